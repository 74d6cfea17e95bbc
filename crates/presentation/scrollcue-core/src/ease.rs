//! Named easing curves.
//!
//! Curves are carried by name (`"power3.out"`, `"back.out(1.7)"`,
//! `"elastic.out(1, 0.3)"`, `"none"`) and mapped to eased progress with the
//! closed forms below. Inputs outside [0, 1] are clamped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScrollcueError;

const BACK_DEFAULT_OVERSHOOT: f32 = 1.70158;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    /// Linear progress (`"none"`).
    None,
    /// `powerN.out`, N in 1..=4.
    PowerOut(u8),
    /// `back.out(overshoot)`.
    BackOut { overshoot: f32 },
    /// `elastic.out(amplitude, period)`.
    ElasticOut { amplitude: f32, period: f32 },
}

impl Default for Ease {
    fn default() -> Self {
        Ease::PowerOut(1)
    }
}

impl Ease {
    pub const POWER2_OUT: Ease = Ease::PowerOut(2);
    pub const POWER3_OUT: Ease = Ease::PowerOut(3);

    pub fn back_out(overshoot: f32) -> Self {
        Ease::BackOut { overshoot }
    }

    pub fn elastic_out(amplitude: f32, period: f32) -> Self {
        Ease::ElasticOut { amplitude, period }
    }

    /// Map linear progress to eased progress.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Ease::None => t,
            Ease::PowerOut(n) => 1.0 - (1.0 - t).powi(i32::from(n) + 1),
            Ease::BackOut { overshoot: s } => {
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
            Ease::ElasticOut { amplitude, period } => {
                let a = amplitude.max(1.0);
                let p = period.max(f32::EPSILON);
                let tau = std::f32::consts::TAU;
                let shift = p / tau * (1.0 / a).asin();
                a * 2f32.powf(-10.0 * t) * ((t - shift) * tau / p).sin() + 1.0
            }
        }
    }
}

fn parse_args(text: &str) -> Result<Vec<f32>, ()> {
    text.split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|_| ()))
        .collect()
}

impl FromStr for Ease {
    type Err = ScrollcueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || ScrollcueError::UnknownEase {
            name: name.to_string(),
        };
        let (head, args) = match name.find('(') {
            Some(open) => {
                let close = name.rfind(')').ok_or_else(unknown)?;
                if close < open {
                    return Err(unknown());
                }
                let args = parse_args(&name[open + 1..close]).map_err(|_| unknown())?;
                (&name[..open], args)
            }
            None => (name, Vec::new()),
        };
        match head {
            "none" | "linear" => Ok(Ease::None),
            "power1" | "power1.out" => Ok(Ease::PowerOut(1)),
            "power2" | "power2.out" => Ok(Ease::PowerOut(2)),
            "power3" | "power3.out" => Ok(Ease::PowerOut(3)),
            "power4" | "power4.out" => Ok(Ease::PowerOut(4)),
            "back" | "back.out" => Ok(Ease::BackOut {
                overshoot: args.first().copied().unwrap_or(BACK_DEFAULT_OVERSHOOT),
            }),
            "elastic" | "elastic.out" => Ok(Ease::ElasticOut {
                amplitude: args.first().copied().unwrap_or(1.0),
                period: args.get(1).copied().unwrap_or(0.3),
            }),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::None => f.write_str("none"),
            Ease::PowerOut(n) => write!(f, "power{n}.out"),
            Ease::BackOut { overshoot } => write!(f, "back.out({overshoot})"),
            Ease::ElasticOut { amplitude, period } => {
                write!(f, "elastic.out({amplitude}, {period})")
            }
        }
    }
}

impl TryFrom<String> for Ease {
    type Error = ScrollcueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(value: Ease) -> Self {
        value.to_string()
    }
}
