//! Scroll offsets of the form `"<element edge> <viewport line>"`.
//!
//! `"top 85%"` is reached when the element's top edge scrolls above the line
//! at 85% of the viewport height. Edges and lines accept `top`, `center`,
//! `bottom` or a percentage; lines also accept pixels (`"top 120px"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScrollcueError;
use crate::value::Rect;
use crate::watcher::{Length, ObserveOptions, RootMargin};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Line {
    /// Fraction of the viewport height from its top.
    Fraction(f32),
    Px(f32),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScrollOffset {
    /// Fraction of the element height from its top edge.
    pub edge: f32,
    pub line: Line,
}

impl ScrollOffset {
    pub const fn new(edge: f32, line: Line) -> Self {
        Self { edge, line }
    }

    /// `"top <percent>%"`.
    pub const fn top_at(percent: f32) -> Self {
        Self::new(0.0, Line::Fraction(percent / 100.0))
    }

    pub fn edge_y(&self, rect: &Rect) -> f32 {
        rect.top + self.edge * rect.height
    }

    pub fn line_y(&self, viewport_height: f32) -> f32 {
        match self.line {
            Line::Fraction(f) => f * viewport_height,
            Line::Px(px) => px,
        }
    }

    /// Signed distance of the edge below the line; `<= 0` once reached.
    pub fn distance(&self, rect: &Rect, viewport_height: f32) -> f32 {
        self.edge_y(rect) - self.line_y(viewport_height)
    }

    pub fn reached(&self, rect: &Rect, viewport_height: f32) -> bool {
        self.distance(rect, viewport_height) <= 0.0
    }

    /// Observation options that fire when this offset is reached.
    ///
    /// The viewport rectangle is shrunk from the bottom up to the line. For a
    /// top edge that is exact with a zero threshold; other edges are
    /// approximated by requiring that fraction of the element to be visible.
    pub fn observe_options(&self) -> ObserveOptions {
        let bottom = match self.line {
            Line::Fraction(f) => Length::Percent(-(1.0 - f) * 100.0),
            Line::Px(px) => Length::LineFromTop(px),
        };
        ObserveOptions {
            root_margin: RootMargin {
                top: Length::Px(0.0),
                bottom,
            },
            threshold: self.edge.clamp(0.0, 1.0),
        }
    }

    /// Scroll progress between `start` and `end` for the element at `rect`,
    /// clamped to [0, 1]. Both distances shrink at the same rate while
    /// scrolling, so their difference is the scroll span.
    pub fn progress(start: &ScrollOffset, end: &ScrollOffset, rect: &Rect, vh: f32) -> f32 {
        let d_start = start.distance(rect, vh);
        let d_end = end.distance(rect, vh);
        let span = d_end - d_start;
        if span <= f32::EPSILON {
            return if d_start <= 0.0 { 1.0 } else { 0.0 };
        }
        (-d_start / span).clamp(0.0, 1.0)
    }
}

fn parse_edge(token: &str) -> Option<f32> {
    match token {
        "top" => Some(0.0),
        "center" => Some(0.5),
        "bottom" => Some(1.0),
        _ => token
            .strip_suffix('%')
            .and_then(|p| p.parse::<f32>().ok())
            .map(|p| p / 100.0),
    }
}

fn parse_line(token: &str) -> Option<Line> {
    if let Some(px) = token.strip_suffix("px") {
        return px.parse::<f32>().ok().map(Line::Px);
    }
    parse_edge(token).map(Line::Fraction)
}

impl FromStr for ScrollOffset {
    type Err = ScrollcueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollcueError::InvalidOffset {
            text: s.to_string(),
        };
        let mut parts = s.split_whitespace();
        let edge = parts.next().and_then(parse_edge).ok_or_else(invalid)?;
        let line = parts.next().and_then(parse_line).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self { edge, line })
    }
}

fn fmt_fraction(f: &mut fmt::Formatter<'_>, v: f32) -> fmt::Result {
    match v {
        v if v == 0.0 => f.write_str("top"),
        v if v == 0.5 => f.write_str("center"),
        v if v == 1.0 => f.write_str("bottom"),
        v => write!(f, "{}%", v * 100.0),
    }
}

impl fmt::Display for ScrollOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fraction(f, self.edge)?;
        f.write_str(" ")?;
        match self.line {
            Line::Fraction(v) => fmt_fraction(f, v),
            Line::Px(px) => write!(f, "{px}px"),
        }
    }
}

impl TryFrom<String> for ScrollOffset {
    type Error = ScrollcueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScrollOffset> for String {
    fn from(value: ScrollOffset) -> Self {
        value.to_string()
    }
}
