//! Animatable properties, property deltas and page geometry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Unit a property value is written with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CssUnit {
    None,
    Px,
    Percent,
    Deg,
}

impl CssUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            CssUnit::None => "",
            CssUnit::Px => "px",
            CssUnit::Percent => "%",
            CssUnit::Deg => "deg",
        }
    }
}

/// A visual property the engine can interpolate.
///
/// Transform components are kept separate; the host composes them into a
/// single transform when applying changes.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    X,
    Y,
    YPercent,
    Scale,
    Rotation,
    RotationY,
    /// CSS custom property such as `--line-width`.
    CssVar { name: String, unit: CssUnit },
}

impl Property {
    pub fn css_var(name: impl Into<String>, unit: CssUnit) -> Self {
        Property::CssVar {
            name: name.into(),
            unit,
        }
    }

    /// Resting value: fully opaque, unscaled, untranslated.
    pub fn neutral(&self) -> f32 {
        match self {
            Property::Opacity | Property::Scale => 1.0,
            _ => 0.0,
        }
    }

    pub fn unit(&self) -> CssUnit {
        match self {
            Property::Opacity | Property::Scale => CssUnit::None,
            Property::X | Property::Y => CssUnit::Px,
            Property::YPercent => CssUnit::Percent,
            Property::Rotation | Property::RotationY => CssUnit::Deg,
            Property::CssVar { unit, .. } => *unit,
        }
    }

    pub fn is_transform(&self) -> bool {
        !matches!(self, Property::Opacity | Property::CssVar { .. })
    }
}

/// Start and end of one property. A missing `from` means "current value", a
/// missing `to` means "neutral value".
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDelta {
    #[serde(default)]
    pub from: Option<f32>,
    #[serde(default)]
    pub to: Option<f32>,
}

impl PropertyDelta {
    /// Resolve against the element's current value for `property`.
    pub fn resolve(&self, property: &Property, current: Option<f32>) -> (f32, f32) {
        let current = current.unwrap_or_else(|| property.neutral());
        let from = self.from.unwrap_or(current);
        let to = self.to.unwrap_or_else(|| {
            if self.from.is_some() {
                property.neutral()
            } else {
                current
            }
        });
        (from, to)
    }

    pub fn is_from_only(&self) -> bool {
        self.from.is_some() && self.to.is_none()
    }
}

/// Ordered property deltas of one recipe or step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(pub IndexMap<Property, PropertyDelta>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// GSAP `from`: start at `value`, end at neutral.
    pub fn from(mut self, property: Property, value: f32) -> Self {
        self.0.insert(
            property,
            PropertyDelta {
                from: Some(value),
                to: None,
            },
        );
        self
    }

    /// GSAP `to`: start at the current value.
    pub fn to(mut self, property: Property, value: f32) -> Self {
        self.0.insert(
            property,
            PropertyDelta {
                from: None,
                to: Some(value),
            },
        );
        self
    }

    pub fn from_to(mut self, property: Property, from: f32, to: f32) -> Self {
        self.0.insert(
            property,
            PropertyDelta {
                from: Some(from),
                to: Some(to),
            },
        );
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Property, &PropertyDelta)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, property: &Property) -> bool {
        self.0.contains_key(property)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Bounding client rectangle in CSS pixels, relative to the viewport.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.left + self.width * 0.5,
            y: self.top + self.height * 0.5,
        }
    }

    /// Pointer position relative to the centre, each axis in [-0.5, 0.5].
    pub fn relative(&self, p: Point) -> Point {
        let w = self.width.max(f32::EPSILON);
        let h = self.height.max(f32::EPSILON);
        Point {
            x: ((p.x - self.left) / w - 0.5).clamp(-0.5, 0.5),
            y: ((p.y - self.top) / h - 0.5).clamp(-0.5, 0.5),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_only_resolves_to_neutral() {
        let d = PropertyDelta {
            from: Some(0.0),
            to: None,
        };
        assert_eq!(d.resolve(&Property::Opacity, Some(0.4)), (0.0, 1.0));
        assert!(d.is_from_only());
    }

    #[test]
    fn to_only_starts_at_current() {
        let d = PropertyDelta {
            from: None,
            to: Some(1.05),
        };
        assert_eq!(d.resolve(&Property::Scale, Some(0.9)), (0.9, 1.05));
        assert_eq!(d.resolve(&Property::Scale, None), (1.0, 1.05));
    }

    #[test]
    fn relative_pointer_is_centred() {
        let r = Rect::new(100.0, 50.0, 200.0, 40.0);
        let p = r.relative(Point { x: 200.0, y: 70.0 });
        assert_eq!(p, Point { x: 0.0, y: 0.0 });
        let corner = r.relative(Point { x: 300.0, y: 90.0 });
        assert_eq!(corner, Point { x: 0.5, y: 0.5 });
    }

    #[test]
    fn props_keep_declaration_order() {
        let p = Props::new()
            .from(Property::Opacity, 0.0)
            .from(Property::Y, 50.0)
            .to(Property::Scale, 1.05);
        let keys: Vec<_> = p.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![Property::Opacity, Property::Y, Property::Scale]);
    }
}
