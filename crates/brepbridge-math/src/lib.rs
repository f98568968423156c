#![warn(missing_docs)]

//! Math types for the brepbridge interchange core.
//!
//! Thin wrappers around nalgebra providing the domain-specific types shared
//! by the kernel model and the converters: points, parameter intervals,
//! bounding boxes, unit systems, and the tolerance context that every
//! conversion call receives by reference.

use nalgebra::{Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D parameter space.
pub type Vec2 = Vector2<f64>;

// =============================================================================
// Interval
// =============================================================================

/// A closed parameter interval `[t0, t1]`.
///
/// Intervals are kept increasing on construction; `t0 <= t1` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound.
    pub t0: f64,
    /// Upper bound.
    pub t1: f64,
}

impl Interval {
    /// Create an interval, swapping the bounds if given in reverse.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { t0: a, t1: b }
        } else {
            Self { t0: b, t1: a }
        }
    }

    /// The unit interval `[0, 1]`.
    pub fn unit() -> Self {
        Self { t0: 0.0, t1: 1.0 }
    }

    /// Interval length `t1 - t0`.
    pub fn length(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Midpoint of the interval.
    pub fn mid(&self) -> f64 {
        0.5 * (self.t0 + self.t1)
    }

    /// Whether `t` lies inside the interval, within `tolerance` at the ends.
    pub fn contains(&self, t: f64, tolerance: f64) -> bool {
        t >= self.t0 - tolerance && t <= self.t1 + tolerance
    }

    /// Whether `other` is a sub-interval of this one, within `tolerance`.
    pub fn encloses(&self, other: &Interval, tolerance: f64) -> bool {
        other.t0 >= self.t0 - tolerance && other.t1 <= self.t1 + tolerance
    }

    /// Map a normalized parameter `s in [0, 1]` into this interval.
    pub fn at_normalized(&self, s: f64) -> f64 {
        self.t0 + s * self.length()
    }

    /// Normalize `t` into `[0, 1]` relative to this interval.
    ///
    /// Returns 0 for a degenerate interval.
    pub fn normalize(&self, t: f64) -> f64 {
        let len = self.length();
        if len.abs() < f64::EPSILON {
            0.0
        } else {
            (t - self.t0) / len
        }
    }
}

// =============================================================================
// Bounding box
// =============================================================================

/// An axis-aligned bounding box in 3D.
///
/// A freshly-created box is empty (inverted bounds) and becomes valid once a
/// point is added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundingBox {
    /// An empty (inverted) bounding box.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create a box from explicit corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Whether the box contains at least one point.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Expand to contain `p`.
    pub fn expand(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Union with another box.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        if other.is_valid() {
            out.expand(&other.min);
            out.expand(&other.max);
        }
        out
    }

    /// Length of the box diagonal; 0 for an empty box.
    pub fn diagonal(&self) -> f64 {
        if self.is_valid() {
            (self.max - self.min).norm()
        } else {
            0.0
        }
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        Point3::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.5 * (self.min.z + self.max.z),
        )
    }

    /// Uniformly scale the box about the origin.
    pub fn scaled(&self, factor: f64) -> BoundingBox {
        BoundingBox {
            min: Point3::new(self.min.x * factor, self.min.y * factor, self.min.z * factor),
            max: Point3::new(self.max.x * factor, self.max.y * factor, self.max.z * factor),
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Units
// =============================================================================

/// The length unit a model's coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    /// Millimeters (the common mechanical-CAD default).
    #[default]
    Millimeters,
    /// Centimeters.
    Centimeters,
    /// Meters.
    Meters,
    /// Inches.
    Inches,
    /// Feet.
    Feet,
}

impl UnitSystem {
    /// Meters per one unit of this system.
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            UnitSystem::Millimeters => 0.001,
            UnitSystem::Centimeters => 0.01,
            UnitSystem::Meters => 1.0,
            UnitSystem::Inches => 0.0254,
            UnitSystem::Feet => 0.3048,
        }
    }

    /// Scale factor converting coordinates from `self` into `target`.
    pub fn conversion_factor(&self, target: UnitSystem) -> f64 {
        self.meters_per_unit() / target.meters_per_unit()
    }

    /// Canonical short name, as carried in the neutral schema's `units` field.
    pub fn name(&self) -> &'static str {
        match self {
            UnitSystem::Millimeters => "mm",
            UnitSystem::Centimeters => "cm",
            UnitSystem::Meters => "m",
            UnitSystem::Inches => "in",
            UnitSystem::Feet => "ft",
        }
    }

    /// Parse the canonical short name; `None` for anything unrecognized.
    pub fn from_name(name: &str) -> Option<UnitSystem> {
        match name {
            "mm" => Some(UnitSystem::Millimeters),
            "cm" => Some(UnitSystem::Centimeters),
            "m" => Some(UnitSystem::Meters),
            "in" => Some(UnitSystem::Inches),
            "ft" => Some(UnitSystem::Feet),
            _ => None,
        }
    }
}

// =============================================================================
// Tolerance context
// =============================================================================

/// The tolerance and unit settings of a host document.
///
/// Conversions never read ambient/global document state; the host passes one
/// of these by reference into every encoder, auditor, and repair call. The
/// context is immutable for the duration of a conversion, which keeps batch
/// conversion of independent breps safe to parallelize per object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceContext {
    /// Absolute distance tolerance, in `units`.
    pub absolute: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
    /// Unit system of the owning document.
    pub units: UnitSystem,
}

impl ToleranceContext {
    /// Create a context with explicit settings.
    pub fn new(absolute: f64, angular: f64, units: UnitSystem) -> Self {
        Self {
            absolute,
            angular,
            units,
        }
    }

    /// Context with the given units and default tolerances.
    pub fn with_units(units: UnitSystem) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }
}

impl Default for ToleranceContext {
    fn default() -> Self {
        Self {
            absolute: 1e-6,
            angular: 1e-2,
            units: UnitSystem::Millimeters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interval_swaps_reversed_bounds() {
        let i = Interval::new(3.0, 1.0);
        assert_eq!(i.t0, 1.0);
        assert_eq!(i.t1, 3.0);
        assert_relative_eq!(i.length(), 2.0);
        assert_relative_eq!(i.mid(), 2.0);
    }

    #[test]
    fn interval_encloses() {
        let outer = Interval::new(0.0, 10.0);
        assert!(outer.encloses(&Interval::new(2.0, 5.0), 1e-9));
        assert!(outer.encloses(&Interval::new(0.0, 10.0), 1e-9));
        assert!(!outer.encloses(&Interval::new(-1.0, 5.0), 1e-9));
    }

    #[test]
    fn interval_normalize_roundtrip() {
        let i = Interval::new(2.0, 6.0);
        let t = i.at_normalized(0.25);
        assert_relative_eq!(t, 3.0);
        assert_relative_eq!(i.normalize(t), 0.25);
    }

    #[test]
    fn bbox_expand_and_diagonal() {
        let mut b = BoundingBox::empty();
        assert!(!b.is_valid());
        assert_eq!(b.diagonal(), 0.0);
        b.expand(&Point3::new(0.0, 0.0, 0.0));
        b.expand(&Point3::new(3.0, 4.0, 0.0));
        assert!(b.is_valid());
        assert_relative_eq!(b.diagonal(), 5.0);
        assert_relative_eq!(b.center().x, 1.5);
    }

    #[test]
    fn unit_conversion_factors() {
        assert_relative_eq!(
            UnitSystem::Millimeters.conversion_factor(UnitSystem::Meters),
            0.001
        );
        assert_relative_eq!(
            UnitSystem::Inches.conversion_factor(UnitSystem::Millimeters),
            25.4
        );
        assert_relative_eq!(
            UnitSystem::Meters.conversion_factor(UnitSystem::Meters),
            1.0
        );
    }

    #[test]
    fn unit_names_roundtrip() {
        for u in [
            UnitSystem::Millimeters,
            UnitSystem::Centimeters,
            UnitSystem::Meters,
            UnitSystem::Inches,
            UnitSystem::Feet,
        ] {
            assert_eq!(UnitSystem::from_name(u.name()), Some(u));
        }
        assert_eq!(UnitSystem::from_name("furlong"), None);
    }
}
