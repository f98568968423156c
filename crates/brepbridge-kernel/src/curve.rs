//! Native curve variants.
//!
//! The kernel's supported curve kinds form a closed set, so both the 3D edge
//! curves and the 2D trim curves are tagged enums dispatched by exhaustive
//! match. Analytic kinds carry their closed-form parameters; free-form
//! geometry is [`NurbsCurveData`].

use brepbridge_math::{Interval, Point2, Point3, Vec2, Vec3};

use crate::nurbs::NurbsCurveData;

// =============================================================================
// 3D curves
// =============================================================================

/// A parametric curve in 3D model space.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve3 {
    /// Straight segment, parameterized over `[0, 1]`.
    Line {
        /// Start point.
        start: Point3,
        /// End point.
        end: Point3,
    },
    /// Full circle, parameterized by angle over `[0, 2π]`.
    Circle {
        /// Center.
        center: Point3,
        /// Unit plane normal.
        normal: Vec3,
        /// In-plane unit direction at angle 0.
        x_axis: Vec3,
        /// Radius.
        radius: f64,
    },
    /// Circular arc, parameterized by angle over `angle`.
    Arc {
        /// Center of the underlying circle.
        center: Point3,
        /// Unit plane normal.
        normal: Vec3,
        /// In-plane unit direction at angle 0.
        x_axis: Vec3,
        /// Radius.
        radius: f64,
        /// Swept angle interval in radians.
        angle: Interval,
    },
    /// Full ellipse, parameterized by angle over `[0, 2π]`.
    Ellipse {
        /// Center.
        center: Point3,
        /// Unit plane normal.
        normal: Vec3,
        /// Major-axis unit direction.
        x_axis: Vec3,
        /// Minor-axis unit direction.
        y_axis: Vec3,
        /// Radius along `x_axis`.
        radius1: f64,
        /// Radius along `y_axis`.
        radius2: f64,
    },
    /// Piecewise-linear curve, parameterized by segment index.
    Polyline {
        /// Ordered points.
        points: Vec<Point3>,
    },
    /// Joined segment sequence, parameterized by segment index with each
    /// segment traversed over its own normalized domain.
    Polycurve {
        /// Component curves, end-to-start contiguous.
        segments: Vec<Curve3>,
    },
    /// Free-form NURBS curve.
    Nurbs(NurbsCurveData),
}

impl Curve3 {
    /// Parameter domain.
    pub fn domain(&self) -> Interval {
        match self {
            Curve3::Line { .. } => Interval::unit(),
            Curve3::Circle { .. } | Curve3::Ellipse { .. } => {
                Interval::new(0.0, std::f64::consts::TAU)
            }
            Curve3::Arc { angle, .. } => *angle,
            Curve3::Polyline { points } => {
                Interval::new(0.0, (points.len().saturating_sub(1)) as f64)
            }
            Curve3::Polycurve { segments } => Interval::new(0.0, segments.len() as f64),
            Curve3::Nurbs(data) => data.domain(),
        }
    }

    /// Evaluate the curve at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point3 {
        match self {
            Curve3::Line { start, end } => start + t.clamp(0.0, 1.0) * (end - start),
            Curve3::Circle {
                center,
                normal,
                x_axis,
                radius,
            } => {
                let y_axis = normal.cross(x_axis);
                let (sin_t, cos_t) = t.sin_cos();
                center + *radius * (cos_t * x_axis + sin_t * y_axis)
            }
            Curve3::Arc {
                center,
                normal,
                x_axis,
                radius,
                angle,
            } => {
                let y_axis = normal.cross(x_axis);
                let t = t.clamp(angle.t0, angle.t1);
                let (sin_t, cos_t) = t.sin_cos();
                center + *radius * (cos_t * x_axis + sin_t * y_axis)
            }
            Curve3::Ellipse {
                center,
                x_axis,
                y_axis,
                radius1,
                radius2,
                ..
            } => {
                let (sin_t, cos_t) = t.sin_cos();
                center + radius1 * cos_t * x_axis + radius2 * sin_t * y_axis
            }
            Curve3::Polyline { points } => {
                if points.is_empty() {
                    return Point3::origin();
                }
                let t = t.clamp(0.0, (points.len() - 1) as f64);
                let i = (t.floor() as usize).min(points.len().saturating_sub(2));
                let frac = t - i as f64;
                points[i] + frac * (points[(i + 1).min(points.len() - 1)] - points[i])
            }
            Curve3::Polycurve { segments } => {
                if segments.is_empty() {
                    return Point3::origin();
                }
                let t = t.clamp(0.0, segments.len() as f64);
                let i = (t.floor() as usize).min(segments.len() - 1);
                let frac = t - i as f64;
                let seg = &segments[i];
                seg.point_at(seg.domain().at_normalized(frac))
            }
            Curve3::Nurbs(data) => data.point_at(t),
        }
    }

    /// Tangent vector at parameter `t` (not normalized).
    pub fn tangent_at(&self, t: f64) -> Vec3 {
        match self {
            Curve3::Line { start, end } => end - start,
            Curve3::Nurbs(data) => data.tangent_at(t),
            _ => {
                let d = self.domain();
                let dt = d.length().max(1e-9) * 1e-6;
                let p0 = self.point_at((t - dt).max(d.t0));
                let p1 = self.point_at((t + dt).min(d.t1));
                (p1 - p0) / ((t + dt).min(d.t1) - (t - dt).max(d.t0))
            }
        }
    }

    /// Start point.
    pub fn start_point(&self) -> Point3 {
        self.point_at(self.domain().t0)
    }

    /// End point.
    pub fn end_point(&self) -> Point3 {
        self.point_at(self.domain().t1)
    }

    /// Whether the endpoints coincide within `tolerance`.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        (self.start_point() - self.end_point()).norm() <= tolerance
    }

    /// Approximate arc length of the portion over `sub`, by chord sampling.
    pub fn length_over(&self, sub: &Interval, samples: usize) -> f64 {
        let mut len = 0.0;
        let mut prev = self.point_at(sub.t0);
        for k in 1..=samples {
            let t = sub.at_normalized(k as f64 / samples as f64);
            let p = self.point_at(t);
            len += (p - prev).norm();
            prev = p;
        }
        len
    }

    /// Uniformly scale the curve about the origin.
    pub fn scale(&mut self, factor: f64) {
        match self {
            Curve3::Line { start, end } => {
                *start *= factor;
                *end *= factor;
            }
            Curve3::Circle { center, radius, .. } => {
                *center *= factor;
                *radius *= factor;
            }
            Curve3::Arc { center, radius, .. } => {
                *center *= factor;
                *radius *= factor;
            }
            Curve3::Ellipse {
                center,
                radius1,
                radius2,
                ..
            } => {
                *center *= factor;
                *radius1 *= factor;
                *radius2 *= factor;
            }
            Curve3::Polyline { points } => {
                for p in points {
                    *p *= factor;
                }
            }
            Curve3::Polycurve { segments } => {
                for seg in segments {
                    seg.scale(factor);
                }
            }
            Curve3::Nurbs(data) => {
                for p in &mut data.points {
                    *p *= factor;
                }
            }
        }
    }
}

// =============================================================================
// 2D curves (surface parameter space)
// =============================================================================

/// A parametric curve in a surface's (u, v) parameter space.
///
/// NURBS trim geometry reuses [`NurbsCurveData`] with z = 0, the same
/// flattening the neutral schema applies.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve2 {
    /// Straight segment over `[0, 1]`.
    Line {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
    },
    /// Full circle over `[0, 2π]`.
    Circle {
        /// Center.
        center: Point2,
        /// Radius.
        radius: f64,
    },
    /// Circular arc over `angle`.
    Arc {
        /// Center.
        center: Point2,
        /// Radius.
        radius: f64,
        /// Swept angle interval in radians.
        angle: Interval,
    },
    /// Full ellipse over `[0, 2π]`.
    Ellipse {
        /// Center.
        center: Point2,
        /// Major-axis unit direction.
        x_axis: Vec2,
        /// Minor-axis unit direction.
        y_axis: Vec2,
        /// Radius along `x_axis`.
        radius1: f64,
        /// Radius along `y_axis`.
        radius2: f64,
    },
    /// Piecewise-linear curve by segment index.
    Polyline {
        /// Ordered points.
        points: Vec<Point2>,
    },
    /// Joined segment sequence by segment index.
    Polycurve {
        /// Component curves.
        segments: Vec<Curve2>,
    },
    /// Free-form NURBS trim curve (z = 0).
    Nurbs(NurbsCurveData),
}

impl Curve2 {
    /// Parameter domain.
    pub fn domain(&self) -> Interval {
        match self {
            Curve2::Line { .. } => Interval::unit(),
            Curve2::Circle { .. } | Curve2::Ellipse { .. } => {
                Interval::new(0.0, std::f64::consts::TAU)
            }
            Curve2::Arc { angle, .. } => *angle,
            Curve2::Polyline { points } => {
                Interval::new(0.0, (points.len().saturating_sub(1)) as f64)
            }
            Curve2::Polycurve { segments } => Interval::new(0.0, segments.len() as f64),
            Curve2::Nurbs(data) => data.domain(),
        }
    }

    /// Evaluate at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point2 {
        match self {
            Curve2::Line { start, end } => start + t.clamp(0.0, 1.0) * (end - start),
            Curve2::Circle { center, radius } => {
                let (sin_t, cos_t) = t.sin_cos();
                center + *radius * Vec2::new(cos_t, sin_t)
            }
            Curve2::Arc {
                center,
                radius,
                angle,
            } => {
                let t = t.clamp(angle.t0, angle.t1);
                let (sin_t, cos_t) = t.sin_cos();
                center + *radius * Vec2::new(cos_t, sin_t)
            }
            Curve2::Ellipse {
                center,
                x_axis,
                y_axis,
                radius1,
                radius2,
            } => {
                let (sin_t, cos_t) = t.sin_cos();
                center + radius1 * cos_t * x_axis + radius2 * sin_t * y_axis
            }
            Curve2::Polyline { points } => {
                if points.is_empty() {
                    return Point2::origin();
                }
                let t = t.clamp(0.0, (points.len() - 1) as f64);
                let i = (t.floor() as usize).min(points.len().saturating_sub(2));
                let frac = t - i as f64;
                points[i] + frac * (points[(i + 1).min(points.len() - 1)] - points[i])
            }
            Curve2::Polycurve { segments } => {
                if segments.is_empty() {
                    return Point2::origin();
                }
                let t = t.clamp(0.0, segments.len() as f64);
                let i = (t.floor() as usize).min(segments.len() - 1);
                let frac = t - i as f64;
                let seg = &segments[i];
                seg.point_at(seg.domain().at_normalized(frac))
            }
            Curve2::Nurbs(data) => {
                let p = data.point_at(t);
                Point2::new(p.x, p.y)
            }
        }
    }

    /// Start point.
    pub fn start_point(&self) -> Point2 {
        self.point_at(self.domain().t0)
    }

    /// End point.
    pub fn end_point(&self) -> Point2 {
        self.point_at(self.domain().t1)
    }

    /// Affinely remap one parameter-space coordinate:
    /// `c' = origin + (c - origin) * factor`.
    ///
    /// Used when a surface's domain is rescaled and the trim geometry living
    /// in its parameter space must follow.
    pub fn remap_axis(&mut self, horizontal: bool, origin: f64, factor: f64) {
        let map1 = |c: &mut f64| *c = origin + (*c - origin) * factor;
        let map2 = |p: &mut Point2| {
            if horizontal {
                map1(&mut p.x);
            } else {
                map1(&mut p.y);
            }
        };
        match self {
            Curve2::Line { start, end } => {
                map2(start);
                map2(end);
            }
            Curve2::Circle { center, .. } | Curve2::Arc { center, .. } => {
                // Non-uniform remap turns circles into ellipses; trims on
                // rescale-repaired faces are NURBS or lines in practice, so
                // shift only the center and accept the radius as-is.
                map2(center);
            }
            Curve2::Ellipse { center, .. } => {
                map2(center);
            }
            Curve2::Polyline { points } => {
                for p in points {
                    map2(p);
                }
            }
            Curve2::Polycurve { segments } => {
                for seg in segments {
                    seg.remap_axis(horizontal, origin, factor);
                }
            }
            Curve2::Nurbs(data) => {
                for p in &mut data.points {
                    if horizontal {
                        map1(&mut p.x);
                    } else {
                        map1(&mut p.y);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn line_midpoint() {
        let c = Curve3::Line {
            start: Point3::origin(),
            end: Point3::new(10.0, 0.0, 0.0),
        };
        assert_relative_eq!(c.point_at(0.5).x, 5.0);
        assert_relative_eq!(c.length_over(&c.domain(), 8), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn circle_quarter_turn() {
        let c = Curve3::Circle {
            center: Point3::origin(),
            normal: Vec3::z(),
            x_axis: Vec3::x(),
            radius: 5.0,
        };
        let p = c.point_at(FRAC_PI_2);
        assert!(p.x.abs() < 1e-12);
        assert_relative_eq!(p.y, 5.0);
        assert!(c.is_closed(1e-9));
    }

    #[test]
    fn arc_respects_angle_domain() {
        let c = Curve3::Arc {
            center: Point3::origin(),
            normal: Vec3::z(),
            x_axis: Vec3::x(),
            radius: 2.0,
            angle: Interval::new(0.0, FRAC_PI_2),
        };
        assert_relative_eq!(c.start_point().x, 2.0);
        assert_relative_eq!(c.end_point().y, 2.0, epsilon = 1e-12);
        assert!(!c.is_closed(1e-9));
    }

    #[test]
    fn ellipse_axes() {
        let c = Curve3::Ellipse {
            center: Point3::origin(),
            normal: Vec3::z(),
            x_axis: Vec3::x(),
            y_axis: Vec3::y(),
            radius1: 4.0,
            radius2: 2.0,
        };
        assert_relative_eq!(c.point_at(0.0).x, 4.0);
        assert_relative_eq!(c.point_at(FRAC_PI_2).y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn polyline_segment_parameterization() {
        let c = Curve3::Polyline {
            points: vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
        };
        assert_eq!(c.domain(), Interval::new(0.0, 2.0));
        let p = c.point_at(1.5);
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 0.5);
    }

    #[test]
    fn polycurve_chains_segments() {
        let c = Curve3::Polycurve {
            segments: vec![
                Curve3::Line {
                    start: Point3::origin(),
                    end: Point3::new(1.0, 0.0, 0.0),
                },
                Curve3::Arc {
                    center: Point3::new(1.0, 1.0, 0.0),
                    normal: Vec3::z(),
                    x_axis: -Vec3::y(),
                    radius: 1.0,
                    angle: Interval::new(0.0, FRAC_PI_2),
                },
            ],
        };
        // End of segment 0 meets start of segment 1.
        let joint_a = c.point_at(1.0);
        let joint_b = c.point_at(1.0 + 1e-12);
        assert!((joint_a - joint_b).norm() < 1e-6);
        assert_eq!(c.domain(), Interval::new(0.0, 2.0));
    }

    #[test]
    fn scale_is_uniform() {
        let mut c = Curve3::Circle {
            center: Point3::new(1.0, 0.0, 0.0),
            normal: Vec3::z(),
            x_axis: Vec3::x(),
            radius: 2.0,
        };
        c.scale(10.0);
        match c {
            Curve3::Circle { center, radius, .. } => {
                assert_relative_eq!(center.x, 10.0);
                assert_relative_eq!(radius, 20.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn curve2_line_and_arc() {
        let l = Curve2::Line {
            start: Point2::origin(),
            end: Point2::new(1.0, 1.0),
        };
        let mid = l.point_at(0.5);
        assert_relative_eq!(mid.x, 0.5);

        let a = Curve2::Arc {
            center: Point2::origin(),
            radius: 1.0,
            angle: Interval::new(0.0, PI),
        };
        assert_relative_eq!(a.end_point().x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn curve2_remap_axis() {
        let mut l = Curve2::Line {
            start: Point2::new(0.0, 0.5),
            end: Point2::new(1.0, 0.5),
        };
        l.remap_axis(true, 0.0, 4.0);
        assert_relative_eq!(l.end_point().x, 4.0);
        assert_relative_eq!(l.end_point().y, 0.5);
    }
}
