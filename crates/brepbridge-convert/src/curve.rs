//! Curve conversion between the native kernel and the neutral schema.
//!
//! Analytic kinds (line, circle, arc, ellipse, polyline, polycurve) carry
//! their closed-form parameters straight across — no knot translation
//! involved. NURBS curves go through the three-step pipeline of the
//! interchange contract: degree elevation for brep edges and trim curves,
//! interior-multiplicity repair by interpolated rebuild, and knot-vector
//! padding into the full-multiplicity neutral convention.

use brepbridge_kernel::{Curve2, Curve3, NurbsCurveData};
use brepbridge_math::{Interval, Point2, Point3, ToleranceContext, Vec2, Vec3};
use brepbridge_schema::{ControlPoint, NeutralCurve, NeutralInterval, NeutralPoint, SchemaError};
use tracing::debug;

use crate::knots::{multiplicity, pad_for_export, strip_for_import};

/// Equality tolerance for grouping knots during the multiplicity scan.
/// Relative comparison applies: these are curve knots.
const KNOT_EQUALITY_TOLERANCE: f64 = 1e-9;

/// Largest multiplicity among knots strictly inside the curve's domain,
/// grouping values within rounding noise of each other.
fn max_interior_multiplicity(data: &NurbsCurveData) -> usize {
    let domain = data.domain();
    let mut max = 0;
    let mut i = 0;
    while i < data.knots.len() {
        let run = multiplicity(&data.knots, i, KNOT_EQUALITY_TOLERANCE, true);
        if run.average > domain.t0 && run.average < domain.t1 {
            max = max.max(run.count);
        }
        i += run.count;
    }
    max
}

/// Where an encoded curve will live, which decides whether low degrees are
/// elevated: downstream brep consumers handle degree-3 edges and trims more
/// reliably than degree-1/2, while standalone curves keep their degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveRole {
    /// A free-standing curve.
    Standalone,
    /// The 3D curve of a brep edge.
    BrepEdge,
    /// A face's parameter-space trim curve.
    TrimCurve,
}

/// An encoded curve plus the positional deviation introduced when the
/// interior-multiplicity rebuild had to approximate.
#[derive(Debug, Clone)]
pub struct EncodedCurve {
    /// The neutral representation.
    pub curve: NeutralCurve,
    /// Max deviation of the rebuilt curve from the original, when rebuilt.
    pub rebuild_deviation: Option<f64>,
}

fn point(p: &Point3) -> NeutralPoint {
    NeutralPoint::new(p.x, p.y, p.z)
}

fn vector(v: &Vec3) -> NeutralPoint {
    NeutralPoint::new(v.x, v.y, v.z)
}

fn point2(p: &Point2) -> NeutralPoint {
    NeutralPoint::new(p.x, p.y, 0.0)
}

fn vector2(v: &Vec2) -> NeutralPoint {
    NeutralPoint::new(v.x, v.y, 0.0)
}

fn interval(i: &Interval) -> NeutralInterval {
    NeutralInterval::new(i.t0, i.t1)
}

fn from_interval(i: &NeutralInterval) -> Interval {
    Interval::new(i.t0, i.t1)
}

fn from_point(p: &NeutralPoint) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

fn from_vector(p: &NeutralPoint) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Encode the NURBS payload shared by 3D and 2D curves.
fn encode_nurbs(
    data: &NurbsCurveData,
    ctx: &ToleranceContext,
    role: CurveRole,
) -> (NeutralCurve, Option<f64>) {
    let mut work = data.clone();
    let mut deviation = None;

    // Brep edges and trim curves below degree 3 elevate first.
    if work.degree < 3 && role != CurveRole::Standalone {
        work = work.elevated(3);
    }

    // Interior knots stacked higher than degree - 2 break downstream
    // builders. An open curve rebuilds by interpolation through 3x the
    // control count; the deviation is surfaced, not swallowed. The rule only
    // makes sense once degree - 2 is positive, so low-degree standalone
    // curves are left alone.
    let closed = work.is_closed(ctx.absolute);
    if work.degree >= 3 && max_interior_multiplicity(&work) > work.degree - 2 && !closed {
        let rebuilt = work.rebuild_interpolated(work.points.len() * 3);
        let dev = work.max_deviation(&rebuilt, 64);
        debug!(deviation = dev, "rebuilt curve with invalid interior multiplicity");
        deviation = Some(dev);
        work = rebuilt;
    }

    let control_points: Vec<ControlPoint> = work
        .points
        .iter()
        .zip(&work.weights)
        .map(|(p, &w)| ControlPoint::new(p.x, p.y, p.z, w))
        .collect();
    let curve = NeutralCurve::Nurbs {
        degree: work.degree,
        rational: work.is_rational(),
        periodic: false,
        closed,
        control_points,
        knots: pad_for_export(&work.knots, work.degree),
        domain: interval(&work.domain()),
    };
    (curve, deviation)
}

/// Decode the NURBS payload back to kernel form.
///
/// The knot padding strips off exactly; degree-elevated curves stay at their
/// elevated degree — no attempt is made to recover the original lower degree.
fn decode_nurbs(
    degree: usize,
    control_points: &[ControlPoint],
    knots: &[f64],
) -> Result<NurbsCurveData, SchemaError> {
    if control_points.len() < degree + 1 {
        return Err(SchemaError::DegenerateControlPoints {
            context: "nurbs curve".to_string(),
            control_points: control_points.len(),
            degree,
        });
    }
    if knots.len() != control_points.len() + degree + 1 {
        return Err(SchemaError::KnotCountMismatch {
            context: "nurbs curve".to_string(),
            knots: knots.len(),
            control_points: control_points.len(),
            degree,
        });
    }
    let points: Vec<Point3> = control_points
        .iter()
        .map(|cp| Point3::new(cp.x, cp.y, cp.z))
        .collect();
    let weights: Vec<f64> = control_points.iter().map(|cp| cp.weight).collect();
    Ok(NurbsCurveData::new(
        degree,
        points,
        weights,
        strip_for_import(knots),
    ))
}

/// Encode a 3D curve.
pub fn encode_curve3(curve: &Curve3, ctx: &ToleranceContext, role: CurveRole) -> EncodedCurve {
    let (neutral, rebuild_deviation) = match curve {
        Curve3::Line { start, end } => (
            NeutralCurve::Line {
                start: point(start),
                end: point(end),
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve3::Circle {
            center,
            normal,
            x_axis,
            radius,
        } => (
            NeutralCurve::Circle {
                center: point(center),
                normal: vector(normal),
                x_axis: vector(x_axis),
                radius: *radius,
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve3::Arc {
            center,
            normal,
            x_axis,
            radius,
            angle,
        } => (
            NeutralCurve::Arc {
                center: point(center),
                normal: vector(normal),
                x_axis: vector(x_axis),
                radius: *radius,
                angle: interval(angle),
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve3::Ellipse {
            center,
            normal,
            x_axis,
            y_axis,
            radius1,
            radius2,
        } => (
            NeutralCurve::Ellipse {
                center: point(center),
                normal: vector(normal),
                x_axis: vector(x_axis),
                y_axis: vector(y_axis),
                radius1: *radius1,
                radius2: *radius2,
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve3::Polyline { points } => (
            NeutralCurve::Polyline {
                points: points.iter().map(point).collect(),
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve3::Polycurve { segments } => {
            let mut worst = None;
            let encoded: Vec<NeutralCurve> = segments
                .iter()
                .map(|seg| {
                    let enc = encode_curve3(seg, ctx, role);
                    if let Some(d) = enc.rebuild_deviation {
                        worst = Some(worst.map_or(d, |w: f64| w.max(d)));
                    }
                    enc.curve
                })
                .collect();
            (
                NeutralCurve::Polycurve {
                    segments: encoded,
                    closed: curve.is_closed(ctx.absolute),
                    domain: interval(&curve.domain()),
                },
                worst,
            )
        }
        Curve3::Nurbs(data) => encode_nurbs(data, ctx, role),
    };
    EncodedCurve {
        curve: neutral,
        rebuild_deviation,
    }
}

/// Decode a 3D curve.
pub fn decode_curve3(neutral: &NeutralCurve) -> Result<Curve3, SchemaError> {
    Ok(match neutral {
        NeutralCurve::Line { start, end, .. } => Curve3::Line {
            start: from_point(start),
            end: from_point(end),
        },
        NeutralCurve::Circle {
            center,
            normal,
            x_axis,
            radius,
            ..
        } => Curve3::Circle {
            center: from_point(center),
            normal: from_vector(normal),
            x_axis: from_vector(x_axis),
            radius: *radius,
        },
        NeutralCurve::Arc {
            center,
            normal,
            x_axis,
            radius,
            angle,
            ..
        } => Curve3::Arc {
            center: from_point(center),
            normal: from_vector(normal),
            x_axis: from_vector(x_axis),
            radius: *radius,
            angle: from_interval(angle),
        },
        NeutralCurve::Ellipse {
            center,
            normal,
            x_axis,
            y_axis,
            radius1,
            radius2,
            ..
        } => Curve3::Ellipse {
            center: from_point(center),
            normal: from_vector(normal),
            x_axis: from_vector(x_axis),
            y_axis: from_vector(y_axis),
            radius1: *radius1,
            radius2: *radius2,
        },
        NeutralCurve::Polyline { points, .. } => Curve3::Polyline {
            points: points.iter().map(from_point).collect(),
        },
        NeutralCurve::Polycurve { segments, .. } => Curve3::Polycurve {
            segments: segments
                .iter()
                .map(decode_curve3)
                .collect::<Result<_, _>>()?,
        },
        NeutralCurve::Nurbs {
            degree,
            control_points,
            knots,
            ..
        } => Curve3::Nurbs(decode_nurbs(*degree, control_points, knots)?),
    })
}

/// Encode a 2D trim curve; the neutral form carries (u, v) with z = 0.
pub fn encode_curve2(curve: &Curve2, ctx: &ToleranceContext, role: CurveRole) -> EncodedCurve {
    let (neutral, rebuild_deviation) = match curve {
        Curve2::Line { start, end } => (
            NeutralCurve::Line {
                start: point2(start),
                end: point2(end),
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve2::Circle { center, radius } => (
            NeutralCurve::Circle {
                center: point2(center),
                normal: NeutralPoint::new(0.0, 0.0, 1.0),
                x_axis: NeutralPoint::new(1.0, 0.0, 0.0),
                radius: *radius,
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve2::Arc {
            center,
            radius,
            angle,
        } => (
            NeutralCurve::Arc {
                center: point2(center),
                normal: NeutralPoint::new(0.0, 0.0, 1.0),
                x_axis: NeutralPoint::new(1.0, 0.0, 0.0),
                radius: *radius,
                angle: interval(angle),
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve2::Ellipse {
            center,
            x_axis,
            y_axis,
            radius1,
            radius2,
        } => (
            NeutralCurve::Ellipse {
                center: point2(center),
                normal: NeutralPoint::new(0.0, 0.0, 1.0),
                x_axis: vector2(x_axis),
                y_axis: vector2(y_axis),
                radius1: *radius1,
                radius2: *radius2,
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve2::Polyline { points } => (
            NeutralCurve::Polyline {
                points: points.iter().map(point2).collect(),
                domain: interval(&curve.domain()),
            },
            None,
        ),
        Curve2::Polycurve { segments } => {
            let mut worst = None;
            let encoded: Vec<NeutralCurve> = segments
                .iter()
                .map(|seg| {
                    let enc = encode_curve2(seg, ctx, role);
                    if let Some(d) = enc.rebuild_deviation {
                        worst = Some(worst.map_or(d, |w: f64| w.max(d)));
                    }
                    enc.curve
                })
                .collect();
            let closed = (curve.start_point() - curve.end_point()).norm() <= ctx.absolute;
            (
                NeutralCurve::Polycurve {
                    segments: encoded,
                    closed,
                    domain: interval(&curve.domain()),
                },
                worst,
            )
        }
        Curve2::Nurbs(data) => encode_nurbs(data, ctx, role),
    };
    EncodedCurve {
        curve: neutral,
        rebuild_deviation,
    }
}

/// Decode a 2D trim curve, dropping the padded z coordinate.
pub fn decode_curve2(neutral: &NeutralCurve) -> Result<Curve2, SchemaError> {
    let p2 = |p: &NeutralPoint| Point2::new(p.x, p.y);
    let v2 = |p: &NeutralPoint| Vec2::new(p.x, p.y);
    Ok(match neutral {
        NeutralCurve::Line { start, end, .. } => Curve2::Line {
            start: p2(start),
            end: p2(end),
        },
        NeutralCurve::Circle { center, radius, .. } => Curve2::Circle {
            center: p2(center),
            radius: *radius,
        },
        NeutralCurve::Arc {
            center,
            radius,
            angle,
            ..
        } => Curve2::Arc {
            center: p2(center),
            radius: *radius,
            angle: from_interval(angle),
        },
        NeutralCurve::Ellipse {
            center,
            x_axis,
            y_axis,
            radius1,
            radius2,
            ..
        } => Curve2::Ellipse {
            center: p2(center),
            x_axis: v2(x_axis),
            y_axis: v2(y_axis),
            radius1: *radius1,
            radius2: *radius2,
        },
        NeutralCurve::Polyline { points, .. } => Curve2::Polyline {
            points: points.iter().map(p2).collect(),
        },
        NeutralCurve::Polycurve { segments, .. } => Curve2::Polycurve {
            segments: segments
                .iter()
                .map(decode_curve2)
                .collect::<Result<_, _>>()?,
        },
        NeutralCurve::Nurbs {
            degree,
            control_points,
            knots,
            ..
        } => Curve2::Nurbs(decode_nurbs(*degree, control_points, knots)?),
    })
}
