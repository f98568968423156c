//! Surface conversion between the native kernel and the neutral schema.
//!
//! Structurally the 2D analogue of the curve encoder: two independent knot
//! vectors translated per axis, plus the row-major control grid. No min-delta
//! checking happens here — degenerate surface knot spacing is a topology-level
//! concern that the auditor flags and repair fixes on the whole brep, while
//! curve multiplicity defects are per-entity and fixed locally.

use brepbridge_kernel::NurbsSurfaceData;
use brepbridge_math::{Point3, ToleranceContext};
use brepbridge_schema::{ControlPoint, NeutralInterval, NeutralSurface, SchemaError};

use crate::knots::{pad_for_export, strip_for_import};

/// Encode a surface into the neutral full-multiplicity convention.
pub fn encode_surface(surface: &NurbsSurfaceData, ctx: &ToleranceContext) -> NeutralSurface {
    let control_points: Vec<ControlPoint> = surface
        .points
        .iter()
        .zip(&surface.weights)
        .map(|(p, &w)| ControlPoint::new(p.x, p.y, p.z, w))
        .collect();
    let du = surface.domain_u();
    let dv = surface.domain_v();
    NeutralSurface {
        degree_u: surface.degree_u,
        degree_v: surface.degree_v,
        rational: surface.is_rational(),
        closed_u: surface.is_closed_u(ctx.absolute),
        closed_v: surface.is_closed_v(ctx.absolute),
        count_u: surface.count_u,
        count_v: surface.count_v,
        knots_u: pad_for_export(&surface.knots_u, surface.degree_u),
        knots_v: pad_for_export(&surface.knots_v, surface.degree_v),
        control_points,
        domain_u: NeutralInterval::new(du.t0, du.t1),
        domain_v: NeutralInterval::new(dv.t0, dv.t1),
    }
}

/// Decode a neutral surface back to kernel form.
pub fn decode_surface(neutral: &NeutralSurface) -> Result<NurbsSurfaceData, SchemaError> {
    if neutral.control_points.len() != neutral.count_u * neutral.count_v {
        return Err(SchemaError::GridMismatch {
            index: 0,
            actual: neutral.control_points.len(),
            count_u: neutral.count_u,
            count_v: neutral.count_v,
        });
    }
    for (axis, knots, count, degree) in [
        ("u", &neutral.knots_u, neutral.count_u, neutral.degree_u),
        ("v", &neutral.knots_v, neutral.count_v, neutral.degree_v),
    ] {
        if knots.len() != count + degree + 1 {
            return Err(SchemaError::KnotCountMismatch {
                context: format!("surface {axis}"),
                knots: knots.len(),
                control_points: count,
                degree,
            });
        }
    }

    let points: Vec<Point3> = neutral
        .control_points
        .iter()
        .map(|cp| Point3::new(cp.x, cp.y, cp.z))
        .collect();
    let weights: Vec<f64> = neutral.control_points.iter().map(|cp| cp.weight).collect();
    Ok(NurbsSurfaceData::new(
        neutral.degree_u,
        neutral.degree_v,
        neutral.count_u,
        neutral.count_v,
        points,
        weights,
        strip_for_import(&neutral.knots_u),
        strip_for_import(&neutral.knots_v),
    ))
}
