//! Structural validation of the neutral schema.
//!
//! Malformed neutral input is a contract violation by the upstream
//! serializer, not a geometry defect, so validation failures are fatal and
//! typed rather than swallowed into a conversion report.

use thiserror::Error;

use crate::{NeutralBrep, NeutralCurve, NeutralSurface};

/// A structural defect in a neutral brep.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A cross-reference points outside its target array.
    #[error("{context}: index {index} out of bounds for {array} (len {len})")]
    IndexOutOfBounds {
        /// Which record held the bad reference.
        context: String,
        /// Target array name.
        array: &'static str,
        /// The offending index.
        index: i32,
        /// Target array length.
        len: usize,
    },

    /// A reference that is required to resolve was −1.
    #[error("{context}: required {array} reference is unset")]
    MissingReference {
        /// Which record held the missing reference.
        context: String,
        /// Target array name.
        array: &'static str,
    },

    /// NURBS knot count disagrees with control count and degree.
    #[error(
        "{context}: knot count {knots} does not match control points {control_points} + degree {degree} + 1"
    )]
    KnotCountMismatch {
        /// Which curve or surface axis.
        context: String,
        /// Actual knot count.
        knots: usize,
        /// Control-point count.
        control_points: usize,
        /// Degree.
        degree: usize,
    },

    /// A knot vector decreases somewhere.
    #[error("{context}: knot vector is not non-decreasing at position {position}")]
    KnotsNotMonotonic {
        /// Which curve or surface axis.
        context: String,
        /// First offending position.
        position: usize,
    },

    /// Surface control grid size disagrees with count_u × count_v.
    #[error("surface {index}: control grid has {actual} points, expected {count_u} x {count_v}")]
    GridMismatch {
        /// Surface index.
        index: usize,
        /// Actual control-point count.
        actual: usize,
        /// Declared u count.
        count_u: usize,
        /// Declared v count.
        count_v: usize,
    },

    /// A curve has too few control points for its degree.
    #[error("{context}: {control_points} control points is too few for degree {degree}")]
    DegenerateControlPoints {
        /// Which curve.
        context: String,
        /// Control-point count.
        control_points: usize,
        /// Degree.
        degree: usize,
    },

    /// An edge's domain is not a sub-interval of its curve's domain.
    #[error("edge {index}: domain [{d0}, {d1}] exceeds curve domain [{c0}, {c1}]")]
    EdgeDomainNotEnclosed {
        /// Edge index.
        index: usize,
        /// Edge domain start.
        d0: f64,
        /// Edge domain end.
        d1: f64,
        /// Curve domain start.
        c0: f64,
        /// Curve domain end.
        c1: f64,
    },

    /// A closed brep has an edge not shared by exactly two trims.
    #[error("brep is flagged closed but edge {index} has {trims} trims (expected 2)")]
    NotWatertight {
        /// Edge index.
        index: usize,
        /// Trim count on that edge.
        trims: usize,
    },

    /// An open brep carries a nonzero volume.
    #[error("open brep carries nonzero volume {volume}")]
    OpenBrepVolume {
        /// The offending volume value.
        volume: f64,
    },
}

/// Domain-enclosure slack: decode feeds these values to a kernel that
/// compares at its own join tolerance, so validation allows the same noise.
const DOMAIN_SLACK: f64 = 1e-9;

fn check_index(
    context: &str,
    array: &'static str,
    index: i32,
    len: usize,
    allow_unset: bool,
) -> Result<(), SchemaError> {
    if index < 0 {
        if allow_unset {
            return Ok(());
        }
        return Err(SchemaError::MissingReference {
            context: context.to_string(),
            array,
        });
    }
    if index as usize >= len {
        return Err(SchemaError::IndexOutOfBounds {
            context: context.to_string(),
            array,
            index,
            len,
        });
    }
    Ok(())
}

fn check_knots(
    context: &str,
    knots: &[f64],
    control_points: usize,
    degree: usize,
) -> Result<(), SchemaError> {
    if control_points < degree + 1 {
        return Err(SchemaError::DegenerateControlPoints {
            context: context.to_string(),
            control_points,
            degree,
        });
    }
    if knots.len() != control_points + degree + 1 {
        return Err(SchemaError::KnotCountMismatch {
            context: context.to_string(),
            knots: knots.len(),
            control_points,
            degree,
        });
    }
    for i in 1..knots.len() {
        if knots[i] < knots[i - 1] {
            return Err(SchemaError::KnotsNotMonotonic {
                context: context.to_string(),
                position: i,
            });
        }
    }
    Ok(())
}

fn check_curve(context: &str, curve: &NeutralCurve) -> Result<(), SchemaError> {
    match curve {
        NeutralCurve::Nurbs {
            degree,
            control_points,
            knots,
            ..
        } => check_knots(context, knots, control_points.len(), *degree),
        NeutralCurve::Polycurve { segments, .. } => {
            for (i, seg) in segments.iter().enumerate() {
                check_curve(&format!("{context} segment {i}"), seg)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_surface(index: usize, surface: &NeutralSurface) -> Result<(), SchemaError> {
    if surface.control_points.len() != surface.count_u * surface.count_v {
        return Err(SchemaError::GridMismatch {
            index,
            actual: surface.control_points.len(),
            count_u: surface.count_u,
            count_v: surface.count_v,
        });
    }
    check_knots(
        &format!("surface {index} u"),
        &surface.knots_u,
        surface.count_u,
        surface.degree_u,
    )?;
    check_knots(
        &format!("surface {index} v"),
        &surface.knots_v,
        surface.count_v,
        surface.degree_v,
    )
}

impl NeutralBrep {
    /// Check every structural invariant of the schema.
    ///
    /// Returns the first violation found. A brep that passes is safe to
    /// decode: every index resolves, every knot vector is consistent, every
    /// edge domain fits its curve, and the watertight flag is honest.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, curve) in self.curves3d.iter().enumerate() {
            check_curve(&format!("curve3d {i}"), curve)?;
        }
        for (i, curve) in self.curves2d.iter().enumerate() {
            check_curve(&format!("curve2d {i}"), curve)?;
        }
        for (i, surface) in self.surfaces.iter().enumerate() {
            check_surface(i, surface)?;
        }

        for (i, face) in self.faces.iter().enumerate() {
            let ctx = format!("face {i}");
            check_index(&ctx, "surfaces", face.surface_index, self.surfaces.len(), false)?;
            check_index(&ctx, "loops", face.outer_loop_index, self.loops.len(), false)?;
            for &li in &face.loop_indices {
                check_index(&ctx, "loops", li, self.loops.len(), false)?;
            }
        }

        for (i, edge) in self.edges.iter().enumerate() {
            let ctx = format!("edge {i}");
            check_index(&ctx, "curves3d", edge.curve3d_index, self.curves3d.len(), false)?;
            check_index(&ctx, "vertices", edge.start_vertex_index, self.vertices.len(), true)?;
            check_index(&ctx, "vertices", edge.end_vertex_index, self.vertices.len(), true)?;
            for &ti in &edge.trim_indices {
                check_index(&ctx, "trims", ti, self.trims.len(), false)?;
            }
            let curve_domain = self.curves3d[edge.curve3d_index as usize].domain();
            if !curve_domain.encloses(&edge.domain, DOMAIN_SLACK) {
                return Err(SchemaError::EdgeDomainNotEnclosed {
                    index: i,
                    d0: edge.domain.t0,
                    d1: edge.domain.t1,
                    c0: curve_domain.t0,
                    c1: curve_domain.t1,
                });
            }
        }

        for (i, lp) in self.loops.iter().enumerate() {
            let ctx = format!("loop {i}");
            check_index(&ctx, "faces", lp.face_index, self.faces.len(), false)?;
            for &ti in &lp.trim_indices {
                check_index(&ctx, "trims", ti, self.trims.len(), false)?;
            }
        }

        for (i, trim) in self.trims.iter().enumerate() {
            let ctx = format!("trim {i}");
            check_index(&ctx, "edges", trim.edge_index, self.edges.len(), true)?;
            check_index(&ctx, "faces", trim.face_index, self.faces.len(), false)?;
            check_index(&ctx, "loops", trim.loop_index, self.loops.len(), false)?;
            check_index(&ctx, "curves2d", trim.curve2d_index, self.curves2d.len(), false)?;
            check_index(&ctx, "vertices", trim.start_vertex_index, self.vertices.len(), true)?;
            check_index(&ctx, "vertices", trim.end_vertex_index, self.vertices.len(), true)?;
        }

        if self.is_closed {
            for (i, edge) in self.edges.iter().enumerate() {
                if edge.trim_indices.len() != 2 {
                    return Err(SchemaError::NotWatertight {
                        index: i,
                        trims: edge.trim_indices.len(),
                    });
                }
            }
        } else if self.volume != 0.0 {
            return Err(SchemaError::OpenBrepVolume {
                volume: self.volume,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BrepOrientation, ControlPoint, NeutralBox, NeutralEdge, NeutralInterval, NeutralPoint,
    };

    fn line_curve(x1: f64) -> NeutralCurve {
        NeutralCurve::Line {
            start: NeutralPoint::new(0.0, 0.0, 0.0),
            end: NeutralPoint::new(x1, 0.0, 0.0),
            domain: NeutralInterval::new(0.0, 1.0),
        }
    }

    fn empty_brep() -> NeutralBrep {
        NeutralBrep {
            provenance: "test".into(),
            units: "mm".into(),
            vertices: vec![],
            curves3d: vec![],
            curves2d: vec![],
            surfaces: vec![],
            faces: vec![],
            edges: vec![],
            loops: vec![],
            trims: vec![],
            is_closed: false,
            orientation: BrepOrientation::None,
            area: 0.0,
            volume: 0.0,
            bbox: NeutralBox {
                min: NeutralPoint::new(0.0, 0.0, 0.0),
                max: NeutralPoint::new(0.0, 0.0, 0.0),
            },
        }
    }

    #[test]
    fn empty_brep_is_valid() {
        assert_eq!(empty_brep().validate(), Ok(()));
    }

    #[test]
    fn edge_curve_index_out_of_bounds() {
        let mut brep = empty_brep();
        brep.curves3d.push(line_curve(1.0));
        brep.edges.push(NeutralEdge {
            curve3d_index: 3,
            trim_indices: vec![],
            start_vertex_index: -1,
            end_vertex_index: -1,
            curve_reversed: false,
            domain: NeutralInterval::new(0.0, 1.0),
        });
        assert!(matches!(
            brep.validate(),
            Err(SchemaError::IndexOutOfBounds { index: 3, .. })
        ));
    }

    #[test]
    fn edge_domain_must_fit_curve() {
        let mut brep = empty_brep();
        brep.curves3d.push(line_curve(1.0));
        brep.edges.push(NeutralEdge {
            curve3d_index: 0,
            trim_indices: vec![],
            start_vertex_index: -1,
            end_vertex_index: -1,
            curve_reversed: false,
            domain: NeutralInterval::new(0.0, 2.0),
        });
        assert!(matches!(
            brep.validate(),
            Err(SchemaError::EdgeDomainNotEnclosed { index: 0, .. })
        ));
    }

    #[test]
    fn nurbs_knot_count_checked() {
        let mut brep = empty_brep();
        brep.curves3d.push(NeutralCurve::Nurbs {
            degree: 2,
            rational: false,
            periodic: false,
            closed: false,
            control_points: vec![
                ControlPoint::new(0.0, 0.0, 0.0, 1.0),
                ControlPoint::new(1.0, 1.0, 0.0, 1.0),
                ControlPoint::new(2.0, 0.0, 0.0, 1.0),
            ],
            knots: vec![0.0, 0.0, 0.0, 1.0, 1.0], // one short
            domain: NeutralInterval::new(0.0, 1.0),
        });
        assert!(matches!(
            brep.validate(),
            Err(SchemaError::KnotCountMismatch { knots: 5, .. })
        ));
    }

    #[test]
    fn closed_brep_requires_two_trims_per_edge() {
        let mut brep = empty_brep();
        brep.curves3d.push(line_curve(1.0));
        brep.edges.push(NeutralEdge {
            curve3d_index: 0,
            trim_indices: vec![],
            start_vertex_index: -1,
            end_vertex_index: -1,
            curve_reversed: false,
            domain: NeutralInterval::new(0.0, 1.0),
        });
        brep.is_closed = true;
        assert!(matches!(
            brep.validate(),
            Err(SchemaError::NotWatertight { index: 0, trims: 0 })
        ));
    }

    #[test]
    fn open_brep_rejects_volume() {
        let mut brep = empty_brep();
        brep.volume = 5.0;
        assert!(matches!(
            brep.validate(),
            Err(SchemaError::OpenBrepVolume { .. })
        ));
    }
}
