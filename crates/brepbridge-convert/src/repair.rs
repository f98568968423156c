//! Tolerance repair of a native brep.
//!
//! Repair consumes the auditor's flags and runs the standard healing
//! sequence: unjoin everything into shells, split kinky edges, drop naked
//! micro-edges, merge co-tangent neighbors, rescale degenerate surface
//! parameterizations, then rejoin at the document tolerance. When rejoining
//! cannot reach a single manifold shell, the remaining naked edges stay in
//! one non-manifold compound — geometry is never discarded.
//!
//! The sequence runs once per call. The export pipeline re-audits afterwards
//! and iterates a small fixed number of times until the flags stabilize.

use brepbridge_kernel::{Brep, EdgeKey, FaceKey, SurfaceAxis};
use brepbridge_math::ToleranceContext;
use tracing::debug;

use crate::audit::IssueFlags;
use crate::knots::{min_delta, KNOT_MIN_DELTA, REBUILD_FIT_TOLERANCE};

/// Collect the edges currently referenced by a group of faces.
fn shell_edges(brep: &Brep, faces: &[FaceKey]) -> Vec<EdgeKey> {
    let mut edges = Vec::new();
    for trim in brep.trims.values() {
        if let Some(edge) = trim.edge {
            if faces.contains(&trim.face) && !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }
    edges
}

/// Heal the defects named in `flags`, returning the brep's final validity.
///
/// With empty flags this is a no-op that just reports current validity, so
/// repairing an already-clean brep changes nothing.
pub fn repair(brep: &mut Brep, flags: IssueFlags, ctx: &ToleranceContext) -> bool {
    if flags.is_empty() {
        return brep.is_valid().is_ok();
    }
    debug!(%flags, "repairing brep");

    let shells = brep.unjoin_edges();
    debug!(shells = shells.len(), "unjoined into shells");

    for shell in &shells {
        // Split tangent discontinuities sharper than the document's angular
        // tolerance, re-examining the halves until no kink remains (bounded,
        // in case of pathological curves).
        let mut queue = shell_edges(brep, shell);
        let mut guard = 0;
        while let Some(edge) = queue.pop() {
            guard += 1;
            if guard > 256 {
                break;
            }
            if !brep.edges.contains_key(edge) || brep.edges[edge].trims.len() != 1 {
                continue;
            }
            if let Some(t) = brep.find_kink(edge, ctx.angular) {
                let (a, b) = brep.split_edge_at(edge, t);
                queue.push(a);
                queue.push(b);
            }
        }

        // Naked micro-edges shorter than the document tolerance disappear,
        // with their loop entries and duplicate vertices cleaned up.
        for edge in shell_edges(brep, shell) {
            if brep.edges.contains_key(edge)
                && brep.edges[edge].trims.len() == 1
                && brep.edge_length(edge) < ctx.absolute
            {
                brep.remove_micro_edge(edge);
            }
        }
    }

    // Merge collinear/co-tangent neighbors. Loops never span shells, so the
    // single pass covers each shell exactly once.
    let merged = brep.merge_adjacent_edges(ctx.angular);
    if merged > 0 {
        debug!(merged, "merged co-tangent edge pairs");
    }

    // Degenerate surface parameterizations stretch by the inverse of the
    // measured minimal knot delta, and the affected faces' edges rebuild at a
    // tight tolerance with fresh iso classification.
    if flags.contains(IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS) {
        let faces: Vec<FaceKey> = brep.face_order.clone();
        for face in faces {
            let surface = brep.faces[face].surface;
            for axis in [SurfaceAxis::U, SurfaceAxis::V] {
                let knots = match axis {
                    SurfaceAxis::U => &brep.surfaces[surface].knots_u,
                    SurfaceAxis::V => &brep.surfaces[surface].knots_v,
                };
                let delta = min_delta(knots);
                if delta < KNOT_MIN_DELTA {
                    debug!(?axis, delta, "rescaling surface domain");
                    brep.rescale_face_domain(face, axis, 1.0 / delta);
                    brep.rebuild_face_edges(face, REBUILD_FIT_TOLERANCE);
                }
            }
        }
    }

    brep.update_iso_flags();

    let manifold = brep.rejoin_edges(ctx.absolute);
    if !manifold {
        debug!("rejoin left naked edges; keeping a single non-manifold compound");
    }
    // Rejoining refits the shared edges at the document tolerance.
    for edge in brep.edges.values_mut() {
        if edge.fit_tolerance > ctx.absolute {
            edge.fit_tolerance = ctx.absolute;
        }
    }

    brep.compact_geometry();
    brep.compute_aggregates();
    brep.is_valid().is_ok()
}

/// Uniformly scale a brep, typically for unit conversion before audit.
///
/// Refuses (returning `false`, brep untouched) when the scaled bounding-box
/// diagonal would drop below the document's angular tolerance — a degenerate
/// result no repair could rescue.
pub fn scale(brep: &mut Brep, factor: f64, ctx: &ToleranceContext) -> bool {
    let bbox = brep.compute_bounding_box();
    if bbox.diagonal() * factor.abs() < ctx.angular {
        return false;
    }
    brep.scale_geometry(factor);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::audit;
    use approx::assert_relative_eq;
    use brepbridge_kernel::{Curve2, Curve3, LoopKind, NurbsSurfaceData};
    use brepbridge_math::{Point2, Point3, UnitSystem};

    fn ctx() -> ToleranceContext {
        ToleranceContext::default()
    }

    #[test]
    fn repair_nothing_is_a_noop() {
        let mut brep = Brep::box_solid(1.0, 1.0, 1.0);
        let counts = (brep.vertex_count(), brep.edge_count(), brep.face_count());
        assert!(audit(&brep, &ctx()).is_empty());
        assert!(repair(&mut brep, IssueFlags::NOTHING, &ctx()));
        assert_eq!(
            counts,
            (brep.vertex_count(), brep.edge_count(), brep.face_count())
        );
        assert!(brep.is_closed);
    }

    #[test]
    fn out_of_tolerance_edges_heal_through_rejoin() {
        let mut brep = Brep::box_solid(2.0, 2.0, 2.0);
        let ek = brep.edge_order[0];
        brep.edges[ek].fit_tolerance = 1e-3;

        let tight = ToleranceContext::new(1e-4, 1e-2, UnitSystem::Millimeters);
        let flags = audit(&brep, &tight);
        assert_eq!(flags, IssueFlags::OUT_OF_TOLERANCE_EDGES);

        assert!(repair(&mut brep, flags, &tight));
        // The unjoin/rejoin cycle restored the watertight box.
        assert_eq!(brep.vertex_count(), 8);
        assert_eq!(brep.edge_count(), 12);
        assert_eq!(brep.trim_count(), 24);
        assert!(brep.is_closed);
        assert_relative_eq!(brep.volume, 8.0, max_relative = 1e-9);
        // And the defect is gone.
        assert!(audit(&brep, &tight).is_empty());
    }

    #[test]
    fn kinky_edge_splits_during_repair() {
        // Open face bounded by an L-shaped polyline edge and a closing line.
        let mut brep = Brep::new();
        let s = brep.add_surface(NurbsSurfaceData::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ));
        let face = brep.add_face(s, false);
        let lp = brep.add_loop(face, LoopKind::Outer);
        let v0 = brep.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = brep.add_vertex(Point3::new(2.0, 2.0, 0.0));
        let kinky = brep.add_curve3d(Curve3::Polyline {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
            ],
        });
        let e0 = brep.add_edge(kinky, Some(v0), Some(v1));
        brep.edges[e0].fit_tolerance = 1e-3;
        let c2 = brep.add_curve2d(Curve2::Polyline {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
            ],
        });
        brep.add_trim(lp, e0, c2, false);
        let back = brep.add_curve3d(Curve3::Line {
            start: Point3::new(2.0, 2.0, 0.0),
            end: Point3::new(0.0, 0.0, 0.0),
        });
        let e1 = brep.add_edge(back, Some(v1), Some(v0));
        let c2b = brep.add_curve2d(Curve2::Line {
            start: Point2::new(1.0, 1.0),
            end: Point2::new(0.0, 0.0),
        });
        brep.add_trim(lp, e1, c2b, false);
        brep.classify_trim_kinds();
        brep.compute_aggregates();

        let tight = ToleranceContext::new(1e-4, 0.5, UnitSystem::Millimeters);
        assert!(repair(&mut brep, IssueFlags::OUT_OF_TOLERANCE_EDGES, &tight));
        // The 90-degree corner became a vertex: three edges now.
        assert_eq!(brep.edge_count(), 3);
        assert_eq!(brep.trim_count(), 3);
        assert_eq!(brep.vertex_count(), 3);
        assert!(brep.is_valid().is_ok(), "{:?}", brep.is_valid());
    }

    #[test]
    fn degenerate_surface_knots_rescale() {
        let mut brep = Brep::box_solid(1.0, 1.0, 1.0);
        // Compress one face's parameterization consistently (surface knots
        // and trim curves together), as a defective exporter would.
        let face = brep.face_order[0];
        brep.rescale_face_domain(face, SurfaceAxis::U, 1e-7);

        let flags = audit(&brep, &ctx());
        assert_eq!(flags, IssueFlags::OUT_OF_TOLERANCE_SURFACE_KNOTS);

        assert!(repair(&mut brep, flags, &ctx()));
        assert!(audit(&brep, &ctx()).is_empty());
        // Still a watertight unit cube.
        assert!(brep.is_closed);
        assert_relative_eq!(brep.volume, 1.0, max_relative = 1e-9);
        let si = brep.faces[face].surface;
        assert!(min_delta(&brep.surfaces[si].knots_u) >= KNOT_MIN_DELTA);
    }

    #[test]
    fn scale_refuses_degenerate_result() {
        let mut brep = Brep::box_solid(1.0, 1.0, 1.0);
        let before = brep.vertices[brep.vertex_order[1]].point;
        assert!(!scale(&mut brep, 1e-9, &ctx()));
        // Untouched on refusal.
        assert_eq!(brep.vertices[brep.vertex_order[1]].point, before);

        assert!(scale(&mut brep, 25.4, &ctx()));
        assert_relative_eq!(brep.volume, 25.4f64.powi(3), max_relative = 1e-9);
    }
}
