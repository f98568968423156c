//! Whole-graph conversion: native BREP arena ⇄ neutral flat arrays.
//!
//! The cyclic Face↔Loop↔Trim↔Edge adjacency graph flattens into sibling
//! arrays cross-referenced by integer indices; arena keys never leave the
//! kernel. Encoding walks entities in the kernel's native order so indices
//! are stable; decoding rebuilds in dependency order — curves, surfaces,
//! vertices, edges, faces, loops, trims — mapping neutral indices back to
//! fresh arena keys.
//!
//! Per-entity failures are non-fatal on both paths: the entity is skipped,
//! the report records it, and everything that referenced it degrades
//! explicitly rather than silently.

use std::collections::HashMap;

use brepbridge_kernel::{
    Brep, EdgeKey, FaceKey, IsoStatus, LoopKey, LoopKind, SolidOrientation, TrimKey, TrimKind,
    VertexKey,
};
use brepbridge_math::{BoundingBox, Interval, Point3, ToleranceContext};
use brepbridge_schema::{
    BrepOrientation, IsoStatus as NeutralIso, LoopType, NeutralBox, NeutralBrep, NeutralEdge,
    NeutralFace, NeutralLoop, NeutralPoint, NeutralTrim, TrimType,
};
use tracing::debug;

use crate::curve::{decode_curve2, decode_curve3, encode_curve2, encode_curve3, CurveRole};
use crate::error::ConvertError;
use crate::report::{ConversionReport, EntityKind};
use crate::surface::{decode_surface, encode_surface};

/// Provenance tag stamped on every neutral brep this kernel exports.
pub const PROVENANCE: &str = "brepbridge-native";

// =============================================================================
// Enum mapping
// =============================================================================

fn iso_to_neutral(iso: IsoStatus) -> NeutralIso {
    match iso {
        IsoStatus::None => NeutralIso::None,
        IsoStatus::X => NeutralIso::X,
        IsoStatus::Y => NeutralIso::Y,
        IsoStatus::West => NeutralIso::West,
        IsoStatus::East => NeutralIso::East,
        IsoStatus::South => NeutralIso::South,
        IsoStatus::North => NeutralIso::North,
    }
}

fn iso_from_neutral(iso: NeutralIso) -> IsoStatus {
    match iso {
        NeutralIso::None => IsoStatus::None,
        NeutralIso::X => IsoStatus::X,
        NeutralIso::Y => IsoStatus::Y,
        NeutralIso::West => IsoStatus::West,
        NeutralIso::East => IsoStatus::East,
        NeutralIso::South => IsoStatus::South,
        NeutralIso::North => IsoStatus::North,
    }
}

fn trim_kind_to_neutral(kind: TrimKind) -> TrimType {
    match kind {
        TrimKind::Boundary => TrimType::Boundary,
        TrimKind::Mated => TrimType::Mated,
        TrimKind::Seam => TrimType::Seam,
        TrimKind::Singular => TrimType::Singular,
        TrimKind::Unknown => TrimType::Unknown,
    }
}

fn trim_kind_from_neutral(kind: TrimType) -> TrimKind {
    match kind {
        TrimType::Boundary => TrimKind::Boundary,
        TrimType::Mated => TrimKind::Mated,
        TrimType::Seam => TrimKind::Seam,
        TrimType::Singular => TrimKind::Singular,
        TrimType::Unknown => TrimKind::Unknown,
    }
}

fn loop_kind_to_neutral(kind: LoopKind) -> LoopType {
    match kind {
        LoopKind::Outer => LoopType::Outer,
        LoopKind::Inner => LoopType::Inner,
        // Slit loops represent degenerate seam conditions and are never
        // collapsed into Inner.
        LoopKind::Slit => LoopType::Slit,
    }
}

fn loop_kind_from_neutral(kind: LoopType) -> LoopKind {
    match kind {
        LoopType::Outer => LoopKind::Outer,
        LoopType::Inner => LoopKind::Inner,
        LoopType::Slit => LoopKind::Slit,
    }
}

fn orientation_to_neutral(o: SolidOrientation) -> BrepOrientation {
    match o {
        SolidOrientation::Outward => BrepOrientation::Outward,
        SolidOrientation::Inward => BrepOrientation::Inward,
        SolidOrientation::None => BrepOrientation::None,
    }
}

fn orientation_from_neutral(o: BrepOrientation) -> SolidOrientation {
    match o {
        BrepOrientation::Outward => SolidOrientation::Outward,
        BrepOrientation::Inward => SolidOrientation::Inward,
        BrepOrientation::None => SolidOrientation::None,
    }
}

// =============================================================================
// Encode
// =============================================================================

/// Flatten a native brep into the neutral schema.
///
/// The caller is expected to have current aggregates (the export pipeline
/// recomputes them before encoding). Per-entity conversion notes land in the
/// returned report.
pub fn encode_brep(brep: &Brep, ctx: &ToleranceContext) -> (NeutralBrep, ConversionReport) {
    let mut report = ConversionReport::new();

    // Arena keys to flat indices, in native order.
    let vertex_index: HashMap<VertexKey, i32> = brep
        .vertex_order
        .iter()
        .enumerate()
        .map(|(i, &k)| (k, i as i32))
        .collect();
    let edge_index: HashMap<EdgeKey, i32> = brep
        .edge_order
        .iter()
        .enumerate()
        .map(|(i, &k)| (k, i as i32))
        .collect();
    let face_index: HashMap<FaceKey, i32> = brep
        .face_order
        .iter()
        .enumerate()
        .map(|(i, &k)| (k, i as i32))
        .collect();

    // Loops and trims are indexed by walking faces in native order.
    let mut loop_index: HashMap<LoopKey, i32> = HashMap::new();
    let mut loop_order: Vec<LoopKey> = Vec::new();
    let mut trim_index: HashMap<TrimKey, i32> = HashMap::new();
    let mut trim_order: Vec<TrimKey> = Vec::new();
    for &fk in &brep.face_order {
        for &lk in &brep.faces[fk].loops {
            loop_index.insert(lk, loop_order.len() as i32);
            loop_order.push(lk);
        }
    }
    for &lk in &loop_order {
        for &tk in &brep.loops[lk].trims {
            trim_index.insert(tk, trim_order.len() as i32);
            trim_order.push(tk);
        }
    }

    let vertices: Vec<NeutralPoint> = brep
        .vertex_order
        .iter()
        .map(|&k| {
            let p = brep.vertices[k].point;
            NeutralPoint::new(p.x, p.y, p.z)
        })
        .collect();

    let curves3d = brep
        .curves3d
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let enc = encode_curve3(c, ctx, CurveRole::BrepEdge);
            if let Some(dev) = enc.rebuild_deviation {
                report.info(
                    EntityKind::Curve3d,
                    Some(i),
                    format!("rebuilt to clear interior multiplicity; max deviation {dev:.3e}"),
                );
            }
            enc.curve
        })
        .collect();
    let curves2d = brep
        .curves2d
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let enc = encode_curve2(c, ctx, CurveRole::TrimCurve);
            if let Some(dev) = enc.rebuild_deviation {
                report.info(
                    EntityKind::Curve2d,
                    Some(i),
                    format!("rebuilt to clear interior multiplicity; max deviation {dev:.3e}"),
                );
            }
            enc.curve
        })
        .collect();
    let surfaces = brep
        .surfaces
        .iter()
        .map(|s| encode_surface(s, ctx))
        .collect();

    let faces: Vec<NeutralFace> = brep
        .face_order
        .iter()
        .map(|&fk| {
            let face = &brep.faces[fk];
            NeutralFace {
                surface_index: face.surface as i32,
                loop_indices: face.loops.iter().map(|lk| loop_index[lk]).collect(),
                outer_loop_index: face
                    .outer_loop
                    .map(|lk| loop_index[&lk])
                    .unwrap_or(-1),
                orientation_reversed: face.orientation_reversed,
            }
        })
        .collect();

    let edges: Vec<NeutralEdge> = brep
        .edge_order
        .iter()
        .map(|&ek| {
            let edge = &brep.edges[ek];
            NeutralEdge {
                curve3d_index: edge.curve3d as i32,
                trim_indices: edge.trims.iter().map(|tk| trim_index[tk]).collect(),
                start_vertex_index: edge.start.map(|v| vertex_index[&v]).unwrap_or(-1),
                end_vertex_index: edge.end.map(|v| vertex_index[&v]).unwrap_or(-1),
                curve_reversed: edge.curve_reversed,
                domain: brepbridge_schema::NeutralInterval::new(edge.domain.t0, edge.domain.t1),
            }
        })
        .collect();

    let loops: Vec<NeutralLoop> = loop_order
        .iter()
        .map(|&lk| {
            let lp = &brep.loops[lk];
            NeutralLoop {
                face_index: face_index[&lp.face],
                trim_indices: lp.trims.iter().map(|tk| trim_index[tk]).collect(),
                loop_type: loop_kind_to_neutral(lp.kind),
            }
        })
        .collect();

    let trims: Vec<NeutralTrim> = trim_order
        .iter()
        .map(|&tk| {
            let trim = &brep.trims[tk];
            NeutralTrim {
                edge_index: trim.edge.map(|ek| edge_index[&ek]).unwrap_or(-1),
                face_index: face_index[&trim.face],
                loop_index: loop_index[&trim.loop_key],
                curve2d_index: trim.curve2d as i32,
                iso_status: iso_to_neutral(trim.iso),
                trim_type: trim_kind_to_neutral(trim.kind),
                reversed: trim.reversed,
                start_vertex_index: trim.start.map(|v| vertex_index[&v]).unwrap_or(-1),
                end_vertex_index: trim.end.map(|v| vertex_index[&v]).unwrap_or(-1),
                domain: brepbridge_schema::NeutralInterval::new(trim.domain.t0, trim.domain.t1),
            }
        })
        .collect();

    let bbox = if brep.bbox.is_valid() {
        NeutralBox {
            min: NeutralPoint::new(brep.bbox.min.x, brep.bbox.min.y, brep.bbox.min.z),
            max: NeutralPoint::new(brep.bbox.max.x, brep.bbox.max.y, brep.bbox.max.z),
        }
    } else {
        NeutralBox {
            min: NeutralPoint::new(0.0, 0.0, 0.0),
            max: NeutralPoint::new(0.0, 0.0, 0.0),
        }
    };

    let neutral = NeutralBrep {
        provenance: PROVENANCE.to_string(),
        units: ctx.units.name().to_string(),
        vertices,
        curves3d,
        curves2d,
        surfaces,
        faces,
        edges,
        loops,
        trims,
        is_closed: brep.is_closed,
        orientation: orientation_to_neutral(brep.orientation),
        area: brep.area,
        volume: if brep.is_closed { brep.volume } else { 0.0 },
        bbox,
    };
    debug!(
        vertices = neutral.vertices.len(),
        edges = neutral.edges.len(),
        faces = neutral.faces.len(),
        "encoded brep"
    );
    (neutral, report)
}

// =============================================================================
// Decode
// =============================================================================

/// Rebuild a native brep from the neutral schema.
///
/// The input is validated first; a schema violation is a fatal contract
/// error. Geometry that fails to decode is skipped with a report entry and
/// everything referencing it degrades explicitly. The returned brep has not
/// been repaired yet — the import pipeline runs repair after unit conversion.
pub fn decode_brep(
    neutral: &NeutralBrep,
    ctx: &ToleranceContext,
) -> Result<(Brep, ConversionReport), ConvertError> {
    neutral.validate()?;

    let mut report = ConversionReport::new();
    let mut brep = Brep::new();

    // Geometry tables in dependency order; a failed entry maps to None.
    let mut curve3_map: Vec<Option<usize>> = Vec::with_capacity(neutral.curves3d.len());
    for (i, c) in neutral.curves3d.iter().enumerate() {
        match decode_curve3(c) {
            Ok(curve) => curve3_map.push(Some(brep.add_curve3d(curve))),
            Err(err) => {
                report.error(EntityKind::Curve3d, Some(i), err.to_string());
                curve3_map.push(None);
            }
        }
    }
    let mut curve2_map: Vec<Option<usize>> = Vec::with_capacity(neutral.curves2d.len());
    for (i, c) in neutral.curves2d.iter().enumerate() {
        match decode_curve2(c) {
            Ok(curve) => curve2_map.push(Some(brep.add_curve2d(curve))),
            Err(err) => {
                report.error(EntityKind::Curve2d, Some(i), err.to_string());
                curve2_map.push(None);
            }
        }
    }
    let mut surface_map: Vec<Option<usize>> = Vec::with_capacity(neutral.surfaces.len());
    for (i, s) in neutral.surfaces.iter().enumerate() {
        match decode_surface(s) {
            Ok(surface) => surface_map.push(Some(brep.add_surface(surface))),
            Err(err) => {
                report.error(EntityKind::Surface, Some(i), err.to_string());
                surface_map.push(None);
            }
        }
    }

    // Vertices join at the target document's tolerance.
    let vertex_map: Vec<VertexKey> = neutral
        .vertices
        .iter()
        .map(|p| brep.find_or_add_vertex(Point3::new(p.x, p.y, p.z), ctx.absolute))
        .collect();
    let vertex_of = |index: i32| -> Option<VertexKey> {
        if index < 0 {
            None
        } else {
            Some(vertex_map[index as usize])
        }
    };

    // Edges: the domain-aware constructor applies when the edge covers a
    // proper sub-interval of its curve or carries explicit vertices.
    let mut edge_map: Vec<Option<EdgeKey>> = Vec::with_capacity(neutral.edges.len());
    for (i, e) in neutral.edges.iter().enumerate() {
        let curve = match curve3_map[e.curve3d_index as usize] {
            Some(idx) => idx,
            None => {
                report.error(
                    EntityKind::Edge,
                    Some(i),
                    "3d curve failed to decode; edge skipped",
                );
                edge_map.push(None);
                continue;
            }
        };
        let domain = Interval::new(e.domain.t0, e.domain.t1);
        let start = vertex_of(e.start_vertex_index);
        let end = vertex_of(e.end_vertex_index);
        let full = brep.curves3d[curve].domain();
        let covers_fully =
            (domain.t0 - full.t0).abs() <= 1e-9 && (domain.t1 - full.t1).abs() <= 1e-9;
        let key = if covers_fully && start.is_none() && end.is_none() {
            brep.add_edge(curve, None, None)
        } else {
            brep.add_edge_with_domain(curve, domain, start, end)
        };
        brep.edges[key].curve_reversed = e.curve_reversed;
        edge_map.push(Some(key));
    }

    // Faces, then their loops in per-face order.
    let mut face_map: Vec<Option<FaceKey>> = Vec::with_capacity(neutral.faces.len());
    let mut loop_map: Vec<Option<LoopKey>> = vec![None; neutral.loops.len()];
    for (i, f) in neutral.faces.iter().enumerate() {
        let surface = match surface_map[f.surface_index as usize] {
            Some(idx) => idx,
            None => {
                report.error(
                    EntityKind::Face,
                    Some(i),
                    "surface failed to decode; face and its loops skipped",
                );
                face_map.push(None);
                continue;
            }
        };
        let face_key = brep.add_face(surface, f.orientation_reversed);
        for &li in &f.loop_indices {
            let kind = loop_kind_from_neutral(neutral.loops[li as usize].loop_type);
            loop_map[li as usize] = Some(brep.add_loop(face_key, kind));
        }
        if f.outer_loop_index >= 0 {
            brep.faces[face_key].outer_loop = loop_map[f.outer_loop_index as usize];
        }
        face_map.push(Some(face_key));
    }

    // Trims, walking loops in neutral order to preserve cycle order.
    let mut trim_map: Vec<Option<TrimKey>> = vec![None; neutral.trims.len()];
    for (li, lp) in neutral.loops.iter().enumerate() {
        let loop_key = match loop_map[li] {
            Some(k) => k,
            None => continue, // owning face was skipped
        };
        for &ti in &lp.trim_indices {
            let trim = &neutral.trims[ti as usize];
            let curve2d = match curve2_map[trim.curve2d_index as usize] {
                Some(idx) => idx,
                None => {
                    report.error(
                        EntityKind::Trim,
                        Some(ti as usize),
                        "2d curve failed to decode; trim skipped",
                    );
                    continue;
                }
            };
            let domain = Interval::new(trim.domain.t0, trim.domain.t1);

            let key = if trim.trim_type == TrimType::Singular {
                // A polar singularity: a degenerate point trim built from the
                // 2D curve and iso status only. Never coerced into an
                // edge-bound trim, even if an edge index is present.
                brep.add_singular_trim(
                    loop_key,
                    curve2d,
                    iso_from_neutral(trim.iso_status),
                    vertex_of(trim.start_vertex_index),
                )
            } else if trim.edge_index >= 0 {
                match edge_map[trim.edge_index as usize] {
                    Some(edge) => {
                        let k = brep.add_trim_with_domain(
                            loop_key,
                            edge,
                            curve2d,
                            trim.reversed,
                            domain,
                        );
                        brep.trims[k].kind = trim_kind_from_neutral(trim.trim_type);
                        brep.trims[k].iso = iso_from_neutral(trim.iso_status);
                        k
                    }
                    None => {
                        report.error(
                            EntityKind::Trim,
                            Some(ti as usize),
                            "edge failed to decode; trim preserved unattached",
                        );
                        brep.add_unattached_trim(loop_key, curve2d, trim.reversed, domain)
                    }
                }
            } else {
                // An unattached boundary trim is a defect, but dropping it
                // would change topology silently; preserve it and say so.
                report.warning(
                    EntityKind::Trim,
                    Some(ti as usize),
                    "boundary trim with no edge preserved as-is",
                );
                let k = brep.add_unattached_trim(loop_key, curve2d, trim.reversed, domain);
                brep.trims[k].iso = iso_from_neutral(trim.iso_status);
                k
            };
            trim_map[ti as usize] = Some(key);
        }
        // Native tolerance settings apply once the loop is complete.
        for &ti in &lp.trim_indices {
            if let Some(key) = trim_map[ti as usize] {
                brep.set_trim_tolerances(key, ctx.absolute, ctx.absolute);
            }
        }
    }

    // Aggregate scalars carry over; volume is only meaningful when closed.
    brep.is_closed = neutral.is_closed;
    brep.orientation = orientation_from_neutral(neutral.orientation);
    brep.area = neutral.area;
    brep.volume = if neutral.is_closed { neutral.volume } else { 0.0 };
    brep.bbox = BoundingBox::new(
        Point3::new(neutral.bbox.min.x, neutral.bbox.min.y, neutral.bbox.min.z),
        Point3::new(neutral.bbox.max.x, neutral.bbox.max.y, neutral.bbox.max.z),
    );

    debug!(
        vertices = brep.vertex_count(),
        edges = brep.edge_count(),
        faces = brep.face_count(),
        skipped = report.has_errors(),
        "decoded brep"
    );
    Ok((brep, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ToleranceContext {
        ToleranceContext::default()
    }

    #[test]
    fn box_encode_flattens_counts() {
        let brep = Brep::box_solid(1.0, 1.0, 1.0);
        let (neutral, report) = encode_brep(&brep, &ctx());
        assert!(!report.has_errors());
        assert_eq!(neutral.vertices.len(), 8);
        assert_eq!(neutral.curves3d.len(), 12);
        assert_eq!(neutral.curves2d.len(), 24);
        assert_eq!(neutral.surfaces.len(), 6);
        assert_eq!(neutral.faces.len(), 6);
        assert_eq!(neutral.edges.len(), 12);
        assert_eq!(neutral.loops.len(), 6);
        assert_eq!(neutral.trims.len(), 24);
        assert!(neutral.is_closed);
        assert_eq!(neutral.orientation, BrepOrientation::Outward);
        assert!(neutral.validate().is_ok());
    }

    #[test]
    fn box_edges_reference_two_trims() {
        let brep = Brep::box_solid(1.0, 1.0, 1.0);
        let (neutral, _) = encode_brep(&brep, &ctx());
        for edge in &neutral.edges {
            assert_eq!(edge.trim_indices.len(), 2);
            assert!(edge.start_vertex_index >= 0);
            assert!(edge.end_vertex_index >= 0);
        }
        for trim in &neutral.trims {
            assert_eq!(trim.trim_type, TrimType::Mated);
            assert!(trim.edge_index >= 0);
        }
    }

    #[test]
    fn box_round_trip_preserves_topology() {
        let brep = Brep::box_solid(1.0, 1.0, 1.0);
        let (neutral, _) = encode_brep(&brep, &ctx());
        let (restored, report) = decode_brep(&neutral, &ctx()).unwrap();
        assert!(!report.has_errors());
        assert_eq!(restored.vertex_count(), 8);
        assert_eq!(restored.edge_count(), 12);
        assert_eq!(restored.face_count(), 6);
        assert_eq!(restored.loop_count(), 6);
        assert_eq!(restored.trim_count(), 24);
        assert!(restored.is_valid().is_ok(), "{:?}", restored.is_valid());
        // Volume carries through the aggregate scalars.
        assert!((restored.volume - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sphere_patch_round_trips_singular_trim() {
        let brep = Brep::sphere_patch(2.0);
        let (neutral, _) = encode_brep(&brep, &ctx());
        let singular: Vec<&NeutralTrim> = neutral
            .trims
            .iter()
            .filter(|t| t.trim_type == TrimType::Singular)
            .collect();
        assert_eq!(singular.len(), 1);
        assert_eq!(singular[0].edge_index, -1);
        assert_eq!(singular[0].iso_status, NeutralIso::North);

        let (restored, report) = decode_brep(&neutral, &ctx()).unwrap();
        assert!(!report.has_errors());
        assert_eq!(restored.trim_count(), 4);
        assert_eq!(restored.edge_count(), 3);
        let kinds: Vec<TrimKind> = restored.trims.values().map(|t| t.kind).collect();
        assert_eq!(
            kinds.iter().filter(|&&k| k == TrimKind::Singular).count(),
            1
        );
        assert!(restored.is_valid().is_ok(), "{:?}", restored.is_valid());
    }

    #[test]
    fn unattached_trim_preserved_with_warning() {
        let brep = Brep::sphere_patch(1.0);
        let (mut neutral, _) = encode_brep(&brep, &ctx());
        // Detach one edge-bound trim: a defect the decoder must preserve.
        let ti = neutral
            .trims
            .iter()
            .position(|t| t.edge_index >= 0)
            .unwrap();
        neutral.trims[ti].edge_index = -1;
        neutral.trims[ti].trim_type = TrimType::Boundary;
        neutral.edges.iter_mut().for_each(|e| {
            e.trim_indices.retain(|&t| t != ti as i32);
        });

        let (restored, report) = decode_brep(&neutral, &ctx()).unwrap();
        assert_eq!(restored.trim_count(), 4, "trim must not be dropped");
        assert!(report
            .entries
            .iter()
            .any(|e| e.message.contains("no edge")));
    }

    #[test]
    fn slit_loop_type_survives_round_trip() {
        use brepbridge_kernel::{Curve2, Curve3, NurbsSurfaceData};
        use brepbridge_math::Point2;

        // A planar face over [0,10]² with an outer loop and a degenerate
        // inner cycle typed Slit; the type must come back verbatim.
        let mut brep = Brep::new();
        let s = brep.add_surface(NurbsSurfaceData::new(
            1,
            1,
            2,
            2,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
                Point3::new(10.0, 10.0, 0.0),
            ],
            vec![1.0; 4],
            vec![0.0, 10.0],
            vec![0.0, 10.0],
        ));
        let face = brep.add_face(s, false);

        let mut add_ring = |brep: &mut Brep, lk, uv: [(f64, f64); 4]| {
            let vks: Vec<_> = uv
                .iter()
                .map(|&(u, v)| brep.add_vertex(Point3::new(u, v, 0.0)))
                .collect();
            for i in 0..4 {
                let j = (i + 1) % 4;
                let c3 = brep.add_curve3d(Curve3::Line {
                    start: Point3::new(uv[i].0, uv[i].1, 0.0),
                    end: Point3::new(uv[j].0, uv[j].1, 0.0),
                });
                let edge = brep.add_edge(c3, Some(vks[i]), Some(vks[j]));
                let c2 = brep.add_curve2d(Curve2::Line {
                    start: Point2::new(uv[i].0, uv[i].1),
                    end: Point2::new(uv[j].0, uv[j].1),
                });
                brep.add_trim(lk, edge, c2, false);
            }
        };

        let outer = brep.add_loop(face, LoopKind::Outer);
        add_ring(
            &mut brep,
            outer,
            [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
        );
        // Clockwise inner cycle, tagged as a slit.
        let slit = brep.add_loop(face, LoopKind::Slit);
        add_ring(
            &mut brep,
            slit,
            [(4.0, 4.0), (4.0, 6.0), (6.0, 6.0), (6.0, 4.0)],
        );
        brep.classify_trim_kinds();
        brep.update_iso_flags();
        brep.compute_aggregates();
        assert!(brep.is_valid().is_ok(), "{:?}", brep.is_valid());

        let (neutral, _) = encode_brep(&brep, &ctx());
        assert_eq!(neutral.loops.len(), 2);
        assert_eq!(neutral.loops[0].loop_type, LoopType::Outer);
        assert_eq!(neutral.loops[1].loop_type, LoopType::Slit);

        let (restored, report) = decode_brep(&neutral, &ctx()).unwrap();
        assert!(!report.has_errors());
        assert_eq!(restored.loop_count(), 2);
        let kinds: Vec<LoopKind> = restored.loops.values().map(|l| l.kind).collect();
        assert!(kinds.contains(&LoopKind::Slit), "slit loop collapsed: {kinds:?}");
        assert_eq!(restored.trim_count(), 8);
        assert_eq!(restored.edge_count(), 8);
    }

    #[test]
    fn decode_rejects_out_of_bounds_index() {
        let brep = Brep::box_solid(1.0, 1.0, 1.0);
        let (mut neutral, _) = encode_brep(&brep, &ctx());
        neutral.edges[0].curve3d_index = 99;
        match decode_brep(&neutral, &ctx()) {
            Err(ConvertError::Schema(_)) => {}
            other => panic!("expected fatal schema error, got {other:?}"),
        }
    }

    #[test]
    fn decoded_edge_uses_domain_aware_constructor() {
        let brep = Brep::box_solid(1.0, 1.0, 1.0);
        let (mut neutral, _) = encode_brep(&brep, &ctx());
        // Narrow one edge to a sub-interval of its line.
        neutral.edges[0].domain = brepbridge_schema::NeutralInterval::new(0.25, 0.75);
        // Keep the schema consistent: the edge's vertices no longer match the
        // sub-curve ends, so drop them.
        neutral.edges[0].start_vertex_index = -1;
        neutral.edges[0].end_vertex_index = -1;
        let (restored, _) = decode_brep(&neutral, &ctx()).unwrap();
        let ek = restored.edge_order[0];
        assert_eq!(restored.edges[ek].domain, Interval::new(0.25, 0.75));
    }
}
