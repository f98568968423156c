//! Topology editing primitives used by tolerance repair.
//!
//! These are mechanisms only; the repair policy (what to split, what to
//! remove, in which order) lives in the conversion pipeline. All operations
//! are conservative: they never invent geometry, only re-wire topology and
//! re-parameterize existing curves.

use std::collections::HashMap;

use brepbridge_math::{Interval, Point3};
use tracing::debug;

use crate::nurbs::SurfaceAxis;
use crate::topology::{Brep, EdgeKey, FaceKey, Trim, TrimKey, TrimKind, VertexKey};

/// Quantized position key for tolerance-based endpoint matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PosKey {
    x: i64,
    y: i64,
    z: i64,
}

impl PosKey {
    fn from_point(p: &Point3, tolerance: f64) -> Self {
        let scale = if tolerance > 0.0 {
            1.0 / tolerance
        } else {
            1.0e6
        };
        Self {
            x: (p.x * scale).round() as i64,
            y: (p.y * scale).round() as i64,
            z: (p.z * scale).round() as i64,
        }
    }
}

/// Unordered endpoint-pair key for edge matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey {
    a: PosKey,
    b: PosKey,
}

impl PairKey {
    fn new(a: PosKey, b: PosKey) -> Self {
        if (a.x, a.y, a.z) <= (b.x, b.y, b.z) {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

impl Brep {
    /// The vertex at an edge's curve-parameter-low end (independent of the
    /// edge's traversal direction).
    fn vertex_at_curve_lo(&self, edge: EdgeKey) -> Option<VertexKey> {
        let e = &self.edges[edge];
        if e.curve_reversed {
            e.end
        } else {
            e.start
        }
    }

    /// The vertex at an edge's curve-parameter-high end.
    fn vertex_at_curve_hi(&self, edge: EdgeKey) -> Option<VertexKey> {
        let e = &self.edges[edge];
        if e.curve_reversed {
            e.start
        } else {
            e.end
        }
    }

    // -------------------------------------------------------------------------
    // Shells and joining
    // -------------------------------------------------------------------------

    /// Group faces into connected components by shared (mated) edges.
    pub fn shells(&self) -> Vec<Vec<FaceKey>> {
        let mut faces_of_edge: HashMap<EdgeKey, Vec<FaceKey>> = HashMap::new();
        for trim in self.trims.values() {
            if let Some(edge) = trim.edge {
                let faces = faces_of_edge.entry(edge).or_default();
                if !faces.contains(&trim.face) {
                    faces.push(trim.face);
                }
            }
        }
        let mut neighbors: HashMap<FaceKey, Vec<FaceKey>> = HashMap::new();
        for faces in faces_of_edge.values() {
            for &a in faces {
                for &b in faces {
                    if a != b {
                        neighbors.entry(a).or_default().push(b);
                    }
                }
            }
        }

        let mut seen: HashMap<FaceKey, ()> = HashMap::new();
        let mut shells: Vec<Vec<FaceKey>> = Vec::new();
        for &start in &self.face_order {
            if seen.contains_key(&start) {
                continue;
            }
            let mut stack = vec![start];
            let mut members = Vec::new();
            while let Some(face) = stack.pop() {
                if seen.insert(face, ()).is_some() {
                    continue;
                }
                members.push(face);
                if let Some(ns) = neighbors.get(&face) {
                    for &n in ns {
                        if !seen.contains_key(&n) {
                            stack.push(n);
                        }
                    }
                }
            }
            shells.push(members);
        }
        shells
    }

    /// Give every trim its own naked edge, dissolving all mating.
    ///
    /// Returns the shells (connected face groups) as they were joined before
    /// the unjoin, so repair can work per shell; if nothing was joined the
    /// whole brep comes back as a single shell.
    pub fn unjoin_edges(&mut self) -> Vec<Vec<FaceKey>> {
        let shells = self.shells();

        let edge_keys: Vec<EdgeKey> = self.edge_order.clone();
        for edge_key in edge_keys {
            let extra_trims: Vec<TrimKey> = {
                let edge = &self.edges[edge_key];
                if edge.trims.len() <= 1 {
                    continue;
                }
                edge.trims[1..].to_vec()
            };
            for trim_key in extra_trims {
                let (curve3d, domain, curve_reversed, fit, start, end) = {
                    let e = &self.edges[edge_key];
                    (
                        e.curve3d,
                        e.domain,
                        e.curve_reversed,
                        e.fit_tolerance,
                        e.start,
                        e.end,
                    )
                };
                let copy = self.add_edge_with_domain(curve3d, domain, start, end);
                self.edges[copy].curve_reversed = curve_reversed;
                self.edges[copy].fit_tolerance = fit;
                self.edges[copy].trims = vec![trim_key];
                self.trims[trim_key].edge = Some(copy);
                self.edges[edge_key].trims.retain(|&t| t != trim_key);
            }
        }
        self.classify_trim_kinds();
        self.update_closed_flag();

        if shells.is_empty() && !self.face_order.is_empty() {
            vec![self.face_order.clone()]
        } else {
            shells
        }
    }

    /// Rejoin naked edges whose endpoint pairs coincide within `tolerance`.
    ///
    /// Matched pairs merge into one shared edge (two trims); their vertices
    /// merge as well. Returns `true` when the result is manifold — every
    /// edge shared by exactly two trims. Unmatched edges simply stay naked:
    /// the caller keeps the whole thing as one non-manifold compound rather
    /// than discarding geometry.
    pub fn rejoin_edges(&mut self, tolerance: f64) -> bool {
        let mut candidates: HashMap<PairKey, EdgeKey> = HashMap::new();
        let edge_keys: Vec<EdgeKey> = self.edge_order.clone();

        for edge_key in edge_keys {
            if !self.edges.contains_key(edge_key) {
                continue;
            }
            if self.edges[edge_key].trims.len() != 1 {
                continue;
            }
            let start = self.edge_start_point(edge_key);
            let end = self.edge_end_point(edge_key);
            let key = PairKey::new(
                PosKey::from_point(&start, tolerance * 2.0),
                PosKey::from_point(&end, tolerance * 2.0),
            );

            if let Some(&other) = candidates.get(&key) {
                if self.edges.contains_key(other) && self.edges[other].trims.len() == 1 {
                    self.merge_edge_into(other, edge_key, tolerance);
                    candidates.remove(&key);
                    continue;
                }
            }
            candidates.insert(key, edge_key);
        }

        self.classify_trim_kinds();
        self.update_closed_flag();
        self.is_closed
    }

    /// Merge naked edge `extra` into naked edge `keep`, re-binding `extra`'s
    /// trim and merging coincident vertices.
    fn merge_edge_into(&mut self, keep: EdgeKey, extra: EdgeKey, tolerance: f64) {
        let keep_start = self.edge_start_point(keep);
        let extra_start = self.edge_start_point(extra);
        let opposite = (keep_start - extra_start).norm() > tolerance * 2.0;

        let trim_key = self.edges[extra].trims[0];
        {
            let trim = &mut self.trims[trim_key];
            trim.edge = Some(keep);
            if opposite {
                trim.reversed = !trim.reversed;
            }
        }
        self.edges[keep].trims.push(trim_key);

        // Merge the dissolved edge's vertices into the kept edge's.
        let (ks, ke) = {
            let e = &self.edges[keep];
            (e.start, e.end)
        };
        let (xs, xe) = {
            let e = &self.edges[extra];
            (e.start, e.end)
        };
        let pairs = if opposite {
            [(ks, xe), (ke, xs)]
        } else {
            [(ks, xs), (ke, xe)]
        };
        self.remove_edge_raw(extra);
        for (kv, xv) in pairs {
            if let (Some(kv), Some(xv)) = (kv, xv) {
                if kv != xv {
                    self.merge_vertices(kv, xv);
                }
            }
        }
        debug!(?keep, "rejoined edge pair");
    }

    /// Redirect every reference from `drop` to `keep` and delete `drop`.
    pub fn merge_vertices(&mut self, keep: VertexKey, drop: VertexKey) {
        for edge in self.edges.values_mut() {
            if edge.start == Some(drop) {
                edge.start = Some(keep);
            }
            if edge.end == Some(drop) {
                edge.end = Some(keep);
            }
        }
        for trim in self.trims.values_mut() {
            if trim.start == Some(drop) {
                trim.start = Some(keep);
            }
            if trim.end == Some(drop) {
                trim.end = Some(keep);
            }
        }
        self.vertices.remove(drop);
        self.vertex_order.retain(|&v| v != drop);
    }

    /// Delete an edge from the arena without touching its trims.
    fn remove_edge_raw(&mut self, edge: EdgeKey) {
        self.edges.remove(edge);
        self.edge_order.retain(|&e| e != edge);
    }

    // -------------------------------------------------------------------------
    // Splitting
    // -------------------------------------------------------------------------

    /// Find a tangent discontinuity along an edge exceeding `angle_tolerance`
    /// radians, returning the curve parameter to split at.
    ///
    /// Coarse sampling locates the discontinuity; bisection then narrows it.
    /// Samples at the domain ends are skipped — a kink at the boundary is not
    /// splittable.
    pub fn find_kink(&self, edge: EdgeKey, angle_tolerance: f64) -> Option<f64> {
        const SAMPLES: usize = 32;
        let e = &self.edges[edge];
        let curve = &self.curves3d[e.curve3d];
        let dir_at = |t: f64| -> Option<brepbridge_math::Vec3> {
            let tangent = curve.tangent_at(t);
            let norm = tangent.norm();
            if norm < 1e-12 {
                None
            } else {
                Some(tangent / norm)
            }
        };
        let angle_between = |a: &brepbridge_math::Vec3, b: &brepbridge_math::Vec3| {
            a.dot(b).clamp(-1.0, 1.0).acos()
        };

        let mut prev: Option<(f64, brepbridge_math::Vec3)> = None;
        for k in 1..SAMPLES {
            let t = e.domain.at_normalized(k as f64 / SAMPLES as f64);
            let dir = match dir_at(t) {
                Some(d) => d,
                None => continue,
            };
            if let Some((t_prev, d_prev)) = prev {
                if angle_between(&d_prev, &dir) > angle_tolerance {
                    // Narrow the discontinuity by bisection.
                    let (mut lo, mut hi) = (t_prev, t);
                    let (mut d_lo, mut d_hi) = (d_prev, dir);
                    for _ in 0..40 {
                        let mid = 0.5 * (lo + hi);
                        match dir_at(mid) {
                            Some(d_mid) => {
                                if angle_between(&d_lo, &d_mid) >= angle_between(&d_mid, &d_hi) {
                                    hi = mid;
                                    d_hi = d_mid;
                                } else {
                                    lo = mid;
                                    d_lo = d_mid;
                                }
                            }
                            None => break,
                        }
                    }
                    let split = 0.5 * (lo + hi);
                    if split > e.domain.t0 && split < e.domain.t1 {
                        return Some(split);
                    }
                }
            }
            prev = Some((t, dir));
        }
        None
    }

    /// Split a naked edge (and its single trim) at curve parameter `t`.
    ///
    /// A new vertex appears at the split point; the edge's domain partitions
    /// into two edges and the trim's domain partitions to match, preserving
    /// loop order. Returns the two edges in curve-parameter order.
    pub fn split_edge_at(&mut self, edge: EdgeKey, t: f64) -> (EdgeKey, EdgeKey) {
        let (curve3d, domain, curve_reversed, fit, trim_key) = {
            let e = &self.edges[edge];
            assert_eq!(e.trims.len(), 1, "split requires a naked edge");
            (e.curve3d, e.domain, e.curve_reversed, e.fit_tolerance, e.trims[0])
        };
        assert!(
            t > domain.t0 && t < domain.t1,
            "split parameter outside domain"
        );

        let v_lo = self.vertex_at_curve_lo(edge);
        let v_hi = self.vertex_at_curve_hi(edge);
        let split_point = self.curves3d[curve3d].point_at(t);
        let mid_vertex = self.add_vertex(split_point);

        // Edge A covers [t0, t], edge B covers [t, t1] in curve parameter.
        let edge_a = edge;
        {
            let e = &mut self.edges[edge_a];
            e.domain = Interval::new(domain.t0, t);
            if curve_reversed {
                e.start = Some(mid_vertex);
                e.end = v_lo;
            } else {
                e.start = v_lo;
                e.end = Some(mid_vertex);
            }
        }
        let edge_b = self.add_edge_with_domain(curve3d, Interval::new(t, domain.t1), None, None);
        {
            let e = &mut self.edges[edge_b];
            e.curve_reversed = curve_reversed;
            e.fit_tolerance = fit;
            if curve_reversed {
                e.start = v_hi;
                e.end = Some(mid_vertex);
            } else {
                e.start = Some(mid_vertex);
                e.end = v_hi;
            }
        }

        // Split the trim to match. Fraction along the trim direction:
        let frac_curve = domain.normalize(t);
        let (reversed, trim_domain, trim_orig_end, loop_key, curve2d, face, iso, kind, tol) = {
            let tr = &self.trims[trim_key];
            (
                tr.reversed,
                tr.domain,
                tr.end,
                tr.loop_key,
                tr.curve2d,
                tr.face,
                tr.iso,
                tr.kind,
                tr.tolerance,
            )
        };
        let frac_edge = if curve_reversed {
            1.0 - frac_curve
        } else {
            frac_curve
        };
        let frac_trim = if reversed { 1.0 - frac_edge } else { frac_edge };
        let split_2d = trim_domain.at_normalized(frac_trim);

        // The loop-order-first portion of the trim maps to edge A exactly when
        // the trim traverses the curve forward (curve_reversed XOR reversed is
        // false).
        let first_edge_is_a = curve_reversed == reversed;
        let (first_edge, second_edge) = if first_edge_is_a {
            (edge_a, edge_b)
        } else {
            (edge_b, edge_a)
        };
        {
            let tr = &mut self.trims[trim_key];
            tr.domain = Interval::new(trim_domain.t0, split_2d);
            tr.edge = Some(first_edge);
            tr.end = Some(mid_vertex);
        }
        let second_trim = self.trims.insert(Trim {
            edge: Some(second_edge),
            face,
            loop_key,
            curve2d,
            iso,
            kind,
            reversed,
            start: Some(mid_vertex),
            end: trim_orig_end,
            domain: Interval::new(split_2d, trim_domain.t1),
            tolerance: tol,
        });
        self.edges[first_edge].trims = vec![trim_key];
        self.edges[second_edge].trims = vec![second_trim];

        // Insert the new trim right after the original in its loop.
        let lp = &mut self.loops[loop_key];
        let pos = lp
            .trims
            .iter()
            .position(|&tk| tk == trim_key)
            .expect("trim must be in its loop");
        lp.trims.insert(pos + 1, second_trim);

        (edge_a, edge_b)
    }

    // -------------------------------------------------------------------------
    // Removal and merging
    // -------------------------------------------------------------------------

    /// Remove a naked micro-edge: drop its trim from the loop, delete the
    /// edge, and snap its end vertex onto its start vertex.
    pub fn remove_micro_edge(&mut self, edge: EdgeKey) {
        let (trims, v_start, v_end) = {
            let e = &self.edges[edge];
            (e.trims.clone(), e.start, e.end)
        };
        for trim_key in trims {
            let loop_key = self.trims[trim_key].loop_key;
            self.loops[loop_key].trims.retain(|&tk| tk != trim_key);
            self.trims.remove(trim_key);
        }
        self.remove_edge_raw(edge);
        if let (Some(a), Some(b)) = (v_start, v_end) {
            if a != b {
                self.merge_vertices(a, b);
            }
        }
    }

    /// Merge pairs of consecutive naked edges in each loop that continue the
    /// same curves co-tangentially within `angle_tolerance`.
    ///
    /// The conservative criterion: both trims share a loop, both edges are
    /// naked on the same 3D curve with adjacent domains, the trims share the
    /// same 2D curve with adjacent domains, and the tangent turns less than
    /// `angle_tolerance` at the junction. Returns the number of merges.
    pub fn merge_adjacent_edges(&mut self, angle_tolerance: f64) -> usize {
        let mut merged = 0;
        let loop_keys: Vec<_> = self.loops.keys().collect();
        for loop_key in loop_keys {
            let mut changed = true;
            while changed {
                changed = false;
                let trims = self.loops[loop_key].trims.clone();
                if trims.len() < 2 {
                    break;
                }
                for i in 0..trims.len() {
                    let a = trims[i];
                    let b = trims[(i + 1) % trims.len()];
                    if a == b || !self.can_merge_trim_pair(a, b, angle_tolerance) {
                        continue;
                    }
                    self.merge_trim_pair(a, b);
                    merged += 1;
                    changed = true;
                    break;
                }
            }
        }
        merged
    }

    fn can_merge_trim_pair(&self, a: TrimKey, b: TrimKey, angle_tolerance: f64) -> bool {
        let (ta, tb) = (&self.trims[a], &self.trims[b]);
        let (ea, eb) = match (ta.edge, tb.edge) {
            (Some(ea), Some(eb)) if ea != eb => (ea, eb),
            _ => return false,
        };
        let (edge_a, edge_b) = (&self.edges[ea], &self.edges[eb]);
        if edge_a.trims.len() != 1 || edge_b.trims.len() != 1 {
            return false;
        }
        if edge_a.curve3d != edge_b.curve3d
            || edge_a.curve_reversed != edge_b.curve_reversed
            || ta.curve2d != tb.curve2d
            || ta.reversed != tb.reversed
        {
            return false;
        }
        // Curve domains must be adjacent and trim domains contiguous.
        let a_before_b = (edge_a.domain.t1 - edge_b.domain.t0).abs() < 1e-9;
        let b_before_a = (edge_b.domain.t1 - edge_a.domain.t0).abs() < 1e-9;
        if !a_before_b && !b_before_a {
            return false;
        }
        if (ta.domain.t1 - tb.domain.t0).abs() > 1e-9 {
            return false;
        }
        // Co-tangency at the junction, sampled clear of the joint so finite
        // differencing does not smear the corner.
        let junction = if a_before_b {
            edge_a.domain.t1
        } else {
            edge_a.domain.t0
        };
        let curve = &self.curves3d[edge_a.curve3d];
        let eps = (edge_a.domain.length().abs() + edge_b.domain.length().abs()).max(1e-9) * 1e-3;
        let before = curve.tangent_at(junction - eps);
        let after = curve.tangent_at(junction + eps);
        let (nb, na) = (before.norm(), after.norm());
        if nb < 1e-12 || na < 1e-12 {
            return false;
        }
        (before.dot(&after) / (nb * na)).clamp(-1.0, 1.0).acos() <= angle_tolerance
    }

    /// Merge trim/edge `b` into `a`; caller has verified compatibility.
    fn merge_trim_pair(&mut self, a: TrimKey, b: TrimKey) {
        let ea = self.trims[a].edge.unwrap();
        let eb = self.trims[b].edge.unwrap();

        let junction_vertex = self.trims[a].end;
        let curve_reversed = self.edges[ea].curve_reversed;

        // Vertices of the merged span at the curve-lo and curve-hi ends.
        let (v_lo, v_hi) = if self.edges[ea].domain.t0 <= self.edges[eb].domain.t0 {
            (self.vertex_at_curve_lo(ea), self.vertex_at_curve_hi(eb))
        } else {
            (self.vertex_at_curve_lo(eb), self.vertex_at_curve_hi(ea))
        };

        let b_edge_domain = self.edges[eb].domain;
        let (b_trim_domain, b_trim_end) = {
            let t = &self.trims[b];
            (t.domain, t.end)
        };
        {
            let e = &mut self.edges[ea];
            e.domain = Interval::new(
                e.domain.t0.min(b_edge_domain.t0),
                e.domain.t1.max(b_edge_domain.t1),
            );
            if curve_reversed {
                e.start = v_hi;
                e.end = v_lo;
            } else {
                e.start = v_lo;
                e.end = v_hi;
            }
        }
        {
            let t = &mut self.trims[a];
            t.domain = Interval::new(
                t.domain.t0.min(b_trim_domain.t0),
                t.domain.t1.max(b_trim_domain.t1),
            );
            t.end = b_trim_end;
        }
        let loop_key = self.trims[b].loop_key;
        self.loops[loop_key].trims.retain(|&tk| tk != b);
        self.trims.remove(b);
        self.remove_edge_raw(eb);

        // The junction vertex may now be unreferenced.
        if let Some(mid) = junction_vertex {
            let still_used = self
                .edges
                .values()
                .any(|e| e.start == Some(mid) || e.end == Some(mid))
                || self
                    .trims
                    .values()
                    .any(|t| t.start == Some(mid) || t.end == Some(mid));
            if !still_used {
                self.vertices.remove(mid);
                self.vertex_order.retain(|&v| v != mid);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Surface domain rescale
    // -------------------------------------------------------------------------

    /// Rescale a face's surface domain along `axis` by `factor`, dragging the
    /// face's 2D trim geometry along so trims stay on the surface.
    ///
    /// Trim curves are per-trim in this kernel, so remapping in place cannot
    /// disturb other faces.
    pub fn rescale_face_domain(&mut self, face: FaceKey, axis: SurfaceAxis, factor: f64) {
        let surface_idx = self.faces[face].surface;
        let origin = self.surfaces[surface_idx].domain(axis).t0;
        self.surfaces[surface_idx].rescale_domain(axis, factor);

        let trim_keys: Vec<TrimKey> = self
            .trims
            .iter()
            .filter(|(_, t)| t.face == face)
            .map(|(k, _)| k)
            .collect();
        let horizontal = axis == SurfaceAxis::U;
        for trim_key in trim_keys {
            let curve_idx = self.trims[trim_key].curve2d;
            self.curves2d[curve_idx].remap_axis(horizontal, origin, factor);
        }
    }

    /// Rebuild a face's edges at `fit_tolerance` after its surface changed
    /// parameterization, and reclassify the face's iso trims.
    pub fn rebuild_face_edges(&mut self, face: FaceKey, fit_tolerance: f64) {
        let trim_keys: Vec<TrimKey> = self
            .trims
            .iter()
            .filter(|(_, t)| t.face == face)
            .map(|(k, _)| k)
            .collect();
        for trim_key in trim_keys {
            if let Some(edge) = self.trims[trim_key].edge {
                self.edges[edge].fit_tolerance = fit_tolerance;
            }
            if self.trims[trim_key].kind != TrimKind::Singular {
                let iso = self.classify_iso(trim_key);
                self.trims[trim_key].iso = iso;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Geometry compaction
    // -------------------------------------------------------------------------

    /// Drop geometry table entries no topology references and remap indices.
    pub fn compact_geometry(&mut self) {
        let mut used3 = vec![false; self.curves3d.len()];
        let mut used2 = vec![false; self.curves2d.len()];
        let mut used_s = vec![false; self.surfaces.len()];
        for edge in self.edges.values() {
            used3[edge.curve3d] = true;
        }
        for trim in self.trims.values() {
            used2[trim.curve2d] = true;
        }
        for face in self.faces.values() {
            used_s[face.surface] = true;
        }

        fn remap(used: &[bool]) -> Vec<Option<usize>> {
            let mut next = 0;
            used.iter()
                .map(|&u| {
                    if u {
                        let i = next;
                        next += 1;
                        Some(i)
                    } else {
                        None
                    }
                })
                .collect()
        }
        fn retain_used<T>(items: &mut Vec<T>, used: &[bool]) {
            let mut kept = Vec::new();
            for (i, item) in std::mem::take(items).into_iter().enumerate() {
                if used[i] {
                    kept.push(item);
                }
            }
            *items = kept;
        }

        let map3 = remap(&used3);
        let map2 = remap(&used2);
        let map_s = remap(&used_s);
        retain_used(&mut self.curves3d, &used3);
        retain_used(&mut self.curves2d, &used2);
        retain_used(&mut self.surfaces, &used_s);

        for edge in self.edges.values_mut() {
            edge.curve3d = map3[edge.curve3d].unwrap();
        }
        for trim in self.trims.values_mut() {
            trim.curve2d = map2[trim.curve2d].unwrap();
        }
        for face in self.faces.values_mut() {
            face.surface = map_s[face.surface].unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Curve2, Curve3};
    use crate::topology::LoopKind;
    use brepbridge_math::Point2;

    /// A single open face whose boundary is one L-shaped polyline edge plus a
    /// closing line edge.
    fn l_shaped_face() -> (Brep, EdgeKey) {
        let mut brep = Brep::new();
        let s = brep.add_surface(crate::nurbs::NurbsSurfaceData::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ));
        let face = brep.add_face(s, false);
        let lp = brep.add_loop(face, LoopKind::Outer);

        // Kinky edge: polyline (0,0) -> (2,0) -> (2,2).
        let v0 = brep.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = brep.add_vertex(Point3::new(2.0, 2.0, 0.0));
        let c_kinky = brep.add_curve3d(Curve3::Polyline {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
            ],
        });
        let kinky = brep.add_edge(c_kinky, Some(v0), Some(v1));
        let c2_kinky = brep.add_curve2d(Curve2::Polyline {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
            ],
        });
        brep.add_trim(lp, kinky, c2_kinky, false);

        // Straight closing edge back to the start.
        let c_close = brep.add_curve3d(Curve3::Line {
            start: Point3::new(2.0, 2.0, 0.0),
            end: Point3::new(0.0, 0.0, 0.0),
        });
        let close = brep.add_edge(c_close, Some(v1), Some(v0));
        let c2_close = brep.add_curve2d(Curve2::Line {
            start: Point2::new(1.0, 1.0),
            end: Point2::new(0.0, 0.0),
        });
        brep.add_trim(lp, close, c2_close, false);
        (brep, kinky)
    }

    #[test]
    fn kink_detection_and_split() {
        let (mut brep, kinky) = l_shaped_face();
        let t = brep.find_kink(kinky, 0.5).expect("kink should be found");
        // The polyline corner sits at parameter 1 of domain [0, 2].
        assert!((t - 1.0).abs() < 0.05, "kink parameter {t}");

        let before_edges = brep.edge_count();
        let before_trims = brep.trim_count();
        let (a, b) = brep.split_edge_at(kinky, 1.0);
        assert_eq!(brep.edge_count(), before_edges + 1);
        assert_eq!(brep.trim_count(), before_trims + 1);
        assert_eq!(brep.edges[a].domain, Interval::new(0.0, 1.0));
        assert_eq!(brep.edges[b].domain, Interval::new(1.0, 2.0));
        assert!(brep.is_valid().is_ok(), "{:?}", brep.is_valid());

        // Straight halves no longer kink.
        assert!(brep.find_kink(a, 0.5).is_none());
        assert!(brep.find_kink(b, 0.5).is_none());
    }

    #[test]
    fn split_then_merge_restores_counts() {
        let (mut brep, kinky) = l_shaped_face();
        brep.split_edge_at(kinky, 1.0);
        let before_edges = brep.edge_count();
        // The halves meet at a real 90-degree kink, so a tight angle
        // tolerance must refuse to merge...
        assert_eq!(brep.merge_adjacent_edges(0.5), 0);
        // ...while a permissive one merges them back.
        let merged = brep.merge_adjacent_edges(2.0);
        assert_eq!(merged, 1);
        assert_eq!(brep.edge_count(), before_edges - 1);
        assert!(brep.is_valid().is_ok(), "{:?}", brep.is_valid());
    }

    #[test]
    fn micro_edge_removal() {
        let mut brep = Brep::new();
        let s = brep.add_surface(crate::nurbs::NurbsSurfaceData::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ));
        let face = brep.add_face(s, false);
        let lp = brep.add_loop(face, LoopKind::Outer);
        let v0 = brep.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = brep.add_vertex(Point3::new(1e-9, 0.0, 0.0));
        let c = brep.add_curve3d(Curve3::Line {
            start: Point3::new(0.0, 0.0, 0.0),
            end: Point3::new(1e-9, 0.0, 0.0),
        });
        let micro = brep.add_edge(c, Some(v0), Some(v1));
        let c2 = brep.add_curve2d(Curve2::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(1e-9, 0.0),
        });
        brep.add_trim(lp, micro, c2, false);

        assert!(brep.edge_length(micro) < 1e-6);
        brep.remove_micro_edge(micro);
        assert_eq!(brep.edge_count(), 0);
        assert_eq!(brep.trim_count(), 0);
        assert_eq!(brep.vertex_count(), 1);
    }

    #[test]
    fn compact_geometry_drops_orphans() {
        let (mut brep, _) = l_shaped_face();
        brep.add_curve3d(Curve3::Line {
            start: Point3::origin(),
            end: Point3::new(1.0, 0.0, 0.0),
        });
        brep.add_curve2d(Curve2::Line {
            start: Point2::origin(),
            end: Point2::new(1.0, 0.0),
        });
        let n3 = brep.curves3d.len();
        let n2 = brep.curves2d.len();
        brep.compact_geometry();
        assert_eq!(brep.curves3d.len(), n3 - 1);
        assert_eq!(brep.curves2d.len(), n2 - 1);
        assert!(brep.is_valid().is_ok(), "{:?}", brep.is_valid());
    }
}
