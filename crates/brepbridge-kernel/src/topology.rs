//! BREP topology arena.
//!
//! Vertices, edges, trims, loops, and faces live in slotmap arenas keyed by
//! generational keys; geometry (3D curves, 2D trim curves, surfaces) lives in
//! plain index tables the way a kernel's geometry store exposes it. Entity
//! creation order is tracked explicitly so exports see the kernel's stable
//! native order even after repair has removed entities.

use brepbridge_math::{BoundingBox, Interval, Point2, Point3};
use slotmap::{new_key_type, SlotMap};

use crate::curve::{Curve2, Curve3};
use crate::nurbs::NurbsSurfaceData;

new_key_type! {
    /// Key of a vertex in the arena.
    pub struct VertexKey;
    /// Key of an edge in the arena.
    pub struct EdgeKey;
    /// Key of a trim in the arena.
    pub struct TrimKey;
    /// Key of a loop in the arena.
    pub struct LoopKey;
    /// Key of a face in the arena.
    pub struct FaceKey;
}

/// Iso-parametric classification of a trim against its surface domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsoStatus {
    /// Not iso-parametric.
    #[default]
    None,
    /// Constant-u trim strictly inside the domain.
    X,
    /// Constant-v trim strictly inside the domain.
    Y,
    /// On the u-min boundary.
    West,
    /// On the u-max boundary.
    East,
    /// On the v-min boundary.
    South,
    /// On the v-max boundary.
    North,
}

/// The role a trim plays on its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimKind {
    /// Boundary trim with a naked edge.
    Boundary,
    /// Edge shared with another face.
    Mated,
    /// Both sides of the edge belong to the same face (closed surface seam).
    Seam,
    /// Degenerate trim at a surface pole; no 3D edge.
    Singular,
    /// Not yet classified.
    #[default]
    Unknown,
}

/// The kind of a face boundary loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    /// Outer boundary.
    Outer,
    /// Hole.
    Inner,
    /// Degenerate seam loop; never merged into Inner.
    Slit,
}

/// Orientation of a closed brep's surface normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolidOrientation {
    /// Normals point out of the enclosed volume.
    Outward,
    /// Normals point inward.
    Inward,
    /// Open or undetermined.
    #[default]
    None,
}

/// A topological vertex.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Position in model space.
    pub point: Point3,
}

/// A topological edge: a bounded portion of a 3D curve.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Index into the brep's 3D curve table.
    pub curve3d: usize,
    /// Trims using this edge.
    pub trims: Vec<TrimKey>,
    /// Start vertex; `None` for open wireframe edges.
    pub start: Option<VertexKey>,
    /// End vertex; `None` for open wireframe edges.
    pub end: Option<VertexKey>,
    /// Whether the edge runs opposite to its curve's direction.
    pub curve_reversed: bool,
    /// Sub-interval of the curve's domain covered by this edge.
    pub domain: Interval,
    /// How far the 3D curve may deviate from the intersection it represents.
    pub fit_tolerance: f64,
}

/// A trim: a 2D parameter-space curve segment bounding a face.
#[derive(Debug, Clone)]
pub struct Trim {
    /// Bound edge; `None` for singular or unattached trims.
    pub edge: Option<EdgeKey>,
    /// Owning face.
    pub face: FaceKey,
    /// Owning loop.
    pub loop_key: LoopKey,
    /// Index into the brep's 2D curve table.
    pub curve2d: usize,
    /// Iso-parametric classification.
    pub iso: IsoStatus,
    /// Trim role.
    pub kind: TrimKind,
    /// Whether the trim runs opposite to its edge's 3D direction. The 2D
    /// curve is always directed along the loop traversal.
    pub reversed: bool,
    /// Start vertex, if any.
    pub start: Option<VertexKey>,
    /// End vertex, if any.
    pub end: Option<VertexKey>,
    /// Sub-interval of the 2D curve's domain covered by this trim.
    pub domain: Interval,
    /// Per-axis 2D fitting tolerances, set after loop assembly.
    pub tolerance: [f64; 2],
}

/// An ordered cycle of trims bounding a face.
#[derive(Debug, Clone)]
pub struct Loop {
    /// Owning face.
    pub face: FaceKey,
    /// Ordered trims.
    pub trims: Vec<TrimKey>,
    /// Loop kind.
    pub kind: LoopKind,
}

/// A face: one surface bounded by loops.
#[derive(Debug, Clone)]
pub struct Face {
    /// Index into the brep's surface table.
    pub surface: usize,
    /// Loops in native order.
    pub loops: Vec<LoopKey>,
    /// The outer loop.
    pub outer_loop: Option<LoopKey>,
    /// Whether the face normal opposes the surface normal.
    pub orientation_reversed: bool,
}

/// A boundary-representation solid or surface model.
#[derive(Debug, Clone, Default)]
pub struct Brep {
    /// 3D edge curves.
    pub curves3d: Vec<Curve3>,
    /// 2D trim curves.
    pub curves2d: Vec<Curve2>,
    /// Face surfaces.
    pub surfaces: Vec<NurbsSurfaceData>,
    /// Vertex arena.
    pub vertices: SlotMap<VertexKey, Vertex>,
    /// Edge arena.
    pub edges: SlotMap<EdgeKey, Edge>,
    /// Trim arena.
    pub trims: SlotMap<TrimKey, Trim>,
    /// Loop arena.
    pub loops: SlotMap<LoopKey, Loop>,
    /// Face arena.
    pub faces: SlotMap<FaceKey, Face>,
    /// Vertices in creation order.
    pub vertex_order: Vec<VertexKey>,
    /// Edges in creation order.
    pub edge_order: Vec<EdgeKey>,
    /// Faces in creation order.
    pub face_order: Vec<FaceKey>,
    /// Whether every edge is shared by exactly two trims.
    pub is_closed: bool,
    /// Normal orientation when closed.
    pub orientation: SolidOrientation,
    /// Cached total surface area.
    pub area: f64,
    /// Cached enclosed volume; 0 when open.
    pub volume: f64,
    /// Cached bounds.
    pub bbox: BoundingBox,
}

/// Parameter-space slack used when comparing trim endpoints and iso positions,
/// relative to the domain extent.
const UV_REL_SLACK: f64 = 1e-6;

/// Model-space slack used by the validity check when comparing curve ends to
/// vertex positions.
const GEOM_SLACK: f64 = 1e-3;

impl Brep {
    /// Create an empty brep.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Geometry tables
    // -------------------------------------------------------------------------

    /// Add a 3D curve, returning its table index.
    pub fn add_curve3d(&mut self, curve: Curve3) -> usize {
        self.curves3d.push(curve);
        self.curves3d.len() - 1
    }

    /// Add a 2D trim curve, returning its table index.
    pub fn add_curve2d(&mut self, curve: Curve2) -> usize {
        self.curves2d.push(curve);
        self.curves2d.len() - 1
    }

    /// Add a surface, returning its table index.
    pub fn add_surface(&mut self, surface: NurbsSurfaceData) -> usize {
        self.surfaces.push(surface);
        self.surfaces.len() - 1
    }

    // -------------------------------------------------------------------------
    // Topology construction
    // -------------------------------------------------------------------------

    /// Add a vertex.
    pub fn add_vertex(&mut self, point: Point3) -> VertexKey {
        let key = self.vertices.insert(Vertex { point });
        self.vertex_order.push(key);
        key
    }

    /// Add a vertex, reusing an existing one within `join_tolerance`.
    pub fn find_or_add_vertex(&mut self, point: Point3, join_tolerance: f64) -> VertexKey {
        for &key in &self.vertex_order {
            if (self.vertices[key].point - point).norm() <= join_tolerance {
                return key;
            }
        }
        self.add_vertex(point)
    }

    /// Add a face over `surface`.
    pub fn add_face(&mut self, surface: usize, orientation_reversed: bool) -> FaceKey {
        let key = self.faces.insert(Face {
            surface,
            loops: Vec::new(),
            outer_loop: None,
            orientation_reversed,
        });
        self.face_order.push(key);
        key
    }

    /// Add a loop to `face`. The first Outer loop becomes the face's outer loop.
    pub fn add_loop(&mut self, face: FaceKey, kind: LoopKind) -> LoopKey {
        let key = self.loops.insert(Loop {
            face,
            trims: Vec::new(),
            kind,
        });
        let f = &mut self.faces[face];
        f.loops.push(key);
        if kind == LoopKind::Outer && f.outer_loop.is_none() {
            f.outer_loop = Some(key);
        }
        key
    }

    /// Add an edge spanning the full domain of `curve3d`.
    pub fn add_edge(
        &mut self,
        curve3d: usize,
        start: Option<VertexKey>,
        end: Option<VertexKey>,
    ) -> EdgeKey {
        let domain = self.curves3d[curve3d].domain();
        self.add_edge_with_domain(curve3d, domain, start, end)
    }

    /// Add an edge over an explicit sub-interval of `curve3d`'s domain.
    pub fn add_edge_with_domain(
        &mut self,
        curve3d: usize,
        domain: Interval,
        start: Option<VertexKey>,
        end: Option<VertexKey>,
    ) -> EdgeKey {
        let key = self.edges.insert(Edge {
            curve3d,
            trims: Vec::new(),
            start,
            end,
            curve_reversed: false,
            domain,
            fit_tolerance: 0.0,
        });
        self.edge_order.push(key);
        key
    }

    /// Add a trim bound to `edge`, spanning the full domain of `curve2d`.
    ///
    /// `reversed` states that the trim traverses its edge backwards; the
    /// trim's vertices come from the edge, swapped accordingly.
    pub fn add_trim(
        &mut self,
        loop_key: LoopKey,
        edge: EdgeKey,
        curve2d: usize,
        reversed: bool,
    ) -> TrimKey {
        let domain = self.curves2d[curve2d].domain();
        self.add_trim_with_domain(loop_key, edge, curve2d, reversed, domain)
    }

    /// Add a trim bound to `edge` over an explicit 2D curve sub-interval.
    pub fn add_trim_with_domain(
        &mut self,
        loop_key: LoopKey,
        edge: EdgeKey,
        curve2d: usize,
        reversed: bool,
        domain: Interval,
    ) -> TrimKey {
        let face = self.loops[loop_key].face;
        let (edge_start, edge_end) = {
            let e = &self.edges[edge];
            (e.start, e.end)
        };
        let (start, end) = if reversed {
            (edge_end, edge_start)
        } else {
            (edge_start, edge_end)
        };
        let key = self.trims.insert(Trim {
            edge: Some(edge),
            face,
            loop_key,
            curve2d,
            iso: IsoStatus::None,
            kind: TrimKind::Unknown,
            reversed,
            start,
            end,
            domain,
            tolerance: [0.0, 0.0],
        });
        self.loops[loop_key].trims.push(key);
        self.edges[edge].trims.push(key);
        key
    }

    /// Add a degenerate point trim at a surface pole: no 3D edge, only the 2D
    /// curve and its iso position.
    pub fn add_singular_trim(
        &mut self,
        loop_key: LoopKey,
        curve2d: usize,
        iso: IsoStatus,
        vertex: Option<VertexKey>,
    ) -> TrimKey {
        let face = self.loops[loop_key].face;
        let domain = self.curves2d[curve2d].domain();
        let key = self.trims.insert(Trim {
            edge: None,
            face,
            loop_key,
            curve2d,
            iso,
            kind: TrimKind::Singular,
            reversed: false,
            start: vertex,
            end: vertex,
            domain,
            tolerance: [0.0, 0.0],
        });
        self.loops[loop_key].trims.push(key);
        key
    }

    /// Add an unattached boundary trim: a defect case preserved as-is so that
    /// topology is not silently changed.
    pub fn add_unattached_trim(
        &mut self,
        loop_key: LoopKey,
        curve2d: usize,
        reversed: bool,
        domain: Interval,
    ) -> TrimKey {
        let face = self.loops[loop_key].face;
        let key = self.trims.insert(Trim {
            edge: None,
            face,
            loop_key,
            curve2d,
            iso: IsoStatus::None,
            kind: TrimKind::Boundary,
            reversed,
            start: None,
            end: None,
            domain,
            tolerance: [0.0, 0.0],
        });
        self.loops[loop_key].trims.push(key);
        key
    }

    /// Set a trim's per-axis 2D tolerances.
    pub fn set_trim_tolerances(&mut self, trim: TrimKey, tol_u: f64, tol_v: f64) {
        self.trims[trim].tolerance = [tol_u, tol_v];
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of loops.
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Number of trims.
    pub fn trim_count(&self) -> usize {
        self.trims.len()
    }

    /// The 3D point where an edge starts, following `curve_reversed`.
    pub fn edge_start_point(&self, edge: EdgeKey) -> Point3 {
        let e = &self.edges[edge];
        let t = if e.curve_reversed {
            e.domain.t1
        } else {
            e.domain.t0
        };
        self.curves3d[e.curve3d].point_at(t)
    }

    /// The 3D point where an edge ends, following `curve_reversed`.
    pub fn edge_end_point(&self, edge: EdgeKey) -> Point3 {
        let e = &self.edges[edge];
        let t = if e.curve_reversed {
            e.domain.t0
        } else {
            e.domain.t1
        };
        self.curves3d[e.curve3d].point_at(t)
    }

    /// Approximate length of an edge.
    pub fn edge_length(&self, edge: EdgeKey) -> f64 {
        let e = &self.edges[edge];
        self.curves3d[e.curve3d].length_over(&e.domain, 16)
    }

    /// 2D start point of a trim (2D curves run along the loop direction).
    pub fn trim_start_uv(&self, trim: TrimKey) -> Point2 {
        let t = &self.trims[trim];
        self.curves2d[t.curve2d].point_at(t.domain.t0)
    }

    /// 2D end point of a trim.
    pub fn trim_end_uv(&self, trim: TrimKey) -> Point2 {
        let t = &self.trims[trim];
        self.curves2d[t.curve2d].point_at(t.domain.t1)
    }

    // -------------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------------

    /// Classify one trim against its face's surface domain.
    pub fn classify_iso(&self, trim: TrimKey) -> IsoStatus {
        let t = &self.trims[trim];
        let face = &self.faces[t.face];
        let surface = &self.surfaces[face.surface];
        let du = surface.domain_u();
        let dv = surface.domain_v();
        let slack_u = du.length().abs().max(1e-12) * UV_REL_SLACK;
        let slack_v = dv.length().abs().max(1e-12) * UV_REL_SLACK;

        const SAMPLES: usize = 5;
        let curve = &self.curves2d[t.curve2d];
        let points: Vec<Point2> = (0..SAMPLES)
            .map(|k| curve.point_at(t.domain.at_normalized(k as f64 / (SAMPLES - 1) as f64)))
            .collect();

        let all_u = |value: f64, slack: f64| points.iter().all(|p| (p.x - value).abs() <= slack);
        let all_v = |value: f64, slack: f64| points.iter().all(|p| (p.y - value).abs() <= slack);

        if all_u(du.t0, slack_u) {
            IsoStatus::West
        } else if all_u(du.t1, slack_u) {
            IsoStatus::East
        } else if all_v(dv.t0, slack_v) {
            IsoStatus::South
        } else if all_v(dv.t1, slack_v) {
            IsoStatus::North
        } else if all_u(points[0].x, slack_u) {
            IsoStatus::X
        } else if all_v(points[0].y, slack_v) {
            IsoStatus::Y
        } else {
            IsoStatus::None
        }
    }

    /// Refresh the iso flag of every non-singular trim.
    pub fn update_iso_flags(&mut self) {
        let keys: Vec<TrimKey> = self.trims.keys().collect();
        for key in keys {
            if self.trims[key].kind != TrimKind::Singular {
                let iso = self.classify_iso(key);
                self.trims[key].iso = iso;
            }
        }
    }

    /// Refresh every non-singular trim's kind from its edge sharing.
    pub fn classify_trim_kinds(&mut self) {
        let keys: Vec<TrimKey> = self.trims.keys().collect();
        for key in keys {
            let t = &self.trims[key];
            if t.kind == TrimKind::Singular {
                continue;
            }
            let kind = match t.edge {
                None => TrimKind::Boundary,
                Some(edge) => {
                    let e = &self.edges[edge];
                    match e.trims.len() {
                        0 | 1 => TrimKind::Boundary,
                        2 => {
                            let f0 = self.trims[e.trims[0]].face;
                            let f1 = self.trims[e.trims[1]].face;
                            if f0 == f1 {
                                TrimKind::Seam
                            } else {
                                TrimKind::Mated
                            }
                        }
                        _ => TrimKind::Mated,
                    }
                }
            };
            self.trims[key].kind = kind;
        }
    }

    /// Recompute `is_closed` from edge sharing.
    pub fn update_closed_flag(&mut self) {
        self.is_closed = !self.edges.is_empty()
            && self
                .edges
                .values()
                .all(|e| e.trims.len() == 2);
        if !self.is_closed {
            self.orientation = SolidOrientation::None;
            self.volume = 0.0;
        }
    }

    // -------------------------------------------------------------------------
    // Scaling
    // -------------------------------------------------------------------------

    /// Uniformly scale all model-space geometry about the origin.
    ///
    /// Parameter-space data (2D curves, knots, domains) is untouched; edge
    /// fitting tolerances scale with the geometry, as do the cached
    /// aggregates.
    pub fn scale_geometry(&mut self, factor: f64) {
        for curve in &mut self.curves3d {
            curve.scale(factor);
        }
        for surface in &mut self.surfaces {
            for p in &mut surface.points {
                *p *= factor;
            }
        }
        for vertex in self.vertices.values_mut() {
            vertex.point *= factor;
        }
        for edge in self.edges.values_mut() {
            edge.fit_tolerance *= factor.abs();
        }
        self.area *= factor * factor;
        self.volume *= factor * factor * factor;
        self.bbox = self.bbox.scaled(factor);
    }

    // -------------------------------------------------------------------------
    // Validity
    // -------------------------------------------------------------------------

    /// Run the kernel's validity check.
    ///
    /// Returns free-form diagnostic text listing every defect found; callers
    /// capture the text verbatim rather than parsing it.
    pub fn is_valid(&self) -> Result<(), String> {
        let mut issues: Vec<String> = Vec::new();

        for (key, face) in &self.faces {
            if face.surface >= self.surfaces.len() {
                issues.push(format!(
                    "face {key:?}: surface index {} out of bounds",
                    face.surface
                ));
            }
            match face.outer_loop {
                None => issues.push(format!("face {key:?}: no outer loop")),
                Some(outer) => {
                    if !face.loops.contains(&outer) {
                        issues.push(format!("face {key:?}: outer loop not among its loops"));
                    }
                }
            }
            for &lk in &face.loops {
                if !self.loops.contains_key(lk) {
                    issues.push(format!("face {key:?}: dangling loop key"));
                }
            }
        }

        for (key, edge) in &self.edges {
            if edge.curve3d >= self.curves3d.len() {
                issues.push(format!(
                    "edge {key:?}: curve index {} out of bounds",
                    edge.curve3d
                ));
                continue;
            }
            let curve_domain = self.curves3d[edge.curve3d].domain();
            if !curve_domain.encloses(&edge.domain, 1e-9) {
                issues.push(format!(
                    "edge {key:?}: domain [{}, {}] exceeds curve domain [{}, {}]",
                    edge.domain.t0, edge.domain.t1, curve_domain.t0, curve_domain.t1
                ));
            }
            let slack = edge.fit_tolerance.max(GEOM_SLACK);
            if let Some(start) = edge.start {
                let p = self.edge_start_point(key);
                if (self.vertices[start].point - p).norm() > slack {
                    issues.push(format!("edge {key:?}: start vertex off the curve start"));
                }
            }
            if let Some(end) = edge.end {
                let p = self.edge_end_point(key);
                if (self.vertices[end].point - p).norm() > slack {
                    issues.push(format!("edge {key:?}: end vertex off the curve end"));
                }
            }
            for &tk in &edge.trims {
                if !self.trims.contains_key(tk) {
                    issues.push(format!("edge {key:?}: dangling trim key"));
                }
            }
        }

        for (key, trim) in &self.trims {
            if trim.curve2d >= self.curves2d.len() {
                issues.push(format!(
                    "trim {key:?}: 2d curve index {} out of bounds",
                    trim.curve2d
                ));
            }
            if let Some(edge) = trim.edge {
                if !self.edges.contains_key(edge) {
                    issues.push(format!("trim {key:?}: dangling edge key"));
                } else if !self.edges[edge].trims.contains(&key) {
                    issues.push(format!("trim {key:?}: edge does not list it back"));
                }
            } else if trim.kind != TrimKind::Singular && trim.kind != TrimKind::Boundary {
                issues.push(format!(
                    "trim {key:?}: no edge but kind is {:?}",
                    trim.kind
                ));
            }
            if !self.loops.contains_key(trim.loop_key) {
                issues.push(format!("trim {key:?}: dangling loop key"));
            }
        }

        for (key, lp) in &self.loops {
            if lp.trims.is_empty() {
                issues.push(format!("loop {key:?}: empty"));
                continue;
            }
            let surface = match self
                .faces
                .get(lp.face)
                .and_then(|f| self.surfaces.get(f.surface))
            {
                Some(s) => s,
                None => {
                    issues.push(format!("loop {key:?}: dangling face or surface"));
                    continue;
                }
            };
            // Consecutive trims must connect in parameter space.
            let slack = (surface.domain_u().length().abs() + surface.domain_v().length().abs())
                .max(1e-9)
                * 1e-3;
            for i in 0..lp.trims.len() {
                let a = lp.trims[i];
                let b = lp.trims[(i + 1) % lp.trims.len()];
                let gap = (self.trim_end_uv(a) - self.trim_start_uv(b)).norm();
                if gap > slack {
                    issues.push(format!(
                        "loop {key:?}: gap of {gap:.3e} between consecutive trims"
                    ));
                }
            }
        }

        if self.is_closed {
            for (key, edge) in &self.edges {
                if edge.trims.len() != 2 {
                    issues.push(format!(
                        "closed brep: edge {key:?} has {} trims (expected 2)",
                        edge.trims.len()
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_face_brep() -> Brep {
        // One planar face over [0,10]² with four line edges.
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
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        let vk: Vec<VertexKey> = corners.iter().map(|&p| brep.add_vertex(p)).collect();
        let face = brep.add_face(s, false);
        let lp = brep.add_loop(face, LoopKind::Outer);
        let uv = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        for i in 0..4 {
            let j = (i + 1) % 4;
            let c3 = brep.add_curve3d(Curve3::Line {
                start: corners[i],
                end: corners[j],
            });
            let edge = brep.add_edge(c3, Some(vk[i]), Some(vk[j]));
            let c2 = brep.add_curve2d(Curve2::Line {
                start: uv[i],
                end: uv[j],
            });
            brep.add_trim(lp, edge, c2, false);
        }
        brep
    }

    #[test]
    fn quad_face_counts_and_validity() {
        let brep = quad_face_brep();
        assert_eq!(brep.vertex_count(), 4);
        assert_eq!(brep.edge_count(), 4);
        assert_eq!(brep.trim_count(), 4);
        assert_eq!(brep.loop_count(), 1);
        assert_eq!(brep.face_count(), 1);
        assert!(brep.is_valid().is_ok(), "{:?}", brep.is_valid());
    }

    #[test]
    fn boundary_trims_classify_iso() {
        let mut brep = quad_face_brep();
        brep.update_iso_flags();
        let lp = brep.loops.values().next().unwrap();
        let isos: Vec<IsoStatus> = lp.trims.iter().map(|&t| brep.trims[t].iso).collect();
        assert_eq!(
            isos,
            vec![
                IsoStatus::South,
                IsoStatus::East,
                IsoStatus::North,
                IsoStatus::West
            ]
        );
    }

    #[test]
    fn naked_trims_classify_boundary() {
        let mut brep = quad_face_brep();
        brep.classify_trim_kinds();
        assert!(brep
            .trims
            .values()
            .all(|t| t.kind == TrimKind::Boundary));
        brep.update_closed_flag();
        assert!(!brep.is_closed);
    }

    #[test]
    fn find_or_add_vertex_joins() {
        let mut brep = Brep::new();
        let a = brep.add_vertex(Point3::origin());
        let b = brep.find_or_add_vertex(Point3::new(1e-9, 0.0, 0.0), 1e-6);
        assert_eq!(a, b);
        let c = brep.find_or_add_vertex(Point3::new(1.0, 0.0, 0.0), 1e-6);
        assert_ne!(a, c);
        assert_eq!(brep.vertex_count(), 2);
    }

    #[test]
    fn validity_flags_loop_gap() {
        let mut brep = quad_face_brep();
        // Break a trim by pointing it at a disconnected 2D segment.
        let tk = brep.loops.values().next().unwrap().trims[0];
        let bad = brep.add_curve2d(Curve2::Line {
            start: Point2::new(3.0, 3.0),
            end: Point2::new(4.0, 4.0),
        });
        brep.trims[tk].curve2d = bad;
        brep.trims[tk].domain = Interval::unit();
        let err = brep.is_valid().unwrap_err();
        assert!(err.contains("gap"), "unexpected diagnostics: {err}");
    }

    #[test]
    fn scale_geometry_scales_aggregates() {
        let mut brep = quad_face_brep();
        brep.area = 100.0;
        brep.volume = 0.0;
        let mut bb = BoundingBox::empty();
        bb.expand(&Point3::origin());
        bb.expand(&Point3::new(10.0, 10.0, 0.0));
        brep.bbox = bb;
        brep.scale_geometry(2.0);
        assert_eq!(brep.area, 400.0);
        assert!((brep.bbox.diagonal() - 2.0 * bb.diagonal()).abs() < 1e-12);
        // Geometry followed.
        let v = brep.vertex_order[1];
        assert_eq!(brep.vertices[v].point.x, 20.0);
    }

    #[test]
    fn edge_reversed_endpoints() {
        let mut brep = Brep::new();
        let c = brep.add_curve3d(Curve3::Line {
            start: Point3::origin(),
            end: Point3::new(5.0, 0.0, 0.0),
        });
        let e = brep.add_edge(c, None, None);
        brep.edges[e].curve_reversed = true;
        assert_eq!(brep.edge_start_point(e).x, 5.0);
        assert_eq!(brep.edge_end_point(e).x, 0.0);
    }
}
