#![warn(missing_docs)]

//! Neutral interchange schema for BREP solids and surfaces.
//!
//! This crate defines the flat, index-referenced representation that moves
//! boundary-representation geometry between two independent NURBS kernels.
//! All cross-references are integer indices into sibling arrays, never
//! handles or pointers — the otherwise-cyclic Face↔Loop↔Trim↔Edge adjacency
//! graph becomes a serializable arena. Index `-1` means "no reference".
//!
//! The schema is purely declarative: no evaluation, no tolerance logic.
//! A `NeutralBrep` is produced once at export time, is immutable until handed
//! to a transport collaborator, and is discarded after decode on the import
//! side.
//!
//! NURBS data here uses the full-multiplicity textbook convention: knot count
//! equals control-point count + degree + 1. [`NeutralBrep::validate`] enforces
//! this and the cross-reference invariants, so malformed input from an
//! upstream serializer fails fast with a typed [`SchemaError`] instead of
//! corrupting a downstream kernel.

use serde::{Deserialize, Serialize};

mod validate;

pub use validate::SchemaError;

/// A 3D position or direction triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeutralPoint {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl NeutralPoint {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A weighted NURBS control point in Cartesian form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// Rational weight; 1.0 for non-rational geometry.
    pub weight: f64,
}

impl ControlPoint {
    /// Create a new weighted control point.
    pub fn new(x: f64, y: f64, z: f64, weight: f64) -> Self {
        Self { x, y, z, weight }
    }
}

/// A closed parameter interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeutralInterval {
    /// Lower bound.
    pub t0: f64,
    /// Upper bound.
    pub t1: f64,
}

impl NeutralInterval {
    /// Create a new interval.
    pub fn new(t0: f64, t1: f64) -> Self {
        Self { t0, t1 }
    }

    /// Interval length.
    pub fn length(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Whether `other` lies within this interval, within `tolerance`.
    pub fn encloses(&self, other: &NeutralInterval, tolerance: f64) -> bool {
        other.t0 >= self.t0 - tolerance && other.t1 <= self.t1 + tolerance
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeutralBox {
    /// Minimum corner.
    pub min: NeutralPoint,
    /// Maximum corner.
    pub max: NeutralPoint,
}

// =============================================================================
// Curves
// =============================================================================

/// A parametric curve, used both for 3D edge curves and for 2D trim curves
/// (trim curves live in surface parameter space and carry z = 0).
///
/// The variant set is closed: the two kernels agree on exactly these kinds,
/// so decoding dispatches by exhaustive match instead of runtime type
/// inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NeutralCurve {
    /// Straight segment between two points.
    Line {
        /// Start point.
        start: NeutralPoint,
        /// End point.
        end: NeutralPoint,
        /// Parameter domain.
        domain: NeutralInterval,
    },
    /// Full circle.
    Circle {
        /// Center of the circle.
        center: NeutralPoint,
        /// Plane normal.
        normal: NeutralPoint,
        /// In-plane reference direction for parameter 0.
        x_axis: NeutralPoint,
        /// Radius.
        radius: f64,
        /// Parameter domain.
        domain: NeutralInterval,
    },
    /// Circular arc: the portion of a circle over `angle`.
    Arc {
        /// Center of the underlying circle.
        center: NeutralPoint,
        /// Plane normal.
        normal: NeutralPoint,
        /// In-plane reference direction for angle 0.
        x_axis: NeutralPoint,
        /// Radius.
        radius: f64,
        /// Swept angle interval in radians.
        angle: NeutralInterval,
        /// Parameter domain.
        domain: NeutralInterval,
    },
    /// Full ellipse.
    Ellipse {
        /// Center of the ellipse.
        center: NeutralPoint,
        /// Plane normal.
        normal: NeutralPoint,
        /// Major-axis direction.
        x_axis: NeutralPoint,
        /// Minor-axis direction.
        y_axis: NeutralPoint,
        /// Radius along `x_axis`.
        radius1: f64,
        /// Radius along `y_axis`.
        radius2: f64,
        /// Parameter domain.
        domain: NeutralInterval,
    },
    /// Piecewise-linear curve through a point list.
    Polyline {
        /// Ordered points; a closed polyline repeats the first point last.
        points: Vec<NeutralPoint>,
        /// Parameter domain.
        domain: NeutralInterval,
    },
    /// Ordered sequence of joined segments.
    Polycurve {
        /// Component curves, end-to-start contiguous.
        segments: Vec<NeutralCurve>,
        /// Whether the last segment closes onto the first.
        closed: bool,
        /// Parameter domain.
        domain: NeutralInterval,
    },
    /// Rational B-spline curve in the full-multiplicity knot convention.
    Nurbs {
        /// Polynomial degree.
        degree: usize,
        /// Whether any weight differs from 1.
        rational: bool,
        /// Whether the curve is periodic.
        periodic: bool,
        /// Whether the curve is closed (end touches start).
        closed: bool,
        /// Weighted control points.
        control_points: Vec<ControlPoint>,
        /// Knot vector; length = control_points.len() + degree + 1.
        knots: Vec<f64>,
        /// Parameter domain.
        domain: NeutralInterval,
    },
}

impl NeutralCurve {
    /// Parameter domain of the curve.
    pub fn domain(&self) -> NeutralInterval {
        match self {
            NeutralCurve::Line { domain, .. }
            | NeutralCurve::Circle { domain, .. }
            | NeutralCurve::Arc { domain, .. }
            | NeutralCurve::Ellipse { domain, .. }
            | NeutralCurve::Polyline { domain, .. }
            | NeutralCurve::Polycurve { domain, .. }
            | NeutralCurve::Nurbs { domain, .. } => *domain,
        }
    }
}

// =============================================================================
// Surface
// =============================================================================

/// A tensor-product NURBS surface in the full-multiplicity knot convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralSurface {
    /// Degree in the u direction.
    pub degree_u: usize,
    /// Degree in the v direction.
    pub degree_v: usize,
    /// Whether any weight differs from 1.
    pub rational: bool,
    /// Whether the surface is closed in u.
    pub closed_u: bool,
    /// Whether the surface is closed in v.
    pub closed_v: bool,
    /// Number of control points in u.
    pub count_u: usize,
    /// Number of control points in v.
    pub count_v: usize,
    /// Knot vector in u; length = count_u + degree_u + 1.
    pub knots_u: Vec<f64>,
    /// Knot vector in v; length = count_v + degree_v + 1.
    pub knots_v: Vec<f64>,
    /// Control grid in row-major order: `[v * count_u + u]`.
    pub control_points: Vec<ControlPoint>,
    /// Parameter domain in u.
    pub domain_u: NeutralInterval,
    /// Parameter domain in v.
    pub domain_v: NeutralInterval,
}

// =============================================================================
// Topology records
// =============================================================================

/// Position of a trim curve relative to its surface's parameter rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsoStatus {
    /// Not an iso-parametric trim.
    None,
    /// Iso in u somewhere inside the domain.
    X,
    /// Iso in v somewhere inside the domain.
    Y,
    /// On the u-min edge of the domain.
    West,
    /// On the u-max edge of the domain.
    East,
    /// On the v-min edge of the domain.
    South,
    /// On the v-max edge of the domain.
    North,
}

/// The role a trim plays on its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimType {
    /// Outer boundary trim with a naked edge.
    Boundary,
    /// Trim whose edge is shared with another face.
    Mated,
    /// Trim along a closed surface's seam.
    Seam,
    /// Degenerate trim at a surface pole; has no 3D edge.
    Singular,
    /// Unclassified.
    Unknown,
}

/// The kind of a face boundary loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopType {
    /// The face's outer boundary.
    Outer,
    /// A hole.
    Inner,
    /// A degenerate seam condition; distinct from Inner and preserved as-is.
    Slit,
}

/// Orientation of a closed brep's surface normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrepOrientation {
    /// Normals point out of the enclosed volume.
    Outward,
    /// Normals point into the enclosed volume.
    Inward,
    /// Open or undetermined.
    None,
}

/// A face: one surface trimmed by one or more loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralFace {
    /// Index into the surfaces array.
    pub surface_index: i32,
    /// Indices into the loops array, native order.
    pub loop_indices: Vec<i32>,
    /// Index of the outer loop within the loops array.
    pub outer_loop_index: i32,
    /// Whether the face normal opposes the surface normal.
    pub orientation_reversed: bool,
}

/// An edge: a 3D curve segment bounding one or more trims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralEdge {
    /// Index into the 3D curves array.
    pub curve3d_index: i32,
    /// Indices of the trims that use this edge.
    pub trim_indices: Vec<i32>,
    /// Start vertex index; −1 when the kernel allows open wireframe edges.
    pub start_vertex_index: i32,
    /// End vertex index; −1 when the kernel allows open wireframe edges.
    pub end_vertex_index: i32,
    /// Whether the edge runs opposite to its curve's direction.
    pub curve_reversed: bool,
    /// Sub-interval of the referenced curve's domain covered by this edge.
    pub domain: NeutralInterval,
}

/// A loop: an ordered cycle of trims bounding a face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralLoop {
    /// Index of the owning face.
    pub face_index: i32,
    /// Ordered trim indices.
    pub trim_indices: Vec<i32>,
    /// Loop kind.
    pub loop_type: LoopType,
}

/// A trim: a parameter-space curve bounding a face, optionally bound to an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralTrim {
    /// Edge index, or −1 for singular or unattached trims.
    pub edge_index: i32,
    /// Index of the owning face.
    pub face_index: i32,
    /// Index of the owning loop.
    pub loop_index: i32,
    /// Index into the 2D curves array.
    pub curve2d_index: i32,
    /// Iso-parametric classification against the face's surface domain.
    pub iso_status: IsoStatus,
    /// Trim role.
    pub trim_type: TrimType,
    /// Whether the trim runs opposite to its edge's 3D direction; the 2D
    /// curve always runs along the loop traversal.
    pub reversed: bool,
    /// Start vertex index, or −1.
    pub start_vertex_index: i32,
    /// End vertex index, or −1.
    pub end_vertex_index: i32,
    /// Sub-interval of the 2D curve's domain covered by this trim.
    pub domain: NeutralInterval,
}

// =============================================================================
// Aggregate
// =============================================================================

/// A complete neutral BREP: flat entity arrays plus aggregate scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeutralBrep {
    /// Tag identifying the originating kernel.
    pub provenance: String,
    /// Length unit of all coordinates (canonical short name, e.g. "mm").
    pub units: String,
    /// Vertex positions.
    pub vertices: Vec<NeutralPoint>,
    /// 3D edge curves.
    pub curves3d: Vec<NeutralCurve>,
    /// 2D trim curves in surface parameter space.
    pub curves2d: Vec<NeutralCurve>,
    /// Face surfaces.
    pub surfaces: Vec<NeutralSurface>,
    /// Faces.
    pub faces: Vec<NeutralFace>,
    /// Edges.
    pub edges: Vec<NeutralEdge>,
    /// Loops.
    pub loops: Vec<NeutralLoop>,
    /// Trims.
    pub trims: Vec<NeutralTrim>,
    /// Whether the brep encloses a volume (every edge shared by two trims).
    pub is_closed: bool,
    /// Normal orientation of a closed brep.
    pub orientation: BrepOrientation,
    /// Total surface area, in `units`².
    pub area: f64,
    /// Enclosed volume in `units`³; 0 unless `is_closed`.
    pub volume: f64,
    /// Axis-aligned bounds of the geometry.
    pub bbox: NeutralBox,
}

impl NeutralBrep {
    /// Serialize to a JSON string (for the transport collaborator).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nurbs_curve() -> NeutralCurve {
        NeutralCurve::Nurbs {
            degree: 1,
            rational: false,
            periodic: false,
            closed: false,
            control_points: vec![
                ControlPoint::new(0.0, 0.0, 0.0, 1.0),
                ControlPoint::new(10.0, 0.0, 0.0, 1.0),
            ],
            knots: vec![0.0, 0.0, 1.0, 1.0],
            domain: NeutralInterval::new(0.0, 1.0),
        }
    }

    #[test]
    fn curve_serde_tagged() {
        let curve = sample_nurbs_curve();
        let json = serde_json::to_string(&curve).unwrap();
        assert!(json.contains(r#""type":"Nurbs""#));
        let restored: NeutralCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(curve, restored);
    }

    #[test]
    fn polycurve_nests_segments() {
        let pc = NeutralCurve::Polycurve {
            segments: vec![
                NeutralCurve::Line {
                    start: NeutralPoint::new(0.0, 0.0, 0.0),
                    end: NeutralPoint::new(1.0, 0.0, 0.0),
                    domain: NeutralInterval::new(0.0, 1.0),
                },
                sample_nurbs_curve(),
            ],
            closed: false,
            domain: NeutralInterval::new(0.0, 2.0),
        };
        let json = serde_json::to_string(&pc).unwrap();
        let restored: NeutralCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(pc, restored);
    }

    #[test]
    fn curve_domain_accessor() {
        let curve = sample_nurbs_curve();
        let d = curve.domain();
        assert_eq!(d.t0, 0.0);
        assert_eq!(d.t1, 1.0);
    }

    #[test]
    fn interval_encloses() {
        let outer = NeutralInterval::new(0.0, 1.0);
        assert!(outer.encloses(&NeutralInterval::new(0.25, 0.75), 1e-12));
        assert!(!outer.encloses(&NeutralInterval::new(0.25, 1.5), 1e-12));
    }
}
