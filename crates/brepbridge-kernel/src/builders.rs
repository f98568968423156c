//! Reference model builders.
//!
//! A watertight box solid and a single-face sphere patch with a polar
//! singularity. Both are fully wired breps — vertices, edges, loops, trims,
//! per-trim 2D curves — built the way the kernel's own primitive factory
//! would produce them, and both pass the validity check.

use brepbridge_math::{Interval, Point2, Point3, Vec3};

use crate::curve::{Curve2, Curve3};
use crate::nurbs::NurbsSurfaceData;
use crate::topology::{Brep, IsoStatus, LoopKind};

/// Unit-square 2D boundary, counter-clockwise: south, east, north, west.
fn uv_rectangle() -> [Curve2; 4] {
    let c = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ];
    [
        Curve2::Line { start: c[0], end: c[1] },
        Curve2::Line { start: c[1], end: c[2] },
        Curve2::Line { start: c[2], end: c[3] },
        Curve2::Line { start: c[3], end: c[0] },
    ]
}

impl Brep {
    /// An axis-aligned box solid with one corner at the origin.
    ///
    /// 8 vertices, 12 line edges, 6 bilinear faces with one outer loop and 4
    /// trims each; all faces oriented outward. Aggregates are computed before
    /// returning, so `volume == dx * dy * dz` and `is_closed` holds.
    pub fn box_solid(dx: f64, dy: f64, dz: f64) -> Brep {
        assert!(dx > 0.0 && dy > 0.0 && dz > 0.0, "box extents must be positive");
        let mut brep = Brep::new();

        let corners = [
            Point3::new(0.0, 0.0, 0.0), // 0
            Point3::new(dx, 0.0, 0.0),  // 1
            Point3::new(dx, dy, 0.0),   // 2
            Point3::new(0.0, dy, 0.0),  // 3
            Point3::new(0.0, 0.0, dz),  // 4
            Point3::new(dx, 0.0, dz),   // 5
            Point3::new(dx, dy, dz),    // 6
            Point3::new(0.0, dy, dz),   // 7
        ];
        let v: Vec<_> = corners.iter().map(|&p| brep.add_vertex(p)).collect();

        // Twelve edges: bottom ring, top ring, verticals.
        let edge_vertices: [(usize, usize); 12] = [
            (0, 1), // e0
            (1, 2), // e1
            (2, 3), // e2
            (3, 0), // e3
            (4, 5), // e4
            (5, 6), // e5
            (6, 7), // e6
            (7, 4), // e7
            (0, 4), // e8
            (1, 5), // e9
            (2, 6), // e10
            (3, 7), // e11
        ];
        let edges: Vec<_> = edge_vertices
            .iter()
            .map(|&(a, b)| {
                let curve = brep.add_curve3d(Curve3::Line {
                    start: corners[a],
                    end: corners[b],
                });
                brep.add_edge(curve, Some(v[a]), Some(v[b]))
            })
            .collect();

        // Each face: bilinear corner grid (p00, p10, p01, p11) chosen so the
        // surface normal points outward, plus the CCW loop as (edge index,
        // trim-reversed) in south/east/north/west order.
        struct FaceSpec {
            grid: [usize; 4],
            loop_edges: [(usize, bool); 4],
        }
        let face_specs = [
            // Bottom (z = 0), normal -z.
            FaceSpec {
                grid: [0, 3, 1, 2],
                loop_edges: [(3, true), (2, true), (1, true), (0, true)],
            },
            // Top (z = dz), normal +z.
            FaceSpec {
                grid: [4, 5, 7, 6],
                loop_edges: [(4, false), (5, false), (6, false), (7, false)],
            },
            // Front (y = 0), normal -y.
            FaceSpec {
                grid: [0, 1, 4, 5],
                loop_edges: [(0, false), (9, false), (4, true), (8, true)],
            },
            // Right (x = dx), normal +x.
            FaceSpec {
                grid: [1, 2, 5, 6],
                loop_edges: [(1, false), (10, false), (5, true), (9, true)],
            },
            // Back (y = dy), normal +y.
            FaceSpec {
                grid: [2, 3, 6, 7],
                loop_edges: [(2, false), (11, false), (6, true), (10, true)],
            },
            // Left (x = 0), normal -x.
            FaceSpec {
                grid: [3, 0, 7, 4],
                loop_edges: [(3, false), (8, false), (7, true), (11, true)],
            },
        ];

        for spec in &face_specs {
            let [g00, g10, g01, g11] = spec.grid;
            let surface = brep.add_surface(NurbsSurfaceData::bilinear(
                corners[g00],
                corners[g10],
                corners[g01],
                corners[g11],
            ));
            let face = brep.add_face(surface, false);
            let lp = brep.add_loop(face, LoopKind::Outer);
            for (side, &(edge_idx, reversed)) in spec.loop_edges.iter().enumerate() {
                let curve2d = brep.add_curve2d(uv_rectangle()[side].clone());
                brep.add_trim(lp, edges[edge_idx], curve2d, reversed);
            }
        }

        brep.classify_trim_kinds();
        brep.update_iso_flags();
        brep.compute_aggregates();
        brep
    }

    /// One octant of a sphere as a single face whose north side degenerates
    /// to the pole: three arc edges plus one singular trim with no edge.
    ///
    /// The surface is the exact rational biquadratic octant patch; the face
    /// passes the validity check and exercises the singular-trim path.
    pub fn sphere_patch(radius: f64) -> Brep {
        assert!(radius > 0.0, "radius must be positive");
        let r = radius;
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let mut brep = Brep::new();

        let surface = brep.add_surface(NurbsSurfaceData::new(
            2,
            2,
            3,
            3,
            vec![
                Point3::new(r, 0.0, 0.0),
                Point3::new(r, r, 0.0),
                Point3::new(0.0, r, 0.0),
                Point3::new(r, 0.0, r),
                Point3::new(r, r, r),
                Point3::new(0.0, r, r),
                Point3::new(0.0, 0.0, r),
                Point3::new(0.0, 0.0, r),
                Point3::new(0.0, 0.0, r),
            ],
            vec![1.0, w, 1.0, w, w * w, w, 1.0, w, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
        ));

        let a = brep.add_vertex(Point3::new(r, 0.0, 0.0));
        let b = brep.add_vertex(Point3::new(0.0, r, 0.0));
        let pole = brep.add_vertex(Point3::new(0.0, 0.0, r));

        let quarter = Interval::new(0.0, std::f64::consts::FRAC_PI_2);
        // Equator arc A -> B in the XY plane.
        let equator = brep.add_curve3d(Curve3::Arc {
            center: Point3::origin(),
            normal: Vec3::z(),
            x_axis: Vec3::x(),
            radius: r,
            angle: quarter,
        });
        // Meridian B -> pole in the YZ plane.
        let meridian_bp = brep.add_curve3d(Curve3::Arc {
            center: Point3::origin(),
            normal: Vec3::x(),
            x_axis: Vec3::y(),
            radius: r,
            angle: quarter,
        });
        // Meridian pole -> A in the ZX plane.
        let meridian_pa = brep.add_curve3d(Curve3::Arc {
            center: Point3::origin(),
            normal: Vec3::y(),
            x_axis: Vec3::z(),
            radius: r,
            angle: quarter,
        });

        let e_equator = brep.add_edge(equator, Some(a), Some(b));
        let e_bp = brep.add_edge(meridian_bp, Some(b), Some(pole));
        let e_pa = brep.add_edge(meridian_pa, Some(pole), Some(a));

        let face = brep.add_face(surface, false);
        let lp = brep.add_loop(face, LoopKind::Outer);
        let [south, east, north, west] = uv_rectangle();

        let c_south = brep.add_curve2d(south);
        brep.add_trim(lp, e_equator, c_south, false);
        let c_east = brep.add_curve2d(east);
        brep.add_trim(lp, e_bp, c_east, false);
        let c_north = brep.add_curve2d(north);
        brep.add_singular_trim(lp, c_north, IsoStatus::North, Some(pole));
        let c_west = brep.add_curve2d(west);
        brep.add_trim(lp, e_pa, c_west, false);

        brep.classify_trim_kinds();
        brep.update_iso_flags();
        brep.compute_aggregates();
        brep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{SolidOrientation, TrimKind};
    use approx::assert_relative_eq;

    #[test]
    fn box_counts() {
        let b = Brep::box_solid(1.0, 1.0, 1.0);
        assert_eq!(b.vertex_count(), 8);
        assert_eq!(b.edge_count(), 12);
        assert_eq!(b.face_count(), 6);
        assert_eq!(b.loop_count(), 6);
        assert_eq!(b.trim_count(), 24);
    }

    #[test]
    fn box_is_watertight_and_valid() {
        let b = Brep::box_solid(1.0, 1.0, 1.0);
        assert!(b.is_valid().is_ok(), "{:?}", b.is_valid());
        assert!(b.is_closed);
        assert_eq!(b.orientation, SolidOrientation::Outward);
        assert!(b.trims.values().all(|t| t.kind == TrimKind::Mated));
    }

    #[test]
    fn box_mass_properties() {
        let b = Brep::box_solid(2.0, 3.0, 4.0);
        assert_relative_eq!(b.volume, 24.0, max_relative = 1e-9);
        assert_relative_eq!(b.area, 52.0, max_relative = 1e-9);
        assert_relative_eq!(b.bbox.diagonal(), (4.0f64 + 9.0 + 16.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn box_boundary_trims_are_iso() {
        let b = Brep::box_solid(1.0, 1.0, 1.0);
        for lp in b.loops.values() {
            let isos: Vec<IsoStatus> = lp.trims.iter().map(|&t| b.trims[t].iso).collect();
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
    }

    #[test]
    fn sphere_patch_is_valid_with_singular_trim() {
        let b = Brep::sphere_patch(3.0);
        assert!(b.is_valid().is_ok(), "{:?}", b.is_valid());
        assert_eq!(b.face_count(), 1);
        assert_eq!(b.edge_count(), 3);
        assert_eq!(b.trim_count(), 4);
        assert!(!b.is_closed);
        assert_eq!(b.volume, 0.0);

        let singular: Vec<_> = b
            .trims
            .values()
            .filter(|t| t.kind == TrimKind::Singular)
            .collect();
        assert_eq!(singular.len(), 1);
        assert!(singular[0].edge.is_none());
        assert_eq!(singular[0].iso, IsoStatus::North);
        // The other trims are naked boundaries.
        assert_eq!(
            b.trims
                .values()
                .filter(|t| t.kind == TrimKind::Boundary)
                .count(),
            3
        );
    }

    #[test]
    fn sphere_patch_area_octant() {
        // One octant of a sphere: area = 4πr² / 8.
        let r = 3.0;
        let b = Brep::sphere_patch(r);
        let expected = std::f64::consts::PI * r * r / 2.0;
        assert_relative_eq!(b.area, expected, max_relative = 2e-2);
    }
}
