//! Mass properties: area, volume, bounding box.
//!
//! Area integrates `|Su x Sv|` and volume applies the divergence theorem,
//! `V = (1/3) * sum of P . (Su x Sv)`, with composite Gauss-Legendre
//! quadrature per knot span. Integration runs over each face's full surface
//! domain, which is exact for faces whose outer loop spans the whole domain
//! (every builder in this crate, and anything produced by decode from such
//! models); partially-trimmed faces would need parameter-space clipping that
//! the interchange pipeline never requires, since it only copies the cached
//! aggregates through.

use brepbridge_math::BoundingBox;

use crate::nurbs::NurbsSurfaceData;
use crate::topology::{Brep, SolidOrientation};

/// 4-point Gauss-Legendre nodes on [-1, 1].
const GAUSS_X: [f64; 4] = [
    -0.861_136_311_594_052_6,
    -0.339_981_043_584_856_3,
    0.339_981_043_584_856_3,
    0.861_136_311_594_052_6,
];
/// Matching weights.
const GAUSS_W: [f64; 4] = [
    0.347_854_845_137_453_86,
    0.652_145_154_862_546_1,
    0.652_145_154_862_546_1,
    0.347_854_845_137_453_86,
];

/// Distinct span boundaries of a kernel-convention knot vector, restricted to
/// the domain.
fn spans(knots: &[f64], t0: f64, t1: f64) -> Vec<f64> {
    let mut out = vec![t0];
    for &k in knots {
        if k > t0 && k < t1 && (k - out.last().unwrap()).abs() > 1e-12 {
            out.push(k);
        }
    }
    out.push(t1);
    out
}

/// Integrate `f(u, v) * ju * jv` over the surface domain with per-span
/// Gauss-Legendre quadrature.
fn integrate_surface<F: FnMut(&NurbsSurfaceData, f64, f64) -> f64>(
    surface: &NurbsSurfaceData,
    mut f: F,
) -> f64 {
    let du = surface.domain_u();
    let dv = surface.domain_v();
    let spans_u = spans(&surface.knots_u, du.t0, du.t1);
    let spans_v = spans(&surface.knots_v, dv.t0, dv.t1);

    let mut total = 0.0;
    for su in spans_u.windows(2) {
        let (ua, ub) = (su[0], su[1]);
        let ju = 0.5 * (ub - ua);
        for sv in spans_v.windows(2) {
            let (va, vb) = (sv[0], sv[1]);
            let jv = 0.5 * (vb - va);
            for (i, &xu) in GAUSS_X.iter().enumerate() {
                let u = 0.5 * (ua + ub) + ju * xu;
                for (j, &xv) in GAUSS_X.iter().enumerate() {
                    let v = 0.5 * (va + vb) + jv * xv;
                    total += GAUSS_W[i] * GAUSS_W[j] * ju * jv * f(surface, u, v);
                }
            }
        }
    }
    total
}

impl Brep {
    /// Total surface area over all faces.
    pub fn compute_area(&self) -> f64 {
        self.face_order
            .iter()
            .filter_map(|&fk| self.faces.get(fk))
            .map(|face| {
                integrate_surface(&self.surfaces[face.surface], |s, u, v| {
                    s.partial_u(u, v).cross(&s.partial_v(u, v)).norm()
                })
            })
            .sum()
    }

    /// Signed volume by the divergence theorem; positive when face normals
    /// (after `orientation_reversed`) point outward.
    pub fn compute_signed_volume(&self) -> f64 {
        let sum: f64 = self
            .face_order
            .iter()
            .filter_map(|&fk| self.faces.get(fk))
            .map(|face| {
                let sign = if face.orientation_reversed { -1.0 } else { 1.0 };
                sign * integrate_surface(&self.surfaces[face.surface], |s, u, v| {
                    let p = s.point_at(u, v);
                    let n = s.partial_u(u, v).cross(&s.partial_v(u, v));
                    p.coords.dot(&n)
                })
            })
            .sum();
        sum / 3.0
    }

    /// Bounding box from vertices, surface control nets, and sampled edges.
    pub fn compute_bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for vertex in self.vertices.values() {
            bb.expand(&vertex.point);
        }
        for surface in &self.surfaces {
            for p in &surface.points {
                bb.expand(p);
            }
        }
        for edge in self.edges.values() {
            let curve = &self.curves3d[edge.curve3d];
            for k in 0..=8 {
                bb.expand(&curve.point_at(edge.domain.at_normalized(k as f64 / 8.0)));
            }
        }
        bb
    }

    /// Recompute and cache every aggregate scalar: closed flag, orientation,
    /// area, volume, bounds.
    pub fn compute_aggregates(&mut self) {
        self.update_closed_flag();
        self.area = self.compute_area();
        self.bbox = self.compute_bounding_box();
        if self.is_closed {
            let signed = self.compute_signed_volume();
            self.orientation = if signed < 0.0 {
                SolidOrientation::Inward
            } else {
                SolidOrientation::Outward
            };
            self.volume = signed.abs();
        } else {
            self.orientation = SolidOrientation::None;
            self.volume = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brepbridge_math::Point3;

    #[test]
    fn flat_patch_area() {
        let mut brep = Brep::new();
        let s = brep.add_surface(NurbsSurfaceData::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
        ));
        brep.add_face(s, false);
        assert_relative_eq!(brep.compute_area(), 100.0, max_relative = 1e-6);
    }

    #[test]
    fn open_brep_volume_is_zero() {
        let mut brep = Brep::new();
        let s = brep.add_surface(NurbsSurfaceData::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ));
        brep.add_face(s, false);
        brep.compute_aggregates();
        assert!(!brep.is_closed);
        assert_eq!(brep.volume, 0.0);
        assert_eq!(brep.orientation, SolidOrientation::None);
    }
}
