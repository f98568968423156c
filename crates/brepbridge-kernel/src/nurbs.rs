//! NURBS curve and surface data in the kernel's knot convention.
//!
//! The native kernel stores clamped knot vectors with end multiplicity equal
//! to the degree, so a curve with `n` control points of degree `p` carries
//! `n + p - 1` knots. Evaluation internally pads each end once to recover the
//! full-multiplicity form required by the basis-function recurrence.
//!
//! Evaluation runs De Boor's algorithm in homogeneous coordinates; knot
//! insertion uses Boehm's algorithm. Degree elevation decomposes into Bezier
//! segments (repeated knot insertion), elevates each segment exactly, and
//! reassembles with C0 interior knots.

use brepbridge_math::{Interval, Point3, Vec3};
use nalgebra::{DMatrix, DVector};

/// Homogeneous control point `(w*x, w*y, w*z, w)`.
type Hpoint = [f64; 4];

fn to_homogeneous(p: &Point3, w: f64) -> Hpoint {
    [w * p.x, w * p.y, w * p.z, w]
}

fn from_homogeneous(h: Hpoint) -> (Point3, f64) {
    let w = h[3];
    if w.abs() < 1e-30 {
        (Point3::origin(), 0.0)
    } else {
        (Point3::new(h[0] / w, h[1] / w, h[2] / w), w)
    }
}

fn lerp_h(a: Hpoint, b: Hpoint, alpha: f64) -> Hpoint {
    [
        (1.0 - alpha) * a[0] + alpha * b[0],
        (1.0 - alpha) * a[1] + alpha * b[1],
        (1.0 - alpha) * a[2] + alpha * b[2],
        (1.0 - alpha) * a[3] + alpha * b[3],
    ]
}

// =============================================================================
// Basis utilities (full-multiplicity knot form)
// =============================================================================

/// Validate a full-multiplicity knot vector: non-decreasing, length = n + p + 1.
fn validate_full_knots(knots: &[f64], n_points: usize, degree: usize) -> bool {
    if knots.len() != n_points + degree + 1 {
        return false;
    }
    knots.windows(2).all(|w| w[0] <= w[1])
}

/// Find the knot span index for parameter `t`.
///
/// Returns `i` such that `knots[i] <= t < knots[i+1]`, clamped to valid range.
fn find_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis function values `N[span-degree..=span]` at `t`.
fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            if denom.abs() < 1e-30 {
                // Zero-length knot interval — avoid division by zero
                n[j] = saved;
                continue;
            }
            let temp = n[r] / denom;
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

/// Insert knot `t` into a homogeneous control polygon (Boehm's algorithm).
fn insert_knot_h(hpts: &mut Vec<Hpoint>, knots: &mut Vec<f64>, degree: usize, t: f64) {
    let n = hpts.len() - 1;
    let p = degree;
    let span = find_span(knots, n, p, t);

    let mut new_pts = Vec::with_capacity(hpts.len() + 1);
    for i in 0..=(span - p) {
        new_pts.push(hpts[i]);
    }
    for i in (span - p + 1)..=span {
        let denom = knots[i + p] - knots[i];
        let alpha = if denom.abs() < 1e-30 {
            0.0
        } else {
            (t - knots[i]) / denom
        };
        new_pts.push(lerp_h(hpts[i - 1], hpts[i], alpha));
    }
    for i in span..=n {
        new_pts.push(hpts[i]);
    }

    knots.insert(span + 1, t);
    *hpts = new_pts;
}

// =============================================================================
// Curve
// =============================================================================

/// A rational B-spline curve in the kernel knot convention.
///
/// Control points are stored Cartesian with a parallel weight array, the way
/// the native kernel's tables expose them. Knot count is
/// `points.len() + degree - 1` (end multiplicity = degree).
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsCurveData {
    /// Polynomial degree (>= 1).
    pub degree: usize,
    /// Control points in Cartesian coordinates.
    pub points: Vec<Point3>,
    /// Weights, one per control point; all 1.0 for non-rational curves.
    pub weights: Vec<f64>,
    /// Knot vector in the kernel convention.
    pub knots: Vec<f64>,
}

impl NurbsCurveData {
    /// Create a curve.
    ///
    /// # Panics
    /// Panics if the array lengths are inconsistent with the kernel knot
    /// convention or the knots decrease.
    pub fn new(degree: usize, points: Vec<Point3>, weights: Vec<f64>, knots: Vec<f64>) -> Self {
        assert!(degree >= 1, "degree must be at least 1");
        assert_eq!(points.len(), weights.len(), "points/weights length mismatch");
        assert!(
            points.len() >= degree + 1,
            "need at least degree + 1 control points"
        );
        assert_eq!(
            knots.len(),
            points.len() + degree - 1,
            "kernel knot convention requires n + degree - 1 knots"
        );
        assert!(
            knots.windows(2).all(|w| w[0] <= w[1]),
            "knot vector must be non-decreasing"
        );
        Self {
            degree,
            points,
            weights,
            knots,
        }
    }

    /// Degree-1 curve through two points over `[0, 1]`.
    pub fn line(p0: Point3, p1: Point3) -> Self {
        Self::new(1, vec![p0, p1], vec![1.0, 1.0], vec![0.0, 1.0])
    }

    /// Full-multiplicity evaluation form: homogeneous points + padded knots.
    fn to_full(&self) -> (Vec<Hpoint>, Vec<f64>) {
        let hpts = self
            .points
            .iter()
            .zip(&self.weights)
            .map(|(p, &w)| to_homogeneous(p, w))
            .collect();
        let mut knots = Vec::with_capacity(self.knots.len() + 2);
        knots.push(self.knots[0]);
        knots.extend_from_slice(&self.knots);
        knots.push(*self.knots.last().unwrap());
        (hpts, knots)
    }

    /// Rebuild kernel-form data from full-multiplicity arrays.
    fn from_full(degree: usize, hpts: Vec<Hpoint>, full_knots: Vec<f64>) -> Self {
        let mut points = Vec::with_capacity(hpts.len());
        let mut weights = Vec::with_capacity(hpts.len());
        for h in hpts {
            let (p, w) = from_homogeneous(h);
            points.push(p);
            weights.push(w);
        }
        let knots = full_knots[1..full_knots.len() - 1].to_vec();
        Self::new(degree, points, weights, knots)
    }

    /// Parameter domain.
    pub fn domain(&self) -> Interval {
        let n = self.points.len();
        Interval::new(self.knots[self.degree - 1], self.knots[n - 1])
    }

    /// Evaluate the curve at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point3 {
        let (hpts, knots) = self.to_full();
        let n = hpts.len() - 1;
        let t = t.clamp(knots[self.degree], knots[n + 1]);
        let span = find_span(&knots, n, self.degree, t);
        let basis = basis_functions(&knots, span, self.degree, t);

        let mut acc = [0.0; 4];
        for (i, &b) in basis.iter().enumerate() {
            let h = hpts[span - self.degree + i];
            acc[0] += b * h[0];
            acc[1] += b * h[1];
            acc[2] += b * h[2];
            acc[3] += b * h[3];
        }
        from_homogeneous(acc).0
    }

    /// Finite-difference tangent at `t`.
    pub fn tangent_at(&self, t: f64) -> Vec3 {
        let d = self.domain();
        let dt = d.length() * 1e-6;
        if dt.abs() < 1e-30 {
            return Vec3::zeros();
        }
        let p0 = self.point_at((t - dt).max(d.t0));
        let p1 = self.point_at((t + dt).min(d.t1));
        (p1 - p0) / (2.0 * dt)
    }

    /// Start point of the curve.
    pub fn start_point(&self) -> Point3 {
        self.point_at(self.domain().t0)
    }

    /// End point of the curve.
    pub fn end_point(&self) -> Point3 {
        self.point_at(self.domain().t1)
    }

    /// Whether any weight differs from 1.
    pub fn is_rational(&self) -> bool {
        self.weights.iter().any(|&w| (w - 1.0).abs() > 1e-12)
    }

    /// Whether the curve's endpoints coincide within `tolerance`.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        (self.start_point() - self.end_point()).norm() <= tolerance
    }

    /// Insert a knot value, returning a refined but geometrically identical curve.
    pub fn insert_knot(&self, t: f64) -> Self {
        let (mut hpts, mut knots) = self.to_full();
        insert_knot_h(&mut hpts, &mut knots, self.degree, t);
        Self::from_full(self.degree, hpts, knots)
    }

    /// The largest multiplicity among interior knots (strictly inside the domain).
    pub fn max_interior_multiplicity(&self) -> usize {
        let d = self.domain();
        let mut max_mult = 0;
        let mut i = 0;
        while i < self.knots.len() {
            let value = self.knots[i];
            let mut j = i + 1;
            while j < self.knots.len() && self.knots[j] == value {
                j += 1;
            }
            if value > d.t0 && value < d.t1 {
                max_mult = max_mult.max(j - i);
            }
            i = j;
        }
        max_mult
    }

    /// Elevate to `target_degree`, preserving the curve exactly.
    ///
    /// Decomposes into Bezier segments by knot insertion, elevates each
    /// segment, and reassembles with interior knots at full C0 multiplicity.
    /// Single-span curves come back span-free, so elevating a line or a
    /// one-segment arc never introduces interior knots.
    pub fn elevated(&self, target_degree: usize) -> Self {
        assert!(target_degree >= self.degree);
        if target_degree == self.degree {
            return self.clone();
        }

        let p = self.degree;
        let (mut hpts, mut knots) = self.to_full();

        // Decompose: raise every interior knot to multiplicity p. Inserted
        // copies extend the current run in place, so the scan jumps past the
        // full run afterwards.
        let domain = self.domain();
        let mut breakpoints = vec![domain.t0];
        let mut i = 0;
        while i < knots.len() {
            let value = knots[i];
            let mut mult = 1;
            while i + mult < knots.len() && knots[i + mult] == value {
                mult += 1;
            }
            if value > domain.t0 && value < domain.t1 {
                for _ in mult..p {
                    insert_knot_h(&mut hpts, &mut knots, p, value);
                }
                breakpoints.push(value);
                i += p;
            } else {
                i += mult;
            }
        }
        breakpoints.push(domain.t1);

        // Elevate each Bezier segment from p to target_degree.
        let segments = breakpoints.len() - 1;
        let mut elevated_segments: Vec<Vec<Hpoint>> = Vec::with_capacity(segments);
        for s in 0..segments {
            let mut seg: Vec<Hpoint> = hpts[s * p..s * p + p + 1].to_vec();
            for q in p..target_degree {
                let mut next = Vec::with_capacity(q + 2);
                next.push(seg[0]);
                for i in 1..=q {
                    let alpha = i as f64 / (q + 1) as f64;
                    next.push(lerp_h(seg[i], seg[i - 1], alpha));
                }
                next.push(seg[q]);
                seg = next;
            }
            elevated_segments.push(seg);
        }

        // Reassemble control points and a full-multiplicity knot vector.
        let q = target_degree;
        let mut new_pts: Vec<Hpoint> = Vec::new();
        for (s, seg) in elevated_segments.iter().enumerate() {
            let skip = if s == 0 { 0 } else { 1 };
            new_pts.extend_from_slice(&seg[skip..]);
        }
        let mut new_knots = Vec::new();
        for _ in 0..=q {
            new_knots.push(breakpoints[0]);
        }
        for &b in &breakpoints[1..breakpoints.len() - 1] {
            for _ in 0..q {
                new_knots.push(b);
            }
        }
        for _ in 0..=q {
            new_knots.push(*breakpoints.last().unwrap());
        }

        debug_assert!(validate_full_knots(&new_knots, new_pts.len(), q));
        Self::from_full(q, new_pts, new_knots)
    }

    /// Rebuild by global interpolation through `sample_count` points sampled
    /// from this curve, at the same degree with unit weights.
    ///
    /// Chord-length parameterization with the averaged knot vector; the
    /// resulting curve interpolates the samples exactly but only approximates
    /// the original in between. Callers should measure [`max_deviation`] and
    /// surface it as a diagnostic.
    ///
    /// [`max_deviation`]: NurbsCurveData::max_deviation
    pub fn rebuild_interpolated(&self, sample_count: usize) -> Self {
        let d = self.degree;
        let m = sample_count.max(d + 1);
        let domain = self.domain();

        // Sample the original uniformly in parameter.
        let samples: Vec<Point3> = (0..m)
            .map(|k| self.point_at(domain.at_normalized(k as f64 / (m - 1) as f64)))
            .collect();

        // Chord-length parameters mapped back into the original domain.
        let mut chords = vec![0.0; m];
        for k in 1..m {
            chords[k] = chords[k - 1] + (samples[k] - samples[k - 1]).norm();
        }
        let total = chords[m - 1];
        let params: Vec<f64> = if total < 1e-30 {
            (0..m)
                .map(|k| domain.at_normalized(k as f64 / (m - 1) as f64))
                .collect()
        } else {
            chords
                .iter()
                .map(|&c| domain.at_normalized(c / total))
                .collect()
        };

        // Averaged knot vector (full-multiplicity form).
        let mut full_knots = vec![domain.t0; d + 1];
        for j in 1..=(m - d - 1) {
            let avg: f64 = params[j..j + d].iter().sum::<f64>() / d as f64;
            full_knots.push(avg);
        }
        full_knots.extend(std::iter::repeat(domain.t1).take(d + 1));
        debug_assert!(validate_full_knots(&full_knots, m, d));

        // Solve the interpolation system for each coordinate.
        let n = m - 1;
        let mut a = DMatrix::<f64>::zeros(m, m);
        for (k, &u) in params.iter().enumerate() {
            let u = u.clamp(domain.t0, domain.t1);
            let span = find_span(&full_knots, n, d, u);
            let basis = basis_functions(&full_knots, span, d, u);
            for (i, &b) in basis.iter().enumerate() {
                a[(k, span - d + i)] = b;
            }
        }
        let lu = a.lu();
        let solve_axis = |get: fn(&Point3) -> f64| -> Vec<f64> {
            let rhs = DVector::from_iterator(m, samples.iter().map(get));
            lu.solve(&rhs)
                .map(|v| v.iter().copied().collect())
                .unwrap_or_else(|| samples.iter().map(get).collect())
        };
        let xs = solve_axis(|p| p.x);
        let ys = solve_axis(|p| p.y);
        let zs = solve_axis(|p| p.z);

        let points: Vec<Point3> = (0..m).map(|i| Point3::new(xs[i], ys[i], zs[i])).collect();
        let knots = full_knots[1..full_knots.len() - 1].to_vec();
        Self::new(d, points, vec![1.0; m], knots)
    }

    /// Maximum distance between this curve and `other`, sampled at
    /// `samples` normalized parameters.
    pub fn max_deviation(&self, other: &NurbsCurveData, samples: usize) -> f64 {
        let da = self.domain();
        let db = other.domain();
        let mut max = 0.0_f64;
        for k in 0..samples {
            let s = k as f64 / (samples - 1) as f64;
            let pa = self.point_at(da.at_normalized(s));
            let pb = other.point_at(db.at_normalized(s));
            max = max.max((pa - pb).norm());
        }
        max
    }
}

// =============================================================================
// Surface
// =============================================================================

/// Which parameter axis of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAxis {
    /// The u direction.
    U,
    /// The v direction.
    V,
}

/// Which boundary of a surface's parameter rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSide {
    /// u = u_min.
    West,
    /// u = u_max.
    East,
    /// v = v_min.
    South,
    /// v = v_max.
    North,
}

/// A rational tensor-product NURBS surface in the kernel knot convention.
///
/// The control grid is row-major: `points[v * count_u + u]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsSurfaceData {
    /// Degree in u.
    pub degree_u: usize,
    /// Degree in v.
    pub degree_v: usize,
    /// Number of control points in u.
    pub count_u: usize,
    /// Number of control points in v.
    pub count_v: usize,
    /// Control points in row-major order.
    pub points: Vec<Point3>,
    /// Weights, one per control point.
    pub weights: Vec<f64>,
    /// Knot vector in u (kernel convention).
    pub knots_u: Vec<f64>,
    /// Knot vector in v (kernel convention).
    pub knots_v: Vec<f64>,
}

impl NurbsSurfaceData {
    /// Create a surface.
    ///
    /// # Panics
    /// Panics if array lengths are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        count_u: usize,
        count_v: usize,
        points: Vec<Point3>,
        weights: Vec<f64>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
    ) -> Self {
        assert!(degree_u >= 1 && degree_v >= 1);
        assert_eq!(points.len(), count_u * count_v, "grid size mismatch");
        assert_eq!(points.len(), weights.len());
        assert_eq!(knots_u.len(), count_u + degree_u - 1, "u knot count");
        assert_eq!(knots_v.len(), count_v + degree_v - 1, "v knot count");
        assert!(knots_u.windows(2).all(|w| w[0] <= w[1]));
        assert!(knots_v.windows(2).all(|w| w[0] <= w[1]));
        Self {
            degree_u,
            degree_v,
            count_u,
            count_v,
            points,
            weights,
            knots_u,
            knots_v,
        }
    }

    /// Bilinear patch over `[0,1]²` through four corners.
    ///
    /// Corner order: `(u0v0, u1v0, u0v1, u1v1)`.
    pub fn bilinear(p00: Point3, p10: Point3, p01: Point3, p11: Point3) -> Self {
        Self::new(
            1,
            1,
            2,
            2,
            vec![p00, p10, p01, p11],
            vec![1.0; 4],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        )
    }

    fn full_knots(kernel: &[f64]) -> Vec<f64> {
        let mut k = Vec::with_capacity(kernel.len() + 2);
        k.push(kernel[0]);
        k.extend_from_slice(kernel);
        k.push(*kernel.last().unwrap());
        k
    }

    /// Parameter domain in u.
    pub fn domain_u(&self) -> Interval {
        Interval::new(
            self.knots_u[self.degree_u - 1],
            self.knots_u[self.count_u - 1],
        )
    }

    /// Parameter domain in v.
    pub fn domain_v(&self) -> Interval {
        Interval::new(
            self.knots_v[self.degree_v - 1],
            self.knots_v[self.count_v - 1],
        )
    }

    /// Parameter domain along `axis`.
    pub fn domain(&self, axis: SurfaceAxis) -> Interval {
        match axis {
            SurfaceAxis::U => self.domain_u(),
            SurfaceAxis::V => self.domain_v(),
        }
    }

    fn hpoint(&self, u_idx: usize, v_idx: usize) -> Hpoint {
        let i = v_idx * self.count_u + u_idx;
        to_homogeneous(&self.points[i], self.weights[i])
    }

    /// Evaluate the surface at `(u, v)`.
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        let ku = Self::full_knots(&self.knots_u);
        let kv = Self::full_knots(&self.knots_v);
        let nu = self.count_u - 1;
        let nv = self.count_v - 1;
        let u = u.clamp(ku[self.degree_u], ku[nu + 1]);
        let v = v.clamp(kv[self.degree_v], kv[nv + 1]);

        let span_u = find_span(&ku, nu, self.degree_u, u);
        let span_v = find_span(&kv, nv, self.degree_v, v);
        let basis_u = basis_functions(&ku, span_u, self.degree_u, u);
        let basis_v = basis_functions(&kv, span_v, self.degree_v, v);

        let mut acc = [0.0; 4];
        for (j, &bv) in basis_v.iter().enumerate() {
            let v_idx = span_v - self.degree_v + j;
            for (i, &bu) in basis_u.iter().enumerate() {
                let u_idx = span_u - self.degree_u + i;
                let w = bu * bv;
                let h = self.hpoint(u_idx, v_idx);
                acc[0] += w * h[0];
                acc[1] += w * h[1];
                acc[2] += w * h[2];
                acc[3] += w * h[3];
            }
        }
        from_homogeneous(acc).0
    }

    /// Finite-difference partial derivative with respect to u.
    pub fn partial_u(&self, u: f64, v: f64) -> Vec3 {
        let du = self.domain_u().length() * 1e-6;
        let d = self.domain_u();
        let p0 = self.point_at((u - du).max(d.t0), v);
        let p1 = self.point_at((u + du).min(d.t1), v);
        (p1 - p0) / ((u + du).min(d.t1) - (u - du).max(d.t0))
    }

    /// Finite-difference partial derivative with respect to v.
    pub fn partial_v(&self, u: f64, v: f64) -> Vec3 {
        let dv = self.domain_v().length() * 1e-6;
        let d = self.domain_v();
        let p0 = self.point_at(u, (v - dv).max(d.t0));
        let p1 = self.point_at(u, (v + dv).min(d.t1));
        (p1 - p0) / ((v + dv).min(d.t1) - (v - dv).max(d.t0))
    }

    /// Whether any weight differs from 1.
    pub fn is_rational(&self) -> bool {
        self.weights.iter().any(|&w| (w - 1.0).abs() > 1e-12)
    }

    /// Whether opposite boundaries in u coincide within `tolerance`.
    pub fn is_closed_u(&self, tolerance: f64) -> bool {
        self.boundary_matches(SurfaceAxis::U, tolerance)
    }

    /// Whether opposite boundaries in v coincide within `tolerance`.
    pub fn is_closed_v(&self, tolerance: f64) -> bool {
        self.boundary_matches(SurfaceAxis::V, tolerance)
    }

    fn boundary_matches(&self, axis: SurfaceAxis, tolerance: f64) -> bool {
        let (du, dv) = (self.domain_u(), self.domain_v());
        const SAMPLES: usize = 5;
        for k in 0..SAMPLES {
            let s = k as f64 / (SAMPLES - 1) as f64;
            let (a, b) = match axis {
                SurfaceAxis::U => (
                    self.point_at(du.t0, dv.at_normalized(s)),
                    self.point_at(du.t1, dv.at_normalized(s)),
                ),
                SurfaceAxis::V => (
                    self.point_at(du.at_normalized(s), dv.t0),
                    self.point_at(du.at_normalized(s), dv.t1),
                ),
            };
            if (a - b).norm() > tolerance {
                return false;
            }
        }
        true
    }

    /// If the given boundary collapses to a single point within `tolerance`,
    /// return that point (a polar singularity).
    pub fn side_collapsed(&self, side: SurfaceSide, tolerance: f64) -> Option<Point3> {
        let (du, dv) = (self.domain_u(), self.domain_v());
        const SAMPLES: usize = 7;
        let mut first: Option<Point3> = None;
        for k in 0..SAMPLES {
            let s = k as f64 / (SAMPLES - 1) as f64;
            let p = match side {
                SurfaceSide::West => self.point_at(du.t0, dv.at_normalized(s)),
                SurfaceSide::East => self.point_at(du.t1, dv.at_normalized(s)),
                SurfaceSide::South => self.point_at(du.at_normalized(s), dv.t0),
                SurfaceSide::North => self.point_at(du.at_normalized(s), dv.t1),
            };
            match first {
                None => first = Some(p),
                Some(f) => {
                    if (p - f).norm() > tolerance {
                        return None;
                    }
                }
            }
        }
        first
    }

    /// Affinely rescale the knot vector (and thus the parameter domain) along
    /// `axis` by `factor`, anchored at the domain start.
    ///
    /// The geometry is unchanged; only the parameterization stretches. The
    /// caller is responsible for remapping any 2D trim geometry that lives in
    /// this surface's parameter space.
    pub fn rescale_domain(&mut self, axis: SurfaceAxis, factor: f64) {
        let knots = match axis {
            SurfaceAxis::U => &mut self.knots_u,
            SurfaceAxis::V => &mut self.knots_v,
        };
        let origin = knots[0];
        for k in knots.iter_mut() {
            *k = origin + (*k - origin) * factor;
        }
    }
}
