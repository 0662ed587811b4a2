//! Periodic interpolating cubic spline through a closed polygon
//!
//! Parameterized by normalized cumulative chord length, so `u = 0` and `u = 1`
//! are both the first control point and the curve closes with C2 continuity.

use glam::DVec2;

use crate::error::GenerationError;

/// Closed cubic spline through an ordered ring of control points
#[derive(Debug, Clone)]
pub struct PeriodicSpline {
    points: Vec<DVec2>,
    /// Knot parameters, `knots[0] = 0`, `knots[n] = 1`
    knots: Vec<f64>,
    /// Second derivatives at each control point
    moments: Vec<DVec2>,
}

impl PeriodicSpline {
    /// Fit the spline. Rejects rings that cannot describe a closed curve.
    pub fn fit(points: &[DVec2], min_points: usize) -> Result<Self, GenerationError> {
        let n = points.len();
        if n < min_points.max(3) {
            return Err(GenerationError::TooFewPoints {
                got: n,
                min: min_points.max(3),
            });
        }

        let chords: Vec<f64> = (0..n)
            .map(|i| points[i].distance(points[(i + 1) % n]))
            .collect();
        if let Some(index) = chords.iter().position(|&c| c <= 1e-9) {
            return Err(GenerationError::CoincidentPoints { index });
        }
        if is_collinear(points) {
            return Err(GenerationError::CollinearPoints);
        }

        let total: f64 = chords.iter().sum();
        let mut knots = Vec::with_capacity(n + 1);
        let mut acc = 0.0;
        knots.push(0.0);
        for chord in &chords[..n - 1] {
            acc += chord;
            knots.push(acc / total);
        }
        knots.push(1.0);

        let h: Vec<f64> = (0..n).map(|i| knots[i + 1] - knots[i]).collect();

        // h[i-1] M[i-1] + 2 (h[i-1] + h[i]) M[i] + h[i] M[i+1] = rhs[i], indices mod n
        let mut lower = vec![0.0; n];
        let mut diag = vec![0.0; n];
        let mut upper = vec![0.0; n];
        let mut rhs = vec![DVec2::ZERO; n];
        for i in 0..n {
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            lower[i] = h[prev];
            diag[i] = 2.0 * (h[prev] + h[i]);
            upper[i] = h[i];
            rhs[i] = 6.0
                * ((points[next] - points[i]) / h[i] - (points[i] - points[prev]) / h[prev]);
        }

        let moments = solve_cyclic(&lower, &diag, &upper, &rhs)?;

        Ok(Self {
            points: points.to_vec(),
            knots,
            moments,
        })
    }

    /// Point on the curve at parameter `u` (clamped to [0, 1])
    pub fn eval(&self, u: f64) -> DVec2 {
        let n = self.points.len();
        let u = u.clamp(0.0, 1.0);
        // Segment i spans knots[i]..knots[i+1]
        let i = (self.knots.partition_point(|&k| k <= u).max(1) - 1).min(n - 1);
        let j = (i + 1) % n;

        let t0 = self.knots[i];
        let t1 = self.knots[i + 1];
        let h = t1 - t0;
        let a = t1 - u;
        let b = u - t0;

        let (m0, m1) = (self.moments[i], self.moments[j]);
        let (p0, p1) = (self.points[i], self.points[j]);

        m0 * (a * a * a / (6.0 * h))
            + m1 * (b * b * b / (6.0 * h))
            + (p0 / h - m0 * (h / 6.0)) * a
            + (p1 / h - m1 * (h / 6.0)) * b
    }

    /// `count` evenly spaced samples over [0, 1], both ends included
    pub fn sample(&self, count: usize) -> Vec<DVec2> {
        match count {
            0 => Vec::new(),
            1 => vec![self.eval(0.0)],
            _ => (0..count)
                .map(|k| self.eval(k as f64 / (count - 1) as f64))
                .collect(),
        }
    }
}

fn is_collinear(points: &[DVec2]) -> bool {
    let origin = points[0];
    let Some(axis) = points[1..]
        .iter()
        .map(|&p| p - origin)
        .find(|d| d.length_squared() > 1e-12)
    else {
        return true;
    };
    let scale = axis.length();
    points[1..]
        .iter()
        .all(|&p| (axis.perp_dot(p - origin) / scale).abs() < 1e-9)
}

/// Solve a cyclic tridiagonal system via Sherman-Morrison.
///
/// Row i reads `lower[i] x[i-1] + diag[i] x[i] + upper[i] x[i+1] = rhs[i]`,
/// with `x[-1] = x[n-1]` and `x[n] = x[0]`.
fn solve_cyclic(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[DVec2],
) -> Result<Vec<DVec2>, GenerationError> {
    let n = diag.len();
    let alpha = upper[n - 1];
    let beta = lower[0];
    let gamma = -diag[0];
    if gamma == 0.0 {
        return Err(GenerationError::SingularSystem);
    }

    let mut bb = diag.to_vec();
    bb[0] = diag[0] - gamma;
    bb[n - 1] = diag[n - 1] - alpha * beta / gamma;

    let x = solve_tridiagonal(lower, &bb, upper, rhs)?;

    let mut corr = vec![DVec2::ZERO; n];
    corr[0] = DVec2::splat(gamma);
    corr[n - 1] = DVec2::splat(alpha);
    let z = solve_tridiagonal(lower, &bb, upper, &corr)?;

    // Both columns of z are identical, x and y share the same matrix
    let denom = 1.0 + z[0].x + beta * z[n - 1].x / gamma;
    if denom.abs() < 1e-15 {
        return Err(GenerationError::SingularSystem);
    }
    let fact = (x[0] + x[n - 1] * (beta / gamma)) / denom;

    Ok(x.iter().zip(&z).map(|(&xi, zi)| xi - fact * zi.x).collect())
}

/// Thomas algorithm; `lower[0]` and `upper[n-1]` are ignored
fn solve_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[DVec2],
) -> Result<Vec<DVec2>, GenerationError> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![DVec2::ZERO; n];

    let mut denom = diag[0];
    if denom.abs() < 1e-15 {
        return Err(GenerationError::SingularSystem);
    }
    c_prime[0] = upper[0] / denom;
    d_prime[0] = rhs[0] / denom;

    for i in 1..n {
        denom = diag[i] - lower[i] * c_prime[i - 1];
        if denom.abs() < 1e-15 {
            return Err(GenerationError::SingularSystem);
        }
        c_prime[i] = if i + 1 < n { upper[i] / denom } else { 0.0 };
        d_prime[i] = (rhs[i] - d_prime[i - 1] * lower[i]) / denom;
    }

    let mut x = d_prime;
    for i in (0..n - 1).rev() {
        x[i] = x[i] - x[i + 1] * c_prime[i];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_spline_interpolates_control_points() {
        let pts = square();
        let spline = PeriodicSpline::fit(&pts, 4).unwrap();
        // Equal chords -> control points sit at quarter parameters
        for (k, p) in pts.iter().enumerate() {
            let q = spline.eval(k as f64 / 4.0);
            assert!(q.distance(*p) < 1e-9, "point {k}: {q:?} vs {p:?}");
        }
    }

    #[test]
    fn test_spline_is_closed() {
        let spline = PeriodicSpline::fit(&square(), 4).unwrap();
        let samples = spline.sample(50);
        assert_eq!(samples.len(), 50);
        assert!(samples[0].distance(samples[49]) < 1e-9);
    }

    #[test]
    fn test_spline_tangent_is_continuous_at_seam() {
        let pts = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(7.0, -2.0),
            DVec2::new(12.0, 6.0),
            DVec2::new(5.0, 11.0),
            DVec2::new(-3.0, 5.0),
        ];
        let spline = PeriodicSpline::fit(&pts, 4).unwrap();
        let eps = 1e-6;
        let before = (spline.eval(1.0) - spline.eval(1.0 - eps)) / eps;
        let after = (spline.eval(eps) - spline.eval(0.0)) / eps;
        assert!((before - after).length() < 1e-3 * before.length());
    }

    #[test]
    fn test_symmetric_square_stays_symmetric() {
        let spline = PeriodicSpline::fit(&square(), 4).unwrap();
        // Midpoint of the first edge bulges outward (below y = 0), centered in x
        let mid = spline.eval(0.125);
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!(mid.y < 0.0);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let pts = &square()[..3];
        assert_eq!(
            PeriodicSpline::fit(pts, 4).unwrap_err(),
            GenerationError::TooFewPoints { got: 3, min: 4 }
        );

        let mut dup = square();
        dup.insert(2, dup[1]);
        assert_eq!(
            PeriodicSpline::fit(&dup, 4).unwrap_err(),
            GenerationError::CoincidentPoints { index: 1 }
        );

        let line: Vec<DVec2> = (0..5).map(|i| DVec2::new(i as f64, 2.0 * i as f64)).collect();
        assert_eq!(
            PeriodicSpline::fit(&line, 4).unwrap_err(),
            GenerationError::CollinearPoints
        );
    }
}
