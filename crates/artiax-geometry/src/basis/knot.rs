//! Knot vector utilities for B-spline evaluation and fitting.

use artiax_core::{CurveError, Result};
use artiax_math::Point3;

/// Index `i` with `knots[i] <= t < knots[i + 1]` for a curve with `n + 1`
/// control points. Parameters at or past the end of the domain map to the
/// last non-empty span, so `t = 1` on a clamped curve is evaluable.
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
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

/// Compute the non-vanishing basis functions at parameter `t`.
///
/// Returns `degree + 1` values N_{span-degree,degree}(t) through N_{span,degree}(t).
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Compute basis functions and their first derivatives at parameter `t`.
///
/// Uses the recurrence
/// `N'_{i,p} = p * (N_{i,p-1} / (u_{i+p} - u_i) - N_{i+1,p-1} / (u_{i+p+1} - u_{i+1}))`
/// on the degree `p - 1` functions of the same span. Returns `(N, dN)`.
pub fn basis_functions_derivs(
    degree: usize,
    knots: &[f64],
    span: usize,
    t: f64,
) -> (Vec<f64>, Vec<f64>) {
    let values = basis_functions(degree, knots, span, t);
    let mut derivs = vec![0.0; degree + 1];
    if degree == 0 {
        return (values, derivs);
    }

    let p = degree;
    // lower[k] = N_{span-p+1+k, p-1}(t), k in 0..p
    let lower = basis_functions(p - 1, knots, span, t);
    let factor = p as f64;

    for (r, d) in derivs.iter_mut().enumerate() {
        let i = span - p + r;
        let mut value = 0.0;
        if r >= 1 {
            let denom = knots[i + p] - knots[i];
            if denom > 0.0 {
                value += lower[r - 1] / denom;
            }
        }
        if r < p {
            let denom = knots[i + p + 1] - knots[i + 1];
            if denom > 0.0 {
                value -= lower[r] / denom;
            }
        }
        *d = factor * value;
    }

    (values, derivs)
}

/// Cumulative chord-length parameters normalized to `[0, 1]`.
///
/// Fails when two consecutive points coincide, which would give two data
/// points the same parameter.
pub fn chord_parameters(points: &[Point3]) -> Result<Vec<f64>> {
    if points.len() < 2 {
        return Err(CurveError::Fitting(format!(
            "need at least 2 points to parameterize a curve, got {}",
            points.len()
        )));
    }

    let mut params = Vec::with_capacity(points.len());
    params.push(0.0);
    let mut total = 0.0;
    for (i, pair) in points.windows(2).enumerate() {
        let step = pair[0].distance(pair[1]);
        if step <= f64::EPSILON * (1.0 + pair[0].length()) {
            return Err(CurveError::Fitting(format!(
                "points {} and {} coincide at ({}, {}, {})",
                i,
                i + 1,
                pair[1].x,
                pair[1].y,
                pair[1].z
            )));
        }
        total += step;
        params.push(total);
    }

    for u in params.iter_mut() {
        *u /= total;
    }
    // Pin the end exactly so evaluation at u = 1 hits the last point.
    if let Some(last) = params.last_mut() {
        *last = 1.0;
    }
    Ok(params)
}

/// Clamped knot vector for interpolating `params.len()` data points with an
/// odd-degree spline.
///
/// Interior knots sit on the data parameters shifted by `(degree + 1) / 2`,
/// so the collocation system is square and satisfies Schoenberg-Whitney.
pub fn interpolation_knots(degree: usize, params: &[f64]) -> Vec<f64> {
    let m = params.len();
    debug_assert!(m > degree, "need more data points than the degree");
    let half = (degree + 1) / 2;

    let mut knots = Vec::with_capacity(m + degree + 1);
    knots.extend(std::iter::repeat(0.0).take(degree + 1));
    for j in 0..(m - degree - 1) {
        knots.push(params[j + half]);
    }
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

#[cfg(test)]
mod tests {
    use super::*;
    use artiax_math::DVec3;

    #[test]
    fn test_find_span_on_interpolation_knots() {
        // Cubic through 6 points: interior knots at params[2] and params[3].
        let knots = interpolation_knots(3, &[0.0, 0.1, 0.3, 0.6, 0.8, 1.0]);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 0.0, 0.3, 0.6, 1.0, 1.0, 1.0, 1.0]);

        let n = 5;
        assert_eq!(find_span(3, &knots, n, 0.0), 3);
        assert_eq!(find_span(3, &knots, n, 0.29), 3);
        // A parameter on an interior knot starts the next span.
        assert_eq!(find_span(3, &knots, n, 0.3), 4);
        assert_eq!(find_span(3, &knots, n, 0.7), 5);
        assert_eq!(find_span(3, &knots, n, 1.0), 5);
    }

    #[test]
    fn test_basis_functions_partition_of_unity() {
        let params = [0.0, 0.1, 0.3, 0.35, 0.6, 0.8, 1.0];
        for degree in [1, 3, 5] {
            let knots = interpolation_knots(degree, &params);
            let n = params.len() - 1;
            for i in 0..=40 {
                let t = i as f64 / 40.0;
                let span = find_span(degree, &knots, n, t);
                let sum: f64 = basis_functions(degree, &knots, span, t).iter().sum();
                assert!(
                    (sum - 1.0).abs() < 1e-12,
                    "Partition of unity failed at t={} degree={}: sum={}",
                    t,
                    degree,
                    sum
                );
            }
        }
    }

    #[test]
    fn test_basis_derivatives_sum_to_zero() {
        let params = [0.0, 0.2, 0.45, 0.5, 0.75, 1.0];
        for degree in [1, 3, 5] {
            let knots = interpolation_knots(degree, &params);
            let n = params.len() - 1;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let span = find_span(degree, &knots, n, t);
                let (_, d) = basis_functions_derivs(degree, &knots, span, t);
                let sum: f64 = d.iter().sum();
                assert!(sum.abs() < 1e-9, "degree {} t={} sum={}", degree, t, sum);
            }
        }
    }

    #[test]
    fn test_basis_derivative_matches_finite_difference() {
        let params = [0.0, 0.15, 0.4, 0.55, 0.7, 0.9, 1.0];
        let degree = 3;
        let knots = interpolation_knots(degree, &params);
        let n = params.len() - 1;
        let t = 0.47;
        let h = 1e-6;
        let span = find_span(degree, &knots, n, t);
        let (_, d) = basis_functions_derivs(degree, &knots, span, t);
        let plus = basis_functions(degree, &knots, span, t + h);
        let minus = basis_functions(degree, &knots, span, t - h);
        for k in 0..=degree {
            let fd = (plus[k] - minus[k]) / (2.0 * h);
            assert!((fd - d[k]).abs() < 1e-5, "k={} fd={} d={}", k, fd, d[k]);
        }
    }

    #[test]
    fn test_chord_parameters() {
        let pts = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(3.0, 0.0, 0.0),
            DVec3::new(3.0, 1.0, 0.0),
        ];
        let u = chord_parameters(&pts).unwrap();
        assert_eq!(u, vec![0.0, 0.75, 1.0]);
    }

    #[test]
    fn test_chord_parameters_rejects_duplicates() {
        let pts = vec![DVec3::ZERO, DVec3::X, DVec3::X];
        let err = chord_parameters(&pts).unwrap_err();
        assert!(err.to_string().contains("points 1 and 2"));
    }

    #[test]
    fn test_interpolation_knots_layout() {
        let params = [0.0, 0.25, 0.5, 0.75, 1.0];
        assert_eq!(
            interpolation_knots(1, &params),
            vec![0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 1.0]
        );
        assert_eq!(
            interpolation_knots(3, &params),
            vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0]
        );
    }
}
