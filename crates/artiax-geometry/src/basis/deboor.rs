//! De Boor evaluation of B-spline curves and their first derivative.

use artiax_math::{Point3, Vector3};

use super::knot::{basis_functions, basis_functions_derivs, find_span};

/// Evaluate a B-spline curve point at parameter `t`.
pub fn curve_point(degree: usize, knots: &[f64], control_points: &[Point3], t: f64) -> Point3 {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, t);
    let basis = basis_functions(degree, knots, span, t);

    basis
        .iter()
        .enumerate()
        .fold(Point3::ZERO, |acc, (i, &b)| acc + b * control_points[span - degree + i])
}

/// Evaluate the first derivative of a B-spline curve at parameter `t`.
///
/// The derivative is taken with respect to the curve parameter, so its
/// length scales with the parameterization, not just the geometry.
pub fn curve_tangent(
    degree: usize,
    knots: &[f64],
    control_points: &[Point3],
    t: f64,
) -> Vector3 {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, t);
    let (_, dn) = basis_functions_derivs(degree, knots, span, t);

    dn.iter()
        .enumerate()
        .fold(Vector3::ZERO, |acc, (i, &d)| acc + d * control_points[span - degree + i])
}
