//! Parametric spline fitting through an ordered set of particle positions.
//!
//! The three coordinates are fitted as functions of one common parameter,
//! the cumulative chord length normalized to `[0, 1]`. With zero smoothing
//! the spline interpolates every point. With a positive smoothing factor a
//! second-difference penalty on the control points is weighted as strongly
//! as possible while the total squared deviation from the points stays
//! within the smoothing factor.
//!
//! Points are threaded in the order given; they are not reordered by
//! proximity.

use artiax_core::traits::Validate;
use artiax_core::{CurveError, Result};
use artiax_math::{Point3, Vector3};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::basis::{basis_functions, chord_parameters, find_span, interpolation_knots};
use crate::curve::{BSplineCurve, Curve};
use crate::sample::CurveSample;

/// Polynomial degrees the fitter accepts.
pub const SUPPORTED_DEGREES: [usize; 3] = [1, 3, 5];

/// Penalty weights searched for a smoothing fit, relative to the data term.
const MIN_PENALTY: f64 = 1e-8;
const MAX_PENALTY: f64 = 1e8;
const PENALTY_STEPS: usize = 60;

/// Parameters of a curve fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParameters {
    /// Polynomial degree, one of [`SUPPORTED_DEGREES`].
    pub degree: usize,
    /// Upper bound on the summed squared distance between points and curve.
    /// Zero forces the curve through every point.
    pub smoothing: f64,
    /// Number of parameter steps; the sample holds `resolution + 1` points.
    pub resolution: usize,
}

impl FitParameters {
    pub fn new(degree: usize, smoothing: f64, resolution: usize) -> Self {
        Self {
            degree,
            smoothing,
            resolution,
        }
    }
}

impl Default for FitParameters {
    fn default() -> Self {
        Self::new(3, 0.0, 100)
    }
}

impl Validate for FitParameters {
    fn validate(&self) -> Result<()> {
        if !SUPPORTED_DEGREES.contains(&self.degree) {
            return Err(CurveError::invalid(
                "degree",
                format!("must be 1, 3 or 5, got {}", self.degree),
            ));
        }
        if !self.smoothing.is_finite() || self.smoothing < 0.0 {
            return Err(CurveError::invalid(
                "smoothing",
                format!("must be finite and >= 0, got {}", self.smoothing),
            ));
        }
        if self.resolution < 1 {
            return Err(CurveError::invalid("resolution", "must be at least 1, got 0"));
        }
        Ok(())
    }
}

/// A fitted spline together with the data parameters of the input points.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    pub curve: BSplineCurve,
    /// Parameter of each input point on the curve.
    pub parameters: Vec<f64>,
    /// Summed squared distance between the input points and the curve.
    pub residual: f64,
}

impl FittedCurve {
    /// Evaluate points and first derivatives at `resolution + 1` uniform
    /// parameter steps, both ends included.
    pub fn sample(&self, resolution: usize) -> CurveSample {
        let resolution = resolution.max(1);
        let (points, derivatives): (Vec<Point3>, Vec<Vector3>) = (0..=resolution)
            .map(|i| {
                let u = self.curve.parameter_at(i as f64 / resolution as f64);
                (self.curve.point_at(u), self.curve.tangent_at(u))
            })
            .unzip();
        CurveSample {
            points,
            derivatives,
        }
    }
}

/// Fit a curve through `points` and sample it.
pub fn fit(points: &[Point3], params: &FitParameters) -> Result<CurveSample> {
    params.validate()?;
    let fitted = fit_curve(points, params.degree, params.smoothing)?;
    Ok(fitted.sample(params.resolution))
}

/// Fit a spline of `degree` through `points` with the given smoothing factor.
pub fn fit_curve(points: &[Point3], degree: usize, smoothing: f64) -> Result<FittedCurve> {
    FitParameters::new(degree, smoothing, 1).validate()?;

    if points.len() <= degree {
        return Err(CurveError::Fitting(format!(
            "a degree {} fit needs at least {} points, got {}",
            degree,
            degree + 1,
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        let p = points[i];
        return Err(CurveError::invalid(
            "points",
            format!("point {} is not finite: ({}, {}, {})", i, p.x, p.y, p.z),
        ));
    }
    let first = points[0];
    if points.iter().all(|p| p.distance(first) <= f64::EPSILON * (1.0 + first.length())) {
        return Err(CurveError::Fitting(
            "need at least 2 distinct points, all points coincide".into(),
        ));
    }

    let parameters = chord_parameters(points)?;
    let knots = interpolation_knots(degree, &parameters);
    let collocation = collocation_matrix(degree, &knots, &parameters);
    let data = DMatrix::from_fn(points.len(), 3, |i, j| points[i][j]);

    let coefficients = if smoothing > 0.0 && points.len() > 2 {
        smoothing_coefficients(&collocation, &data, smoothing)?
    } else {
        collocation
            .clone()
            .lu()
            .solve(&data)
            .ok_or_else(|| CurveError::Fitting("interpolation system is singular".into()))?
    };

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(CurveError::Fitting("fit produced non-finite control points".into()));
    }

    let residual = (&collocation * &coefficients - &data).norm_squared();
    let control_points = coefficients
        .row_iter()
        .map(|row| Point3::new(row[0], row[1], row[2]))
        .collect();

    log::trace!(
        "fitted degree {} spline through {} points, residual {:e}",
        degree,
        points.len(),
        residual
    );

    Ok(FittedCurve {
        curve: BSplineCurve::new(degree, knots, control_points)?,
        parameters,
        residual,
    })
}

/// Row `i` holds the basis function values at data parameter `i`.
fn collocation_matrix(degree: usize, knots: &[f64], parameters: &[f64]) -> DMatrix<f64> {
    let m = parameters.len();
    let mut matrix = DMatrix::zeros(m, m);
    for (row, &u) in parameters.iter().enumerate() {
        let span = find_span(degree, knots, m - 1, u);
        for (k, value) in basis_functions(degree, knots, span, u).into_iter().enumerate() {
            matrix[(row, span - degree + k)] = value;
        }
    }
    matrix
}

/// Second differences of consecutive control points, `(m - 2) x m`.
fn second_difference(m: usize) -> DMatrix<f64> {
    let mut d = DMatrix::zeros(m - 2, m);
    for i in 0..m - 2 {
        d[(i, i)] = 1.0;
        d[(i, i + 1)] = -2.0;
        d[(i, i + 2)] = 1.0;
    }
    d
}

/// Penalized least squares with the largest penalty whose residual stays
/// within `smoothing`.
fn smoothing_coefficients(
    collocation: &DMatrix<f64>,
    data: &DMatrix<f64>,
    smoothing: f64,
) -> Result<DMatrix<f64>> {
    let m = collocation.nrows();
    let bt = collocation.transpose();
    let normal = &bt * collocation;
    let rhs = &bt * data;
    let penalty = {
        let d = second_difference(m);
        d.transpose() * d
    };
    let scale = normal.trace() / penalty.trace();

    let solve = |weight: f64| -> Result<(DMatrix<f64>, f64)> {
        let lhs = &normal + &penalty * (weight * scale);
        let coefficients = lhs.cholesky().map(|c| c.solve(&rhs)).ok_or_else(|| {
            CurveError::Fitting(format!("smoothing system is singular at penalty {:e}", weight))
        })?;
        let residual = (collocation * &coefficients - data).norm_squared();
        Ok((coefficients, residual))
    };

    let (smoothest, residual) = solve(MAX_PENALTY)?;
    if residual <= smoothing {
        log::debug!(
            "smoothing {} exceeds the residual of the smoothest fit ({:e})",
            smoothing,
            residual
        );
        return Ok(smoothest);
    }

    let (mut best, residual) = solve(MIN_PENALTY)?;
    if residual > smoothing {
        // Smoothing below what any penalized fit reaches: interpolate.
        return collocation
            .clone()
            .lu()
            .solve(data)
            .ok_or_else(|| CurveError::Fitting("interpolation system is singular".into()));
    }

    let mut lo = MIN_PENALTY.log10();
    let mut hi = MAX_PENALTY.log10();
    for _ in 0..PENALTY_STEPS {
        let mid = 0.5 * (lo + hi);
        let (coefficients, residual) = solve(10f64.powf(mid))?;
        if residual <= smoothing {
            lo = mid;
            best = coefficients;
        } else {
            hi = mid;
        }
    }
    log::trace!("smoothing penalty settled at 1e{:.3}", lo);

    Ok(best)
}
