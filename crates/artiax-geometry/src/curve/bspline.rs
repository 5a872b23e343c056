use artiax_core::{CurveError, Result};
use artiax_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::Curve;
use crate::basis::deboor;

/// Clamped, non-rational B-spline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSplineCurve {
    pub degree: usize,
    pub knots: Vec<f64>,
    pub control_points: Vec<Point3>,
}

impl BSplineCurve {
    /// Checks `knots.len() == control_points.len() + degree + 1` and that
    /// the knots never decrease.
    pub fn new(degree: usize, knots: Vec<f64>, control_points: Vec<Point3>) -> Result<Self> {
        if control_points.len() <= degree {
            return Err(CurveError::invalid(
                "control_points",
                format!(
                    "degree {} needs at least {} control points, got {}",
                    degree,
                    degree + 1,
                    control_points.len()
                ),
            ));
        }
        if knots.len() != control_points.len() + degree + 1 {
            return Err(CurveError::invalid(
                "knots",
                format!(
                    "expected {} knots for {} control points, got {}",
                    control_points.len() + degree + 1,
                    control_points.len(),
                    knots.len()
                ),
            ));
        }
        if knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(CurveError::invalid("knots", "knot vector must not decrease"));
        }
        Ok(Self {
            degree,
            knots,
            control_points,
        })
    }
}

impl Curve for BSplineCurve {
    fn point_at(&self, t: f64) -> Point3 {
        deboor::curve_point(self.degree, &self.knots, &self.control_points, t)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        deboor::curve_tangent(self.degree, &self.knots, &self.control_points, t)
    }

    fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.control_points.len()])
    }
}
