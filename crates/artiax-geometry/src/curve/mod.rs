//! Parametric curves.

mod bspline;

use artiax_math::{Point3, Vector3};

pub use bspline::BSplineCurve;

/// A curve evaluated by parameter.
pub trait Curve: Send + Sync {
    fn point_at(&self, t: f64) -> Point3;

    /// First derivative with respect to `t`. Its length depends on the
    /// parameterization.
    fn tangent_at(&self, t: f64) -> Vector3;

    /// Valid parameter range `(start, end)`.
    fn domain(&self) -> (f64, f64);

    /// Parameter at `fraction` of the way through the domain.
    fn parameter_at(&self, fraction: f64) -> f64 {
        let (start, end) = self.domain();
        start + (end - start) * fraction
    }
}
