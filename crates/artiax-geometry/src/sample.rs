//! Sampled curve: positions with first derivatives at uniform parameter steps.

use artiax_core::{CurveError, Result};
use artiax_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Positions and first derivatives of a fitted curve, ordered along the curve.
///
/// This is also the persisted form of a curve: it can be redrawn and
/// re-sampled without the particles it was fitted through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    pub points: Vec<Point3>,
    pub derivatives: Vec<Vector3>,
}

impl CurveSample {
    pub fn new(points: Vec<Point3>, derivatives: Vec<Vector3>) -> Result<Self> {
        if points.len() != derivatives.len() {
            return Err(CurveError::invalid(
                "derivatives",
                format!(
                    "expected one derivative per point ({} points), got {}",
                    points.len(),
                    derivatives.len()
                ),
            ));
        }
        Ok(Self {
            points,
            derivatives,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Point3, Vector3)> + '_ {
        self.points.iter().copied().zip(self.derivatives.iter().copied())
    }

    /// Consecutive point pairs, the segments a renderer draws.
    pub fn segments(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Total polyline length through the sample points.
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }

    /// Same curve walked from the other end: order reversed, derivatives negated.
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
            derivatives: self.derivatives.iter().rev().map(|d| -*d).collect(),
        }
    }

    /// Every `stride`-th sample, starting with the first.
    pub fn subsampled(&self, stride: usize) -> Self {
        let stride = stride.max(1);
        Self {
            points: self.points.iter().step_by(stride).copied().collect(),
            derivatives: self.derivatives.iter().step_by(stride).copied().collect(),
        }
    }
}
