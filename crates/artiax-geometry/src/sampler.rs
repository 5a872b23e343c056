//! Evenly spaced placements along a sampled curve.

use std::f64::consts::PI;

use artiax_core::{CurveError, Result, Tolerance};
use artiax_math::{rotation_about, DQuat, Point3, RigidTransform, Vector3};
use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::sample::CurveSample;

/// A marker position and orientation on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Position in emission order, stable for later deletion or replacement.
    pub index: usize,
    pub position: Point3,
    /// Unit direction of travel at the placement.
    pub tangent: Vector3,
    /// Maps local +Z onto `tangent`.
    pub rotation: DQuat,
}

impl Placement {
    pub fn transform(&self) -> RigidTransform {
        RigidTransform::new(self.rotation, self.position)
    }
}

/// Arclength walk over a curve sample and its frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    /// Minimum curve length between consecutive placements.
    pub spacing: f64,
    /// Roll in degrees about the tangent added to every placement.
    pub start_rotation: f64,
    /// Emit placements from the last sample to the first.
    pub reverse: bool,
    /// Thin the sample to about this many entries before walking.
    pub max_count: Option<usize>,
    pub tolerance: Tolerance,
}

impl Sampler {
    pub fn new(spacing: f64) -> Self {
        Self {
            spacing,
            start_rotation: 0.0,
            reverse: false,
            max_count: None,
            tolerance: Tolerance::default(),
        }
    }

    pub fn with_start_rotation(mut self, degrees: f64) -> Self {
        self.start_rotation = degrees;
        self
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Place markers along `samples`, one per `spacing` of walked length.
    ///
    /// The first sample always gets a placement. In reverse mode the same
    /// samples are emitted last to first, facing the other way. `frames`
    /// must be the frame field of `samples`.
    pub fn sample(&self, samples: &CurveSample, frames: &[Frame]) -> Result<Vec<Placement>> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(CurveError::invalid(
                "spacing",
                format!("must be finite and > 0, got {}", self.spacing),
            ));
        }
        if !self.start_rotation.is_finite() {
            return Err(CurveError::invalid(
                "start_rotation",
                format!("must be finite, got {}", self.start_rotation),
            ));
        }
        if samples.is_empty() {
            return Err(CurveError::invalid("samples", "curve sample is empty"));
        }
        if frames.len() != samples.len() {
            return Err(CurveError::invalid(
                "frames",
                format!("expected {} frames, got {}", samples.len(), frames.len()),
            ));
        }

        let stride = subsample_stride(samples.len(), self.max_count)?;
        let order: Vec<usize> = (0..samples.len()).step_by(stride).collect();

        // The walk always runs first to last; reversing only changes the
        // emission order, so both directions land on the same samples.
        let mut chosen = Vec::new();
        let mut since_last = 0.0;
        let mut previous: Option<Point3> = None;
        for &i in &order {
            let position = samples.points[i];
            if let Some(prev) = previous {
                since_last += prev.distance(position);
            }

            if previous.is_none() || self.tolerance.reaches(since_last, self.spacing) {
                since_last = 0.0;
                chosen.push(i);
            }
            previous = Some(position);
        }
        if self.reverse {
            chosen.reverse();
        }

        let placements: Vec<Placement> = chosen
            .iter()
            .enumerate()
            .map(|(index, &i)| self.place(index, samples.points[i], &frames[i]))
            .collect();

        log::trace!(
            "placed {} markers every {} along {} samples",
            placements.len(),
            self.spacing,
            order.len()
        );
        Ok(placements)
    }

    fn place(&self, index: usize, position: Point3, frame: &Frame) -> Placement {
        let mut rotation = rotation_about(frame.tangent, self.start_rotation) * frame.rotation;
        let mut tangent = frame.tangent;
        if self.reverse {
            // Half turn about the marker's own x axis: z follows the reversed
            // direction of travel, x stays put.
            rotation = DQuat::from_axis_angle(rotation * Vector3::X, PI) * rotation;
            tangent = -tangent;
        }
        Placement {
            index,
            position,
            tangent,
            rotation,
        }
    }
}

/// Stride that thins `len` samples to roughly `max_count` entries.
pub(crate) fn subsample_stride(len: usize, max_count: Option<usize>) -> Result<usize> {
    match max_count {
        None => Ok(1),
        Some(count) if count < 2 => Err(CurveError::invalid(
            "max_count",
            format!("must be at least 2, got {}", count),
        )),
        Some(count) => Ok((len / (count - 1)).max(1)),
    }
}
