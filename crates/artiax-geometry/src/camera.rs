//! Camera fly-through along a fitted curve.
//!
//! The camera travels in sample order (or backwards), looks along the
//! direction of travel and keeps a twist-free up vector. Its local +Z axis
//! points back along the path, the usual convention for a camera looking
//! down its -Z axis.

use artiax_core::Result;
use artiax_math::{rotation_about, DQuat, Point3, RigidTransform, Vector3};
use serde::{Deserialize, Serialize};

use crate::frame::FrameField;
use crate::sample::CurveSample;
use crate::sampler::{subsample_stride, Placement};

/// How the camera follows the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPathOptions {
    /// Thin the curve to about this many camera positions.
    pub frame_count: Option<usize>,
    /// Travel from the last sample to the first.
    pub backwards: bool,
    /// How far the eye sits behind the curve point, along the view axis.
    pub distance_behind: f64,
    /// Roll about the view axis, in degrees.
    pub top_rotation: f64,
    /// Turn about the camera up axis, in degrees.
    pub facing_rotation: f64,
}

impl Default for CameraPathOptions {
    fn default() -> Self {
        Self {
            frame_count: Some(60),
            backwards: false,
            distance_behind: 500.0,
            top_rotation: 0.0,
            facing_rotation: 0.0,
        }
    }
}

/// One camera position along the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub index: usize,
    /// Curve point the camera is attached to.
    pub anchor: Point3,
    /// Eye position, `distance_behind` from the anchor along local +Z.
    pub eye: Point3,
    pub rotation: DQuat,
}

impl CameraPose {
    pub fn transform(&self) -> RigidTransform {
        RigidTransform::new(self.rotation, self.eye)
    }

    pub fn view_direction(&self) -> Vector3 {
        -(self.rotation * Vector3::Z)
    }

    pub fn up(&self) -> Vector3 {
        self.rotation * Vector3::Y
    }
}

/// Camera poses along `samples`.
pub fn camera_path(samples: &CurveSample, options: &CameraPathOptions) -> Result<Vec<CameraPose>> {
    let stride = subsample_stride(samples.len(), options.frame_count)?;
    let mut path = samples.subsampled(stride);
    if options.backwards {
        path = path.reversed();
    }

    // Local +Z faces back along the path.
    let facing_back = CurveSample::new(
        path.points.clone(),
        path.derivatives.iter().map(|d| -*d).collect(),
    )?;
    let frames = FrameField::new().propagate(&facing_back)?;

    Ok(frames
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let rolled = rotation_about(frame.tangent, options.top_rotation) * frame.rotation;
            let rotation = rotation_about(rolled * Vector3::Y, options.facing_rotation) * rolled;
            CameraPose {
                index,
                anchor: frame.position,
                eye: frame.position + rotation * Vector3::Z * options.distance_behind,
                rotation,
            }
        })
        .collect())
}

/// Markers previewing the camera path: placed on the curve itself and
/// turned half way round about the camera up axis so they point the way
/// the camera looks.
pub fn camera_markers(samples: &CurveSample, options: &CameraPathOptions) -> Result<Vec<Placement>> {
    Ok(camera_path(samples, options)?
        .into_iter()
        .map(|pose| {
            let rotation = rotation_about(pose.up(), 180.0) * pose.rotation;
            Placement {
                index: pose.index,
                position: pose.anchor,
                tangent: rotation * Vector3::Z,
                rotation,
            }
        })
        .collect())
}
