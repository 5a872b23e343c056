//! ArtiaX curve geometry: fit a spline through particle positions, derive a
//! twist-free frame field along it and place markers by arclength.
//!
//! The pipeline is `fit` → [`CurveSample`] → [`FrameField`] → [`Sampler`].
//! Every stage is a pure function of its inputs.

pub mod basis;
pub mod camera;
pub mod curve;
pub mod fit;
pub mod frame;
pub mod sample;
pub mod sampler;
pub mod tessellate;

pub use camera::{camera_markers, camera_path, CameraPathOptions, CameraPose};
pub use curve::{BSplineCurve, Curve};
pub use fit::{fit, fit_curve, FitParameters, FittedCurve, SUPPORTED_DEGREES};
pub use frame::{propagate, Frame, FrameField};
pub use sample::CurveSample;
pub use sampler::{Placement, Sampler};
pub use tessellate::{cylinder, tube_mesh, LineMesh};
