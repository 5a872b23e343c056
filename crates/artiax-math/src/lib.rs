pub mod rotation;
pub mod transform;

pub use glam::{DMat4, DQuat, DVec3};
pub use rotation::{orthogonal_to, reject_from, rotation_about, signed_angle, z_align};
pub use transform::RigidTransform;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
