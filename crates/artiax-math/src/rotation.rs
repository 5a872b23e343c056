//! Rotation helpers in the conventions of the curve code: angles given in
//! degrees are converted here, everything else works in radians.

use crate::{DQuat, Vector3};

/// Rotation that carries the world +Z axis onto `direction`.
///
/// `direction` does not need to be normalized but must be non-zero.
pub fn z_align(direction: Vector3) -> DQuat {
    DQuat::from_rotation_arc(Vector3::Z, direction.normalize())
}

/// Rotation of `degrees` about `axis` (right-handed).
pub fn rotation_about(axis: Vector3, degrees: f64) -> DQuat {
    DQuat::from_axis_angle(axis.normalize(), degrees.to_radians())
}

/// Signed angle in radians that rotates `from` onto `to` about `axis`.
///
/// Both vectors are expected to lie in the plane orthogonal to `axis`.
/// The sign follows the right-hand rule about `axis`; the result lies in
/// `(-PI, PI]`.
pub fn signed_angle(from: Vector3, to: Vector3, axis: Vector3) -> f64 {
    let sin = from.cross(to).dot(axis.normalize());
    let cos = from.dot(to);
    sin.atan2(cos)
}

/// Component of `v` orthogonal to `axis`, i.e. `v` projected onto the
/// plane through the origin with normal `axis`.
pub fn reject_from(v: Vector3, axis: Vector3) -> Vector3 {
    let n = axis.normalize();
    v - n * v.dot(n)
}

/// Some unit vector orthogonal to `v`.
pub fn orthogonal_to(v: Vector3) -> Vector3 {
    let n = v.normalize();
    // Choose a vector not parallel to v to build the frame
    let reference = if n.x.abs() < 0.9 {
        Vector3::X
    } else {
        Vector3::Y
    };
    n.cross(reference).normalize()
}
