use crate::{DMat4, DQuat, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Orientation and position of an object placed on a curve.
///
/// Local coordinates are rotated first, then translated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub rotation: DQuat,
    pub translation: Vector3,
}

impl RigidTransform {
    pub fn new(rotation: DQuat, translation: Vector3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Column-major 4x4 matrix, the layout scene graphs take a placement in.
    pub fn to_cols_array(&self) -> [f64; 16] {
        self.to_mat4().to_cols_array()
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.rotation * p + self.translation
    }

    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.rotation * v
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::new(DQuat::IDENTITY, Vector3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation_about;
    use glam::dvec3;

    #[test]
    fn test_point_and_vector() {
        let t = RigidTransform::new(rotation_about(Vector3::Z, 90.0), dvec3(10.0, 0.0, 0.0));
        assert!((t.transform_point(Vector3::X) - dvec3(10.0, 1.0, 0.0)).length() < 1e-12);
        // Directions ignore the translation.
        assert!((t.transform_vector(Vector3::X) - Vector3::Y).length() < 1e-12);
    }

    #[test]
    fn test_matrix_agrees_with_transform() {
        let t = RigidTransform::new(rotation_about(dvec3(1.0, 1.0, 0.0), 40.0), dvec3(4.0, 5.0, 6.0));
        let p = dvec3(0.5, -1.0, 2.0);
        assert!((t.to_mat4().transform_point3(p) - t.transform_point(p)).length() < 1e-12);
        assert_eq!(&t.to_cols_array()[12..15], &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_default_is_identity() {
        let p = dvec3(1.0, 2.0, 3.0);
        assert_eq!(RigidTransform::default().transform_point(p), p);
    }
}
