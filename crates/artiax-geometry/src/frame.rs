//! Twist-free frames along a sampled curve.
//!
//! Each normal is the previous normal projected onto the plane orthogonal
//! to the current tangent ("projection normal" transport). Unlike a Frenet
//! frame this stays defined on straight stretches and does not flip at
//! inflection points.

use artiax_core::{CurveError, Result, Tolerance};
use artiax_math::{
    orthogonal_to, reject_from, signed_angle, z_align, DQuat, Point3, RigidTransform, Vector3,
};
use serde::{Deserialize, Serialize};

use crate::sample::CurveSample;

/// Orthonormal frame at one curve sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub position: Point3,
    /// Unit direction of travel.
    pub tangent: Vector3,
    /// Unit normal carried along the curve by minimal-rotation transport.
    /// Helix twist is not applied to it, only to `rotation`.
    pub normal: Vector3,
    /// `tangent × normal`.
    pub binormal: Vector3,
    /// Curve length walked from the first sample.
    pub arclength: f64,
    /// Orientation mapping local +Z onto the tangent and local +X onto the
    /// normal rolled by the helix twist.
    pub rotation: DQuat,
}

impl Frame {
    fn new(
        position: Point3,
        tangent: Vector3,
        normal: Vector3,
        arclength: f64,
        twist_degrees: f64,
    ) -> Self {
        let align = z_align(tangent);
        let reference = align * Vector3::X;
        let theta = signed_angle(reference, normal, tangent) + twist_degrees.to_radians();
        Self {
            position,
            tangent,
            normal,
            binormal: tangent.cross(normal),
            arclength,
            rotation: DQuat::from_axis_angle(tangent, theta) * align,
        }
    }

    pub fn transform(&self) -> RigidTransform {
        RigidTransform::new(self.rotation, self.position)
    }

    pub fn is_orthonormal(&self, epsilon: f64) -> bool {
        (self.tangent.length() - 1.0).abs() < epsilon
            && (self.normal.length() - 1.0).abs() < epsilon
            && (self.binormal.length() - 1.0).abs() < epsilon
            && self.tangent.dot(self.normal).abs() < epsilon
    }
}

/// Frame propagation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameField {
    /// Preferred normal at the first sample; projected onto the plane
    /// orthogonal to the first tangent. Ignored if it is parallel to it.
    pub start_normal: Option<Vector3>,
    /// Helix twist in degrees per unit of arclength.
    pub helix_rate: f64,
    pub tolerance: Tolerance,
}

impl FrameField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_normal(mut self, normal: Vector3) -> Self {
        self.start_normal = Some(normal);
        self
    }

    pub fn with_helix_rate(mut self, degrees_per_unit: f64) -> Self {
        self.helix_rate = degrees_per_unit;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// One frame per sample, in sample order.
    pub fn propagate(&self, samples: &CurveSample) -> Result<Vec<Frame>> {
        if !self.helix_rate.is_finite() {
            return Err(CurveError::invalid(
                "helix_rate",
                format!("must be finite, got {}", self.helix_rate),
            ));
        }

        let mut frames: Vec<Frame> = Vec::with_capacity(samples.len());
        for (index, (position, derivative)) in samples.iter().enumerate() {
            let tangent = self.unit_tangent(index, derivative)?;

            let frame = match frames.last() {
                None => {
                    let normal = self.initial_normal(tangent);
                    Frame::new(position, tangent, normal, 0.0, 0.0)
                }
                Some(prev) => {
                    let arclength = prev.arclength + prev.position.distance(position);
                    let normal = self.transport(prev, tangent);
                    Frame::new(position, tangent, normal, arclength, self.helix_rate * arclength)
                }
            };
            frames.push(frame);
        }

        Ok(frames)
    }

    fn unit_tangent(&self, index: usize, derivative: Vector3) -> Result<Vector3> {
        let length = derivative.length();
        if !length.is_finite() || self.tolerance.is_negligible(length) {
            return Err(CurveError::DegenerateTangent { index, length });
        }
        Ok(derivative / length)
    }

    fn initial_normal(&self, tangent: Vector3) -> Vector3 {
        self.start_normal
            .map(|n| reject_from(n, tangent))
            .filter(|n| !self.tolerance.is_negligible(n.length()))
            .map(Vector3::normalize)
            .unwrap_or_else(|| z_align(tangent) * Vector3::X)
    }

    fn transport(&self, prev: &Frame, tangent: Vector3) -> Vector3 {
        let projected = reject_from(prev.normal, tangent);
        if !self.tolerance.is_negligible(projected.length()) {
            return projected.normalize();
        }

        // The tangent turned onto the old normal within one step; carry the
        // normal along with that turn instead.
        let turn = DQuat::from_rotation_arc(prev.tangent, tangent);
        let carried = reject_from(turn * prev.normal, tangent);
        if !self.tolerance.is_negligible(carried.length()) {
            carried.normalize()
        } else {
            orthogonal_to(tangent)
        }
    }
}

/// Frames along `samples` without helix twist.
pub fn propagate(samples: &CurveSample, start_normal: Option<Vector3>) -> Result<Vec<Frame>> {
    FrameField {
        start_normal,
        ..FrameField::default()
    }
    .propagate(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use artiax_math::DVec3;
    use std::f64::consts::PI;

    fn circle(n: usize, radius: f64) -> CurveSample {
        let (points, derivatives) = (0..n)
            .map(|i| {
                let a = i as f64 / (n - 1) as f64 * 2.0 * PI;
                (
                    DVec3::new(radius * a.cos(), radius * a.sin(), 0.0),
                    DVec3::new(-a.sin(), a.cos(), 0.0),
                )
            })
            .unzip();
        CurveSample::new(points, derivatives).unwrap()
    }

    fn straight(n: usize, direction: Vector3) -> CurveSample {
        let points = (0..n).map(|i| direction * i as f64).collect();
        CurveSample::new(points, vec![direction; n]).unwrap()
    }

    #[test]
    fn test_straight_line_constant_frame() {
        let samples = straight(20, DVec3::new(1.0, 2.0, 2.0));
        let frames = propagate(&samples, None).unwrap();
        assert_eq!(frames.len(), 20);
        for f in &frames {
            assert!((f.normal - frames[0].normal).length() < 1e-12);
            assert!((f.rotation * Vector3::X - frames[0].normal).length() < 1e-9);
        }
    }

    #[test]
    fn test_rotation_axes_match_frame() {
        let frames = propagate(&circle(50, 5.0), Some(DVec3::Z)).unwrap();
        for f in &frames {
            assert!(f.is_orthonormal(1e-9));
            assert!((f.rotation * Vector3::Z - f.tangent).length() < 1e-9);
            assert!((f.rotation * Vector3::X - f.normal).length() < 1e-9);
            assert!((f.rotation * Vector3::Y - f.binormal).length() < 1e-9);
        }
    }

    #[test]
    fn test_transform_maps_local_axes() {
        let frames = propagate(&circle(20, 4.0), None).unwrap();
        let f = frames[7];
        let t = f.transform();
        assert!((t.transform_point(Point3::ZERO) - f.position).length() < 1e-12);
        assert!((t.transform_point(Vector3::Z) - (f.position + f.tangent)).length() < 1e-9);
        assert!((t.transform_vector(Vector3::Y) - f.binormal).length() < 1e-9);
    }

    #[test]
    fn test_planar_curve_keeps_out_of_plane_normal() {
        // A normal perpendicular to the curve plane is parallel transported unchanged.
        let frames = propagate(&circle(60, 3.0), Some(DVec3::new(0.0, 0.3, 1.0))).unwrap();
        for f in &frames {
            assert!((f.normal - DVec3::Z).length() < 1e-9);
        }
    }

    #[test]
    fn test_start_normal_is_projected() {
        let samples = straight(3, DVec3::X);
        let frames = propagate(&samples, Some(DVec3::new(5.0, 0.0, 2.0))).unwrap();
        assert!((frames[0].normal - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_parallel_start_normal_falls_back() {
        let samples = straight(3, DVec3::X);
        let frames = propagate(&samples, Some(DVec3::X)).unwrap();
        assert!(frames[0].is_orthonormal(1e-12));
    }

    #[test]
    fn test_helix_twist_grows_with_arclength() {
        let samples = straight(11, DVec3::Z);
        let frames = FrameField::new()
            .with_start_normal(DVec3::X)
            .with_helix_rate(9.0)
            .propagate(&samples)
            .unwrap();
        assert_abs_diff_eq!(frames[10].arclength, 10.0, epsilon = 1e-12);
        for f in &frames {
            let x_axis = f.rotation * Vector3::X;
            let angle = signed_angle(f.normal, x_axis, f.tangent).to_degrees();
            assert_abs_diff_eq!(angle, 9.0 * f.arclength, epsilon = 1e-6);
            // Twist leaves the transported normal alone.
            assert!((f.normal - DVec3::X).length() < 1e-12);
        }
    }

    #[test]
    fn test_normals_continuous_on_tight_curve() {
        // Corkscrew with several full turns.
        let n = 400;
        let (points, derivatives) = (0..n)
            .map(|i| {
                let a = i as f64 * 0.05;
                (
                    DVec3::new(2.0 * a.cos(), 2.0 * a.sin(), 0.3 * a),
                    DVec3::new(-2.0 * a.sin(), 2.0 * a.cos(), 0.3),
                )
            })
            .unzip();
        let samples = CurveSample::new(points, derivatives).unwrap();
        let frames = propagate(&samples, None).unwrap();
        for pair in frames.windows(2) {
            let turn = pair[0].tangent.angle_between(pair[1].tangent);
            let roll = pair[0].normal.angle_between(pair[1].normal);
            // Projection transport rotates the normal no more than the tangent turned.
            assert!(roll <= turn + 1e-9, "roll {} exceeds turn {}", roll, turn);
        }
    }

    #[test]
    fn test_right_angle_step_keeps_frame() {
        let samples = CurveSample::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0)],
            vec![DVec3::X, DVec3::X, DVec3::Y],
        )
        .unwrap();
        let frames = propagate(&samples, Some(DVec3::Y)).unwrap();
        // The old normal is the new tangent; it is carried along with the turn.
        assert!(frames[2].is_orthonormal(1e-12));
        assert!((frames[2].normal + DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_degenerate_tangent() {
        let samples = CurveSample::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)],
            vec![DVec3::X, DVec3::ZERO, DVec3::X],
        )
        .unwrap();
        let err = propagate(&samples, None).unwrap_err();
        assert!(matches!(err, CurveError::DegenerateTangent { index: 1, .. }));
    }

    #[test]
    fn test_empty_sample() {
        let samples = CurveSample::new(Vec::new(), Vec::new()).unwrap();
        assert!(propagate(&samples, None).unwrap().is_empty());
    }
}
