//! Defaults and edit ranges for curved lines.

use artiax_core::traits::Validate;
use artiax_core::{CurveError, Result, Tolerance};
use artiax_geometry::{CameraPathOptions, FitParameters};
use serde::{Deserialize, Serialize};

/// Closed interval a user-facing value may be edited within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditRange {
    pub min: f64,
    pub max: f64,
}

impl EditRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    fn check(&self, name: &'static str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(CurveError::invalid(
                name,
                format!("range [{}, {}] is empty or not finite", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Useful smoothing values for `point_count` points: `m ± sqrt(2m)`.
pub fn smoothing_range(point_count: usize) -> EditRange {
    let m = point_count as f64;
    let spread = (2.0 * m).sqrt();
    EditRange::new((m - spread).floor().max(0.0), (m + spread).ceil())
}

/// Settings a curved line starts from. Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    pub fit: FitParameters,
    pub resolution_range: EditRange,
    /// Radius of the cylinders the line is drawn with.
    pub radius: f64,
    pub radius_range: EditRange,
    /// Sides of each drawn cylinder.
    pub tube_segments: usize,
    /// Distance between created particles.
    pub spacing: f64,
    pub spacing_range: EditRange,
    /// Whether created particles twist around the line.
    pub rotate: bool,
    /// Twist in degrees per unit length.
    pub rotation_rate: f64,
    pub rotation_range: EditRange,
    /// Roll of every created particle about the line, in degrees.
    pub start_rotation: f64,
    /// Refit when source particles move.
    pub update_on_move: bool,
    pub camera: CameraPathOptions,
    pub distance_behind_range: EditRange,
    /// Number of markers previewing the camera path.
    pub camera_marker_count: usize,
    pub tolerance: Tolerance,
}

impl Default for CurveSettings {
    fn default() -> Self {
        let spacing_range = EditRange::new(1.0, 100.0);
        let distance_behind_range = EditRange::new(0.0, 1000.0);
        Self {
            fit: FitParameters::default(),
            resolution_range: EditRange::new(50.0, 500.0),
            radius: 1.0,
            radius_range: EditRange::new(0.0, 2.0),
            tube_segments: 12,
            spacing: spacing_range.midpoint(),
            spacing_range,
            rotate: false,
            rotation_rate: 0.0,
            rotation_range: EditRange::new(0.0, 1.0),
            start_rotation: 0.0,
            update_on_move: false,
            camera: CameraPathOptions {
                distance_behind: distance_behind_range.midpoint(),
                ..CameraPathOptions::default()
            },
            distance_behind_range,
            camera_marker_count: 30,
            tolerance: Tolerance::default(),
        }
    }
}

impl CurveSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| CurveError::Serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CurveError::Serialization(e.to_string()))
    }
}

impl Validate for CurveSettings {
    fn validate(&self) -> Result<()> {
        self.fit.validate()?;
        self.resolution_range.check("resolution_range")?;
        self.radius_range.check("radius_range")?;
        self.spacing_range.check("spacing_range")?;
        self.rotation_range.check("rotation_range")?;
        self.distance_behind_range.check("distance_behind_range")?;

        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(CurveError::invalid(
                "radius",
                format!("must be finite and >= 0, got {}", self.radius),
            ));
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(CurveError::invalid(
                "spacing",
                format!("must be finite and > 0, got {}", self.spacing),
            ));
        }
        if !self.rotation_rate.is_finite() || !self.start_rotation.is_finite() {
            return Err(CurveError::invalid("rotation_rate", "rotations must be finite"));
        }
        if self.camera_marker_count < 2 {
            return Err(CurveError::invalid(
                "camera_marker_count",
                format!("must be at least 2, got {}", self.camera_marker_count),
            ));
        }
        if matches!(self.camera.frame_count, Some(n) if n < 2) {
            return Err(CurveError::invalid("camera.frame_count", "must be at least 2"));
        }
        if self.tolerance.linear.is_nan() || self.tolerance.linear <= 0.0 {
            return Err(CurveError::invalid(
                "tolerance",
                format!("linear tolerance must be > 0, got {}", self.tolerance.linear),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = CurveSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.spacing, 50.5);
        assert_eq!(settings.camera.distance_behind, 500.0);
        assert_eq!(settings.camera.frame_count, Some(60));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = CurveSettings::from_json(r#"{ "radius": 0.5, "rotate": true }"#).unwrap();
        assert_eq!(settings.radius, 0.5);
        assert!(settings.rotate);
        assert_eq!(settings.fit, FitParameters::default());
        assert_eq!(settings.camera_marker_count, 30);
    }

    #[test]
    fn test_retired_fields_are_ignored() {
        // Files written before the camera axes size was dropped still load.
        let settings = CurveSettings::from_json(
            r#"{ "camera_axes_size": 15.0, "camera_axes_size_range": { "min": 10.0, "max": 20.0 } }"#,
        )
        .unwrap();
        assert_eq!(settings, CurveSettings::default());
        assert!(!settings.to_json().unwrap().contains("camera_axes"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = CurveSettings::default();
        settings.fit = FitParameters::new(5, 2.5, 300);
        settings.update_on_move = true;
        let json = settings.to_json().unwrap();
        assert_eq!(CurveSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json_values() {
        let err = CurveSettings::from_json(r#"{ "fit": { "degree": 2, "smoothing": 0.0, "resolution": 10 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("degree"));
        let err = CurveSettings::from_json(r#"{ "spacing": -1.0 }"#).unwrap_err();
        assert!(err.to_string().contains("spacing"));
        let err = CurveSettings::from_json("not json").unwrap_err();
        assert!(matches!(err, CurveError::Serialization(_)));
    }

    #[test]
    fn test_smoothing_range() {
        // m = 8: sqrt(16) = 4
        assert_eq!(smoothing_range(8), EditRange::new(4.0, 12.0));
        let r = smoothing_range(2);
        assert_eq!(r, EditRange::new(0.0, 4.0));
        assert!(r.contains(2.0));
    }

    #[test]
    fn test_edit_range_clamp() {
        let r = EditRange::new(1.0, 100.0);
        assert_eq!(r.clamp(0.0), 1.0);
        assert_eq!(r.clamp(150.0), 100.0);
        assert_eq!(r.midpoint(), 50.5);
    }
}
