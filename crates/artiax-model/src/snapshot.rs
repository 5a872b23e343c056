//! JSON snapshot of a curved line.
//!
//! A snapshot stores the source particles, the fit parameters and the
//! fitted sample, so a saved line restores exactly even if the fitting
//! code changes later.

use std::path::Path;

use artiax_core::traits::Validate;
use artiax_core::{CurveError, ParticleId, Result};
use artiax_geometry::{CameraPathOptions, CurveSample, FitParameters};
use artiax_math::Point3;
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

const MODEL_TYPE: &str = "CurvedLine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvedLineSnapshot {
    pub version: u32,
    pub model_type: String,
    pub name: String,
    pub particles: Vec<ParticleId>,
    pub particle_positions: Vec<Point3>,
    pub fit: FitParameters,
    pub samples: CurveSample,
    pub radius: f64,
    pub spacing: f64,
    pub rotate: bool,
    pub rotation_rate: f64,
    pub start_rotation: f64,
    #[serde(default)]
    pub update_on_move: bool,
    #[serde(default)]
    pub camera: CameraPathOptions,
}

impl CurvedLineSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CurveError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| CurveError::Serialization(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::debug!("wrote curved line snapshot '{}' to {}", self.name, path.display());
        Ok(())
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Validate for CurvedLineSnapshot {
    fn validate(&self) -> Result<()> {
        if self.model_type != MODEL_TYPE {
            return Err(CurveError::Serialization(format!(
                "expected model type {}, found {}",
                MODEL_TYPE, self.model_type
            )));
        }
        if self.version > SNAPSHOT_VERSION {
            return Err(CurveError::Serialization(format!(
                "snapshot version {} is newer than supported version {}",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if self.particles.len() != self.particle_positions.len() {
            return Err(CurveError::Serialization(format!(
                "{} particle ids but {} positions",
                self.particles.len(),
                self.particle_positions.len()
            )));
        }
        if self.samples.points.len() != self.samples.derivatives.len() {
            return Err(CurveError::Serialization(format!(
                "{} sample points but {} derivatives",
                self.samples.points.len(),
                self.samples.derivatives.len()
            )));
        }
        self.fit.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artiax_math::DVec3;

    fn snapshot() -> CurvedLineSnapshot {
        CurvedLineSnapshot {
            version: SNAPSHOT_VERSION,
            model_type: MODEL_TYPE.to_string(),
            name: "line".to_string(),
            particles: vec![ParticleId::new(1), ParticleId::new(2)],
            particle_positions: vec![DVec3::ZERO, DVec3::X],
            fit: FitParameters::new(1, 0.0, 2),
            samples: CurveSample::new(vec![DVec3::ZERO, DVec3::X], vec![DVec3::X; 2]).unwrap(),
            radius: 1.0,
            spacing: 0.5,
            rotate: false,
            rotation_rate: 0.0,
            start_rotation: 0.0,
            update_on_move: false,
            camera: CameraPathOptions::default(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let s = snapshot();
        let restored = CurvedLineSnapshot::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(restored, s);
    }

    #[test]
    fn test_rejects_wrong_model_type() {
        let mut s = snapshot();
        s.model_type = "Boundary".to_string();
        let err = CurvedLineSnapshot::from_json(&s.to_json().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Boundary"));
    }

    #[test]
    fn test_rejects_mismatched_particles() {
        let mut s = snapshot();
        s.particle_positions.pop();
        let err = CurvedLineSnapshot::from_json(&s.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, CurveError::Serialization(_)));
    }

    #[test]
    fn test_rejects_future_version() {
        let mut s = snapshot();
        s.version = SNAPSHOT_VERSION + 1;
        assert!(CurvedLineSnapshot::from_json(&s.to_json().unwrap()).is_err());
    }
}
