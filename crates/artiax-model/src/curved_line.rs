use std::collections::BTreeMap;
use std::path::Path;

use artiax_core::traits::{Renderable, Transformable, Validate};
use artiax_core::{CurveError, ParticleId, Result};
use artiax_geometry::{
    camera_markers, camera_path, fit, tube_mesh, CameraPathOptions, CameraPose, CurveSample,
    FitParameters, FrameField, LineMesh, Placement, Sampler,
};
use artiax_math::{DQuat, Point3};

use crate::change::CurveChange;
use crate::settings::{smoothing_range, CurveSettings, EditRange};
use crate::snapshot::{CurvedLineSnapshot, SNAPSHOT_VERSION};

/// A smooth curve fitted through an ordered list of particles.
///
/// The fitted sample, the particle placements and the camera markers are
/// derived state. Every edit recomputes them on a copy and commits only if
/// the whole recomputation succeeds, so a failed edit leaves the previous
/// geometry in place.
#[derive(Debug, Clone)]
pub struct CurvedLine {
    name: String,
    particles: Vec<ParticleId>,
    positions: Vec<Point3>,
    fit: FitParameters,
    samples: CurveSample,
    radius: f64,
    spacing: f64,
    rotate: bool,
    rotation_rate: f64,
    start_rotation: f64,
    update_on_move: bool,
    visible: bool,
    camera: CameraPathOptions,
    placements: Option<Vec<Placement>>,
    camera_markers: Option<Vec<Placement>>,
    settings: CurveSettings,
}

impl CurvedLine {
    /// Fit a new line through `particles`, in the given order.
    pub fn new(
        name: impl Into<String>,
        particles: Vec<(ParticleId, Point3)>,
        settings: CurveSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let (ids, positions): (Vec<ParticleId>, Vec<Point3>) = particles.into_iter().unzip();
        check_unique(&ids)?;

        let samples = fit(&positions, &settings.fit)?;
        let line = Self {
            name: name.into(),
            particles: ids,
            positions,
            fit: settings.fit,
            samples,
            radius: settings.radius,
            spacing: settings.spacing,
            rotate: settings.rotate,
            rotation_rate: settings.rotation_rate,
            start_rotation: settings.start_rotation,
            update_on_move: settings.update_on_move,
            visible: true,
            camera: settings.camera,
            placements: None,
            camera_markers: None,
            settings,
        };
        log::info!(
            "Created a curved line through {} particles",
            line.particles.len()
        );
        Ok(line)
    }

    /// Restore a saved line. The stored sample is used as is, without refitting.
    pub fn from_snapshot(snapshot: CurvedLineSnapshot, settings: CurveSettings) -> Result<Self> {
        snapshot.validate()?;
        settings.validate()?;
        check_unique(&snapshot.particles)?;

        log::debug!(
            "restoring curved line '{}' ({} samples)",
            snapshot.name,
            snapshot.samples.len()
        );
        Ok(Self {
            name: snapshot.name,
            particles: snapshot.particles,
            positions: snapshot.particle_positions,
            fit: snapshot.fit,
            samples: snapshot.samples,
            radius: snapshot.radius,
            spacing: snapshot.spacing,
            rotate: snapshot.rotate,
            rotation_rate: snapshot.rotation_rate,
            start_rotation: snapshot.start_rotation,
            update_on_move: snapshot.update_on_move,
            visible: true,
            camera: snapshot.camera,
            placements: None,
            camera_markers: None,
            settings,
        })
    }

    pub fn snapshot(&self) -> CurvedLineSnapshot {
        CurvedLineSnapshot {
            version: SNAPSHOT_VERSION,
            model_type: "CurvedLine".to_string(),
            name: self.name.clone(),
            particles: self.particles.clone(),
            particle_positions: self.positions.clone(),
            fit: self.fit,
            samples: self.samples.clone(),
            radius: self.radius,
            spacing: self.spacing,
            rotate: self.rotate,
            rotation_rate: self.rotation_rate,
            start_rotation: self.start_rotation,
            update_on_move: self.update_on_move,
            camera: self.camera,
        }
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        self.snapshot().write_file(path)
    }

    pub fn read_file(path: &Path, settings: CurveSettings) -> Result<Self> {
        Self::from_snapshot(CurvedLineSnapshot::read_file(path)?, settings)
    }

    // ---- accessors ----

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn particles(&self) -> &[ParticleId] {
        &self.particles
    }

    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    pub fn fit_parameters(&self) -> FitParameters {
        self.fit
    }

    pub fn samples(&self) -> &CurveSample {
        &self.samples
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn rotate(&self) -> bool {
        self.rotate
    }

    pub fn rotation_rate(&self) -> f64 {
        self.rotation_rate
    }

    pub fn start_rotation(&self) -> f64 {
        self.start_rotation
    }

    pub fn update_on_move(&self) -> bool {
        self.update_on_move
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn camera_options(&self) -> &CameraPathOptions {
        &self.camera
    }

    pub fn placements(&self) -> Option<&[Placement]> {
        self.placements.as_deref()
    }

    pub fn camera_markers(&self) -> Option<&[Placement]> {
        self.camera_markers.as_deref()
    }

    pub fn settings(&self) -> &CurveSettings {
        &self.settings
    }

    /// Range the smoothing slider should offer for this line.
    pub fn smoothing_edit_range(&self) -> EditRange {
        smoothing_range(self.positions.len())
    }

    // ---- recomputation ----

    /// Refit through the current positions and rederive everything cached.
    pub fn recalc_and_update(&mut self) -> Result<CurveChange> {
        self.commit(Self::refit)
    }

    /// Take new coordinates for some of the source particles.
    ///
    /// Unknown ids are rejected before anything changes. The line refits
    /// only when it follows its particles and is shown; otherwise the new
    /// positions are kept for the next refit.
    pub fn particles_moved(&mut self, moved: &BTreeMap<ParticleId, Point3>) -> Result<CurveChange> {
        let mut positions = self.positions.clone();
        for (id, position) in moved {
            let slot = self
                .particles
                .iter()
                .position(|p| p == id)
                .ok_or_else(|| CurveError::NotFound(format!("{} is not on {}", id, self.name)))?;
            positions[slot] = *position;
        }
        if positions == self.positions {
            return Ok(CurveChange::UNCHANGED);
        }

        if !(self.update_on_move && self.visible) {
            self.positions = positions;
            return Ok(CurveChange::UNCHANGED);
        }
        self.commit(|line| {
            line.positions = positions;
            line.refit()
        })
    }

    pub fn change_degree(&mut self, degree: usize) -> Result<CurveChange> {
        let fit = FitParameters { degree, ..self.fit };
        self.change_fit(fit)
    }

    pub fn change_resolution(&mut self, resolution: usize) -> Result<CurveChange> {
        let fit = FitParameters { resolution, ..self.fit };
        self.change_fit(fit)
    }

    pub fn change_smoothing(&mut self, smoothing: f64) -> Result<CurveChange> {
        let fit = FitParameters { smoothing, ..self.fit };
        self.change_fit(fit)
    }

    fn change_fit(&mut self, fit: FitParameters) -> Result<CurveChange> {
        if fit == self.fit {
            return Ok(CurveChange::UNCHANGED);
        }
        fit.validate()?;
        self.commit(|line| {
            line.fit = fit;
            line.refit()
        })
    }

    pub fn change_radius(&mut self, radius: f64) -> Result<CurveChange> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(CurveError::invalid(
                "radius",
                format!("must be finite and >= 0, got {}", radius),
            ));
        }
        if radius == self.radius {
            return Ok(CurveChange::UNCHANGED);
        }
        self.radius = radius;
        Ok(CurveChange::GEOMETRY)
    }

    pub fn change_spacing(&mut self, spacing: f64) -> Result<CurveChange> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(CurveError::invalid(
                "spacing",
                format!("must be finite and > 0, got {}", spacing),
            ));
        }
        if spacing == self.spacing {
            return Ok(CurveChange::UNCHANGED);
        }
        self.commit(|line| {
            line.spacing = spacing;
            line.refresh_placements()
        })
    }

    /// Twist rate of created particles, in degrees per unit length.
    pub fn change_rotation(&mut self, rate: f64) -> Result<CurveChange> {
        if !rate.is_finite() {
            return Err(CurveError::invalid(
                "rotation_rate",
                format!("must be finite, got {}", rate),
            ));
        }
        if rate == self.rotation_rate {
            return Ok(CurveChange::UNCHANGED);
        }
        self.commit(|line| {
            line.rotation_rate = rate;
            line.refresh_placements()
        })
    }

    pub fn change_start_rotation(&mut self, degrees: f64) -> Result<CurveChange> {
        if !degrees.is_finite() {
            return Err(CurveError::invalid(
                "start_rotation",
                format!("must be finite, got {}", degrees),
            ));
        }
        if degrees == self.start_rotation {
            return Ok(CurveChange::UNCHANGED);
        }
        self.commit(|line| {
            line.start_rotation = degrees;
            line.refresh_placements()
        })
    }

    pub fn set_rotate(&mut self, rotate: bool) -> Result<CurveChange> {
        if rotate == self.rotate {
            return Ok(CurveChange::UNCHANGED);
        }
        self.commit(|line| {
            line.rotate = rotate;
            line.refresh_placements()
        })
    }

    pub fn set_update_on_move(&mut self, update_on_move: bool) {
        self.update_on_move = update_on_move;
    }

    pub fn set_visible(&mut self, visible: bool) -> CurveChange {
        if visible == self.visible {
            return CurveChange::UNCHANGED;
        }
        self.visible = visible;
        CurveChange::GEOMETRY
    }

    // ---- particle placements ----

    /// Place particles along the line every `spacing`, replacing any
    /// existing placements.
    pub fn create_placements(&mut self) -> Result<CurveChange> {
        let placements = self.compute_placements()?;
        log::debug!(
            "placed {} particles along '{}' every {}",
            placements.len(),
            self.name,
            self.spacing
        );
        self.placements = Some(placements);
        Ok(CurveChange::PLACEMENTS)
    }

    pub fn remove_placements(&mut self) -> CurveChange {
        match self.placements.take() {
            Some(_) => CurveChange::PLACEMENTS,
            None => CurveChange::UNCHANGED,
        }
    }

    /// Move `targets` onto the cached placements, pairing them in order.
    /// Returns how many targets were moved.
    pub fn apply_placements<T>(&self, targets: &mut [T]) -> usize
    where
        T: Transformable<Position = Point3, Orientation = DQuat>,
    {
        let placements = self.placements.as_deref().unwrap_or_default();
        let mut moved = 0;
        for (target, p) in targets.iter_mut().zip(placements) {
            target.set_placement(p.position, p.rotation);
            moved += 1;
        }
        moved
    }

    /// Column-major 4x4 matrices of the cached placements, for hosts that
    /// take a placement as a matrix.
    pub fn placement_matrices(&self) -> Vec<[f64; 16]> {
        self.placements
            .iter()
            .flatten()
            .map(|p| p.transform().to_cols_array())
            .collect()
    }

    // ---- camera ----

    pub fn set_camera_options(&mut self, options: CameraPathOptions) -> Result<CurveChange> {
        if !options.distance_behind.is_finite()
            || !options.top_rotation.is_finite()
            || !options.facing_rotation.is_finite()
        {
            return Err(CurveError::invalid("camera", "offsets and rotations must be finite"));
        }
        if matches!(options.frame_count, Some(n) if n < 2) {
            return Err(CurveError::invalid("camera.frame_count", "must be at least 2"));
        }
        if options == self.camera {
            return Ok(CurveChange::UNCHANGED);
        }
        self.commit(|line| {
            line.camera = options;
            line.refresh_camera_markers()
        })
    }

    /// Camera poses for a fly-through along the line.
    pub fn camera_poses(&self) -> Result<Vec<CameraPose>> {
        camera_path(&self.samples, &self.camera)
    }

    /// Put `camera` at pose `frame` of the fly-through.
    pub fn move_camera<T>(&self, camera: &mut T, frame: usize) -> Result<()>
    where
        T: Transformable<Position = Point3, Orientation = DQuat>,
    {
        let poses = self.camera_poses()?;
        let pose = poses.get(frame).ok_or_else(|| {
            CurveError::NotFound(format!("camera frame {} of {}", frame, poses.len()))
        })?;
        camera.set_placement(pose.eye, pose.rotation);
        Ok(())
    }

    /// Markers previewing the camera path, replacing any existing ones.
    pub fn create_camera_markers(&mut self) -> Result<CurveChange> {
        self.camera_markers = Some(self.compute_camera_markers()?);
        Ok(CurveChange::CAMERA_MARKERS)
    }

    pub fn remove_camera_markers(&mut self) -> CurveChange {
        match self.camera_markers.take() {
            Some(_) => CurveChange::CAMERA_MARKERS,
            None => CurveChange::UNCHANGED,
        }
    }

    // ---- drawing ----

    /// Triangles of the line drawn as a tube; empty while hidden.
    pub fn line_geometry(&self) -> LineMesh {
        if !self.visible {
            return LineMesh::default();
        }
        tube_mesh(&self.samples.points, self.radius, self.settings.tube_segments)
    }

    pub fn render_into(&self, target: &mut dyn Renderable<Vertex = Point3>) {
        self.line_geometry().render_into(target);
    }

    // ---- internals ----

    /// Run `edit` on a copy and keep the copy only if it succeeds.
    fn commit<F>(&mut self, edit: F) -> Result<CurveChange>
    where
        F: FnOnce(&mut Self) -> Result<CurveChange>,
    {
        let mut next = self.clone();
        match edit(&mut next) {
            Ok(change) => {
                *self = next;
                Ok(change)
            }
            Err(e) => {
                log::warn!("curved line '{}' kept its previous geometry: {}", self.name, e);
                Err(e)
            }
        }
    }

    fn refit(&mut self) -> Result<CurveChange> {
        self.samples = fit(&self.positions, &self.fit)?;
        log::debug!(
            "refitted '{}': degree {}, smoothing {}, {} samples",
            self.name,
            self.fit.degree,
            self.fit.smoothing,
            self.samples.len()
        );
        Ok(CurveChange::GEOMETRY | self.refresh_placements()? | self.refresh_camera_markers()?)
    }

    fn refresh_placements(&mut self) -> Result<CurveChange> {
        if self.placements.is_none() {
            return Ok(CurveChange::UNCHANGED);
        }
        self.placements = Some(self.compute_placements()?);
        Ok(CurveChange::PLACEMENTS)
    }

    fn refresh_camera_markers(&mut self) -> Result<CurveChange> {
        if self.camera_markers.is_none() {
            return Ok(CurveChange::UNCHANGED);
        }
        self.camera_markers = Some(self.compute_camera_markers()?);
        Ok(CurveChange::CAMERA_MARKERS)
    }

    fn compute_placements(&self) -> Result<Vec<Placement>> {
        let helix_rate = if self.rotate { self.rotation_rate } else { 0.0 };
        let frames = FrameField::new()
            .with_helix_rate(helix_rate)
            .with_tolerance(self.settings.tolerance)
            .propagate(&self.samples)?;
        Sampler {
            tolerance: self.settings.tolerance,
            ..Sampler::new(self.spacing).with_start_rotation(self.start_rotation)
        }
        .sample(&self.samples, &frames)
    }

    fn compute_camera_markers(&self) -> Result<Vec<Placement>> {
        let options = CameraPathOptions {
            frame_count: Some(self.settings.camera_marker_count),
            ..self.camera
        };
        camera_markers(&self.samples, &options)
    }
}

fn check_unique(ids: &[ParticleId]) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    match ids.iter().find(|id| !seen.insert(**id)) {
        Some(id) => Err(CurveError::invalid(
            "particles",
            format!("{} is listed more than once", id),
        )),
        None => Ok(()),
    }
}
