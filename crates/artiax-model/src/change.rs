/// What a mutation of a curved line invalidated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurveChange {
    /// The line itself must be redrawn.
    pub geometry: bool,
    /// Particle placements were replaced or removed.
    pub placements: bool,
    /// Camera path markers were replaced or removed.
    pub camera_markers: bool,
}

impl CurveChange {
    pub const UNCHANGED: Self = Self {
        geometry: false,
        placements: false,
        camera_markers: false,
    };

    pub const GEOMETRY: Self = Self {
        geometry: true,
        placements: false,
        camera_markers: false,
    };

    pub const PLACEMENTS: Self = Self {
        geometry: false,
        placements: true,
        camera_markers: false,
    };

    pub const CAMERA_MARKERS: Self = Self {
        geometry: false,
        placements: false,
        camera_markers: true,
    };

    pub fn is_unchanged(self) -> bool {
        self == Self::UNCHANGED
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            geometry: self.geometry || other.geometry,
            placements: self.placements || other.placements,
            camera_markers: self.camera_markers || other.camera_markers,
        }
    }
}

impl std::ops::BitOr for CurveChange {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}
