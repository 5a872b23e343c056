/// Length tolerance for comparisons along a sampled curve.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// In model units.
    pub linear: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;

    pub fn new(linear: f64) -> Self {
        Self { linear }
    }

    /// Lengths at or below the tolerance count as zero.
    pub fn is_negligible(self, length: f64) -> bool {
        length <= self.linear
    }

    /// `a >= b`, allowing `a` to fall short of `b` by the tolerance.
    pub fn reaches(self, a: f64, b: f64) -> bool {
        a + self.linear >= b
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LINEAR)
    }
}
