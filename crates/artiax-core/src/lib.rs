pub mod error;
pub mod id;
pub mod tolerance;
pub mod traits;

pub use error::{CurveError, Result};
pub use id::ParticleId;
pub use tolerance::Tolerance;
