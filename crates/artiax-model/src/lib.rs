//! ArtiaX curved-line model.
//!
//! A [`CurvedLine`] owns the particle positions a curve was fitted through,
//! the fit parameters, and the geometry derived from them. Derived geometry
//! is recomputed as a whole whenever an input changes; every mutator
//! returns a [`CurveChange`] telling the caller what to redraw.

pub mod change;
pub mod curved_line;
pub mod settings;
pub mod snapshot;

pub use change::CurveChange;
pub use curved_line::CurvedLine;
pub use settings::{smoothing_range, CurveSettings, EditRange};
pub use snapshot::CurvedLineSnapshot;
