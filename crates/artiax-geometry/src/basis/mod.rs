//! B-spline basis machinery: knot vectors, basis functions and De Boor evaluation.

pub mod deboor;
pub mod knot;

pub use deboor::{curve_point, curve_tangent};
pub use knot::{basis_functions, basis_functions_derivs, chord_parameters, find_span, interpolation_knots};
