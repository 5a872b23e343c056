use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("Fitting error: {0}")]
    Fitting(String),

    #[error("Degenerate tangent at sample {index}: derivative length {length:e}")]
    DegenerateTangent { index: usize, length: f64 },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CurveError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CurveError>;
