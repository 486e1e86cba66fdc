use thiserror::Error;

/// Errors reported by fallible constructors and persistence
///
/// Out-of-range state or action indices are contract violations and panic instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid decay parameters: `vi - vf` must have same sign as `rate` (rate={rate}, vi={vi}, vf={vf})")]
    DecaySign { rate: f32, vi: f32, vf: f32 },

    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid bounds in dimension {dim}: low {low} must be less than high {high}")]
    InvalidBounds { dim: usize, low: f32, high: f32 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("table shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("stored {what} is inconsistent: {message}")]
    Inconsistent { what: &'static str, message: String },

    #[error("invalid maze layout: {message}")]
    InvalidLayout { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
