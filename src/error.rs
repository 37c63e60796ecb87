//! Error taxonomy for flow estimation.
//!
//! Configuration errors and caller contract violations surface here before
//! any pyramid level is processed. Numerical edge cases inside the solver are
//! recovered locally and only show up as counters in the diagnostics.
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, FlowError>;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("missing parameter `{0}`")]
    MissingParameter(String),

    #[error("parameter `{name}` out of range: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("pyramid level {level} would be {width}x{height}, below the 2x2 minimum")]
    LevelTooSmall {
        level: usize,
        width: usize,
        height: usize,
    },

    #[error("{what} size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image codec error on {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlowError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
