use crate::errors::PerchError;
use crate::surface::SurfaceError;

#[derive(Debug, thiserror::Error)]
pub enum SizingError {
    #[error("Measurement script failed: {source}")]
    ScriptFailed {
        #[from]
        source: SurfaceError,
    },

    #[error("Measurement returned an unusable value: {message}")]
    InvalidMeasurement { message: String },
}

impl From<serde_json::Error> for SizingError {
    fn from(e: serde_json::Error) -> Self {
        SizingError::InvalidMeasurement {
            message: e.to_string(),
        }
    }
}

impl PerchError for SizingError {
    fn error_code(&self) -> &'static str {
        match self {
            SizingError::ScriptFailed { .. } => "SIZING_SCRIPT_FAILED",
            SizingError::InvalidMeasurement { .. } => "SIZING_INVALID_MEASUREMENT",
        }
    }
}
