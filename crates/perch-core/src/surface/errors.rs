use crate::errors::PerchError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("Failed to load '{url}': {message}")]
    LoadFailed { url: String, message: String },

    #[error("Script evaluation failed: {message}")]
    ScriptFailed { message: String },

    #[error("Surface has been destroyed")]
    Destroyed,
}

impl PerchError for SurfaceError {
    fn error_code(&self) -> &'static str {
        match self {
            SurfaceError::LoadFailed { .. } => "SURFACE_LOAD_FAILED",
            SurfaceError::ScriptFailed { .. } => "SURFACE_SCRIPT_FAILED",
            SurfaceError::Destroyed => "SURFACE_DESTROYED",
        }
    }
}
