use std::fmt;

use media_picker::{ExportError, LibraryError};

/// Central error types for the Fotokorb app
#[derive(Debug)]
pub enum AppError {
    /// Media library error (catalog, thumbnails, fetches)
    Library(LibraryError),
    /// Export pipeline error
    Export(ExportError),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Configuration error (e.g. unreadable fotokorb.toml)
    Config(String),
    /// General error
    #[allow(dead_code)]
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Library(e) => write!(f, "Library error: {}", e),
            AppError::Export(e) => write!(f, "Export error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<LibraryError> for AppError {
    fn from(e: LibraryError) -> Self {
        AppError::Library(e)
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Export(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

/// User-friendly error messages for UI
impl AppError {
    #[allow(dead_code)]
    pub fn user_message(&self) -> String {
        match self {
            AppError::Library(_) => "A library error occurred. Please try again.".to_string(),
            AppError::Export(_) => "Exporting the selected media failed.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::Config(msg) => msg.clone(),
            AppError::Other(msg) => msg.clone(),
        }
    }
}
