//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Folder name is empty.
    #[error("folder name must not be empty")]
    EmptyFolderName,

    /// Folder name would escape the root directory.
    #[error("folder name '{name}' must not contain path separators")]
    FolderNameWithSeparator {
        /// Offending folder name.
        name: String,
    },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// Image format string was not recognized.
    #[error("invalid image format '{value}': expected 'png' or 'jpeg'")]
    InvalidImageFormat {
        /// Value that failed to parse.
        value: String,
    },

    /// JPEG quality is outside `1..=100`.
    #[error("invalid JPEG quality '{value}': must be between 1 and 100")]
    InvalidJpegQuality {
        /// Value that failed to parse.
        value: String,
    },

    /// A numeric environment override could not be parsed.
    #[error("failed to parse {name} value '{value}'")]
    InvalidNumber {
        /// Environment variable name.
        name: &'static str,
        /// Value that failed to parse.
        value: String,
    },
}
