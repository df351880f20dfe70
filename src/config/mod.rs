//! Storage configuration.
//!
//! All settings have defaults. Override with `CACHETTE_*` environment
//! variables, or build the struct directly.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::codec::{DEFAULT_JPEG_QUALITY, ImageFormat, StructuredFormat};

/// Settings resolved once when a [`crate::Storage`] is constructed.
///
/// The configuration is immutable for the instance's lifetime; in particular
/// the resolved folder path never changes after construction.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding all storage folders. Default: `./.cachette`.
    pub root_dir: PathBuf,

    /// Name of this storage's folder under `root_dir`. Default: `default`.
    pub folder_name: String,

    /// Optional cap on the folder's total size in bytes. Saves that would
    /// push past it fail; nothing is evicted. Default: unbounded.
    pub max_disk_bytes: Option<u64>,

    /// Max entries in the in-memory tier. Default: `10_000`.
    pub memory_capacity: u64,

    /// Wire format for structured values. Default: JSON.
    pub structured_format: StructuredFormat,

    /// Container format for saved images. Default: PNG.
    pub image_format: ImageFormat,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./.cachette"),
            folder_name: "default".to_string(),
            max_disk_bytes: None,
            memory_capacity: 10_000,
            structured_format: StructuredFormat::Json,
            image_format: ImageFormat::Png,
        }
    }
}

impl StorageConfig {
    const ENV_DIR: &'static str = "CACHETTE_DIR";
    const ENV_FOLDER: &'static str = "CACHETTE_FOLDER";
    const ENV_MAX_DISK_BYTES: &'static str = "CACHETTE_MAX_DISK_BYTES";
    const ENV_MEMORY_CAPACITY: &'static str = "CACHETTE_MEMORY_CAPACITY";
    const ENV_IMAGE_FORMAT: &'static str = "CACHETTE_IMAGE_FORMAT";
    const ENV_JPEG_QUALITY: &'static str = "CACHETTE_JPEG_QUALITY";

    /// Creates a config for `folder_name` under `root_dir`, defaults elsewhere.
    pub fn new(root_dir: impl Into<PathBuf>, folder_name: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            folder_name: folder_name.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let root_dir = Self::parse_path_from_env(Self::ENV_DIR, defaults.root_dir);
        let folder_name = Self::parse_string_from_env(Self::ENV_FOLDER, defaults.folder_name);
        let max_disk_bytes = Self::parse_max_disk_bytes_from_env()?;
        let memory_capacity =
            Self::parse_u64_from_env(Self::ENV_MEMORY_CAPACITY, defaults.memory_capacity);
        let image_format = Self::parse_image_format_from_env(defaults.image_format)?;

        Ok(Self {
            root_dir,
            folder_name,
            max_disk_bytes,
            memory_capacity,
            structured_format: defaults.structured_format,
            image_format,
        })
    }

    /// Validates basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.folder_name.is_empty() {
            return Err(ConfigError::EmptyFolderName);
        }

        if self.folder_name.contains('/') || self.folder_name.contains('\\') {
            return Err(ConfigError::FolderNameWithSeparator {
                name: self.folder_name.clone(),
            });
        }

        if self.root_dir.exists() && !self.root_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.root_dir.clone(),
            });
        }

        let folder = self.folder_path();
        if folder.exists() && !folder.is_dir() {
            return Err(ConfigError::NotADirectory { path: folder });
        }

        Ok(())
    }

    /// Resolved folder backing this storage.
    pub fn folder_path(&self) -> PathBuf {
        self.root_dir.join(&self.folder_name)
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_max_disk_bytes_from_env() -> Result<Option<u64>, ConfigError> {
        match env::var(Self::ENV_MAX_DISK_BYTES) {
            Ok(value) => {
                let bytes: u64 = value.parse().map_err(|_| ConfigError::InvalidNumber {
                    name: Self::ENV_MAX_DISK_BYTES,
                    value: value.clone(),
                })?;
                Ok(Some(bytes))
            }
            Err(_) => Ok(None),
        }
    }

    fn parse_image_format_from_env(default: ImageFormat) -> Result<ImageFormat, ConfigError> {
        let Ok(value) = env::var(Self::ENV_IMAGE_FORMAT) else {
            return Ok(default);
        };

        match value.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => {
                let quality = Self::parse_jpeg_quality_from_env()?;
                Ok(ImageFormat::Jpeg { quality })
            }
            _ => Err(ConfigError::InvalidImageFormat { value }),
        }
    }

    fn parse_jpeg_quality_from_env() -> Result<u8, ConfigError> {
        let Ok(value) = env::var(Self::ENV_JPEG_QUALITY) else {
            return Ok(DEFAULT_JPEG_QUALITY);
        };

        let quality: u8 = value.parse().map_err(|_| ConfigError::InvalidJpegQuality {
            value: value.clone(),
        })?;

        if !(1..=100).contains(&quality) {
            return Err(ConfigError::InvalidJpegQuality { value });
        }

        Ok(quality)
    }
}
