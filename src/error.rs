//! Error types and handling for BatchShrink

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for BatchShrink operations
pub type Result<T> = std::result::Result<T, ShrinkError>;

/// Main error type for BatchShrink operations
#[derive(Debug, Error)]
pub enum ShrinkError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image format or processing errors
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Operator supplied a path that is not an existing directory
    #[error("Invalid folder location: {message} ({path:?})")]
    InvalidLocation { message: String, path: PathBuf },

    /// Directory listing failed
    #[error("Unable to scan directory {path:?}: {source}")]
    ScanError {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The file could not be opened or read
    #[error("Cannot read file {file:?}: {source}")]
    Unreadable {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a decodable image (corrupt header, unsupported format)
    #[error("Cannot decode image {file:?}: {source}")]
    Undecodable {
        file: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// EXIF metadata could not be carried over
    #[error("Metadata error: {message}")]
    MetadataError { message: String },

    /// Interactive prompt failed (no terminal, interrupted input)
    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),

    /// A spawned resize task panicked or was cancelled
    #[error("Task error: {message}")]
    TaskError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ShrinkError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid location error
    pub fn invalid_location<S: Into<String>>(message: S, path: PathBuf) -> Self {
        Self::InvalidLocation {
            message: message.into(),
            path,
        }
    }

    /// Create a new metadata error
    pub fn metadata<S: Into<String>>(message: S) -> Self {
        Self::MetadataError {
            message: message.into(),
        }
    }

    /// Create a new task error
    pub fn task<S: Into<String>>(message: S) -> Self {
        Self::TaskError {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single file (the batch can continue)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::IoError(_)
            | Self::ImageError(_)
            | Self::Unreadable { .. }
            | Self::Undecodable { .. }
            | Self::MetadataError { .. }
            | Self::TaskError { .. } => true,

            // The operator is asked again
            Self::InvalidLocation { .. } => true,

            Self::ConfigError { .. }
            | Self::ScanError { .. }
            | Self::PromptError(_)
            | Self::SerdeError(_) => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Unreadable { file, .. } | Self::Undecodable { file, .. } => Some(file),
            Self::InvalidLocation { path, .. } | Self::ScanError { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("File system error: {}", e),
            Self::ImageError(e) => format!("Image processing failed: {}", e),
            Self::InvalidLocation { path, .. } => {
                format!("{} is not an existing folder", path.display())
            }
            Self::Unreadable { file, source } => {
                format!("Could not read {}: {}", file.display(), source)
            }
            Self::Undecodable { file, .. } => {
                format!(
                    "{} is corrupt or not a supported image (JPEG, PNG)",
                    file.display()
                )
            }
            Self::PromptError(_) => {
                "The folder prompt needs an interactive terminal".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for ShrinkError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ShrinkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}

/// Error context extension for attaching the file being worked on
pub trait ErrorContext<T> {
    /// Reclassify I/O and image errors as errors about `file`
    fn with_file_context(self, file: PathBuf) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ShrinkError>,
{
    fn with_file_context(self, file: PathBuf) -> Result<T> {
        self.map_err(|e| match e.into() {
            ShrinkError::IoError(source) => ShrinkError::Unreadable { file, source },
            ShrinkError::ImageError(source) => ShrinkError::Undecodable { file, source },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = ShrinkError::config("test message");
        assert!(matches!(err, ShrinkError::ConfigError { .. }));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(ShrinkError::metadata("bad exif").is_recoverable());
        assert!(ShrinkError::invalid_location("nope", PathBuf::from("x")).is_recoverable());
        assert!(!ShrinkError::config("bad").is_recoverable());
    }

    #[test]
    fn test_file_context_reclassifies_io() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result
            .with_file_context(Path::new("a.jpg").to_path_buf())
            .unwrap_err();

        assert!(matches!(err, ShrinkError::Unreadable { .. }));
        assert_eq!(err.file_path(), Some(&PathBuf::from("a.jpg")));
    }

    #[test]
    fn test_file_context_keeps_other_errors() {
        let result: Result<()> = Err(ShrinkError::config("test"));
        let err = result
            .with_file_context(Path::new("a.jpg").to_path_buf())
            .unwrap_err();
        assert!(matches!(err, ShrinkError::ConfigError { .. }));
    }

    #[test]
    fn test_user_messages() {
        let err = ShrinkError::invalid_location("not a directory", PathBuf::from("/tmp/x.txt"));
        assert!(err.user_message().contains("not an existing folder"));
    }
}
