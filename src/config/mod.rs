//! Configuration management for BatchShrink
//!
//! A single [`Config`] value is built once at start-up and handed to every
//! step of the run. Every field has a default, so a config file only needs
//! the values it changes.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ShrinkError};
use crate::processing::resize::FilterType;

pub mod ignore;
pub use ignore::IgnoreList;

/// File names looked up next to the executable by [`Config::discover`]
pub const CONFIG_FILE_NAMES: &[&str] = &["batchshrink.toml", "batchshrink.yaml", "batchshrink.yml"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which files are considered
    pub scan: ScanConfig,

    /// When and how images are resized
    pub resize: ResizeConfig,

    /// Batch guards, concurrency and output location
    pub processing: ProcessingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Candidate selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extension fragments; a lowercase extension containing one qualifies
    pub extensions: Vec<String>,

    /// Stems containing any of these are skipped
    pub ignore_list: IgnoreList,

    /// Nested folder probed when the chosen folder has too few candidates
    pub fallback_subdir: PathBuf,

    /// Below this many candidates the fallback folder is tried
    pub min_candidates: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            ignore_list: IgnoreList::default(),
            fallback_subdir: Path::new("assets").join("img"),
            min_candidates: 2,
        }
    }
}

/// Resize trigger and output settings.
///
/// `threshold` and `target` are deliberately separate: images just over the
/// trigger still shrink to the smaller target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// An image is resized when either side is strictly greater than this
    pub threshold: u32,

    /// Long-axis size of the resized output
    pub target: u32,

    /// JPEG output quality (1-100)
    pub quality: u8,

    /// Resampling filter
    pub filter: FilterType,

    /// Carry EXIF metadata (orientation included) into the output
    pub preserve_metadata: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            threshold: 1200,
            target: 1000,
            quality: 80,
            filter: FilterType::Lanczos3,
            preserve_metadata: true,
        }
    }
}

/// Batch processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// More jobs than this aborts the whole batch
    pub max_jobs: usize,

    /// Cap on in-flight resizes (None = launch every job at once)
    pub max_concurrent: Option<usize>,

    /// Output folder (None = `output` next to the executable)
    pub output_dir: Option<PathBuf>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_jobs: 300,
            max_concurrent: None,
            output_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ShrinkError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(ShrinkError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| ShrinkError::config(format!("TOML serialization failed: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| ShrinkError::config(format!("YAML serialization failed: {}", e)))?,
            _ => {
                return Err(ShrinkError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            ShrinkError::config(format!(
                "Failed to write config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Ok(())
    }

    /// Load the first config file found in `dir`, or defaults when none exists
    pub fn discover_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                let config = Self::from_file(&candidate)?;
                config.validate()?;
                info!("Loaded configuration from {:?}", candidate);
                return Ok(config);
            }
        }

        debug!("No config file in {:?}, using defaults", dir.as_ref());
        Ok(Self::default())
    }

    /// Load configuration from the executable's folder
    pub fn discover() -> Result<Self> {
        Self::discover_in(program_dir()?)
    }

    /// Folder resized images are written to
    pub fn output_dir(&self) -> Result<PathBuf> {
        match &self.processing.output_dir {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => Ok(program_dir()?.join(dir)),
            None => Ok(program_dir()?.join("output")),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ShrinkError::config(
                "At least one image extension must be configured",
            ));
        }

        if self.resize.threshold == 0 || self.resize.target == 0 {
            return Err(ShrinkError::config(
                "Resize threshold and target must be greater than 0",
            ));
        }

        if self.resize.quality == 0 || self.resize.quality > 100 {
            return Err(ShrinkError::config("Quality must be between 1 and 100"));
        }

        if self.processing.max_jobs == 0 {
            return Err(ShrinkError::config("max_jobs must be greater than 0"));
        }

        if self.processing.max_concurrent == Some(0) {
            return Err(ShrinkError::config(
                "max_concurrent must be greater than 0 when set",
            ));
        }

        Ok(())
    }
}

/// Folder containing the running executable
pub fn program_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| ShrinkError::config(format!("Executable {:?} has no parent folder", exe)))
}
