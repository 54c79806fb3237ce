//! Core image processing functionality

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, warn};

use crate::config::ResizeConfig;
use crate::error::{ErrorContext, Result, ShrinkError};

pub mod dimensions;
pub mod formats;
pub mod metadata;
pub mod resize;

pub use dimensions::*;
pub use formats::*;
pub use resize::*;

/// Side of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    /// The longer side; ties go to height
    pub fn longest(width: u32, height: u32) -> Self {
        if width > height {
            Self::Width
        } else {
            Self::Height
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => f.write_str("width"),
            Self::Height => f.write_str("height"),
        }
    }
}

/// An oversized image scheduled for resizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub source_dir: PathBuf,
    /// Name as stored on disk
    pub file_name: OsString,
    /// Printable form of `file_name`, for logs and reports
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub longest: Axis,
}

impl ImageJob {
    pub fn source_path(&self) -> PathBuf {
        self.source_dir.join(&self.file_name)
    }

    /// Output location; the original filename is reused
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.file_name)
    }
}

/// Core processing engine for image operations
#[derive(Debug, Clone, Default)]
pub struct ProcessingEngine {
    config: ResizeConfig,
}

impl ProcessingEngine {
    /// Create a new processing engine
    pub fn new(config: ResizeConfig) -> Self {
        Self { config }
    }

    /// Decode, shrink, re-encode and write one job into `output_dir`
    pub async fn process_job(&self, job: &ImageJob, output_dir: &Path) -> Result<ProcessingResult> {
        let start_time = Instant::now();
        let input_path = job.source_path();
        let output_path = job.output_path(output_dir);

        debug!("Processing file: {:?} -> {:?}", input_path, output_path);

        let source = fs::read(&input_path)
            .await
            .with_file_context(input_path.clone())?;
        let input_size = source.len() as u64;

        let encoded = tokio::task::spawn_blocking({
            let config = self.config.clone();
            let job = job.clone();
            let input_path = input_path.clone();
            move || shrink_encoded(&source, &job, &config, input_path)
        })
        .await
        .map_err(|e| ShrinkError::task(format!("Task join error: {}", e)))??;

        if fs::try_exists(&output_path).await.unwrap_or(false) {
            debug!("Overwriting existing output {:?}", output_path);
        }

        fs::write(&output_path, &encoded.bytes)
            .await
            .with_file_context(output_path.clone())?;

        Ok(ProcessingResult {
            filename: job.filename.clone(),
            input_path,
            output_path,
            original_dimensions: (job.width, job.height),
            output_dimensions: encoded.dimensions,
            input_size,
            output_size: encoded.bytes.len() as u64,
            metadata_preserved: encoded.metadata_preserved,
            processing_time: start_time.elapsed(),
        })
    }
}

struct EncodedImage {
    bytes: Vec<u8>,
    dimensions: (u32, u32),
    metadata_preserved: bool,
}

fn shrink_encoded(
    source: &[u8],
    job: &ImageJob,
    config: &ResizeConfig,
    input_path: PathBuf,
) -> Result<EncodedImage> {
    let format = image::guess_format(source).with_file_context(input_path.clone())?;
    let image = image::load_from_memory_with_format(source, format)
        .with_file_context(input_path.clone())?;

    let resized = resize::shrink(&image, job.longest, config.target, config.filter);
    let dimensions = (resized.width(), resized.height());
    let mut bytes = formats::encode(&resized, format, config.quality)?;

    let mut metadata_preserved = false;
    if config.preserve_metadata {
        match metadata::read_exif(source) {
            Ok(Some(exif)) => match metadata::embed_exif(format, bytes.clone(), &exif) {
                Ok(tagged) => {
                    bytes = tagged;
                    metadata_preserved = true;
                }
                Err(e) => warn!("{}: writing without metadata: {}", job.filename, e),
            },
            Ok(None) => debug!("{}: no EXIF metadata", job.filename),
            Err(e) => warn!("{}: writing without metadata: {}", job.filename, e),
        }
    }

    Ok(EncodedImage {
        bytes,
        dimensions,
        metadata_preserved,
    })
}

/// Result of processing an image
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub filename: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub original_dimensions: (u32, u32),
    pub output_dimensions: (u32, u32),
    pub input_size: u64,
    pub output_size: u64,
    pub metadata_preserved: bool,
    pub processing_time: Duration,
}

impl ProcessingResult {
    /// Get size reduction percentage
    pub fn size_reduction(&self) -> f64 {
        if self.input_size == 0 {
            return 0.0;
        }
        let reduction = self.input_size.saturating_sub(self.output_size);
        (reduction as f64 / self.input_size as f64) * 100.0
    }
}
