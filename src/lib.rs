//! BatchShrink - shrink the oversized images of a folder
//!
//! Lists one folder, skips files whose names match an ignore list, measures
//! the remaining JPEG/PNG files from their headers and resizes every image
//! with a side above the threshold (1200 px by default) so its long side
//! becomes the target (1000 px by default). Results keep their filename and
//! EXIF metadata and land in an `output` folder next to the executable.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batchshrink::{Config, Pipeline};
//! use std::path::Path;
//!
//! # async fn demo() -> batchshrink::Result<()> {
//! let config = Config::default();
//! let output_dir = config.output_dir()?;
//! batchshrink::prepare_output_dir(&output_dir)?;
//!
//! let report = Pipeline::new(config, output_dir)
//!     .run(Path::new("site/assets/img"))
//!     .await?;
//! println!("{} images written", report.written());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod parallel;
pub mod pipeline;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, IgnoreList, ResizeConfig, ScanConfig};
pub use error::{Result, ShrinkError};
pub use pipeline::{BatchOutcome, Pipeline, RunReport};
pub use processing::{Axis, ImageJob, ProcessingEngine};

use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from the configuration.
///
/// `RUST_LOG` overrides `logging.level` when set. Calling this more than once
/// keeps the first subscriber.
pub fn init(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| ShrinkError::config(format!("Invalid log level '{}': {}", config.logging.level, e)))?;

    let installed = if config.logging.json_format {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .finish(),
        )
        .is_ok()
    } else {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .finish(),
        )
        .is_ok()
    };

    if installed {
        info!("BatchShrink v{} initialized", VERSION);
    }

    Ok(())
}

/// Create the output folder when it does not exist yet
pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    if !output_dir.is_dir() {
        debug!("Creating output folder {:?}", output_dir);
        std::fs::create_dir_all(output_dir)?;
    }
    Ok(())
}
