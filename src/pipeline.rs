//! One pass over a folder: resolve, measure, guard, dispatch

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::discovery::{resolve_scan_root, Resolution};
use crate::error::Result;
use crate::parallel::{BatchProcessingResult, ParallelProcessor, ProgressTracker};
use crate::processing::{evaluate, SkippedImage, Verdict};

/// How a run ended
#[derive(Debug)]
pub enum BatchOutcome {
    /// No image exceeded the threshold; nothing was written
    NothingToDo,
    /// The batch guard tripped; nothing was written
    TooMany { count: usize, limit: usize },
    /// Jobs were dispatched
    Completed(BatchProcessingResult),
}

/// Everything a run learned, for reporting
#[derive(Debug)]
pub struct RunReport {
    pub resolution: Resolution,
    /// Candidates whose size could be read
    pub measured: usize,
    /// Measured images above the threshold
    pub oversized: usize,
    pub skipped: Vec<SkippedImage>,
    pub outcome: BatchOutcome,
}

impl RunReport {
    /// Number of files written to the output folder
    pub fn written(&self) -> usize {
        match &self.outcome {
            BatchOutcome::Completed(result) => result.successful(),
            _ => 0,
        }
    }
}

/// Batch driver bound to a configuration and an output folder
pub struct Pipeline {
    config: Config,
    output_dir: PathBuf,
    processor: ParallelProcessor,
}

impl Pipeline {
    pub fn new(config: Config, output_dir: PathBuf) -> Self {
        let processor = ParallelProcessor::new(config.resize.clone(), config.processing.max_concurrent);
        Self {
            config,
            output_dir,
            processor,
        }
    }

    /// Report dispatch progress through `tracker`
    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.processor = self.processor.with_progress(tracker);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Process the images of `root`
    pub async fn run(&self, root: &Path) -> Result<RunReport> {
        let resolution = resolve_scan_root(root, &self.config.scan)?;
        info!(
            "{} candidate image(s) in {:?}",
            resolution.candidates.len(),
            resolution.root
        );

        let mut evaluation = evaluate(&resolution.root, &resolution.candidates, &self.config.resize);
        let skipped = std::mem::take(&mut evaluation.skipped);
        let measured = evaluation.measured;
        let oversized = evaluation.jobs.len();

        let outcome = match evaluation.verdict(self.config.processing.max_jobs) {
            Verdict::NothingToDo => BatchOutcome::NothingToDo,
            Verdict::TooMany { count, limit } => BatchOutcome::TooMany { count, limit },
            Verdict::Ready(jobs) => {
                BatchOutcome::Completed(self.processor.process_batch(jobs, &self.output_dir).await?)
            }
        };

        Ok(RunReport {
            resolution,
            measured,
            oversized,
            skipped,
            outcome,
        })
    }
}
