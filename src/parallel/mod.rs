//! Concurrent dispatch of resize jobs

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::ResizeConfig;
use crate::error::{Result, ShrinkError};
use crate::processing::{ImageJob, ProcessingEngine, ProcessingResult};

pub mod progress;

pub use progress::*;

/// Launches every job at once and waits for all of them to settle
pub struct ParallelProcessor {
    engine: Arc<ProcessingEngine>,
    max_concurrent: Option<usize>,
    progress_tracker: Arc<ProgressTracker>,
}

impl ParallelProcessor {
    /// Create a new processor; `max_concurrent = None` leaves dispatch uncapped
    pub fn new(config: ResizeConfig, max_concurrent: Option<usize>) -> Self {
        match max_concurrent {
            Some(limit) => info!("Dispatching with at most {} concurrent resizes", limit),
            None => debug!("Dispatching without a concurrency cap"),
        }

        Self {
            engine: Arc::new(ProcessingEngine::new(config)),
            max_concurrent,
            progress_tracker: Arc::new(ProgressTracker::new()),
        }
    }

    /// Report progress through `tracker` instead of a silent one
    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.progress_tracker = Arc::new(tracker);
        self
    }

    /// Resize every job into `output_dir`.
    ///
    /// Every outcome is collected; a failing job never cuts the wait short.
    pub async fn process_batch(&self, jobs: Vec<ImageJob>, output_dir: &Path) -> Result<BatchProcessingResult> {
        let start_time = Instant::now();
        let total_jobs = jobs.len();

        info!("Starting concurrent processing of {} images", total_jobs);
        self.progress_tracker.start(total_jobs as u64);

        tokio::fs::create_dir_all(output_dir).await?;

        let outcomes = self.process_jobs_async(jobs, output_dir).await;
        self.progress_tracker.finish();

        let processing_time = start_time.elapsed();
        let batch_result = BatchProcessingResult::from_outcomes(outcomes, processing_time);

        info!(
            "Processing completed in {:.2}s ({} ok, {} failed)",
            processing_time.as_secs_f64(),
            batch_result.successful(),
            batch_result.failed()
        );

        Ok(batch_result)
    }

    async fn process_jobs_async(
        &self,
        jobs: Vec<ImageJob>,
        output_dir: &Path,
    ) -> Vec<(String, Result<ProcessingResult>)> {
        let semaphore = self.max_concurrent.map(|limit| Arc::new(Semaphore::new(limit)));
        let mut filenames = Vec::with_capacity(jobs.len());
        let mut tasks = Vec::with_capacity(jobs.len());

        for job in jobs {
            let engine = Arc::clone(&self.engine);
            let semaphore = semaphore.clone();
            let progress_tracker = Arc::clone(&self.progress_tracker);
            let output_dir = output_dir.to_path_buf();
            filenames.push(job.filename.clone());

            let task = tokio::spawn(async move {
                let _permit = match &semaphore {
                    Some(semaphore) => Some(
                        semaphore
                            .acquire()
                            .await
                            .map_err(|e| ShrinkError::task(format!("Semaphore closed: {}", e)))?,
                    ),
                    None => None,
                };

                let result = engine.process_job(&job, &output_dir).await;

                match &result {
                    Ok(_) => progress_tracker.complete_file(&job.filename, true),
                    Err(e) => {
                        progress_tracker.complete_file(&job.filename, false);
                        warn!("Failed to resize {}: {}", job.filename, e);
                    }
                }

                result
            });

            tasks.push(task);
        }

        // join_all keeps every outcome, unlike try_join_all
        let results = futures::future::join_all(tasks).await;

        filenames
            .into_iter()
            .zip(results)
            .map(|(filename, task_result)| {
                let result = task_result
                    .map_err(|e| ShrinkError::task(format!("Task join error: {}", e)))
                    .and_then(|result| result);
                (filename, result)
            })
            .collect()
    }
}

/// A job that did not produce an output file
#[derive(Debug)]
pub struct FailedJob {
    pub filename: String,
    pub error: ShrinkError,
}

/// Result of batch processing operation
#[derive(Debug)]
pub struct BatchProcessingResult {
    pub successful_results: Vec<ProcessingResult>,
    pub failures: Vec<FailedJob>,
    pub processing_time: Duration,
    pub total_input_size: u64,
    pub total_output_size: u64,
}

impl BatchProcessingResult {
    fn from_outcomes(
        outcomes: Vec<(String, Result<ProcessingResult>)>,
        processing_time: Duration,
    ) -> Self {
        let mut successful_results = Vec::new();
        let mut failures = Vec::new();

        for (filename, outcome) in outcomes {
            match outcome {
                Ok(result) => successful_results.push(result),
                Err(error) => failures.push(FailedJob { filename, error }),
            }
        }

        let total_input_size = successful_results.iter().map(|r| r.input_size).sum();
        let total_output_size = successful_results.iter().map(|r| r.output_size).sum();

        Self {
            successful_results,
            failures,
            processing_time,
            total_input_size,
            total_output_size,
        }
    }

    pub fn successful(&self) -> usize {
        self.successful_results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Get size reduction percentage
    pub fn size_reduction(&self) -> f64 {
        if self.total_input_size == 0 {
            return 0.0;
        }
        let reduction = self.total_input_size.saturating_sub(self.total_output_size);
        (reduction as f64 / self.total_input_size as f64) * 100.0
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("Batch Processing Results:");
        println!("  Resized: {}", self.successful());
        if self.failed() > 0 {
            println!("  Failed: {}", self.failed());
        }
        println!("  Duration: {:.2}s", self.processing_time.as_secs_f64());

        if self.successful() > 0 {
            println!(
                "  Size: {:.2}MB -> {:.2}MB ({:.1}% smaller)",
                self.total_input_size as f64 / 1024.0 / 1024.0,
                self.total_output_size as f64 / 1024.0 / 1024.0,
                self.size_reduction()
            );
        }

        if !self.failures.is_empty() {
            println!("\nErrors:");
            for (i, failure) in self.failures.iter().enumerate() {
                println!("  {}: {}: {}", i + 1, failure.filename, failure.error.user_message());
            }
        }
    }
}
