//! Header-only dimension probing and job selection

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::ResizeConfig;
use crate::discovery::Candidate;
use crate::error::{ErrorContext, Result, ShrinkError};
use crate::processing::{Axis, ImageJob};

/// Read width and height from the image header without decoding pixels
pub fn measure<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .with_file_context(path.to_path_buf())?;

    reader
        .into_dimensions()
        .with_file_context(path.to_path_buf())
}

/// Build a job when either side is strictly greater than `threshold`
pub fn select_job<S: AsRef<OsStr>>(
    source_dir: &Path,
    file_name: S,
    width: u32,
    height: u32,
    threshold: u32,
) -> Option<ImageJob> {
    if width > threshold || height > threshold {
        let file_name = file_name.as_ref();
        Some(ImageJob {
            source_dir: source_dir.to_path_buf(),
            file_name: file_name.to_os_string(),
            filename: file_name.to_string_lossy().into_owned(),
            width,
            height,
            longest: Axis::longest(width, height),
        })
    } else {
        None
    }
}

/// A candidate that could not be measured
#[derive(Debug)]
pub struct SkippedImage {
    pub filename: String,
    pub error: ShrinkError,
}

impl fmt::Display for SkippedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.filename, self.error.user_message())
    }
}

/// Outcome of measuring every candidate of a scan
#[derive(Debug, Default)]
pub struct Evaluation {
    pub jobs: Vec<ImageJob>,
    pub skipped: Vec<SkippedImage>,
    /// Candidates measured successfully, oversized or not
    pub measured: usize,
}

/// What the batch should do with an [`Evaluation`]
#[derive(Debug)]
pub enum Verdict {
    /// No oversized images
    NothingToDo,
    /// More jobs than the batch limit; nothing is resized
    TooMany { count: usize, limit: usize },
    /// Jobs to dispatch
    Ready(Vec<ImageJob>),
}

impl Evaluation {
    /// Apply the batch guards
    pub fn verdict(self, max_jobs: usize) -> Verdict {
        let count = self.jobs.len();
        if count > max_jobs {
            warn!(
                "{} images need resizing, more than the limit of {}; is this the right folder?",
                count, max_jobs
            );
            Verdict::TooMany {
                count,
                limit: max_jobs,
            }
        } else if count == 0 {
            info!("No image exceeds the size threshold");
            Verdict::NothingToDo
        } else {
            Verdict::Ready(self.jobs)
        }
    }
}

/// Measure each candidate in `dir` and keep the oversized ones.
///
/// Unreadable or corrupt files are logged and skipped; they never stop the
/// evaluation.
pub fn evaluate(dir: &Path, candidates: &[Candidate], config: &ResizeConfig) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for candidate in candidates {
        let path: PathBuf = dir.join(&candidate.file_name);
        match measure(&path) {
            Ok((width, height)) => {
                evaluation.measured += 1;
                debug!("{}: {}x{}", candidate.filename, width, height);

                if let Some(job) = select_job(dir, &candidate.file_name, width, height, config.threshold) {
                    info!("Resizing image {} ({}x{}, longest {})", job.filename, width, height, job.longest);
                    evaluation.jobs.push(job);
                }
            }
            Err(error) => {
                warn!("Error with image file {}: {}", candidate.filename, error);
                evaluation.skipped.push(SkippedImage {
                    filename: candidate.filename.clone(),
                    error,
                });
            }
        }
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        RgbImage::new(width, height)
            .save_with_format(dir.join(name), image::ImageFormat::Png)
            .unwrap();
    }

    fn candidate(name: &str) -> Candidate {
        Candidate::from_filename(name).unwrap()
    }

    #[test]
    fn test_select_wide_image() {
        let job = select_job(Path::new("/img"), "wide.jpg", 1201, 800, 1200).unwrap();
        assert_eq!(job.longest, Axis::Width);
        assert_eq!(job.source_path(), Path::new("/img/wide.jpg"));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(select_job(Path::new("/img"), "tall.jpg", 800, 1200, 1200).is_none());
        assert!(select_job(Path::new("/img"), "edge.jpg", 1200, 1200, 1200).is_none());
    }

    #[test]
    fn test_select_tall_and_square_images() {
        let tall = select_job(Path::new("/img"), "tall.jpg", 900, 1300, 1200).unwrap();
        assert_eq!(tall.longest, Axis::Height);

        let square = select_job(Path::new("/img"), "sq.jpg", 2000, 2000, 1200).unwrap();
        assert_eq!(square.longest, Axis::Height);
    }

    #[test]
    fn test_measure_reads_header() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "a.png", 30, 20);
        assert_eq!(measure(dir.path().join("a.png")).unwrap(), (30, 20));
    }

    #[test]
    fn test_measure_error_classes() {
        let dir = TempDir::new().unwrap();

        let missing = measure(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(missing, ShrinkError::Unreadable { .. }));

        std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();
        let corrupt = measure(dir.path().join("broken.png")).unwrap_err();
        assert!(matches!(corrupt, ShrinkError::Undecodable { .. }));
    }

    #[test]
    fn test_evaluate_skips_corrupt_files() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "big.png", 1300, 10);
        write_png(dir.path(), "small.png", 100, 100);
        std::fs::write(dir.path().join("broken.jpg"), b"garbage").unwrap();

        let candidates = vec![candidate("big.png"), candidate("broken.jpg"), candidate("small.png")];
        let evaluation = evaluate(dir.path(), &candidates, &ResizeConfig::default());

        assert_eq!(evaluation.measured, 2);
        assert_eq!(evaluation.jobs.len(), 1);
        assert_eq!(evaluation.jobs[0].filename, "big.png");
        assert_eq!(evaluation.skipped.len(), 1);
        assert_eq!(evaluation.skipped[0].filename, "broken.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_evaluate_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"gr\xfcn.png");
        if RgbImage::new(1300, 10)
            .save_with_format(dir.path().join(raw), image::ImageFormat::Png)
            .is_err()
        {
            // Some file systems only accept UTF-8 names
            return;
        }

        let candidates = vec![Candidate::from_file_name(raw).unwrap()];
        let evaluation = evaluate(dir.path(), &candidates, &ResizeConfig::default());

        assert!(evaluation.skipped.is_empty());
        assert_eq!(evaluation.jobs.len(), 1);
        assert_eq!(evaluation.jobs[0].source_path(), dir.path().join(raw));
    }

    #[test]
    fn test_verdict_limits() {
        let job = select_job(Path::new("/img"), "a.png", 2000, 10, 1200).unwrap();

        let at_limit = Evaluation {
            jobs: vec![job.clone(); 300],
            ..Default::default()
        };
        assert!(matches!(at_limit.verdict(300), Verdict::Ready(jobs) if jobs.len() == 300));

        let over_limit = Evaluation {
            jobs: vec![job; 301],
            ..Default::default()
        };
        assert!(matches!(
            over_limit.verdict(300),
            Verdict::TooMany { count: 301, limit: 300 }
        ));

        assert!(matches!(Evaluation::default().verdict(300), Verdict::NothingToDo));
    }
}
