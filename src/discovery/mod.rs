//! Locating the images to work on
//!
//! [`scan_candidates`] lists one folder and keeps image-like files that are
//! not on the ignore list. [`resolve_scan_root`] wraps it with the
//! `assets/img` fallback for folders that turn out to be nearly empty.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{Result, ShrinkError};
use crate::processing::formats::is_image_extension;

pub mod prompt;

pub use prompt::{clean_location, normalize_path, prompt_scan_root, validate_location};

/// A directory entry that passed the name filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Name as stored on disk, used to build paths
    pub file_name: OsString,
    /// Printable form of `file_name`
    pub filename: String,
    pub stem: String,
    pub extension: String,
}

impl Candidate {
    /// Split a filename into stem and extension; `None` when it has no extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::from_file_name(OsStr::new(filename))
    }

    /// Same as [`Candidate::from_filename`] for names that may not be UTF-8.
    ///
    /// Stem and extension are matched in their lossy form only.
    pub fn from_file_name(file_name: &OsStr) -> Option<Self> {
        let path = Path::new(file_name);
        let extension = path.extension()?.to_string_lossy().into_owned();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Some(Self {
            file_name: file_name.to_os_string(),
            filename: file_name.to_string_lossy().into_owned(),
            stem,
            extension,
        })
    }

    /// Whether this file should be measured under `config`
    pub fn is_wanted(&self, config: &ScanConfig) -> bool {
        is_image_extension(&self.extension, &config.extensions)
            && !config.ignore_list.matches(&self.stem)
    }
}

/// List `dir` (not recursively) and keep the wanted image files.
///
/// Order follows the file system listing and is not stable across platforms.
/// Only a folder that cannot be listed is an error; an entry that cannot be
/// inspected, such as a dangling symlink, is logged and left out.
pub fn scan_candidates(dir: &Path, config: &ScanConfig) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(ShrinkError::ScanError {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match Candidate::from_file_name(entry.file_name()) {
            Some(candidate) if candidate.is_wanted(config) => candidates.push(candidate),
            _ => debug!("Skipping {}", entry.file_name().to_string_lossy()),
        }
    }

    debug!("{} candidates in {:?}", candidates.len(), dir);
    Ok(candidates)
}

/// Folder that will actually be processed, with its candidates
#[derive(Debug, Clone)]
pub struct Resolution {
    pub root: PathBuf,
    pub candidates: Vec<Candidate>,
    /// Too few candidates were found and the nested folder was probed
    pub fallback_attempted: bool,
    /// The nested folder existed and replaced the chosen one
    pub fallback_used: bool,
}

/// Scan `root`; with fewer than `min_candidates` results, try `root/assets/img`
/// once and use it when it exists.
pub fn resolve_scan_root(root: &Path, config: &ScanConfig) -> Result<Resolution> {
    let candidates = scan_candidates(root, config)?;

    if candidates.len() >= config.min_candidates {
        return Ok(Resolution {
            root: root.to_path_buf(),
            candidates,
            fallback_attempted: false,
            fallback_used: false,
        });
    }

    let nested = root.join(&config.fallback_subdir);
    if nested.is_dir() {
        info!(
            "Only {} candidate(s) in {:?}, trying {:?}",
            candidates.len(),
            root,
            nested
        );
        let candidates = scan_candidates(&nested, config)?;
        return Ok(Resolution {
            root: nested,
            candidates,
            fallback_attempted: true,
            fallback_used: true,
        });
    }

    debug!("No {:?} folder, keeping {:?}", config.fallback_subdir, root);
    Ok(Resolution {
        root: root.to_path_buf(),
        candidates,
        fallback_attempted: true,
        fallback_used: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn names(candidates: &[Candidate]) -> Vec<String> {
        let mut names: Vec<String> = candidates.iter().map(|c| c.filename.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_candidate_parts() {
        let candidate = Candidate::from_filename("archive.tar.PNG").unwrap();
        assert_eq!(candidate.stem, "archive.tar");
        assert_eq!(candidate.extension, "PNG");

        assert!(Candidate::from_filename("README").is_none());
        assert!(Candidate::from_filename(".png").is_none());
    }

    #[test]
    fn test_scan_extension_filter() {
        let dir = TempDir::new().unwrap();
        for name in ["a.JPG", "b.Png", "c.jpeg", "d.gif", "e.txt", "f"] {
            touch(dir.path(), name);
        }

        let found = scan_candidates(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(names(&found), vec!["a.JPG", "b.Png", "c.jpeg"]);
    }

    #[test]
    fn test_scan_ignore_list() {
        let dir = TempDir::new().unwrap();
        for name in [
            "MindsOn_intro.jpg",
            "unit_consolidation.png",
            "u1_ACTION_2.jpeg",
            "learninggoals.png",
            "silo.jpg",
            "harbour.jpg",
        ] {
            touch(dir.path(), name);
        }

        let found = scan_candidates(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(names(&found), vec!["harbour.jpg"]);
    }

    #[test]
    fn test_scan_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("folder.png")).unwrap();
        touch(dir.path(), "real.png");

        let found = scan_candidates(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(names(&found), vec!["real.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlink_to_file() {
        let dir = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(target.path(), "real.jpg");
        std::os::unix::fs::symlink(target.path().join("real.jpg"), dir.path().join("link.jpg")).unwrap();
        std::os::unix::fs::symlink(target.path(), dir.path().join("folder.png")).unwrap();

        let found = scan_candidates(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(names(&found), vec!["link.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_dangling_symlink() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "b.jpg");
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), dir.path().join("link.jpg")).unwrap();

        let found = scan_candidates(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(names(&found), vec!["a.jpg", "b.jpg"]);

        let resolution = resolve_scan_root(dir.path(), &ScanConfig::default()).unwrap();
        assert!(!resolution.fallback_attempted);
        assert_eq!(resolution.candidates.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_keeps_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"caf\xe9.png");
        match fs::write(dir.path().join(raw), b"x") {
            Ok(()) => {}
            // Some file systems only accept UTF-8 names
            Err(_) => return,
        }

        let found = scan_candidates(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name.as_os_str(), raw);
        assert_eq!(found[0].filename, "caf\u{FFFD}.png");
        assert!(dir.path().join(&found[0].file_name).is_file());
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = scan_candidates(&dir.path().join("gone"), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ShrinkError::ScanError { .. }));
    }

    #[test]
    fn test_no_fallback_with_enough_candidates() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "b.jpg");
        fs::create_dir_all(dir.path().join("assets/img")).unwrap();
        touch(&dir.path().join("assets/img"), "c.jpg");

        let resolution = resolve_scan_root(dir.path(), &ScanConfig::default()).unwrap();
        assert!(!resolution.fallback_attempted);
        assert_eq!(resolution.root, dir.path());
        assert_eq!(resolution.candidates.len(), 2);
    }

    #[test]
    fn test_fallback_to_nested_folder() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "only.jpg");
        let nested = dir.path().join("assets").join("img");
        fs::create_dir_all(&nested).unwrap();
        for name in ["x.png", "y.png", "z.png"] {
            touch(&nested, name);
        }

        let resolution = resolve_scan_root(dir.path(), &ScanConfig::default()).unwrap();
        assert!(resolution.fallback_attempted);
        assert!(resolution.fallback_used);
        assert_eq!(resolution.root, nested);
        assert_eq!(names(&resolution.candidates), vec!["x.png", "y.png", "z.png"]);
    }

    #[test]
    fn test_fallback_missing_keeps_original() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "only.jpg");

        let resolution = resolve_scan_root(dir.path(), &ScanConfig::default()).unwrap();
        assert!(resolution.fallback_attempted);
        assert!(!resolution.fallback_used);
        assert_eq!(resolution.root, dir.path());
        assert_eq!(names(&resolution.candidates), vec!["only.jpg"]);
    }

    #[test]
    fn test_fallback_is_not_chained() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("assets").join("img");
        fs::create_dir_all(nested.join("assets").join("img")).unwrap();
        touch(&nested.join("assets").join("img"), "deep.jpg");

        let resolution = resolve_scan_root(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(resolution.root, nested);
        assert!(resolution.candidates.is_empty());
    }
}
