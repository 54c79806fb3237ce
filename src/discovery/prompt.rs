//! Interactive folder prompt

use std::path::{Component, Path, PathBuf};

use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use tracing::debug;

use crate::error::{Result, ShrinkError};

/// Trim the raw answer and drop quoting pasted along with the path
pub fn clean_location(raw: &str) -> String {
    let unquoted: String = raw.trim().chars().filter(|&c| c != '"').collect();
    let unquoted = unquoted.trim();

    unquoted
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(unquoted)
        .trim()
        .to_string()
}

/// Lexically normalize `path` and anchor it on the current directory
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in anchored.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    Ok(normalized)
}

/// Turn an operator answer into an existing directory, or explain why not
pub fn validate_location(raw: &str) -> Result<PathBuf> {
    let cleaned = clean_location(raw);
    if cleaned.is_empty() {
        return Err(ShrinkError::invalid_location(
            "no folder given",
            PathBuf::new(),
        ));
    }

    let path = normalize_path(Path::new(&cleaned))?;
    let metadata = std::fs::metadata(&path)
        .map_err(|e| ShrinkError::invalid_location(e.to_string(), path.clone()))?;

    if !metadata.is_dir() {
        return Err(ShrinkError::invalid_location("not a directory", path));
    }

    debug!("Accepted folder {:?}", path);
    Ok(path)
}

/// Ask for the folder to process until a valid directory is entered
pub fn prompt_scan_root() -> Result<PathBuf> {
    let theme = ColorfulTheme::default();
    let answer: String = Input::with_theme(&theme)
        .with_prompt(
            "Folder containing the images to shrink (e.g. \"C:\\site\\assets\\img\")",
        )
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            validate_location(input)
                .map(|_| ())
                .map_err(|e| e.user_message())
        })
        .interact_text()?;

    validate_location(&answer)
}
