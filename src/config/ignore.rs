//! Filename ignore list

use serde::{Deserialize, Serialize};

/// Lowercase substrings; a filename stem containing any of them is skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IgnoreList {
    entries: Vec<String>,
}

impl IgnoreList {
    /// Build a list, lowercasing every entry and dropping empty ones
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Whether `stem` contains any entry, ignoring case
    pub fn matches(&self, stem: &str) -> bool {
        let stem = stem.to_lowercase();
        self.entries.iter().any(|entry| stem.contains(entry.as_str()))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(["mindson", "consolidation", "action", "learninggoals", "ilo"])
    }
}

impl From<Vec<String>> for IgnoreList {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}

impl From<IgnoreList> for Vec<String> {
    fn from(list: IgnoreList) -> Self {
        list.entries
    }
}
