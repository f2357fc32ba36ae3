//! Notice index data structures.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One published notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeEntry {
    /// Display title
    pub title: String,

    /// Published URL, unique within an index
    pub url: String,

    /// Calendar date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Whether the client should pin this notice
    pub priority: bool,
}

impl NoticeEntry {
    /// Whether an identifier (filename, URL) carries any priority marker.
    ///
    /// Plain case-sensitive substring match.
    pub fn has_priority_marker(identifier: &str, markers: &[String]) -> bool {
        markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| identifier.contains(m.as_str()))
    }
}

/// The published notice list, newest first with unique URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct NoticeIndex {
    entries: Vec<NoticeEntry>,
}

impl NoticeIndex {
    /// Build an index from entries in input order.
    ///
    /// Sorting is stable, so entries sharing a date keep their input order.
    /// When a URL repeats, the first entry after sorting wins.
    pub fn build(entries: impl IntoIterator<Item = NoticeEntry>) -> Self {
        let mut entries: Vec<NoticeEntry> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        let mut seen = HashSet::new();
        entries.retain(|entry| seen.insert(entry.url.clone()));

        Self { entries }
    }

    pub fn entries(&self) -> &[NoticeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as `list.json`: a JSON array with 2-space indentation.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// An authored Markdown notice found in the notice directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeDocument {
    pub path: PathBuf,

    /// File name including extension, e.g. `v1.0.0-priority.md`
    pub file_name: String,

    /// File name without extension; the published URL path segment
    pub stem: String,

    /// Text of the first `# ` line, if any
    pub heading: Option<String>,

    /// Local calendar date of the last modification
    pub modified: NaiveDate,
}

impl NoticeDocument {
    /// Display title: the heading, else the stem.
    pub fn title(&self) -> &str {
        self.heading.as_deref().unwrap_or(&self.stem)
    }

    /// First line starting with `# `, without the marker.
    pub fn find_heading(text: &str) -> Option<String> {
        text.lines()
            .find_map(|line| line.strip_prefix("# "))
            .map(|heading| heading.trim().to_string())
            .filter(|heading| !heading.is_empty())
    }
}
