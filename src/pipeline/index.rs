// src/pipeline/index.rs

//! Notice index building.

use crate::models::{NoticeConfig, NoticeDocument, NoticeEntry, NoticeIndex};

/// Entry for an authored notice document.
pub fn authored_entry(document: &NoticeDocument, notice: &NoticeConfig) -> NoticeEntry {
    NoticeEntry {
        title: document.title().to_string(),
        url: notice.url_for(&document.stem),
        date: document.modified,
        priority: NoticeEntry::has_priority_marker(&document.file_name, &notice.priority_markers),
    }
}

/// Merge authored documents and extracted entries into a fresh index.
///
/// Authored documents come first in the input, so on a URL clash with the
/// same date the authored entry is kept.
pub fn build_index(
    documents: &[NoticeDocument],
    extracted: Vec<NoticeEntry>,
    notice: &NoticeConfig,
) -> NoticeIndex {
    let authored = documents.iter().map(|doc| authored_entry(doc, notice));
    NoticeIndex::build(authored.chain(extracted))
}
