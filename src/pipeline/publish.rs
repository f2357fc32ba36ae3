// src/pipeline/publish.rs

//! Publish target synchronization.
//!
//! Mirrors the index and the authored documents into `{target}/notice/` of
//! the first candidate directory that exists. The target is optional: no
//! candidate means nothing to do. Copy failures are reported per file and
//! earlier copies are kept.

use std::path::PathBuf;

use crate::models::{NoticeDocument, NoticeIndex, PathsConfig};
use crate::storage::{LocalStorage, NoticeStorage};

/// Subdirectory of the publish target that receives the notices.
const NOTICE_SUBDIR: &str = "notice";

/// Result of a publish sync.
#[derive(Debug, Default)]
pub struct SyncResult {
    /// Notice directory that was written, `None` when no candidate exists
    pub target: Option<PathBuf>,
    pub index_written: bool,
    pub copied: usize,
    /// Files that could not be written, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl SyncResult {
    pub fn is_noop(&self) -> bool {
        self.target.is_none()
    }
}

/// First candidate that is an existing directory.
pub async fn find_target(candidates: &[PathBuf]) -> Option<PathBuf> {
    for candidate in candidates {
        if tokio::fs::metadata(candidate)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            return Some(candidate.clone());
        }
    }
    None
}

/// Mirror the index and documents into the publish target.
pub async fn sync(
    index: &NoticeIndex,
    documents: &[NoticeDocument],
    paths: &PathsConfig,
) -> SyncResult {
    let Some(root) = find_target(&paths.publish_candidates).await else {
        log::debug!("No publish target among {:?}", paths.publish_candidates);
        return SyncResult::default();
    };

    let target = root.join(NOTICE_SUBDIR);
    let mut result = SyncResult {
        target: Some(target.clone()),
        ..SyncResult::default()
    };

    if let Err(e) = tokio::fs::create_dir_all(&target).await {
        log::warn!("Cannot create publish directory {}: {}", target.display(), e);
        result.failures.push((target, e.to_string()));
        return result;
    }

    let storage = LocalStorage::new(&target, paths.index_file.as_str());
    match storage.write_index(index).await {
        Ok(_) => result.index_written = true,
        Err(e) => record_failure(&mut result, storage.index_path(), &e),
    }

    for document in documents {
        match storage.copy_document(document).await {
            Ok(()) => result.copied += 1,
            Err(e) => record_failure(&mut result, target.join(&document.file_name), &e),
        }
    }

    result
}

fn record_failure(result: &mut SyncResult, path: PathBuf, err: &dyn std::fmt::Display) {
    log::warn!("Publish copy failed for {}: {}", path.display(), err);
    result.failures.push((path, err.to_string()));
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::models::NoticeEntry;

    fn index() -> NoticeIndex {
        NoticeIndex::build(vec![NoticeEntry {
            title: "Release Notes".into(),
            url: "/notice/v1.0.0-priority".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            priority: true,
        }])
    }

    fn paths(candidates: Vec<PathBuf>) -> PathsConfig {
        PathsConfig {
            publish_candidates: candidates,
            ..PathsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_no_candidate_is_noop_success() {
        let tmp = TempDir::new().unwrap();
        let result = sync(&index(), &[], &paths(vec![tmp.path().join("missing")])).await;

        assert!(result.is_noop());
        assert_eq!(result.copied, 0);
        assert!(result.failures.is_empty());
    }

    #[tokio::test]
    async fn test_sync_copies_into_first_existing_candidate() {
        let src = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();
        let body = "# Release Notes\nFixed things.\n";
        std::fs::write(src.path().join("v1.0.0-priority.md"), body).unwrap();
        let documents = LocalStorage::new(src.path(), "list.json")
            .list_documents(&["md".to_string()])
            .await
            .unwrap();

        let candidates = vec![site.path().join("absent"), site.path().to_path_buf()];
        let result = sync(&index(), &documents, &paths(candidates)).await;

        let target = site.path().join("notice");
        assert_eq!(result.target.as_deref(), Some(target.as_path()));
        assert!(result.index_written);
        assert_eq!(result.copied, 1);
        assert_eq!(
            std::fs::read_to_string(target.join("v1.0.0-priority.md")).unwrap(),
            body
        );
        let written: NoticeIndex =
            serde_json::from_slice(&std::fs::read(target.join("list.json")).unwrap()).unwrap();
        assert_eq!(written, index());
    }

    #[tokio::test]
    async fn test_failed_copy_is_reported_not_rolled_back() {
        let src = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();
        std::fs::write(src.path().join("a.md"), "# A").unwrap();
        std::fs::write(src.path().join("b.md"), "# B").unwrap();
        let documents = LocalStorage::new(src.path(), "list.json")
            .list_documents(&["md".to_string()])
            .await
            .unwrap();
        std::fs::remove_file(&documents[1].path).unwrap();

        let result = sync(&index(), &documents, &paths(vec![site.path().to_path_buf()])).await;

        assert_eq!(result.copied, 1);
        assert_eq!(result.failures.len(), 1);
        assert!(site.path().join("notice/a.md").exists());
    }
}
