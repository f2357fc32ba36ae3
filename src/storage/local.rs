//! Local filesystem storage implementation.
//!
//! Serves both the primary notice directory and the publish target mirror.
//! Every whole-file write goes through a temp file and a rename, so readers
//! never observe a partially written index.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{NoticeDocument, NoticeIndex};
use crate::storage::{NoticeStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    index_file: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            index_file: index_file.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Full path of the index file.
    pub fn index_path(&self) -> PathBuf {
        self.path(&self.index_file)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = self.path(&format!(".{key}.tmp"));
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Authored documents with one of the given extensions, sorted by name.
    ///
    /// A missing root directory is a filesystem error; the caller decides
    /// whether that is fatal. Symlinked documents are followed, and a
    /// document that cannot be read is logged and skipped.
    pub async fn list_documents(&self, extensions: &[String]) -> Result<Vec<NoticeDocument>> {
        let mut dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::filesystem(
                    &self.root_dir,
                    "notice directory does not exist",
                ));
            }
            Err(e) => return Err(AppError::filesystem(&self.root_dir, e)),
        };

        let mut documents = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if !has_extension(&path, extensions) {
                continue;
            }
            // Follows symlinks, unlike `DirEntry::metadata`
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    log::warn!("Skipping unreadable notice {}: {}", path.display(), e);
                    continue;
                }
            };

            let (Some(file_name), Some(stem)) = (
                path.file_name().and_then(|n| n.to_str()),
                path.file_stem().and_then(|n| n.to_str()),
            ) else {
                log::warn!("Skipping notice with non UTF-8 name: {}", path.display());
                continue;
            };

            let (bytes, modified) = match (tokio::fs::read(&path).await, metadata.modified()) {
                (Ok(bytes), Ok(modified)) => (bytes, modified),
                (Err(e), _) | (_, Err(e)) => {
                    log::warn!("Skipping unreadable notice {}: {}", path.display(), e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let modified = DateTime::<Local>::from(modified).date_naive();

            documents.push(NoticeDocument {
                file_name: file_name.to_string(),
                stem: stem.to_string(),
                heading: NoticeDocument::find_heading(&text),
                modified,
                path,
            });
        }

        documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(documents)
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

#[async_trait]
impl NoticeStorage for LocalStorage {
    async fn write_index(&self, index: &NoticeIndex) -> Result<WriteMetadata> {
        let bytes = index.to_json()?;
        self.write_bytes(&self.index_file, &bytes).await?;

        Ok(WriteMetadata {
            location: self.index_path().display().to_string(),
            entry_count: index.len(),
            byte_length: bytes.len(),
        })
    }

    async fn copy_document(&self, document: &NoticeDocument) -> Result<()> {
        let bytes = tokio::fs::read(&document.path).await?;
        self.write_bytes(&document.file_name, &bytes).await
    }
}
