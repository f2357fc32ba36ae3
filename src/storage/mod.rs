//! Storage abstractions for the notice index.
//!
//! The index is the only durable state. It is replaced as a whole file on
//! every run, next to the authored documents it was built from.
//!
//! ## Directory Structure
//!
//! ```text
//! notice/
//! ├── list.json             # Generated index
//! ├── v1.0.0-priority.md    # Authored notices
//! └── maintenance.md
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NoticeDocument, NoticeIndex};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about an index write.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Where the index was written
    pub location: String,
    /// Number of entries written
    pub entry_count: usize,
    /// Serialized size in bytes
    pub byte_length: usize,
}

/// Trait for notice storage backends.
#[async_trait]
pub trait NoticeStorage: Send + Sync {
    /// Replace the index file atomically.
    async fn write_index(&self, index: &NoticeIndex) -> Result<WriteMetadata>;

    /// Copy an authored document into this storage, byte for byte.
    async fn copy_document(&self, document: &NoticeDocument) -> Result<()>;
}
