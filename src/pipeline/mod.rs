//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Extract notices from the configured forum sources
//! - `build_index`: Merge authored and extracted notices
//! - `sync`: Mirror the index into the publish target
//! - `run_pipeline`: All of the above, in order

pub mod crawl;
pub mod index;
pub mod pipeline;
pub mod publish;
pub mod validate;

pub use crawl::{notice_entries, run_crawler};
pub use index::{authored_entry, build_index};
pub use pipeline::{PipelineReport, run_pipeline};
pub use publish::{SyncResult, sync};
pub use validate::run_validate;
