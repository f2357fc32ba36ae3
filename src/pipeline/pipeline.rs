// src/pipeline/pipeline.rs

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, CrawlOutcome, NoticeIndex};
use crate::services::PageFetcher;
use crate::storage::{LocalStorage, NoticeStorage, WriteMetadata};
use crate::utils::log;

use super::crawl::{notice_entries, run_crawler};
use super::index::build_index;
use super::publish::{SyncResult, sync};

/// What a pipeline run produced.
#[derive(Debug)]
pub struct PipelineReport {
    /// Authored documents found in the notice directory
    pub documents: usize,
    /// `None` when the forum crawl was skipped
    pub crawl: Option<CrawlOutcome>,
    pub index: NoticeIndex,
    pub written: WriteMetadata,
    pub sync: SyncResult,
}

/// Run the full pipeline.
///
/// The notice directory is checked before any network traffic; its absence
/// is the only fatal condition besides failing to write the primary index.
/// Without a fetcher the forum crawl is skipped and only authored notices
/// are indexed.
pub async fn run_pipeline(
    config: Arc<Config>,
    fetcher: Option<Arc<dyn PageFetcher>>,
) -> Result<PipelineReport> {
    log::header("Notice pipeline starting");
    let total_steps = 4;

    log::step(1, total_steps, "Load - Reading authored notices");
    let primary = LocalStorage::new(&config.paths.notice_dir, config.paths.index_file.as_str());
    let documents = primary.list_documents(&config.notice.extensions).await?;
    log::sub_item(&format!(
        "{} documents in {}",
        documents.len(),
        config.paths.notice_dir.display()
    ));

    log::step(2, total_steps, "Crawl - Extracting forum notices");
    let crawl = match fetcher {
        Some(fetcher) => Some(run_crawler(Arc::clone(&config), fetcher).await?),
        None => {
            log::sub_item("Skipped (offline)");
            None
        }
    };
    let extracted = crawl
        .as_ref()
        .map(|outcome| notice_entries(outcome, &config.notice))
        .unwrap_or_default();

    log::step(3, total_steps, "Index - Writing notice index");
    let index = build_index(&documents, extracted, &config.notice);
    let written = primary.write_index(&index).await?;
    log::sub_item(&format!(
        "{} entries ({} bytes) written to {}",
        written.entry_count, written.byte_length, written.location
    ));

    log::step(4, total_steps, "Publish - Syncing publish target");
    let sync = sync(&index, &documents, &config.paths).await;
    match &sync.target {
        Some(target) => log::sub_item(&format!(
            "{} documents copied to {} ({} failures)",
            sync.copied,
            target.display(),
            sync.failures.len()
        )),
        None => log::sub_item("No publish target present"),
    }

    Ok(PipelineReport {
        documents: documents.len(),
        crawl,
        index,
        written,
        sync,
    })
}
