// src/pipeline/crawl.rs

//! Forum crawling pipeline.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, CrawlOutcome, NoticeConfig, NoticeEntry};
use crate::services::{ForumCrawler, PageFetcher};
use crate::utils::log;

/// Run the forum crawler over every configured source.
pub async fn run_crawler(
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<CrawlOutcome> {
    let start_time = Utc::now();
    log::header("Forum crawl starting");
    log::sub_item(&format!(
        "{} sources, up to {} concurrent requests",
        config.sources.len(),
        config.crawler.max_concurrent
    ));

    let crawler = ForumCrawler::new(Arc::clone(&config), fetcher);
    let outcome = crawler.crawl_all().await;

    let elapsed = Utc::now() - start_time;
    log::summary(
        "Forum crawl",
        &[
            ("sources", outcome.sources.len().to_string()),
            ("misconfigured sources", outcome.config_failures.to_string()),
            ("listing failures", outcome.listing_failures.total().to_string()),
            (
                "threads extracted",
                format!("{}/{}", outcome.extracted_count(), outcome.thread_total),
            ),
            ("blocked", outcome.thread_failures.blocked.to_string()),
            ("transport", outcome.thread_failures.transport.to_string()),
            (
                "markup drift",
                (outcome.thread_failures.unexpected_shape + outcome.thread_failures.not_found)
                    .to_string(),
            ),
            ("elapsed", format!("{}s", elapsed.num_seconds())),
        ],
    );

    Ok(outcome)
}

/// Index entries for extracted threads.
///
/// A thread without a parsed date stays out of the index.
pub fn notice_entries(outcome: &CrawlOutcome, notice: &NoticeConfig) -> Vec<NoticeEntry> {
    outcome
        .extracted()
        .filter_map(|post| {
            let Some(date) = post.summary.posted_at else {
                ::log::info!(
                    "Leaving {} out of the index: post date unknown",
                    post.summary.thread_url
                );
                return None;
            };
            Some(NoticeEntry {
                title: post.summary.title.clone(),
                url: post.summary.thread_url.clone(),
                date,
                priority: NoticeEntry::has_priority_marker(
                    &post.summary.thread_url,
                    &notice.priority_markers,
                ),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::ExtractError;
    use crate::models::{ExtractedContent, PostSummary, SourceReport, ThreadReport};

    fn thread(id: u32, date: Option<NaiveDate>, ok: bool) -> ThreadReport {
        let url = format!("https://forum.example.com/forum/view-thread/{id}");
        ThreadReport {
            summary: PostSummary {
                title: format!("Thread {id}"),
                thread_url: url.clone(),
                posted_at: date,
            },
            content: if ok {
                Ok(ExtractedContent {
                    html: "<p>x</p>".into(),
                    plain_text: "x".into(),
                })
            } else {
                Err(ExtractError::NotFound {
                    url,
                    chain: "[div.content]".into(),
                })
            },
        }
    }

    #[test]
    fn test_notice_entries_keep_dated_successes() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5);
        let mut outcome = CrawlOutcome::default();
        outcome.add_source(SourceReport {
            threads: vec![thread(1, date, true), thread(2, None, true), thread(3, date, false)],
            ..SourceReport::new("publisher", "https://forum.example.com/forum/view-forum/1")
        });

        let entries = notice_entries(&outcome, &NoticeConfig::default());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Thread 1");
        assert_eq!(entries[0].url, "https://forum.example.com/forum/view-thread/1");
        assert!(!entries[0].priority);
    }

    #[test]
    fn test_notice_entries_priority_from_url() {
        let mut outcome = CrawlOutcome::default();
        let mut report = thread(1, NaiveDate::from_ymd_opt(2024, 1, 1), true);
        report.summary.thread_url = "https://forum.example.com/notice/1".into();
        outcome.add_source(SourceReport {
            threads: vec![report],
            ..SourceReport::new("partner", "https://forum.example.com/forum")
        });

        let entries = notice_entries(&outcome, &NoticeConfig::default());
        assert!(entries[0].priority);
    }
}
