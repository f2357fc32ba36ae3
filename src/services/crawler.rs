// src/services/crawler.rs

//! Forum crawler service.
//!
//! Fetches each source's listing, then its threads with a bounded fan-out.
//! Per-thread failures are recorded in the report and never abort the batch.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::{ExtractError, Result, TransportError};
use crate::models::{
    Config, CrawlOutcome, FetchOutcome, FetchResult, ForumSource, PostSummary, SelectorChain,
    SourceReport, SourceSelectors, ThreadReport,
};
use crate::services::{
    BotDetector, ContentCleaner, ListingExtractor, PageFetcher, ThreadExtractor,
};

/// Service for crawling configured forum sources.
pub struct ForumCrawler {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    detector: BotDetector,
}

impl ForumCrawler {
    pub fn new(config: Arc<Config>, fetcher: Arc<dyn PageFetcher>) -> Self {
        let detector = BotDetector::new(&config.detector);
        Self {
            config,
            fetcher,
            detector,
        }
    }

    /// Crawl every configured source, one after another.
    ///
    /// A source with an invalid selector configuration is recorded and
    /// skipped; the remaining sources still run.
    pub async fn crawl_all(&self) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();

        for source in &self.config.sources {
            log::info!("Crawling {} ({})", source.name, source.listing_url);
            let report = match self.crawl_source(source).await {
                Ok(report) => report,
                Err(err) => {
                    log::warn!("[{}] skipped, invalid configuration: {}", source.name, err);
                    outcome.add_source(SourceReport::misconfigured(
                        &source.name,
                        &source.listing_url,
                        err.to_string(),
                    ));
                    continue;
                }
            };
            log::info!(
                "  {}: {}/{} threads extracted",
                source.name,
                report.extracted().count(),
                report.threads.len()
            );
            outcome.add_source(report);
        }

        outcome
    }

    /// Crawl a single source.
    ///
    /// Only an invalid selector configuration is an `Err`; page-level
    /// failures are recorded in the returned report.
    pub async fn crawl_source(&self, source: &ForumSource) -> Result<SourceReport> {
        let selectors = source.selectors.compile()?;
        let cleaner = ContentCleaner::new(&selectors.unwanted);

        let mut report = SourceReport::new(&source.name, &source.listing_url);

        let summaries = match self.fetch_listing(source, &selectors).await {
            Ok(summaries) => summaries,
            Err(err) => {
                report_failure(&source.name, &err);
                report.listing = Err(err);
                return Ok(report);
            }
        };

        let limit = self.config.crawler.max_threads_per_source;
        let summaries: Vec<PostSummary> = if limit == 0 {
            summaries
        } else {
            summaries.into_iter().take(limit).collect()
        };
        log::debug!(
            "{}: {} threads queued from listing",
            source.name,
            summaries.len()
        );

        report.threads = self
            .fetch_threads(&source.name, summaries, &selectors, &cleaner)
            .await;
        Ok(report)
    }

    async fn fetch_listing(
        &self,
        source: &ForumSource,
        selectors: &SourceSelectors,
    ) -> std::result::Result<Vec<PostSummary>, ExtractError> {
        let outcome = self
            .fetch_classified(&source.listing_url, &selectors.listing_anchor)
            .await;
        ListingExtractor::new(selectors).extract(outcome)
    }

    /// Fetch thread pages concurrently, keeping listing order.
    async fn fetch_threads(
        &self,
        source_name: &str,
        summaries: Vec<PostSummary>,
        selectors: &SourceSelectors,
        cleaner: &ContentCleaner,
    ) -> Vec<ThreadReport> {
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        let concurrency = self.config.crawler.max_concurrent.max(1);
        let extractor = ThreadExtractor::new(&selectors.content, cleaner);
        let extractor = &extractor;

        let mut thread_stream = stream::iter(summaries)
            .map(|summary| async move {
                let outcome = self
                    .fetch_classified(&summary.thread_url, &selectors.thread_anchor)
                    .await;
                let content = extractor.extract(outcome);
                ThreadReport { summary, content }
            })
            .buffered(concurrency);

        let mut threads = Vec::new();
        while let Some(thread) = thread_stream.next().await {
            if let Err(err) = &thread.content {
                report_failure(source_name, err);
            }
            threads.push(thread);

            if delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }
        }

        threads
    }

    /// Fetch and classify a page against its structural anchor.
    async fn fetch_classified(&self, url: &str, anchor: &SelectorChain) -> FetchOutcome {
        match self.fetch_with_retry(url).await {
            Ok(result) => self.detector.classify(result, anchor),
            Err(err) => FetchOutcome::TransportError(err),
        }
    }

    /// Retry transport failures only; any response is returned as-is.
    async fn fetch_with_retry(&self, url: &str) -> std::result::Result<FetchResult, TransportError> {
        let retries = self.config.crawler.max_retries;
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        let mut attempt = 0;

        loop {
            match self.fetcher.fetch(url).await {
                Ok(result) => return Ok(result),
                Err(err) if attempt < retries => {
                    attempt += 1;
                    log::debug!("Retrying ({}/{}) after {}", attempt, retries, err);
                    if delay.as_millis() > 0 {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn report_failure(source_name: &str, err: &ExtractError) {
    match err {
        ExtractError::Blocked { url, marker } => log::warn!(
            "[{}] BLOCKED by bot mitigation at {} (marker {:?}); not retried",
            source_name,
            url,
            marker
        ),
        _ => log::warn!("[{}] {} failure: {}", source_name, err.kind(), err),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    const LISTING_URL: &str = "https://forum.example.com/forum/view-forum/patch-notes";

    /// Serves canned bodies; unknown URLs fail at the transport layer.
    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        failures_left: Mutex<HashMap<String, usize>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn flaky(self, url: &str, failures: usize) -> Self {
            self.failures_left
                .lock()
                .unwrap()
                .insert(url.to_string(), failures);
            self
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<FetchResult, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());

            if let Some(left) = self.failures_left.lock().unwrap().get_mut(url) {
                if *left > 0 {
                    *left -= 1;
                    return Err(TransportError {
                        url: url.to_string(),
                        cause: "connect: connection reset".into(),
                    });
                }
            }

            match self.pages.get(url) {
                Some(body) => Ok(FetchResult::new(url, 200, body.clone())),
                None => Err(TransportError {
                    url: url.to_string(),
                    cause: "dns: no such host".into(),
                }),
            }
        }
    }

    fn listing(ids: &[u32]) -> String {
        let rows: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<tr><td class="thread"><div class="title"><a href="/forum/view-thread/{id}">Thread {id}</a></div>
                       <span class="post_date">2024-03-{id:02}</span></td></tr>"#
                )
            })
            .collect();
        format!(
            r#"<table class="forumTable viewForumTable"><tr><th>Thread</th></tr>{rows}</table>"#
        )
    }

    fn thread(text: &str) -> String {
        format!(
            r#"<table class="forumPostListTable"><tr><td class="content-container">
               <div class="content"><p>{text}</p><div class="report_button">Report</div></div>
               </td></tr></table>"#
        )
    }

    fn thread_url(id: u32) -> String {
        format!("https://forum.example.com/forum/view-thread/{id}")
    }

    fn config() -> Arc<Config> {
        let mut config = Config::default();
        config.crawler.request_delay_ms = 0;
        config.sources.truncate(1);
        config.sources[0].listing_url = LISTING_URL.to_string();
        Arc::new(config)
    }

    #[tokio::test]
    async fn test_crawl_source_keeps_listing_order() {
        let fetcher = StubFetcher::default()
            .page(LISTING_URL, &listing(&[3, 1, 2]))
            .page(&thread_url(1), &thread("one"))
            .page(&thread_url(2), &thread("two"))
            .page(&thread_url(3), &thread("three"));
        let config = config();
        let crawler = ForumCrawler::new(Arc::clone(&config), Arc::new(fetcher));

        let report = crawler.crawl_source(&config.sources[0]).await.unwrap();

        assert!(report.listing.is_ok());
        let texts: Vec<_> = report
            .threads
            .iter()
            .map(|t| t.content.as_ref().unwrap().plain_text.as_str())
            .collect();
        assert_eq!(texts, ["three", "one", "two"]);
    }

    #[tokio::test]
    async fn test_blocked_thread_does_not_abort_batch() {
        let fetcher = StubFetcher::default()
            .page(LISTING_URL, &listing(&[1, 2]))
            .page(&thread_url(1), "<html><title>Just a moment...</title></html>")
            .page(&thread_url(2), &thread("two"));
        let config = config();
        let crawler = ForumCrawler::new(Arc::clone(&config), Arc::new(fetcher));

        let outcome = crawler.crawl_all().await;

        assert_eq!(outcome.thread_total, 2);
        assert_eq!(outcome.thread_failures.blocked, 1);
        assert_eq!(outcome.extracted_count(), 1);
        let posts: Vec<_> = outcome.extracted().collect();
        assert_eq!(posts[0].summary.thread_url, thread_url(2));
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let fetcher = Arc::new(
            StubFetcher::default()
                .page(LISTING_URL, &listing(&[1]))
                .page(&thread_url(1), &thread("one"))
                .flaky(&thread_url(1), 1),
        );
        let config = config();
        let crawler = ForumCrawler::new(Arc::clone(&config), fetcher.clone());

        let report = crawler.crawl_source(&config.sources[0]).await.unwrap();

        assert!(report.threads[0].content.is_ok());
        assert_eq!(fetcher.calls_to(&thread_url(1)), 2);
    }

    #[tokio::test]
    async fn test_blocked_is_never_retried() {
        let fetcher = Arc::new(
            StubFetcher::default()
                .page(LISTING_URL, &listing(&[1]))
                .page(&thread_url(1), "<script>window._cf_chl_opt={}</script>"),
        );
        let config = config();
        let crawler = ForumCrawler::new(Arc::clone(&config), fetcher.clone());

        let report = crawler.crawl_source(&config.sources[0]).await.unwrap();

        assert_eq!(report.threads[0].content.as_ref().unwrap_err().kind(), "blocked");
        assert_eq!(fetcher.calls_to(&thread_url(1)), 1);
    }

    #[tokio::test]
    async fn test_failed_listing_is_recorded() {
        let config = config();
        let crawler = ForumCrawler::new(Arc::clone(&config), Arc::new(StubFetcher::default()));

        let outcome = crawler.crawl_all().await;

        assert_eq!(outcome.listing_failures.transport, 1);
        assert_eq!(outcome.thread_total, 0);
        assert!(outcome.sources[0].listing.is_err());
    }

    #[tokio::test]
    async fn test_misconfigured_source_does_not_stop_the_others() {
        let fetcher = StubFetcher::default()
            .page(LISTING_URL, &listing(&[1]))
            .page(&thread_url(1), &thread("one"));
        let mut config = Config::default();
        config.crawler.request_delay_ms = 0;
        config.sources[0].selectors.unwanted.push("div[".to_string());
        config.sources[1].listing_url = LISTING_URL.to_string();
        let crawler = ForumCrawler::new(Arc::new(config), Arc::new(fetcher));

        let outcome = crawler.crawl_all().await;

        assert_eq!(outcome.sources.len(), 2);
        assert_eq!(outcome.config_failures, 1);
        let skipped = &outcome.sources[0];
        assert!(skipped.config_error.as_ref().unwrap().contains("div["));
        assert!(skipped.threads.is_empty());
        assert_eq!(outcome.sources[1].source, "partner");
        assert_eq!(outcome.extracted_count(), 1);
    }

    #[tokio::test]
    async fn test_thread_limit_applies() {
        let fetcher = StubFetcher::default()
            .page(LISTING_URL, &listing(&[1, 2, 3]))
            .page(&thread_url(1), &thread("one"))
            .page(&thread_url(2), &thread("two"))
            .page(&thread_url(3), &thread("three"));
        let mut config = (*config()).clone();
        config.crawler.max_threads_per_source = 2;
        let config = Arc::new(config);
        let crawler = ForumCrawler::new(Arc::clone(&config), Arc::new(fetcher));

        let report = crawler.crawl_source(&config.sources[0]).await.unwrap();
        assert_eq!(report.threads.len(), 2);
    }
}
