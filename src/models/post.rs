// src/models/post.rs

//! Forum posts extracted from listing and thread pages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// One row of a forum listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostSummary {
    /// Thread title as shown in the listing
    pub title: String,

    /// Absolute URL of the thread page
    pub thread_url: String,

    /// Post date, `None` when the source format is not recognized
    pub posted_at: Option<NaiveDate>,
}

/// Cleaned content of a thread's post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedContent {
    pub html: String,
    pub plain_text: String,
}

/// Result of extracting one thread of a listing.
#[derive(Debug, Clone)]
pub struct ThreadReport {
    pub summary: PostSummary,
    pub content: Result<ExtractedContent, ExtractError>,
}

/// A successfully extracted post, as written by `crawl --output`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedPost<'a> {
    pub source: &'a str,
    #[serde(flatten)]
    pub summary: &'a PostSummary,
    #[serde(flatten)]
    pub content: &'a ExtractedContent,
}

/// Everything extracted from a single forum source.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: String,
    pub listing_url: String,

    /// Set when the source's selectors failed to compile; nothing was fetched
    pub config_error: Option<String>,

    /// `Err` when the listing page itself could not be extracted
    pub listing: Result<(), ExtractError>,

    pub threads: Vec<ThreadReport>,
}

impl SourceReport {
    pub fn new(source: impl Into<String>, listing_url: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            listing_url: listing_url.into(),
            config_error: None,
            listing: Ok(()),
            threads: Vec::new(),
        }
    }

    /// Report for a source skipped because its configuration is unusable.
    pub fn misconfigured(
        source: impl Into<String>,
        listing_url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            config_error: Some(reason.into()),
            ..Self::new(source, listing_url)
        }
    }

    /// Posts whose thread content was extracted.
    pub fn extracted(&self) -> impl Iterator<Item = ExtractedPost<'_>> {
        self.threads.iter().filter_map(|thread| {
            thread.content.as_ref().ok().map(|content| ExtractedPost {
                source: &self.source,
                summary: &thread.summary,
                content,
            })
        })
    }
}

/// Failure counters by classification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FailureCounts {
    pub transport: usize,
    pub blocked: usize,
    pub unexpected_shape: usize,
    pub not_found: usize,
}

impl FailureCounts {
    pub fn record(&mut self, err: &ExtractError) {
        match err {
            ExtractError::Transport(_) => self.transport += 1,
            ExtractError::Blocked { .. } => self.blocked += 1,
            ExtractError::UnexpectedShape { .. } => self.unexpected_shape += 1,
            ExtractError::NotFound { .. } => self.not_found += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.transport + self.blocked + self.unexpected_shape + self.not_found
    }
}

/// Summary of a crawl run across all sources.
#[derive(Debug, Default, Clone)]
pub struct CrawlOutcome {
    pub sources: Vec<SourceReport>,
    /// Sources skipped over an invalid selector configuration
    pub config_failures: usize,
    pub listing_failures: FailureCounts,
    pub thread_total: usize,
    pub thread_failures: FailureCounts,
}

impl CrawlOutcome {
    pub fn add_source(&mut self, report: SourceReport) {
        if report.config_error.is_some() {
            self.config_failures += 1;
        }
        if let Err(err) = &report.listing {
            self.listing_failures.record(err);
        }
        self.thread_total += report.threads.len();
        for thread in &report.threads {
            if let Err(err) = &thread.content {
                self.thread_failures.record(err);
            }
        }
        self.sources.push(report);
    }

    /// Number of threads whose content was extracted.
    pub fn extracted_count(&self) -> usize {
        self.thread_total - self.thread_failures.total()
    }

    pub fn extracted(&self) -> impl Iterator<Item = ExtractedPost<'_>> {
        self.sources.iter().flat_map(|source| source.extracted())
    }
}
