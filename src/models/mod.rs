// src/models/mod.rs

//! Domain models for the notice crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod fetch;
mod notice;
mod post;
mod selectors;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, DetectorConfig, ForumSource, NoticeConfig, PathsConfig, SelectorConfig,
};
pub use fetch::{FetchOutcome, FetchResult, Page};
pub use notice::{NoticeDocument, NoticeEntry, NoticeIndex};
pub use post::{
    CrawlOutcome, ExtractedContent, ExtractedPost, FailureCounts, PostSummary, SourceReport,
    ThreadReport,
};
pub use selectors::{SelectorChain, SourceSelectors, parse_selector};
