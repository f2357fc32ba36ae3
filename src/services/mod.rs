//! Service layer for the crawler application.
//!
//! This module contains the extraction logic for:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Challenge detection (`BotDetector`)
//! - Listing and thread extraction (`ListingExtractor`, `ThreadExtractor`)
//! - Batch orchestration (`ForumCrawler`)

mod cleaner;
mod crawler;
mod detector;
mod fetcher;
mod listing;
pub mod resolver;
mod thread;

pub use cleaner::ContentCleaner;
pub use crawler::ForumCrawler;
pub use detector::BotDetector;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use listing::ListingExtractor;
pub use thread::ThreadExtractor;
