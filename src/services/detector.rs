// src/services/detector.rs

//! Bot-mitigation detection.
//!
//! Classifies a raw fetch as content, a challenge page, or a page whose
//! structure no longer matches what the extractors expect. The marker list
//! is data (see `DetectorConfig`); new challenge variants are config changes.

use scraper::Html;

use crate::models::{DetectorConfig, FetchOutcome, FetchResult, Page, SelectorChain};
use crate::services::resolver::resolve_in;

/// Classifies fetched pages against known challenge signatures.
#[derive(Debug, Clone)]
pub struct BotDetector {
    version: u32,
    markers: Vec<String>,
}

impl BotDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            version: config.version,
            markers: config
                .markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Signature list version, for logs.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// First known marker present in the body (case-sensitive).
    pub fn find_marker(&self, body: &str) -> Option<&str> {
        self.markers
            .iter()
            .map(String::as_str)
            .find(|marker| body.contains(marker))
    }

    /// Classify a fetch.
    ///
    /// A marker wins regardless of status code. Otherwise the body is parsed
    /// and must contain the anchor to count as `Ok`.
    pub fn classify(&self, result: FetchResult, anchor: &SelectorChain) -> FetchOutcome {
        if let Some(marker) = self.find_marker(&result.body_text) {
            log::debug!(
                "Challenge marker {:?} (signatures v{}) in {} [HTTP {}]",
                marker,
                self.version,
                result.url,
                result.status_code
            );
            return FetchOutcome::Blocked {
                url: result.url,
                marker: marker.to_string(),
            };
        }

        let document = Html::parse_document(&result.body_text);
        if resolve_in(&document, anchor).is_none() {
            return FetchOutcome::UnexpectedShape {
                url: result.url,
                chain: anchor.to_string(),
            };
        }

        FetchOutcome::Ok(Page {
            url: result.url,
            document,
        })
    }
}

impl Default for BotDetector {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}
