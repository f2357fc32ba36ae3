// src/services/thread.rs

//! Thread content extraction.

use crate::error::ExtractError;
use crate::models::{ExtractedContent, FetchOutcome, SelectorChain};
use crate::services::ContentCleaner;
use crate::services::resolver::resolve_in;

/// Extracts the cleaned post content of a thread page.
pub struct ThreadExtractor<'a> {
    content: &'a SelectorChain,
    cleaner: &'a ContentCleaner,
}

impl<'a> ThreadExtractor<'a> {
    pub fn new(content: &'a SelectorChain, cleaner: &'a ContentCleaner) -> Self {
        Self { content, cleaner }
    }

    /// Resolve the content node and clean it.
    ///
    /// An exhausted chain is `NotFound`; blocked and transport outcomes pass
    /// through with their own classification.
    pub fn extract(&self, outcome: FetchOutcome) -> Result<ExtractedContent, ExtractError> {
        let page = outcome.into_page()?;

        let resolved =
            resolve_in(&page.document, self.content).ok_or_else(|| ExtractError::NotFound {
                url: page.url.clone(),
                chain: self.content.to_string(),
            })?;

        if resolved.candidate > 0 {
            log::debug!(
                "Content for {} matched fallback candidate {} of {}",
                page.url,
                resolved.candidate,
                self.content
            );
        }

        Ok(self.cleaner.clean(resolved.node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::models::{Config, FetchResult, SourceSelectors};
    use crate::services::BotDetector;

    fn selectors() -> SourceSelectors {
        Config::default().sources[0].selectors.compile().unwrap()
    }

    fn classify(selectors: &SourceSelectors, body: &str) -> FetchOutcome {
        let result = FetchResult::new(
            "https://www.example.com/forum/view-thread/3501",
            200,
            body.to_string(),
        );
        BotDetector::default().classify(result, &selectors.thread_anchor)
    }

    #[test]
    fn test_extract_cleans_first_post() {
        let body = r#"
            <table class="forumTable forumPostListTable">
              <tr>
                <td class="content-container">
                  <div class="content">
                    <p>Patch notes body.</p>
                    <div class="report_button">Report Forum Post</div>
                  </div>
                </td>
                <td><div class="posted-by">Staff</div></td>
              </tr>
            </table>"#;
        let selectors = selectors();
        let cleaner = ContentCleaner::new(&selectors.unwanted);

        let content = ThreadExtractor::new(&selectors.content, &cleaner)
            .extract(classify(&selectors, body))
            .unwrap();

        assert_eq!(content.plain_text, "Patch notes body.");
        assert!(!content.html.contains("report_button"));
    }

    #[test]
    fn test_generic_fallback_candidate() {
        let body = r#"
            <table class="forumTable"><tr><td>
              <div class="content"><p>Older markup.</p></div>
            </td></tr></table>"#;
        let selectors = selectors();
        let cleaner = ContentCleaner::new(&selectors.unwanted);

        let content = ThreadExtractor::new(&selectors.content, &cleaner)
            .extract(classify(&selectors, body))
            .unwrap();
        assert_eq!(content.plain_text, "Older markup.");
    }

    #[test]
    fn test_missing_content_is_not_found() {
        let body = r#"<table class="forumPostListTable"><tr><td>empty</td></tr></table>"#;
        let selectors = selectors();
        let cleaner = ContentCleaner::new(&selectors.unwanted);

        let err = ThreadExtractor::new(&selectors.content, &cleaner)
            .extract(classify(&selectors, body))
            .unwrap_err();

        match err {
            ExtractError::NotFound { url, chain } => {
                assert_eq!(url, "https://www.example.com/forum/view-thread/3501");
                assert!(chain.contains("div.content"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_transport_outcome_passes_through() {
        let selectors = selectors();
        let cleaner = ContentCleaner::new(&selectors.unwanted);
        let outcome = FetchOutcome::TransportError(TransportError {
            url: "https://www.example.com/forum/view-thread/1".into(),
            cause: "timeout".into(),
        });

        let err = ThreadExtractor::new(&selectors.content, &cleaner)
            .extract(outcome)
            .unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
