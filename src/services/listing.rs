// src/services/listing.rs

//! Forum listing extraction.

use scraper::ElementRef;
use url::Url;

use crate::error::ExtractError;
use crate::models::{FetchOutcome, PostSummary, SourceSelectors};
use crate::services::resolver::{resolve, resolve_all, resolve_in};
use crate::utils::date::parse_post_date;
use crate::utils::{normalize_whitespace, resolve_url};

/// Extracts post summaries from a forum index page.
pub struct ListingExtractor<'a> {
    selectors: &'a SourceSelectors,
}

impl<'a> ListingExtractor<'a> {
    pub fn new(selectors: &'a SourceSelectors) -> Self {
        Self { selectors }
    }

    /// Extract summaries in source row order.
    ///
    /// Header rows and rows without a resolvable title link are skipped; the
    /// listing only fails as a whole when the page itself is unusable.
    pub fn extract(&self, outcome: FetchOutcome) -> Result<Vec<PostSummary>, ExtractError> {
        let page = outcome.into_page()?;
        let base = Url::parse(&page.url).ok();

        let anchor = resolve_in(&page.document, &self.selectors.listing_anchor)
            .ok_or_else(|| ExtractError::UnexpectedShape {
                url: page.url.clone(),
                chain: self.selectors.listing_anchor.to_string(),
            })?;

        let (_, rows) = resolve_all(anchor.node, &self.selectors.row).ok_or_else(|| {
            ExtractError::NotFound {
                url: page.url.clone(),
                chain: self.selectors.row.to_string(),
            }
        })?;

        let mut summaries = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            if is_header_row(row) {
                continue;
            }
            match self.parse_row(row, base.as_ref()) {
                Some(summary) => summaries.push(summary),
                None => log::debug!(
                    "Skipping row {} of {}: no title link matched {}",
                    index,
                    page.url,
                    self.selectors.title
                ),
            }
        }

        Ok(summaries)
    }

    fn parse_row(&self, row: ElementRef<'_>, base: Option<&Url>) -> Option<PostSummary> {
        let link = resolve(row, &self.selectors.title)?.node;

        let title = normalize_whitespace(&link.text().collect::<String>());
        if title.is_empty() {
            return None;
        }

        let href = link.value().attr("href")?;
        let thread_url = base.and_then(|base| resolve_url(base, href))?;

        let posted_at = resolve(row, &self.selectors.date).and_then(|date| {
            let raw = normalize_whitespace(&date.node.text().collect::<String>());
            let parsed = parse_post_date(&raw);
            if parsed.is_none() {
                log::debug!("Unrecognized post date {:?} for {}", raw, thread_url);
            }
            parsed
        });

        Some(PostSummary {
            title,
            thread_url,
            posted_at,
        })
    }
}

/// A row of `th` cells or one inside `thead`.
fn is_header_row(row: ElementRef<'_>) -> bool {
    let in_thead = row
        .parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "thead");

    in_thead
        || row
            .children()
            .filter_map(ElementRef::wrap)
            .any(|cell| cell.value().name() == "th")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Config, FetchResult};
    use crate::services::BotDetector;

    const LISTING: &str = r#"
        <html><body>
        <table class="forumTable viewForumTable">
          <tr><th>Thread</th><th>Replies</th><th>Last Post</th></tr>
          <tr>
            <td class="thread">
              <div class="title"><a href="/forum/view-thread/3501">Content Update 3.24.1</a></div>
              <div class="postBy">by <a href="/u/staff">Staff</a><span class="post_date">, Mar 5, 2024, 10:00:00 AM</span></div>
            </td>
            <td>12</td><td class="last_post"></td>
          </tr>
          <tr>
            <td class="thread">
              <div class="title"><a href="/forum/view-thread/3499">  Hotfix
                 Notes </a></div>
              <div class="postBy"><span class="post_date">yesterday</span></div>
            </td>
            <td>4</td><td class="last_post"></td>
          </tr>
        </table>
        </body></html>
    "#;

    fn selectors() -> SourceSelectors {
        Config::default().sources[0].selectors.compile().unwrap()
    }

    fn classify(body: &str) -> FetchOutcome {
        let selectors = selectors();
        let result = FetchResult::new(
            "https://www.example.com/forum/view-forum/patch-notes",
            200,
            body.to_string(),
        );
        BotDetector::default().classify(result, &selectors.listing_anchor)
    }

    #[test]
    fn test_extract_rows_in_order_skipping_header() {
        let selectors = selectors();
        let summaries = ListingExtractor::new(&selectors)
            .extract(classify(LISTING))
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "Content Update 3.24.1");
        assert_eq!(
            summaries[0].thread_url,
            "https://www.example.com/forum/view-thread/3501"
        );
        assert_eq!(summaries[0].posted_at, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(summaries[1].title, "Hotfix Notes");
        assert_eq!(summaries[1].posted_at, None);
    }

    #[test]
    fn test_row_without_title_link_is_skipped() {
        let body = r#"
            <table class="forumTable">
              <tr><th>Thread</th></tr>
              <tr><td class="thread"><div class="sticky-banner">Sponsored</div></td></tr>
              <tr><td class="thread"><div class="title"><a href="/forum/view-thread/7">Real</a></div></td></tr>
            </table>"#;
        let selectors = selectors();
        let summaries = ListingExtractor::new(&selectors)
            .extract(classify(body))
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "Real");
    }

    #[test]
    fn test_thead_rows_are_headers() {
        let body = r#"
            <table class="forumTable">
              <thead><tr><td><div class="title"><a href="/sort">Thread</a></div></td></tr></thead>
              <tbody><tr><td><div class="title"><a href="/forum/view-thread/8">Post</a></div></td></tr></tbody>
            </table>"#;
        let selectors = selectors();
        let summaries = ListingExtractor::new(&selectors)
            .extract(classify(body))
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "Post");
    }

    #[test]
    fn test_blocked_listing_is_error() {
        let selectors = selectors();
        let body = "<html><title>Just a moment...</title><script>cf_chl_opt</script></html>";
        let err = ListingExtractor::new(&selectors)
            .extract(classify(body))
            .unwrap_err();
        assert_eq!(err.kind(), "blocked");
    }

    #[test]
    fn test_unexpected_shape_listing_is_error() {
        let selectors = selectors();
        let err = ListingExtractor::new(&selectors)
            .extract(classify("<html><body><p>Forum moved</p></body></html>"))
            .unwrap_err();
        assert_eq!(err.kind(), "unexpected-shape");
    }
}
