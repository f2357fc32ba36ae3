// src/models/selectors.rs

//! CSS selector chains for scraping forum pages.

use std::fmt;

use scraper::Selector;

use crate::error::{AppError, Result};

/// Ordered list of CSS selectors tried in priority order.
///
/// Always non-empty and every candidate parses; both are checked on
/// construction so resolution never has to handle a bad selector.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    candidates: Vec<String>,
    compiled: Vec<Selector>,
}

impl SelectorChain {
    /// Build a chain from selector strings, most specific first.
    pub fn new<I, S>(candidates: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
        if candidates.is_empty() {
            return Err(AppError::config("selector chain must not be empty"));
        }

        let compiled = candidates
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            candidates,
            compiled,
        })
    }

    /// Selector strings in declared order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Compiled selectors paired with their source strings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selector)> {
        self.candidates
            .iter()
            .map(String::as_str)
            .zip(self.compiled.iter())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.candidates.join(" | "))
    }
}

/// Parse one CSS selector, keeping the source text in the error.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))
}

/// Compiled selector chains and cleanup list for one forum source.
#[derive(Debug, Clone)]
pub struct SourceSelectors {
    /// Root anchor that proves a listing page has the expected structure
    pub listing_anchor: SelectorChain,

    /// Rows inside the listing anchor
    pub row: SelectorChain,

    /// Title link inside a row
    pub title: SelectorChain,

    /// Post date inside a row
    pub date: SelectorChain,

    /// Root anchor that proves a thread page has the expected structure
    pub thread_anchor: SelectorChain,

    /// Post content node, most site-specific candidate first
    pub content: SelectorChain,

    /// Substructures stripped from the content node, in order
    pub unwanted: Vec<Selector>,
}
