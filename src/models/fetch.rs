// src/models/fetch.rs

//! Fetch results and their classification.

use chrono::{DateTime, Utc};
use scraper::Html;

use crate::error::{ExtractError, TransportError};

/// Raw response of a single GET, before any interpretation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub status_code: u16,
    pub body_text: String,
    /// Size of the body as delivered by the client, before text decoding
    pub byte_length: usize,
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    /// Result from an already decoded body; `byte_length` is its UTF-8 size.
    pub fn new(url: impl Into<String>, status_code: u16, body_text: String) -> Self {
        Self {
            url: url.into(),
            status_code,
            byte_length: body_text.len(),
            body_text,
            fetched_at: Utc::now(),
        }
    }

    /// Result from a raw body. Invalid UTF-8 is replaced, not rejected.
    pub fn from_bytes(url: impl Into<String>, status_code: u16, body: &[u8]) -> Self {
        Self {
            byte_length: body.len(),
            ..Self::new(url, status_code, String::from_utf8_lossy(body).into_owned())
        }
    }
}

/// A parsed document whose root anchor was found.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub document: Html,
}

/// Classification of a fetch, driving every downstream branch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Ok(Page),
    Blocked { url: String, marker: String },
    UnexpectedShape { url: String, chain: String },
    TransportError(TransportError),
}

impl FetchOutcome {
    /// URL the outcome refers to.
    pub fn url(&self) -> &str {
        match self {
            Self::Ok(page) => &page.url,
            Self::Blocked { url, .. }
            | Self::UnexpectedShape { url, .. }
            | Self::TransportError(TransportError { url, .. }) => url,
        }
    }

    /// The page for `Ok`, otherwise the matching extraction error.
    pub fn into_page(self) -> Result<Page, ExtractError> {
        match self {
            Self::Ok(page) => Ok(page),
            Self::Blocked { url, marker } => Err(ExtractError::Blocked { url, marker }),
            Self::UnexpectedShape { url, chain } => {
                Err(ExtractError::UnexpectedShape { url, chain })
            }
            Self::TransportError(err) => Err(ExtractError::Transport(err)),
        }
    }
}
