// src/error.rs

//! Unified error handling for the notice crawler.
//!
//! [`AppError`] covers plumbing and fatal failures. [`ExtractError`] classifies
//! why a single listing or thread produced no content; it is a value that the
//! batch records and moves past, never something that aborts a run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem precondition or write failure
    #[error("Filesystem error at {}: {message}", path.display())]
    Filesystem { path: PathBuf, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a filesystem error for a path.
    pub fn filesystem(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Filesystem {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Network-level failure of a single fetch (DNS, reset, timeout).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error for {url}: {cause}")]
pub struct TransportError {
    pub url: String,
    pub cause: String,
}

/// Why a page yielded no extractable content.
///
/// Every variant carries the URL so a failure can be reproduced from the log
/// line alone. Shape and lookup failures also carry the selector chain tried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Network-level failure. Retryable.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A bot-challenge page was served instead of content.
    #[error("blocked by bot mitigation at {url} (marker {marker:?})")]
    Blocked { url: String, marker: String },

    /// The page parsed but its root anchor is missing.
    #[error("unexpected page shape at {url}: no anchor matched {chain}")]
    UnexpectedShape { url: String, chain: String },

    /// The anchor exists but the content chain matched nothing.
    #[error("content not found at {url}: no candidate matched {chain}")]
    NotFound { url: String, chain: String },
}

impl ExtractError {
    /// Short classification label used in logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Blocked { .. } => "blocked",
            Self::UnexpectedShape { .. } => "unexpected-shape",
            Self::NotFound { .. } => "not-found",
        }
    }

    /// URL the failure refers to.
    pub fn url(&self) -> &str {
        match self {
            Self::Transport(TransportError { url, .. })
            | Self::Blocked { url, .. }
            | Self::UnexpectedShape { url, .. }
            | Self::NotFound { url, .. } => url,
        }
    }

    /// Whether the caller may retry without backing off.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
