//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{SelectorChain, SourceSelectors, parse_selector};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Authored notice indexing rules
    #[serde(default)]
    pub notice: NoticeConfig,

    /// Bot-challenge signatures
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Forum sources to extract
    #[serde(default = "defaults::default_sources")]
    pub sources: Vec<ForumSource>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.paths.index_file.trim().is_empty() {
            return Err(AppError::validation("paths.index_file is empty"));
        }
        if self.detector.markers.iter().any(|m| m.is_empty()) {
            return Err(AppError::validation("detector.markers contains an empty marker"));
        }
        for source in &self.sources {
            url::Url::parse(&source.listing_url).map_err(|e| {
                AppError::validation(format!(
                    "source '{}' has invalid listing_url: {e}",
                    source.name
                ))
            })?;
            source.selectors.compile().map_err(|e| {
                AppError::validation(format!("source '{}': {e}", source.name))
            })?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            paths: PathsConfig::default(),
            notice: NoticeConfig::default(),
            detector: DetectorConfig::default(),
            sources: defaults::default_sources(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every request
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent in-flight requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Extra attempts after a transport error
    #[serde(default = "defaults::max_retries")]
    pub max_retries: usize,

    /// Threads fetched per listing page (0 = all rows)
    #[serde(default = "defaults::max_threads_per_source")]
    pub max_threads_per_source: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            max_retries: defaults::max_retries(),
            max_threads_per_source: defaults::max_threads_per_source(),
        }
    }
}

/// Input and output locations, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory of authored Markdown notices; also receives the index
    #[serde(default = "defaults::notice_dir")]
    pub notice_dir: PathBuf,

    /// File name of the generated index
    #[serde(default = "defaults::index_file")]
    pub index_file: String,

    /// Secondary publish roots, first existing one wins
    #[serde(default = "defaults::publish_candidates")]
    pub publish_candidates: Vec<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            notice_dir: defaults::notice_dir(),
            index_file: defaults::index_file(),
            publish_candidates: defaults::publish_candidates(),
        }
    }
}

/// Rules for turning authored notice files into index entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// Prefix for published notice URLs
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Filename tokens that mark a notice as priority
    #[serde(default = "defaults::priority_markers")]
    pub priority_markers: Vec<String>,

    /// Extensions treated as notice documents
    #[serde(default = "defaults::extensions")]
    pub extensions: Vec<String>,
}

impl NoticeConfig {
    /// Published URL for a notice file stem.
    pub fn url_for(&self, stem: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), stem)
    }
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            priority_markers: defaults::priority_markers(),
            extensions: defaults::extensions(),
        }
    }
}

/// Versioned list of bot-challenge markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Bumped whenever the marker list changes
    #[serde(default = "defaults::signature_version")]
    pub version: u32,

    /// Case-sensitive substrings that identify a challenge page
    #[serde(default = "defaults::challenge_markers")]
    pub markers: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            version: defaults::signature_version(),
            markers: defaults::challenge_markers(),
        }
    }
}

/// A forum listing to extract notices from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumSource {
    /// Short identifier used in logs and output
    pub name: String,

    /// Absolute URL of the listing page
    pub listing_url: String,

    pub selectors: SelectorConfig,
}

/// Selector chains as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub listing_anchor: Vec<String>,
    pub row: Vec<String>,
    pub title: Vec<String>,
    pub date: Vec<String>,
    pub thread_anchor: Vec<String>,
    pub content: Vec<String>,
    #[serde(default)]
    pub unwanted: Vec<String>,
}

impl SelectorConfig {
    /// Parse every chain and the unwanted list, failing on the first empty
    /// chain or bad selector.
    pub fn compile(&self) -> Result<SourceSelectors> {
        Ok(SourceSelectors {
            listing_anchor: SelectorChain::new(&self.listing_anchor)?,
            row: SelectorChain::new(&self.row)?,
            title: SelectorChain::new(&self.title)?,
            date: SelectorChain::new(&self.date)?,
            thread_anchor: SelectorChain::new(&self.thread_anchor)?,
            content: SelectorChain::new(&self.content)?,
            unwanted: self
                .unwanted
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::{ForumSource, SelectorConfig};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.9,ko;q=0.8".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn request_delay() -> u64 {
        250
    }
    pub fn max_concurrent() -> usize {
        3
    }
    pub fn max_retries() -> usize {
        1
    }
    pub fn max_threads_per_source() -> usize {
        20
    }

    // Path defaults
    pub fn notice_dir() -> PathBuf {
        PathBuf::from("notice")
    }
    pub fn index_file() -> String {
        "list.json".into()
    }
    pub fn publish_candidates() -> Vec<PathBuf> {
        vec![
            PathBuf::from("../launcher-web/public"),
            PathBuf::from("../launcher-site/public"),
            PathBuf::from("../web/public"),
        ]
    }

    // Notice defaults
    pub fn base_url() -> String {
        "/notice".into()
    }
    pub fn priority_markers() -> Vec<String> {
        strings(&["priority", "notice"])
    }
    pub fn extensions() -> Vec<String> {
        strings(&["md"])
    }

    // Detector defaults
    pub fn signature_version() -> u32 {
        3
    }
    pub fn challenge_markers() -> Vec<String> {
        strings(&[
            "cf-browser-verification",
            "cf_chl_opt",
            "/cdn-cgi/challenge-platform/",
            "<title>Just a moment...</title>",
            "Attention Required! | Cloudflare",
            "_Incapsula_Resource",
            "captcha-delivery.com",
            "px-captcha",
        ])
    }

    // Source defaults
    pub fn default_sources() -> Vec<ForumSource> {
        vec![
            ForumSource {
                name: "publisher".to_string(),
                listing_url: "https://www.pathofexile.com/forum/view-forum/patch-notes"
                    .to_string(),
                selectors: SelectorConfig {
                    listing_anchor: strings(&["table.forumTable.viewForumTable", "table.forumTable"]),
                    row: strings(&["tr"]),
                    title: strings(&[
                        "td.thread div.title > a",
                        "div.title > a",
                        "a[href*='/forum/view-thread/']",
                    ]),
                    date: strings(&[
                        "td.thread span.post_date",
                        "span.post_date",
                        "td.last_post span.post_date",
                    ]),
                    thread_anchor: strings(&["table.forumPostListTable", "table.forumTable"]),
                    content: strings(&[
                        "table.forumPostListTable td.content-container div.content",
                        "td.content-container div.content",
                        "div.content",
                    ]),
                    unwanted: strings(&[
                        "div.posted-by",
                        "div.report_button",
                        "span.report_button",
                        "div.signature",
                        "div.post_footer",
                        "div.social-share",
                        "div.share-buttons",
                        "script",
                        "style",
                        "noscript",
                    ]),
                },
            },
            ForumSource {
                name: "partner".to_string(),
                listing_url: "https://poe.game.daum.net/forum/view-forum/patch-notes"
                    .to_string(),
                selectors: SelectorConfig {
                    listing_anchor: strings(&[
                        "table.forumTable.viewForumTable",
                        "table.forumTable",
                        "div.forum_list table",
                    ]),
                    row: strings(&["tr"]),
                    title: strings(&[
                        "div.title > a",
                        "td.subject a",
                        "a[href*='/forum/view-thread/']",
                    ]),
                    date: strings(&["span.post_date", "td.date", "span.date"]),
                    thread_anchor: strings(&[
                        "table.forumPostListTable",
                        "div.forum_view",
                        "table.forumTable",
                    ]),
                    content: strings(&[
                        "td.content-container div.content",
                        "div.forum_view div.view_cont",
                        "div.content",
                        "div.view_cont",
                    ]),
                    unwanted: strings(&[
                        "div.posted-by",
                        "div.author_info",
                        "div.report_button",
                        "div.btn_report",
                        "div.signature",
                        "div.post_footer",
                        "div.kakao_share",
                        "div.social-share",
                        "script",
                        "style",
                        "noscript",
                    ]),
                },
            },
        ]
    }
}
