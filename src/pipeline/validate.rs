// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::utils::log;

/// Validate configuration and report what would be crawled.
pub fn run_validate(config: &Config) -> Result<()> {
    log::header("Validating configuration");

    if let Err(e) = config.validate() {
        ::log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::sub_item(&format!("User agent: {}", config.crawler.user_agent));
    log::sub_item(&format!("Timeout: {}s", config.crawler.timeout_secs));
    log::sub_item(&format!(
        "Max concurrent: {}",
        config.crawler.max_concurrent
    ));
    log::sub_item(&format!(
        "Notice directory: {}",
        config.paths.notice_dir.display()
    ));
    log::sub_item(&format!(
        "Challenge signatures: v{} ({} markers)",
        config.detector.version,
        config.detector.markers.len()
    ));
    for source in &config.sources {
        log::sub_item(&format!("Source {}: {}", source.name, source.listing_url));
    }

    ::log::info!("Configuration OK");
    Ok(())
}
