// src/utils/date.rs

//! Best-effort parsing of forum post dates.
//!
//! Listing pages render dates in whatever locale the site uses, usually
//! followed by a time. Only unambiguous calendar forms are recognized;
//! anything else yields `None` rather than a guessed date.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// `2024-03-05`, `2024.03.05`, `2024/3/5`, `2024. 3. 5.`
static YMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})\s*[-./]\s*(\d{1,2})\s*[-./]\s*(\d{1,2})\b").expect("valid regex")
});

/// `Mar 5, 2024`, `March 5th 2024`, `Sep. 5, 2024`
static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .expect("valid regex")
});

/// `5 Mar 2024`, `5 March, 2024`
static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})\b").expect("valid regex")
});

/// `2024년 3월 5일`
static KOREAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*년\s*(\d{1,2})\s*월\s*(\d{1,2})\s*일").expect("valid regex")
});

/// Parse a listing date cell into a calendar date.
pub fn parse_post_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = YMD.captures(text).or_else(|| KOREAN.captures(text)) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = MONTH_DAY_YEAR.captures(text) {
        let month = month_number(&caps[1])?;
        return ymd(&caps[3], &month.to_string(), &caps[2]);
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        let month = month_number(&caps[2])?;
        return ymd(&caps[3], &month.to_string(), &caps[1]);
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&name))
        .map(|i| i as u32 + 1)
}
