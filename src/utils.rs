use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Resolve `href` against `base`.
///
/// Absolute URLs come back untouched (byte-for-byte) so they stay usable as
/// dedup keys; relative ones are joined onto `base`. When nothing can be
/// resolved the trimmed input is returned as-is.
pub fn absolutize(href: &str, base: &str) -> String {
    let href = href.trim();
    if href.is_empty() || Url::parse(href).is_ok() {
        return href.to_string();
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Remove everything between angle brackets
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Collapse runs of whitespace into single spaces and trim
pub fn collapse_whitespace(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

/// Keep at most `max` characters (not bytes)
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Publisher name for a feed: its hostname without a leading `www.`
pub fn source_host(feed_url: &str) -> String {
    Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .map(|h| h.strip_prefix("www.").map(str::to_string).unwrap_or(h))
        .unwrap_or_default()
}

/// Best-effort parse of a feed date, used only for ordering.
///
/// Feeds disagree on formats; RFC 2822 (RSS) and RFC 3339 (Atom, Dublin Core)
/// cover nearly all of them, the rest are a few common naive layouts read as UTC.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Truncate a string for logging purposes
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        format!("{}…(+{} chars)", truncate_chars(s, max), count - max)
    }
}
