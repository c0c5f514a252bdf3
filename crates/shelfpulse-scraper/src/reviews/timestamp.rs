//! Review timestamp parsing.
//!
//! Accepts ISO-8601, US slash/dash dates, "Month Day, Year" and relative
//! phrases ("3 days ago", "yesterday", "today"). Relative phrases resolve
//! against the caller-supplied `now`.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%B %d, %Y", "%b %d, %Y"];

const PREFIXES: &[&str] = &["posted on", "reviewed on", "submitted on", "posted", "reviewed", "submitted", "on"];

static RELATIVE_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|a|an|one)\s+(minute|hour|day|week|month|year)s?\s+ago$").expect("valid regex")
});

static RELATIVE_SEARCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+|a|an|one)\s+(minute|hour|day|week|month|year)s?\s+ago\b").expect("valid regex")
});

/// Date-looking substrings, tried in order when the whole string does not parse.
static EMBEDDED_DATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?",
        r"\d{1,2}[/-]\d{1,2}[/-]\d{4}",
        r"[A-Z][a-z]{2,8}\.? \d{1,2}, \d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Parse a review timestamp, searching inside longer strings if needed.
#[must_use]
pub fn parse_timestamp(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(ts) = parse_exact(strip_prefixes(trimmed), now) {
        return Some(ts);
    }
    for re in EMBEDDED_DATES.iter() {
        if let Some(ts) = re
            .find(trimmed)
            .and_then(|m| parse_absolute(m.as_str().trim_end_matches('.')))
        {
            return Some(ts);
        }
    }
    let lowered = trimmed.to_lowercase();
    if let Some(caps) = RELATIVE_SEARCH.captures(&lowered) {
        return relative_offset(&caps[1], &caps[2])
            .and_then(|offset| now.checked_sub_signed(offset));
    }
    if contains_word(&lowered, "yesterday") {
        return Some(now - Duration::days(1));
    }
    if contains_word(&lowered, "today") {
        return Some(now);
    }
    None
}

/// True when the whole string is a timestamp with nothing else around it.
#[must_use]
pub fn is_date_only(raw: &str) -> bool {
    parse_exact(strip_prefixes(raw.trim()), Utc::now()).is_some()
}

fn parse_exact(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(ts) = parse_absolute(s) {
        return Some(ts);
    }
    let lowered = s.to_lowercase();
    match lowered.as_str() {
        "today" | "just now" => return Some(now),
        "yesterday" => return Some(now - Duration::days(1)),
        _ => {}
    }
    let caps = RELATIVE_EXACT.captures(&lowered)?;
    relative_offset(&caps[1], &caps[2]).and_then(|offset| now.checked_sub_signed(offset))
}

fn parse_absolute(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// `None` when the amount does not fit a `Duration`.
fn relative_offset(amount: &str, unit: &str) -> Option<Duration> {
    let n: i64 = match amount {
        "a" | "an" | "one" => 1,
        digits => digits.parse().ok()?,
    };
    match unit {
        "minute" => Duration::try_minutes(n),
        "hour" => Duration::try_hours(n),
        "day" => Duration::try_days(n),
        "week" => Duration::try_weeks(n),
        "month" => Duration::try_days(n.checked_mul(30)?),
        "year" => Duration::try_days(n.checked_mul(365)?),
        _ => None,
    }
}

fn strip_prefixes(s: &str) -> &str {
    let lowered = s.to_lowercase();
    for prefix in PREFIXES {
        if lowered.starts_with(prefix) && s.is_char_boundary(prefix.len()) {
            let rest = &s[prefix.len()..];
            if rest.starts_with(char::is_whitespace) || rest.starts_with(':') {
                return rest.trim_start_matches(':').trim();
            }
        }
    }
    s
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}
