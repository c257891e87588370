//! Display formatting for catalog and subscription data

use crate::config::DisplayLocale;
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use std::cmp::Ordering;
use std::fmt::Write;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Format a count with digit grouping and no fraction digits
pub fn format_usage(value: f64, locale: &DisplayLocale) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let rounded = value.round();
    let negative = rounded < 0.0;
    // f64 integers print without exponent or fraction via {:.0}
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(&locale.grouping_separator);
        }
        out.push(ch);
    }
    out
}

/// Render an epoch timestamp (seconds) as a date-time string
///
/// Fractional milliseconds are truncated. Values outside the +/- 8.64e15 ms
/// range render as "Invalid Date".
pub fn format_renewal_time(epoch_seconds: f64, locale: &DisplayLocale) -> String {
    let millis = (epoch_seconds * 1000.0).trunc();
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return "Invalid Date".to_string();
    }

    let utc = match DateTime::<Utc>::from_timestamp_millis(millis as i64) {
        Some(dt) => dt,
        None => return "Invalid Date".to_string(),
    };

    match locale.utc_offset_minutes {
        Some(minutes) => match FixedOffset::east_opt(minutes * 60) {
            Some(offset) => render(&utc.with_timezone(&offset), &locale.date_time_format),
            None => "Invalid Date".to_string(),
        },
        None => render(&utc.with_timezone(&Local), &locale.date_time_format),
    }
}

fn render<Tz: TimeZone>(dt: &DateTime<Tz>, pattern: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    // An invalid strftime pattern surfaces as fmt::Error instead of a panic
    let mut out = String::new();
    match write!(out, "{}", dt.format(pattern)) {
        Ok(()) => out,
        Err(_) => dt.to_rfc3339(),
    }
}

/// Ascending display-name order
///
/// Letters compare by base letter first, ignoring accents and case. Ties are
/// broken by accents (unaccented first), then lowercase before uppercase.
pub fn compare_display_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| {
            for (x, y) in a.nfd().zip(b.nfd()) {
                if x != y {
                    match (x.is_lowercase(), y.is_lowercase()) {
                        (true, false) => return Ordering::Less,
                        (false, true) => return Ordering::Greater,
                        _ => return x.cmp(&y),
                    }
                }
            }
            a.len().cmp(&b.len())
        })
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}
