//! Date helper functions

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Pattern used for post bylines and metadata ("March 05, 2024")
pub const POST_DATE_FORMAT: &str = "MMMM DD, YYYY";

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
///
/// A pattern chrono cannot format falls back to [`POST_DATE_FORMAT`].
pub fn format_date<Tz2: TimeZone>(date: &DateTime<Tz2>, format: &str) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    let mut chrono_format = moment_to_chrono_format(format);
    if !is_valid_chrono_format(&chrono_format) {
        tracing::warn!("Invalid date format {:?}, using {:?}", format, POST_DATE_FORMAT);
        chrono_format = moment_to_chrono_format(POST_DATE_FORMAT);
    }
    date.format(&chrono_format).to_string()
}

/// Whether a Moment.js-style pattern (strftime escapes allowed) formats cleanly
pub fn is_valid_date_format(format: &str) -> bool {
    is_valid_chrono_format(&moment_to_chrono_format(format))
}

fn is_valid_chrono_format(chrono_format: &str) -> bool {
    !StrftimeItems::new(chrono_format).any(|item| matches!(item, Item::Error))
}

/// Format a stored UTC timestamp in the site timezone
pub fn format_timestamp(timestamp: &DateTime<Utc>, format: &str, tz: Tz) -> String {
    format_date(&timestamp.with_timezone(&tz), format)
}

/// Byline under a post title: date plus optional reading time
///
/// A missing date leaves the date part empty rather than failing.
pub fn byline(date: Option<&str>, reading_minutes: Option<u32>) -> String {
    let mut line = date.unwrap_or_default().to_string();
    if let Some(minutes) = reading_minutes {
        line.push_str(&format!(" · {} min read", minutes));
    }
    line
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each field
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("DDDD", "%j"),
        ("DD", "%d"),
        // Hour
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
        // Timezone
        ("ZZ", "%z"),
        // Milliseconds
        ("SSS", "%3f"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
