//! Date parser interface.
//!
//! A thin capability consumed by the classification engine's date pass.
//! Shipping a comprehensive pattern set is out of scope here — callers
//! supply their own [`DateParser`] for production use. [`BuiltinDateParser`]
//! ships only so the pipeline is exercisable end-to-end without an external
//! crate.

use chrono::NaiveDate;

/// One recognized date/time pattern: a stable identifier plus the format
/// token reported in [`crate::engine::MatchResult::datatype_format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    pub pattern_id: &'static str,
    pub format: &'static str,
}

/// Side-effect-free, thread-safe date recognition. Implementations MAY
/// return `None` unconditionally to disable the date pass entirely.
pub trait DateParser: Send + Sync {
    fn match_date(&self, value: &str) -> Option<DatePattern>;
}

/// Always returns `None`; used when `parse_dates=false` should be realized
/// as a genuine no-op rather than a branch in the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDateParser;

impl DateParser for NullDateParser {
    fn match_date(&self, _value: &str) -> Option<DatePattern> {
        None
    }
}

/// A small, explicitly non-exhaustive set of common date/time shapes,
/// tried in order. Documentation-grade: not a claim this covers every
/// locale or format a production date parser would.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDateParser;

const ISO_DATE: DatePattern = DatePattern { pattern_id: "iso8601_date", format: "%Y-%m-%d" };
const ISO_DATETIME: DatePattern = DatePattern { pattern_id: "iso8601_datetime", format: "%Y-%m-%dT%H:%M:%S" };
const US_DATE: DatePattern = DatePattern { pattern_id: "us_date", format: "%m/%d/%Y" };

impl DateParser for BuiltinDateParser {
    fn match_date(&self, value: &str) -> Option<DatePattern> {
        let trimmed = value.trim();
        if chrono::NaiveDateTime::parse_from_str(trimmed, ISO_DATETIME.format).is_ok() {
            return Some(ISO_DATETIME);
        }
        if NaiveDate::parse_from_str(trimmed, ISO_DATE.format).is_ok() {
            return Some(ISO_DATE);
        }
        if NaiveDate::parse_from_str(trimmed, US_DATE.format).is_ok() {
            return Some(US_DATE);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_iso_date() {
        assert_eq!(BuiltinDateParser.match_date("2024-03-05"), Some(ISO_DATE));
    }

    #[test]
    fn recognizes_iso_datetime_before_plain_date() {
        assert_eq!(BuiltinDateParser.match_date("2024-03-05T10:30:00"), Some(ISO_DATETIME));
    }

    #[test]
    fn recognizes_us_date() {
        assert_eq!(BuiltinDateParser.match_date("3/5/2024"), Some(US_DATE));
    }

    #[test]
    fn rejects_non_date_text() {
        assert_eq!(BuiltinDateParser.match_date("not a date"), None);
    }

    #[test]
    fn null_parser_always_none() {
        assert_eq!(NullDateParser.match_date("2024-03-05"), None);
    }
}
