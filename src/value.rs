//! The field-value data model.
//!
//! A [`Record`] is an order-preserving mapping from field name to [`Value`].
//! Field ordering in the *first* record a caller feeds the analyzer/engine
//! defines iteration order for the rest of a scan.

use indexmap::IndexMap;
use std::fmt;

/// A single field value as read from a record source.
///
/// Every scalar a row-dictionary can carry: string, integer, floating,
/// boolean, or null. Mixed-type columns are allowed upstream; this crate
/// never infers a `Value`'s Rust type from context, it only stringifies it
/// for matching (see [`Value::as_match_str`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// True for [`Value::Null`] or an empty string.
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Null) || matches!(self, Value::Str(s) if s.is_empty())
    }

    /// Render the value as the string form used for matching and length
    /// statistics. This is the one place stringification happens; nothing
    /// else in the crate should format a `Value` independently.
    pub fn as_match_str(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => s.clone(),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() { format!("{}", f as i64) } else { format!("{f}") }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_match_str())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// An ordered mapping from field name to [`Value`].
///
/// Backed by [`indexmap::IndexMap`] so insertion order (and therefore the
/// first record's field order) is preserved without a bespoke wrapper type.
pub type Record = IndexMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringifies_scalars() {
        assert_eq!(Value::Int(42).as_match_str(), "42");
        assert_eq!(Value::Float(3.5).as_match_str(), "3.5");
        assert_eq!(Value::Float(4.0).as_match_str(), "4");
        assert_eq!(Value::Bool(true).as_match_str(), "true");
        assert_eq!(Value::Null.as_match_str(), "");
        assert_eq!(Value::Str("hi".into()).as_match_str(), "hi");
    }

    #[test]
    fn blank_detection() {
        assert!(Value::Null.is_blank());
        assert!(Value::Str(String::new()).is_blank());
        assert!(!Value::Str("0".into()).is_blank());
        assert!(!Value::Int(0).is_blank());
    }
}
