//! Field analyzer: per-field statistics over a bounded sample.
//!
//! `analyze()` is a convenience wrapper around [`FieldAccumulator`], exposed
//! separately so a caller who wants to analyze and classify in one iterator
//! pass (e.g. [`crate::engine::classify`]) doesn't have to buffer or
//! re-read records.

use crate::date_parser::DateParser;
use crate::value::{Record, Value};
use std::collections::BTreeSet;

/// The primitive type inferred for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    Date,
    Other,
}

/// Tunable knobs for [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub limit: usize,
    pub dict_share: f64,
    pub empty_values: BTreeSet<String>,
    pub except_empty: bool,
    /// Capacity of a [`FieldStat::dictionary_values`] set; beyond this the
    /// set is still counted for uniqueness but no longer materialized.
    pub dictionary_cap: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            limit: 1000,
            dict_share: 10.0,
            empty_values: ["None", "NaN", "-", "N/A"].into_iter().map(str::to_string).collect(),
            except_empty: true,
            dictionary_cap: 256,
        }
    }
}

impl AnalyzeOptions {
    pub(crate) fn is_empty_token(&self, s: &str) -> bool {
        s.is_empty() || self.empty_values.contains(s)
    }
}

/// Statistics computed for one field over the sample.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldStat {
    pub field: String,
    pub ftype: FieldType,
    pub sample_size: usize,
    pub non_empty: usize,
    pub unique: usize,
    pub min_len: usize,
    pub max_len: usize,
    pub avg_len: f64,
    pub has_digit: bool,
    pub has_alpha: bool,
    pub has_special: bool,
    pub is_dictionary: bool,
    pub dictionary_values: Option<Vec<String>>,
}

/// Accumulates statistics for a single field, one value at a time. Lets
/// [`crate::engine::classify`] analyze and classify in a single pass over an
/// iterator without buffering every record.
pub struct FieldAccumulator {
    field: String,
    ftype: Option<FieldType>,
    sample_size: usize,
    non_empty: usize,
    distinct: BTreeSet<String>,
    min_len: usize,
    max_len: usize,
    sum_len: u64,
    has_digit: bool,
    has_alpha: bool,
    has_special: bool,
    dictionary_cap: usize,
}

impl FieldAccumulator {
    pub fn new(field: impl Into<String>, dictionary_cap: usize) -> Self {
        Self {
            field: field.into(),
            ftype: None,
            sample_size: 0,
            non_empty: 0,
            distinct: BTreeSet::new(),
            min_len: usize::MAX,
            max_len: 0,
            sum_len: 0,
            has_digit: false,
            has_alpha: false,
            has_special: false,
            dictionary_cap,
        }
    }

    /// Feed one sampled value into the accumulator.
    pub fn push(&mut self, value: &Value, options: &AnalyzeOptions, date_parser: &dyn DateParser) {
        self.sample_size += 1;
        let text = value.as_match_str();
        if value.is_blank() || options.is_empty_token(&text) {
            return;
        }
        self.non_empty += 1;

        if self.ftype.is_none() {
            self.ftype = Some(infer_scalar_type(value, &text, date_parser));
        } else if self.ftype != Some(infer_scalar_type(value, &text, date_parser)) {
            self.ftype = Some(FieldType::Str);
        }

        let len = text.chars().count();
        self.min_len = self.min_len.min(len);
        self.max_len = self.max_len.max(len);
        self.sum_len += len as u64;

        for c in text.chars() {
            if c.is_ascii_digit() {
                self.has_digit = true;
            } else if c.is_alphabetic() {
                self.has_alpha = true;
            } else if !c.is_whitespace() {
                self.has_special = true;
            }
        }

        self.distinct.insert(text);
    }

    /// Finalize into a [`FieldStat`]. `dict_share` is a percentage
    /// threshold: `is_dictionary` holds iff `unique/non_empty*100 <= dict_share`.
    pub fn finish(self, dict_share: f64) -> FieldStat {
        let unique = self.distinct.len();
        let is_dictionary = self.non_empty > 0 && (unique as f64 / self.non_empty as f64) * 100.0 <= dict_share;
        let dictionary_values = if is_dictionary && unique <= self.dictionary_cap {
            Some(self.distinct.into_iter().collect())
        } else {
            None
        };
        FieldStat {
            field: self.field,
            ftype: self.ftype.unwrap_or(FieldType::Other),
            sample_size: self.sample_size,
            non_empty: self.non_empty,
            unique,
            min_len: if self.min_len == usize::MAX { 0 } else { self.min_len },
            max_len: self.max_len,
            avg_len: if self.non_empty == 0 { 0.0 } else { self.sum_len as f64 / self.non_empty as f64 },
            has_digit: self.has_digit,
            has_alpha: self.has_alpha,
            has_special: self.has_special,
            is_dictionary,
            dictionary_values,
        }
    }
}

/// Infer a field's scalar type, trying `int -> float -> bool -> date ->
/// str` in order for a value that arrived as text; values that already
/// carry a concrete Rust type map directly.
fn infer_scalar_type(value: &Value, text: &str, date_parser: &dyn DateParser) -> FieldType {
    match value {
        Value::Int(_) => FieldType::Int,
        Value::Float(_) => FieldType::Float,
        Value::Bool(_) => FieldType::Bool,
        Value::Null => FieldType::Other,
        Value::Str(_) => {
            if text.parse::<i64>().is_ok() {
                FieldType::Int
            } else if text.parse::<f64>().is_ok() {
                FieldType::Float
            } else if matches!(text.to_lowercase().as_str(), "true" | "false" | "yes" | "no") {
                FieldType::Bool
            } else if date_parser.match_date(text).is_some() {
                FieldType::Date
            } else {
                FieldType::Str
            }
        }
    }
}

/// Compute a [`FieldStat`] for every field present in the sample, honoring
/// `options.limit` rows and preserving the first record's field order.
pub fn analyze<I>(records: I, options: &AnalyzeOptions, date_parser: &dyn DateParser) -> Vec<FieldStat>
where
    I: IntoIterator<Item = Record>,
{
    let mut order: Vec<String> = Vec::new();
    let mut accumulators: indexmap::IndexMap<String, FieldAccumulator> = indexmap::IndexMap::new();

    for record in records.into_iter().take(options.limit) {
        for (field, value) in &record {
            if !accumulators.contains_key(field) {
                order.push(field.clone());
                accumulators.insert(field.clone(), FieldAccumulator::new(field.clone(), options.dictionary_cap));
            }
            accumulators.get_mut(field).unwrap().push(value, options, date_parser);
        }
    }

    order.into_iter().filter_map(|f| accumulators.shift_remove(&f)).map(|acc| acc.finish(options.dict_share)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_parser::{BuiltinDateParser, NullDateParser};

    fn rec(pairs: &[(&str, Value)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn infers_int_then_widens_to_str_on_contradiction() {
        let records = vec![rec(&[("n", Value::from("1"))]), rec(&[("n", Value::from("abc"))])];
        let stats = analyze(records, &AnalyzeOptions::default(), &NullDateParser);
        assert_eq!(stats[0].ftype, FieldType::Str);
    }

    #[test]
    fn infers_date_via_the_date_parser_before_falling_back_to_str() {
        let records = vec![rec(&[("d", Value::from("2024-01-15"))]), rec(&[("d", Value::from("2024-02-20"))])];
        let stats = analyze(records, &AnalyzeOptions::default(), &BuiltinDateParser);
        assert_eq!(stats[0].ftype, FieldType::Date);
    }

    #[test]
    fn without_a_date_parser_date_shaped_text_falls_back_to_str() {
        let records = vec![rec(&[("d", Value::from("2024-01-15"))])];
        let stats = analyze(records, &AnalyzeOptions::default(), &NullDateParser);
        assert_eq!(stats[0].ftype, FieldType::Str);
    }

    #[test]
    fn dictionary_detection_matches_threshold() {
        let records: Vec<Record> = (0..10).map(|i| rec(&[("flag", Value::from(if i % 2 == 0 { "yes" } else { "no" }))])).collect();
        let mut opts = AnalyzeOptions::default();
        opts.dict_share = 50.0;
        let stats = analyze(records, &opts, &NullDateParser);
        assert!(stats[0].is_dictionary);
        assert_eq!(stats[0].unique, 2);
    }

    #[test]
    fn empty_values_excluded_from_non_empty_count() {
        let records = vec![rec(&[("f", Value::from("N/A"))]), rec(&[("f", Value::from("x"))])];
        let stats = analyze(records, &AnalyzeOptions::default(), &NullDateParser);
        assert_eq!(stats[0].sample_size, 2);
        assert_eq!(stats[0].non_empty, 1);
    }

    #[test]
    fn preserves_first_record_field_order() {
        let records = vec![rec(&[("b", Value::from("1")), ("a", Value::from("2"))])];
        let stats = analyze(records, &AnalyzeOptions::default(), &NullDateParser);
        let fields: Vec<&str> = stats.iter().map(|s| s.field.as_str()).collect();
        assert_eq!(fields, vec!["b", "a"]);
    }

    #[test]
    fn has_digit_alpha_special_flags() {
        let records = vec![rec(&[("f", Value::from("a1-"))])];
        let stats = analyze(records, &AnalyzeOptions::default(), &NullDateParser);
        assert!(stats[0].has_digit && stats[0].has_alpha && stats[0].has_special);
    }
}
