//! A rule-driven semantic classifier for tabular fields.
//!
//! Given a bounded sample of records, this crate labels each field (column)
//! with zero or more semantic datatypes — email, phone, ISO country code,
//! year, and whatever else a rule catalog describes — together with a
//! confidence score, by matching field names and values against a YAML rule
//! catalog compiled through a closed, safe grammar.
//!
//! ```text
//!   rule files ── Catalog::load ──────────────────────────┐
//!                                                          │
//!   records ── analyzer::analyze ── FieldStat[]            │
//!                                                          ▼
//!                                   engine::classify ── ScanReport
//! ```
//!
//! Start with [`catalog::Catalog::load`] to build a rule set, then
//! [`engine::classify`] to run it over a record source.

pub mod analyzer;
pub mod cancel;
pub mod catalog;
pub mod date_parser;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod registry;
pub mod value;

pub use analyzer::{AnalyzeOptions, FieldStat, FieldType, analyze};
pub use cancel::CancellationToken;
pub use catalog::{Catalog, Rule, SelectFilters};
pub use date_parser::{BuiltinDateParser, DatePattern, DateParser, NullDateParser};
pub use engine::{ClassifyOptions, ColumnReport, MatchOrigin, MatchResult, ScanReport, classify};
pub use error::{CatalogIssue, ClassifyError, ConfigError, GrammarError, GrammarErrorKind};
pub use grammar::compile_grammar;
pub use value::{Record, Value};
