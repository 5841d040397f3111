//! Command-line argument surface for the demonstration binary.
//!
//! This is glue, not core: the library never depends on `clap`, only
//! `src/main.rs` does, via this module.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "semantiq", version, about = "Classify tabular fields against a YAML rule catalog")]
pub struct Cli {
    /// Directory (or file) to load YAML rule files from. Repeatable.
    #[arg(long = "rules", required = true)]
    pub rule_paths: Vec<PathBuf>,

    /// Read newline-delimited JSON records from this file instead of stdin.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Minimum confidence percentage for a match to be reported.
    #[arg(long, default_value_t = 5.0)]
    pub confidence_threshold: f64,

    /// Stop evaluating data rules for a field after the first match at or
    /// above the confidence threshold.
    #[arg(long)]
    pub stop_on_match: bool,

    /// Disable the date-pattern detection pass.
    #[arg(long)]
    pub no_dates: bool,

    /// Include rules marked `imprecise` in the catalog.
    #[arg(long)]
    pub include_imprecise: bool,

    /// Restrict classification to these field names. Repeatable.
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Maximum number of records to sample.
    #[arg(long, default_value_t = 1000)]
    pub limit: usize,

    /// Restrict to rules tagged with one of these contexts. Repeatable.
    #[arg(long = "context")]
    pub contexts: Vec<String>,

    /// Restrict to rules tagged with one of these languages. Repeatable.
    #[arg(long = "lang")]
    pub langs: Vec<String>,

    /// Restrict to rules tagged with one of these country codes. Repeatable.
    #[arg(long = "country")]
    pub countries: Vec<String>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,
}
