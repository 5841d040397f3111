//! Report types: the user-facing output of a scan.

use crate::analyzer::{FieldStat, FieldType};
use serde::Serialize;

/// Which pass of the classification engine produced a [`MatchResult`].
/// Distinct from [`crate::catalog::RuleType`]: a loaded rule is only ever
/// `field` or `data`, but the date pass synthesizes matches with no backing
/// rule at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOrigin {
    Field,
    Data,
    Date,
}

/// One rule (or date pattern) match against a column.
///
/// `datatype_format` is `Some` only for [`MatchOrigin::Date`] entries; when
/// present, `rule_id` doubles as the pattern id referenced by the
/// `(dt:<pattern>:<format>)` suffix in [`ColumnReport::matches_csv`].
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub rule_id: String,
    pub key: String,
    pub origin: MatchOrigin,
    pub confidence_pct: f64,
    pub datatype_format: Option<String>,
    /// Originating rule's priority, used for the priority-then-confidence
    /// sort in [`ColumnReport`]; date matches carry `0` (neutral).
    #[serde(skip)]
    pub priority: i64,
}

impl MatchResult {
    fn csv_entry(&self) -> String {
        match &self.datatype_format {
            Some(format) => format!("{} {:.2} (dt:{}:{})", self.key, self.confidence_pct, self.rule_id, format),
            None => format!("{} {:.2}", self.key, self.confidence_pct),
        }
    }
}

/// Per-field outcome: statistics-derived tags plus every surviving match,
/// sorted `(priority desc, confidence desc)`.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    pub field: String,
    pub ftype: FieldType,
    pub tags: Vec<String>,
    pub matches: Vec<MatchResult>,
    pub datatype_url: Option<String>,
}

impl ColumnReport {
    pub(super) fn new(field: String, ftype: FieldType, tags: Vec<String>, mut matches: Vec<MatchResult>) -> Self {
        matches.sort_by(|a, b| b.priority.cmp(&a.priority).then(b.confidence_pct.total_cmp(&a.confidence_pct)));
        ColumnReport { field, ftype, tags, matches, datatype_url: None }
    }

    fn matches_csv(&self) -> String {
        self.matches.iter().map(MatchResult::csv_entry).collect::<Vec<_>>().join(",")
    }

    fn tags_csv(&self) -> String {
        self.tags.join(",")
    }
}

/// One row of [`ScanReport::results`]: `[field, ftype, tags_csv, matches_csv, datatype_url]`.
pub type ResultRow = (String, FieldType, String, String, Option<String>);

/// The complete output of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub results: Vec<ResultRow>,
    pub data: Vec<ColumnReport>,
    pub stats: Vec<FieldStat>,
    /// Non-fatal problems encountered during this scan (e.g. a rule marked
    /// degraded). Catalog load issues live separately on `Catalog::issues()`.
    pub issues: Vec<String>,
}

impl ScanReport {
    pub(super) fn assemble(data: Vec<ColumnReport>, stats: Vec<FieldStat>, issues: Vec<String>) -> Self {
        let results = data
            .iter()
            .map(|c| (c.field.clone(), c.ftype, c.tags_csv(), c.matches_csv(), c.datatype_url.clone()))
            .collect();
        ScanReport { results, data, stats, issues }
    }
}
