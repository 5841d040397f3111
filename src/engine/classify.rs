//! Per-scan classification algorithm.

use super::metrics::{FieldMetrics, RunMetrics};
use super::report::{ColumnReport, MatchOrigin, MatchResult, ScanReport};
use crate::analyzer::{AnalyzeOptions, FieldAccumulator, FieldStat};
use crate::cancel::CancellationToken;
use crate::catalog::{Catalog, Rule, SelectFilters};
use crate::date_parser::{DateParser, NullDateParser};
use crate::error::{ClassifyError, ConfigError};
use crate::value::{Record, Value};
use indexmap::IndexMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

/// Caller-tunable knobs for [`classify`]: sampling options and scan options
/// combined, since both ultimately bound the same record iteration.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub confidence_threshold: f64,
    pub stop_on_match: bool,
    pub parse_dates: bool,
    pub ignore_imprecise: bool,
    pub except_empty: bool,
    pub fields: Option<Vec<String>>,
    pub limit: usize,
    pub dict_share: f64,
    pub contexts: Vec<String>,
    pub langs: Vec<String>,
    pub countries: Vec<String>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 5.0,
            stop_on_match: false,
            parse_dates: true,
            ignore_imprecise: true,
            except_empty: true,
            fields: None,
            limit: 1000,
            dict_share: 10.0,
            contexts: Vec::new(),
            langs: Vec::new(),
            countries: Vec::new(),
        }
    }
}

impl ClassifyOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::ConfidenceThresholdOutOfRange(self.confidence_threshold.to_string()));
        }
        if !(0.0..=100.0).contains(&self.dict_share) {
            return Err(ConfigError::DictShareOutOfRange(self.dict_share.to_string()));
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }

    fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions { limit: self.limit, dict_share: self.dict_share, except_empty: self.except_empty, ..AnalyzeOptions::default() }
    }
}

/// Run a matcher (or validator) with panic isolation. A well-behaved
/// matcher never panics, but treating a panic as an absorbed
/// `MatcherRuntimeError` rather than letting it escape `classify` keeps the
/// "errors never escape `classify()`" guarantee even against a pathological
/// future matcher.
fn safe_call(f: impl FnOnce() -> bool) -> Result<bool, ()> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|_| ())
}

/// Run the full pipeline: sample `records` (bounded by `options.limit`),
/// compute [`FieldStat`]s, then classify each field against `catalog`'s
/// applicable rules.
pub fn classify<I>(
    records: I,
    catalog: &Catalog,
    options: &ClassifyOptions,
    date_parser: &dyn DateParser,
    cancel: Option<&CancellationToken>,
) -> Result<ScanReport, ClassifyError>
where
    I: IntoIterator<Item = Record>,
{
    run(records, catalog, options, date_parser, cancel, None).map(|r| r.report)
}

/// As [`classify`], but also returns timing information.
pub fn classify_with_metrics<I>(
    records: I,
    catalog: &Catalog,
    options: &ClassifyOptions,
    date_parser: &dyn DateParser,
    cancel: Option<&CancellationToken>,
) -> Result<super::metrics::RunResult, ClassifyError>
where
    I: IntoIterator<Item = Record>,
{
    let mut metrics = RunMetrics::default();
    let report = run(records, catalog, options, date_parser, cancel, Some(&mut metrics))?;
    Ok(super::metrics::RunResult { report: report.report, metrics })
}

struct Run {
    report: ScanReport,
}

fn run<I>(
    records: I,
    catalog: &Catalog,
    options: &ClassifyOptions,
    date_parser: &dyn DateParser,
    cancel: Option<&CancellationToken>,
    mut metrics: Option<&mut RunMetrics>,
) -> Result<Run, ClassifyError>
where
    I: IntoIterator<Item = Record>,
{
    let total_start = Instant::now();
    options.validate()?;

    let contexts: Vec<&str> = options.contexts.iter().map(String::as_str).collect();
    let langs: Vec<&str> = options.langs.iter().map(String::as_str).collect();
    let countries: Vec<&str> = options.countries.iter().map(String::as_str).collect();
    let view = catalog.select(SelectFilters {
        contexts: &contexts,
        langs: &langs,
        countries: &countries,
        ignore_imprecise: options.ignore_imprecise,
    });
    let field_rules: Vec<&Rule> = view.field_rules().copied().collect();
    let data_rules: Vec<&Rule> = view.data_rules().copied().collect();

    let analyze_opts = options.analyze_options();
    // Type inference's date trial should respect `parse_dates` the same way
    // the date pass itself does, rather than reporting FieldType::Date when
    // the caller asked for date detection to be off.
    let analyzer_date_parser: &dyn DateParser = if options.parse_dates { date_parser } else { &NullDateParser };

    let analysis_start = Instant::now();
    let mut order: Vec<String> = Vec::new();
    let mut samples: IndexMap<String, Vec<Value>> = IndexMap::new();
    let mut accumulators: IndexMap<String, FieldAccumulator> = IndexMap::new();

    for record in records.into_iter().take(options.limit) {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ClassifyError::Cancelled);
        }
        for (field, value) in &record {
            if let Some(allow) = &options.fields {
                if !allow.iter().any(|f| f == field) {
                    continue;
                }
            }
            if !accumulators.contains_key(field) {
                order.push(field.clone());
                accumulators.insert(field.clone(), FieldAccumulator::new(field.clone(), analyze_opts.dictionary_cap));
                samples.insert(field.clone(), Vec::new());
            }
            accumulators.get_mut(field).unwrap().push(value, &analyze_opts, analyzer_date_parser);
            samples.get_mut(field).unwrap().push(value.clone());
        }
    }

    let mut stats_by_field: IndexMap<String, FieldStat> = IndexMap::new();
    for field in &order {
        let acc = accumulators.shift_remove(field).unwrap();
        stats_by_field.insert(field.clone(), acc.finish(options.dict_share));
    }
    if let Some(m) = metrics.as_deref_mut() {
        m.analysis = analysis_start.elapsed();
    }

    let mut issues: Vec<String> = Vec::new();
    let mut columns: Vec<ColumnReport> = Vec::with_capacity(order.len());
    let mut stats_out: Vec<FieldStat> = Vec::with_capacity(order.len());

    for field in &order {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ClassifyError::Cancelled);
        }
        let stat = stats_by_field.shift_remove(field).unwrap();
        let values = &samples[field];
        let mut field_metrics = FieldMetrics { field: field.clone(), ..Default::default() };

        let field_name_start = Instant::now();
        let mut matches = field_name_pass(field, &field_rules, cancel)?;
        field_metrics.field_name_pass = field_name_start.elapsed();

        let data_start = Instant::now();
        let data_matches = data_value_pass(field, values, &data_rules, options, cancel, &mut issues)?;
        field_metrics.data_value_pass = data_start.elapsed();
        matches.extend(data_matches);

        if options.parse_dates {
            let date_start = Instant::now();
            matches.extend(date_pass(values, options, date_parser, cancel)?);
            field_metrics.date_pass = date_start.elapsed();
        }

        let tags = tags_for(&stat);
        columns.push(ColumnReport::new(field.clone(), stat.ftype, tags, matches));
        stats_out.push(stat);

        if let Some(m) = metrics.as_deref_mut() {
            m.fields.push(field_metrics);
        }
    }

    let report = ScanReport::assemble(columns, stats_out, issues);
    if let Some(m) = metrics {
        m.total = total_start.elapsed();
    }
    Ok(Run { report })
}

fn field_name_pass(field: &str, field_rules: &[&Rule], cancel: Option<&CancellationToken>) -> Result<Vec<MatchResult>, ClassifyError> {
    let lname = field.to_lowercase();
    let mut matches = Vec::new();
    for rule in field_rules {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ClassifyError::Cancelled);
        }
        if safe_call(|| rule.matcher.is_match(&lname)).unwrap_or(false) {
            matches.push(MatchResult {
                rule_id: rule.id.clone(),
                key: rule.key.clone(),
                origin: MatchOrigin::Field,
                confidence_pct: 100.0,
                datatype_format: None,
                priority: rule.priority,
            });
        }
    }
    Ok(matches)
}

fn data_value_pass(
    field: &str,
    values: &[Value],
    data_rules: &[&Rule],
    options: &ClassifyOptions,
    cancel: Option<&CancellationToken>,
    issues: &mut Vec<String>,
) -> Result<Vec<MatchResult>, ClassifyError> {
    let mut matches = Vec::new();

    for rule in data_rules {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ClassifyError::Cancelled);
        }
        if !rule.accepts_field_name(field) {
            continue;
        }

        let mut hits = 0usize;
        let mut considered = 0usize;
        let mut errors = 0usize;
        let mut degraded = false;

        for value in values {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(ClassifyError::Cancelled);
            }
            let text = value.as_match_str();
            if options.except_empty && value.is_blank() {
                continue;
            }
            let len = text.chars().count();
            if !rule.accepts_length(len) {
                continue;
            }
            considered += 1;

            let matched = match safe_call(|| rule.matcher.is_match(&text)) {
                Ok(true) => match rule.validator {
                    None => true,
                    Some(validator) => match safe_call(|| validator(&text)) {
                        Ok(ok) => ok,
                        Err(()) => {
                            errors += 1;
                            false
                        }
                    },
                },
                Ok(false) => false,
                Err(()) => {
                    errors += 1;
                    false
                }
            };
            if matched {
                hits += 1;
            }

            if considered >= 2 && errors * 2 > considered {
                degraded = true;
                break;
            }
        }

        if degraded {
            let msg = format!("rule '{}' degraded: errored on more than half of {considered} candidates for field '{field}'", rule.id);
            log::warn!("{msg}");
            issues.push(msg);
            continue;
        }

        let confidence_pct = 100.0 * hits as f64 / considered.max(1) as f64;
        if confidence_pct >= options.confidence_threshold {
            matches.push(MatchResult {
                rule_id: rule.id.clone(),
                key: rule.key.clone(),
                origin: MatchOrigin::Data,
                confidence_pct,
                datatype_format: None,
                priority: rule.priority,
            });
            if options.stop_on_match {
                break;
            }
        }
    }

    Ok(matches)
}

fn date_pass(
    values: &[Value],
    options: &ClassifyOptions,
    date_parser: &dyn DateParser,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<MatchResult>, ClassifyError> {
    let mut counts: IndexMap<&'static str, (usize, &'static str)> = IndexMap::new();
    let mut considered = 0usize;

    for value in values {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(ClassifyError::Cancelled);
        }
        if options.except_empty && value.is_blank() {
            continue;
        }
        considered += 1;
        let text = value.as_match_str();
        if let Some(pattern) = date_parser.match_date(&text) {
            let entry = counts.entry(pattern.pattern_id).or_insert((0, pattern.format));
            entry.0 += 1;
        }
    }

    let mut matches = Vec::new();
    for (pattern_id, (hits, format)) in counts {
        let confidence_pct = 100.0 * hits as f64 / considered.max(1) as f64;
        if confidence_pct >= options.confidence_threshold {
            matches.push(MatchResult {
                rule_id: pattern_id.to_string(),
                key: "date".to_string(),
                origin: MatchOrigin::Date,
                confidence_pct,
                datatype_format: Some(format.to_string()),
                priority: 0,
            });
        }
    }
    Ok(matches)
}

fn tags_for(stat: &FieldStat) -> Vec<String> {
    let mut tags = Vec::new();
    if stat.sample_size > 0 && stat.non_empty == 0 {
        tags.push("empty".to_string());
    }
    if stat.non_empty > 0 && stat.unique == stat.non_empty {
        tags.push("uniq".to_string());
    }
    if stat.is_dictionary {
        tags.push("dict".to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_parser::NullDateParser;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_rules(contents: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("rules.yaml")).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        dir
    }

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
    }

    // End-to-end scenarios live in tests/scenarios.rs, exercised through the
    // public API. These remaining tests cover option validation and gating
    // behavior.

    #[test]
    fn field_rule_gates_data_rule_by_field_name() {
        let dir = write_rules(
            r#"
name: t
rules:
  phone_like:
    key: phone
    name: Phone
    type: data
    match: text
    rule: "5551234"
    fieldrule: "phone,tel"
"#,
        );
        let catalog = Catalog::load(&[dir.path()]);
        let matches_field = classify(vec![rec(&[("phone", "5551234")])], &catalog, &ClassifyOptions::default(), &NullDateParser, None).unwrap();
        assert_eq!(matches_field.data[0].matches.len(), 1);

        let skips_field = classify(vec![rec(&[("other", "5551234")])], &catalog, &ClassifyOptions::default(), &NullDateParser, None).unwrap();
        assert!(skips_field.data[0].matches.is_empty());
    }

    #[test]
    fn rejects_out_of_range_confidence_threshold() {
        let catalog = Catalog::default();
        let mut opts = ClassifyOptions::default();
        opts.confidence_threshold = 150.0;
        let err = classify(Vec::<Record>::new(), &catalog, &opts, &NullDateParser, None).unwrap_err();
        assert!(matches!(err, ClassifyError::Config(_)));
    }

    #[test]
    fn cancellation_aborts_with_no_partial_report() {
        let catalog = Catalog::default();
        let token = CancellationToken::new();
        token.cancel();
        let err = classify(vec![rec(&[("f", "x")])], &catalog, &ClassifyOptions::default(), &NullDateParser, Some(&token)).unwrap_err();
        assert!(matches!(err, ClassifyError::Cancelled));
    }
}
