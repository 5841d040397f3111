//! Rule catalog: discovery, loading, validation, and runtime selection.
//!
//! ```text
//!   directories
//!        │  walkdir, one YAML doc per file
//!        ▼
//!   RuleFile (yaml.rs) ── malformed/typed-tag docs become a FileParse issue
//!        │  per-rule validate + compile (grammar for ppr, registry for func)
//!        ▼
//!   Vec<Rule> ── bad rules become a per-rule issue, file load continues
//!        │
//!        ▼
//!   Catalog ── immutable, Send + Sync, select() projects a RuleView
//! ```

mod rule;
mod yaml;

pub use rule::{FieldRule, MatchKind, Matcher, Rule, RuleType};

use crate::error::{CatalogIssue, CatalogIssueKind};
use std::path::Path;
use walkdir::WalkDir;

/// A loaded, immutable set of rules plus any non-fatal problems encountered
/// while loading them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rules: Vec<Rule>,
    issues: Vec<CatalogIssue>,
}

impl Catalog {
    /// Recursively walk every path, load every file whose top-level mapping
    /// has a `rules:` key, and compile every rule it defines. Never fails:
    /// malformed files and invalid rules are recorded in [`Catalog::issues`]
    /// instead.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Catalog {
        let mut rules = Vec::new();
        let mut issues = Vec::new();
        let mut load_order = 0usize;

        for root in paths {
            for entry in WalkDir::new(root.as_ref()).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let is_yaml = path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml");
                if !is_yaml {
                    continue;
                }
                let contents = match std::fs::read_to_string(path) {
                    Ok(c) => c,
                    Err(e) => {
                        issues.push(CatalogIssue::new(
                            path.to_path_buf(),
                            None,
                            CatalogIssueKind::FileParse(e.to_string()),
                        ));
                        continue;
                    }
                };
                let file = match yaml::parse_rule_file(path, &contents) {
                    Ok(f) => f,
                    Err(issue) => {
                        log::warn!("skipping rule file {}: {}", path.display(), issue.kind);
                        issues.push(issue);
                        continue;
                    }
                };

                for (id, yaml_rule) in file.rules {
                    match yaml::build_rule(
                        &id,
                        yaml_rule,
                        file.context.as_deref(),
                        file.lang.as_deref(),
                        file.country_code.as_deref(),
                        load_order,
                    ) {
                        Ok(rule) => {
                            load_order += 1;
                            rules.push(rule);
                        }
                        Err(kind) => {
                            log::warn!("skipping rule {} in {}: {}", id, path.display(), kind);
                            issues.push(CatalogIssue::new(path.to_path_buf(), Some(id), kind));
                        }
                    }
                }
            }
        }

        Catalog { rules, issues }
    }

    /// Non-fatal problems encountered while loading.
    pub fn issues(&self) -> &[CatalogIssue] {
        &self.issues
    }

    /// Every rule the catalog holds, regardless of filters.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Project a filtered, ordered view for one scan's use.
    pub fn select(&self, filters: SelectFilters<'_>) -> RuleView<'_> {
        let mut matching: Vec<&Rule> = self.rules.iter().filter(|r| filters.accepts(r)).collect();
        matching.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.load_order.cmp(&b.load_order)));
        RuleView { rules: matching }
    }
}

/// Filter tags applied by [`Catalog::select`]; empty slices mean "no
/// restriction on this axis".
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectFilters<'a> {
    pub contexts: &'a [&'a str],
    pub langs: &'a [&'a str],
    pub countries: &'a [&'a str],
    pub ignore_imprecise: bool,
}

const NEUTRAL_LANG: &str = "common";

impl<'a> SelectFilters<'a> {
    fn accepts(&self, rule: &Rule) -> bool {
        if self.ignore_imprecise && rule.imprecise {
            return false;
        }
        let context_ok = self.contexts.is_empty()
            || rule.context.as_deref().is_some_and(|c| self.contexts.contains(&c));
        let lang_ok = self.langs.is_empty()
            || rule.lang.as_deref().is_some_and(|l| l == NEUTRAL_LANG || self.langs.contains(&l));
        let country_ok = self.countries.is_empty()
            || rule.country_codes.is_empty()
            || rule.country_codes.iter().any(|c| self.countries.contains(&c.as_str()));
        context_ok && lang_ok && country_ok
    }
}

/// A filtered, ordered projection of a [`Catalog`]'s rules, grouped by
/// [`RuleType`] and ordered `(priority desc, load-order asc)` within each
/// group.
#[derive(Debug, Clone)]
pub struct RuleView<'a> {
    rules: Vec<&'a Rule>,
}

impl<'a> RuleView<'a> {
    pub fn field_rules(&self) -> impl Iterator<Item = &&'a Rule> {
        self.rules.iter().filter(|r| r.rule_type == RuleType::Field)
    }

    pub fn data_rules(&self) -> impl Iterator<Item = &&'a Rule> {
        self.rules.iter().filter(|r| r.rule_type == RuleType::Data)
    }
}
