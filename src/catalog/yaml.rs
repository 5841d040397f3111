//! Rule-file YAML shape and validation.
//!
//! Deserialization targets are plain structs/enums with no `Value`-typed
//! field anywhere in the path from document root to [`YamlRule`] — `serde_yaml`
//! therefore has nothing to attach a language-specific typed tag to. A
//! document using one (`!!python/object`, etc.) simply fails to deserialize
//! into [`RuleFile`] and the whole file is skipped as a [`CatalogIssueKind::FileParse`],
//! rejecting language-specific typed tags without any special-casing.

use super::rule::{FieldRule, MatchKind, Matcher, Rule, RuleType};
use crate::error::{CatalogIssue, CatalogIssueKind, GrammarError};
use crate::grammar::compile_grammar;
use crate::registry;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Top-level rule-file document shape.
#[derive(Debug, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    pub rules: std::collections::BTreeMap<String, YamlRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum YamlRuleType {
    Field,
    Data,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum YamlMatchKind {
    Text,
    Ppr,
    Func,
}

/// One entry under a rule file's `rules:` mapping, pre-validation.
#[derive(Debug, Deserialize)]
pub struct YamlRule {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    r#type: YamlRuleType,
    #[serde(rename = "match")]
    match_kind: YamlMatchKind,
    pub rule: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub minlen: Option<usize>,
    #[serde(default)]
    pub maxlen: Option<usize>,
    #[serde(default)]
    pub imprecise: i64,
    #[serde(default)]
    pub is_pii: bool,
    #[serde(default)]
    pub validator: Option<String>,
    #[serde(default)]
    pub fieldrule: Option<String>,
    #[serde(default)]
    fieldrulematch: Option<YamlFieldRuleMatch>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum YamlFieldRuleMatch {
    Text,
    Ppr,
}

/// Build a compiled [`Matcher`] for a rule body of the given [`MatchKind`],
/// returning a [`CatalogIssueKind`] describing why if it cannot be built.
fn compile_matcher(kind: MatchKind, body: &str) -> Result<Matcher, CatalogIssueKind> {
    match kind {
        MatchKind::Text => {
            let tokens: HashSet<String> =
                body.split(',').map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()).collect();
            if tokens.is_empty() {
                return Err(CatalogIssueKind::RuleValidation(format!(
                    "text rule body '{body}' did not yield any non-empty tokens"
                )));
            }
            Ok(Matcher::Text(tokens))
        }
        MatchKind::Ppr => {
            let compiled: Result<_, GrammarError> = compile_grammar(body);
            compiled.map(Matcher::Grammar).map_err(CatalogIssueKind::RuleCompile)
        }
        MatchKind::Func => registry::resolve(body).map(Matcher::Func).ok_or_else(|| CatalogIssueKind::RuleResolve(body.to_string())),
    }
}

/// Validate and compile one [`YamlRule`] into a [`Rule`], inheriting
/// per-file defaults for `context`/`lang`/`country_code` where the rule
/// itself doesn't override them.
pub fn build_rule(
    id: &str,
    yaml: YamlRule,
    file_context: Option<&str>,
    file_lang: Option<&str>,
    file_country_code: Option<&str>,
    load_order: usize,
) -> Result<Rule, CatalogIssueKind> {
    if let (Some(min), Some(max)) = (yaml.minlen, yaml.maxlen) {
        if min > max {
            return Err(CatalogIssueKind::RuleValidation(format!("minlen={min} is greater than maxlen={max}")));
        }
    }

    let rule_type = match yaml.r#type {
        YamlRuleType::Field => RuleType::Field,
        YamlRuleType::Data => RuleType::Data,
    };
    let match_kind = match yaml.match_kind {
        YamlMatchKind::Text => MatchKind::Text,
        YamlMatchKind::Ppr => MatchKind::Ppr,
        YamlMatchKind::Func => MatchKind::Func,
    };

    let matcher = compile_matcher(match_kind, &yaml.rule)?;

    let field_rule = match yaml.fieldrule {
        None => None,
        Some(body) => {
            let fr_kind = match yaml.fieldrulematch {
                None | Some(YamlFieldRuleMatch::Text) => MatchKind::Text,
                Some(YamlFieldRuleMatch::Ppr) => MatchKind::Ppr,
            };
            let matcher = compile_matcher(fr_kind, &body)?;
            Some(FieldRule { match_kind: fr_kind, matcher })
        }
    };

    let validator = match yaml.validator {
        None => None,
        Some(path) => Some(registry::resolve(&path).ok_or_else(|| CatalogIssueKind::RuleResolve(path.clone()))?),
    };

    let country_codes: Vec<String> = yaml
        .country_code
        .as_deref()
        .or(file_country_code)
        .map(|s| s.split(',').map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty()).collect())
        .unwrap_or_default();

    Ok(Rule {
        id: id.to_string(),
        key: yaml.key,
        name: yaml.name,
        rule_type,
        match_kind,
        rule_body: yaml.rule,
        matcher,
        min_len: yaml.minlen,
        max_len: yaml.maxlen,
        priority: yaml.priority,
        imprecise: yaml.imprecise != 0,
        is_pii: yaml.is_pii,
        context: yaml.context.or_else(|| file_context.map(str::to_string)),
        lang: yaml.lang.or_else(|| file_lang.map(str::to_string)),
        country_codes,
        field_rule,
        validator,
        load_order,
    })
}

/// Parse one file's bytes into a [`RuleFile`], reporting a
/// [`CatalogIssueKind::FileParse`] (not a hard error) on failure.
pub fn parse_rule_file(path: &Path, contents: &str) -> Result<RuleFile, CatalogIssue> {
    serde_yaml::from_str(contents)
        .map_err(|e| CatalogIssue::new(path.to_path_buf(), None, CatalogIssueKind::FileParse(e.to_string())))
}
