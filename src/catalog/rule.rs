//! Compiled, immutable rule representation.
//!
//! A [`Rule`] is the in-memory result of validating and compiling one entry
//! from a rule file's `rules:` mapping. Once a [`crate::catalog::Catalog`] is
//! built, rules never change — matching only ever reads them.

use crate::grammar::CompiledGrammar;
use crate::registry::RegisteredFn;
use std::collections::HashSet;

/// Whether a rule applies to the field name or to sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    Field,
    Data,
}

/// The three ways a rule body can be expressed and matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Text,
    Ppr,
    Func,
}

/// The compiled form of a rule's body, dispatched by [`MatchKind`] rather
/// than an inheritance hierarchy (tagged-union rule polymorphism).
#[derive(Clone)]
pub enum Matcher {
    /// Lower-cased token set; matching is `set.contains(&candidate.to_lowercase())`.
    Text(HashSet<String>),
    Grammar(CompiledGrammar),
    Func(RegisteredFn),
}

impl Matcher {
    /// Test a candidate string. Text matching lower-cases once per call
    /// since candidates vary per row; grammar and func matchers are pure
    /// functions of the string as given.
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Matcher::Text(set) => set.contains(&candidate.to_lowercase()),
            Matcher::Grammar(g) => g.is_match(candidate),
            Matcher::Func(f) => f(candidate),
        }
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Matcher::Text(set) => f.debug_tuple("Text").field(&set.len()).finish(),
            Matcher::Grammar(_) => f.write_str("Grammar(..)"),
            Matcher::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Optional secondary condition on the field name that a `data` rule must
/// also satisfy before its value matcher is even tried.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub match_kind: MatchKind,
    pub matcher: Matcher,
}

/// One fully compiled, validated rule. Immutable; `Send + Sync` so a
/// [`crate::catalog::Catalog`] can be shared across scan threads behind an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub key: String,
    pub name: String,
    pub rule_type: RuleType,
    pub match_kind: MatchKind,
    pub rule_body: String,
    pub matcher: Matcher,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub priority: i64,
    pub imprecise: bool,
    pub is_pii: bool,
    pub context: Option<String>,
    pub lang: Option<String>,
    pub country_codes: Vec<String>,
    pub field_rule: Option<FieldRule>,
    pub validator: Option<RegisteredFn>,
    /// Position within the load order across the whole catalog; used as the
    /// tie-break after `priority`.
    pub load_order: usize,
}

impl Rule {
    /// Length-bound acceptance for a candidate value: a value is a
    /// candidate iff its string form has length in `[min_len, max_len]`,
    /// bounds defaulting to `[0, ∞]`.
    pub fn accepts_length(&self, len: usize) -> bool {
        self.min_len.is_none_or(|min| len >= min) && self.max_len.is_none_or(|max| len <= max)
    }

    /// Whether this data rule's `field_rule` (if any) accepts a given field
    /// name; a rule with no `field_rule` accepts every field.
    pub fn accepts_field_name(&self, field_name: &str) -> bool {
        match &self.field_rule {
            None => true,
            Some(fr) => fr.matcher.is_match(field_name),
        }
    }
}
