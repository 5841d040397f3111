//! Error taxonomy.
//!
//! Most errors are per-rule or per-file and are collected into a non-fatal
//! side-channel ([`CatalogIssue`], returned from [`crate::catalog::Catalog::issues`]).
//! Only [`ClassifyError`] can escape [`crate::engine::classify`] — a scan
//! either finishes with a complete [`crate::engine::ScanReport`] or fails
//! with `Cancelled`/`Config`, never midway through the per-record loop.

use std::path::PathBuf;
use thiserror::Error;

/// Why [`crate::grammar::compile_grammar`] rejected a rule body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarErrorKind {
    /// Could not be tokenized/parsed as a grammar expression at all.
    Syntax,
    /// Parsed, but references a name or construct outside the closed
    /// namespace (attribute access other than `.suppress()`, disallowed
    /// substrings, unknown identifiers, ...).
    Unsafe,
    /// Parsed and safe, but uses a combinator/constructor this compiler
    /// does not (yet) implement.
    Unsupported,
}

/// A grammar (`ppr`) compilation failure.
#[derive(Debug, Clone, Error)]
#[error("grammar compile error ({kind:?}): {detail}")]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    pub detail: String,
}

impl GrammarError {
    pub fn syntax(detail: impl Into<String>) -> Self {
        Self { kind: GrammarErrorKind::Syntax, detail: detail.into() }
    }

    pub fn unsafe_(detail: impl Into<String>) -> Self {
        Self { kind: GrammarErrorKind::Unsafe, detail: detail.into() }
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self { kind: GrammarErrorKind::Unsupported, detail: detail.into() }
    }
}

/// The kind of a single rule-load problem, collected per [`CatalogIssue`].
#[derive(Debug, Clone, Error)]
pub enum CatalogIssueKind {
    /// The YAML document itself failed to parse or used a disallowed tag.
    #[error("file parse error: {0}")]
    FileParse(String),
    /// A rule's shape is invalid (missing field, contradictory bounds, ...).
    #[error("rule validation error: {0}")]
    RuleValidation(String),
    /// A `func` rule's dotted path did not resolve in the registry.
    #[error("rule resolve error: unknown function '{0}'")]
    RuleResolve(String),
    /// A `ppr` rule failed to compile.
    #[error("rule compile error: {0}")]
    RuleCompile(#[from] GrammarError),
}

/// One non-fatal problem encountered while loading the rule catalog.
///
/// Catalog loading never aborts because of these; the offending rule or
/// file is skipped and the issue is recorded here instead.
#[derive(Debug, Clone, Error)]
#[error("{file}: {rule_id:?}: {kind}")]
pub struct CatalogIssue {
    pub file: PathBuf,
    pub rule_id: Option<String>,
    pub kind: CatalogIssueKind,
}

impl CatalogIssue {
    pub fn new(file: PathBuf, rule_id: Option<String>, kind: CatalogIssueKind) -> Self {
        Self { file, rule_id, kind }
    }
}

/// Caller passed an option outside its valid range.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("confidence_threshold must be within [0, 100], got {0}")]
    ConfidenceThresholdOutOfRange(String),
    #[error("dict_share must be within [0, 100], got {0}")]
    DictShareOutOfRange(String),
    #[error("limit must be greater than zero")]
    ZeroLimit,
}

/// The only error [`crate::engine::classify`] can return.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// A cooperative cancellation signal tripped mid-scan. No partial
    /// `ScanReport` is returned.
    #[error("scan cancelled")]
    Cancelled,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
