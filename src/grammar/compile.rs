//! Compiles an [`Expr`] into a runnable [`Matcher`].
//!
//! A matcher tries to consume a prefix of `text` starting exactly at byte
//! offset `pos` and returns the offset just past what it consumed. There is
//! no backtracking across matcher boundaries beyond what [`Expr::LongestAlt`]
//! and [`Expr::FirstAlt`] do internally — this mirrors pyparsing's `^`/`|`
//! rather than a full regex engine, which keeps compiled grammars cheap to
//! evaluate per candidate value.

use super::ast::{CharClass, Expr};
use crate::error::GrammarError;
use std::sync::Arc;

/// A compiled grammar ready to test candidate strings.
#[derive(Clone)]
pub struct CompiledGrammar {
    matcher: Arc<dyn Fn(&str, usize) -> Option<usize> + Send + Sync>,
    tolerates_trailing_whitespace: bool,
}

impl CompiledGrammar {
    /// Whole-string match: every byte of `text` must be consumed, except
    /// that a grammar ending in `lineEnd` tolerates trailing whitespace.
    pub fn is_match(&self, text: &str) -> bool {
        match (self.matcher)(text, 0) {
            Some(end) if end == text.len() => true,
            Some(end) if self.tolerates_trailing_whitespace => text[end..].chars().all(char::is_whitespace),
            _ => false,
        }
    }
}

/// Compile a parsed expression into a [`CompiledGrammar`]. Never fails for
/// anything [`super::parse::parse`] can produce today — reserved for future
/// combinators that parse but aren't implemented yet.
pub fn compile_expr(expr: &Expr) -> Result<CompiledGrammar, GrammarError> {
    let tolerates_trailing_whitespace = expr.ends_with_line_end();
    let matcher = build(expr)?;
    Ok(CompiledGrammar { matcher, tolerates_trailing_whitespace })
}

type Matcher = Arc<dyn Fn(&str, usize) -> Option<usize> + Send + Sync>;

fn build(expr: &Expr) -> Result<Matcher, GrammarError> {
    match expr {
        Expr::Word { class, bounds } => {
            let class = class.clone();
            let exact = bounds.exact;
            let min = bounds.min.or(exact).unwrap_or(1);
            let max = bounds.max.or(exact);
            Ok(Arc::new(move |text: &str, pos: usize| {
                let rest = &text[pos..];
                let mut count = 0usize;
                let mut end = pos;
                for ch in rest.chars() {
                    if !class.contains(ch) {
                        break;
                    }
                    if let Some(max) = max {
                        if count >= max {
                            break;
                        }
                    }
                    count += 1;
                    end += ch.len_utf8();
                }
                if count >= min { Some(end) } else { None }
            }))
        }
        Expr::Literal(lit) => {
            let lit = lit.clone();
            Ok(Arc::new(move |text: &str, pos: usize| {
                text[pos..].starts_with(lit.as_str()).then(|| pos + lit.len())
            }))
        }
        Expr::CaselessLiteral(lit) => {
            let lit_lower = lit.to_lowercase();
            Ok(Arc::new(move |text: &str, pos: usize| {
                let rest = &text[pos..];
                let take = rest.char_indices().nth(lit_lower.chars().count()).map(|(i, _)| i).unwrap_or(rest.len());
                let candidate = &rest[..take];
                (candidate.to_lowercase() == lit_lower).then(|| pos + take)
            }))
        }
        Expr::Optional(inner) => {
            let inner = build(inner)?;
            Ok(Arc::new(move |text: &str, pos: usize| Some(inner(text, pos).unwrap_or(pos))))
        }
        Expr::Suppress(inner) => build(inner)?,
        Expr::LineEnd => Ok(Arc::new(|text: &str, pos: usize| {
            text[pos..].chars().all(char::is_whitespace).then_some(text.len())
        })),
        Expr::Seq(lhs, rhs) => {
            let lhs = build(lhs)?;
            let rhs = build(rhs)?;
            Ok(Arc::new(move |text: &str, pos: usize| lhs(text, pos).and_then(|mid| rhs(text, mid))))
        }
        Expr::LongestAlt(lhs, rhs) => {
            let lhs = build(lhs)?;
            let rhs = build(rhs)?;
            Ok(Arc::new(move |text: &str, pos: usize| match (lhs(text, pos), rhs(text, pos)) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            }))
        }
        Expr::FirstAlt(lhs, rhs) => {
            let lhs = build(lhs)?;
            let rhs = build(rhs)?;
            Ok(Arc::new(move |text: &str, pos: usize| lhs(text, pos).or_else(|| rhs(text, pos))))
        }
    }
}

impl std::fmt::Debug for CompiledGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGrammar").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::lex;
    use super::super::parse::parse;
    use super::*;

    fn compile(src: &str) -> CompiledGrammar {
        compile_expr(&parse(&lex(src).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn word_exact_matches_whole_string_only() {
        let g = compile("Word(nums, exact=4)");
        assert!(g.is_match("1234"));
        assert!(!g.is_match("123"));
        assert!(!g.is_match("12345"));
    }

    #[test]
    fn literal_and_sequence() {
        let g = compile("Literal('US') + Word(nums, exact=3)");
        assert!(g.is_match("US123"));
        assert!(!g.is_match("US12"));
        assert!(!g.is_match("UK123"));
    }

    #[test]
    fn caseless_literal_ignores_case() {
        let g = compile("CaselessLiteral('yes')");
        assert!(g.is_match("YES"));
        assert!(g.is_match("Yes"));
        assert!(!g.is_match("nope"));
    }

    #[test]
    fn longest_alternative_prefers_the_longer_branch() {
        let src = "(Literal('1') + Word(nums, exact=3)) ^ (Literal('2') + Word('01', exact=1) + Word(nums, exact=2))";
        let g = compile(src);
        assert!(g.is_match("1123"));
        assert!(g.is_match("2013"));
        assert!(!g.is_match("3123"));
    }

    #[test]
    fn line_end_tolerates_trailing_whitespace() {
        let g = compile("Literal('ok') + lineEnd");
        assert!(g.is_match("ok"));
        assert!(g.is_match("ok   "));
        assert!(!g.is_match("ok!"));
    }

    #[test]
    fn optional_allows_absence() {
        let g = compile("Literal('US').suppress() + Optional(Literal('-')) + Word(nums, exact=3)");
        assert!(g.is_match("US123"));
        assert!(g.is_match("US-123"));
        assert!(!g.is_match("US--123"));
    }
}
