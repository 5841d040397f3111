//! Safe grammar compiler for `ppr` rule bodies.
//!
//! ```text
//!   rule body text
//!        │  lex (lexer.rs) ── rejects banned substrings per identifier
//!        ▼
//!   Vec<Token>
//!        │  parse (parse.rs) ── rejects anything off the closed allow-list
//!        ▼
//!   Expr (ast.rs)
//!        │  compile (compile.rs)
//!        ▼
//!   CompiledGrammar ── memoized in cache.rs, keyed by body text
//! ```
//!
//! There is no stage here that can execute arbitrary Rust, shell out, or
//! perform I/O: a grammar body can only ever describe character-class
//! repetition, literals, and the handful of combinators in [`ast::Expr`].

mod ast;
mod cache;
mod compile;
mod lexer;
mod parse;

pub use ast::{CharClass, Expr, WordBounds};
pub use compile::CompiledGrammar;

use crate::error::GrammarError;

/// Compile a `ppr` rule body, consulting and populating the process-wide
/// cache so repeated bodies across rule files are compiled once.
pub fn compile_grammar(body: &str) -> Result<CompiledGrammar, GrammarError> {
    if let Some(hit) = cache::get(body) {
        return Ok(hit);
    }
    let tokens = lexer::lex(body)?;
    let expr = parse::parse(&tokens)?;
    let compiled = compile::compile_expr(&expr)?;
    cache::put(body, compiled.clone());
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_matches_scenario_s3_grammar() {
        let src = "(Literal('1') + Word(nums, exact=3)) ^ (Literal('2') + Word('01', exact=1) + Word(nums, exact=2))";
        let g = compile_grammar(src).unwrap();
        assert!(g.is_match("1123"));
        assert!(g.is_match("2013"));
    }

    #[test]
    fn rejects_unsafe_body() {
        let err = compile_grammar("__import__('os').system('x')").unwrap_err();
        assert_eq!(err.kind, crate::error::GrammarErrorKind::Unsafe);
    }
}
