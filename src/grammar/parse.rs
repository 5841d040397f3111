//! Recursive-descent parser for the grammar expression language.
//!
//! Precedence, loosest to tightest: `|` (first-alternative), `^`
//! (longest-alternative), `+` (sequence), postfix `.suppress()`, atoms.
//! Every identifier encountered is checked against [`ALLOWED_IDENTS`]
//! before being interpreted — this, together with the lexer's substring
//! check, is the whole safety boundary: there is no code path that
//! evaluates an identifier not on this list.

use super::ast::{CharClass, Expr, WordBounds};
use super::lexer::Token;
use crate::error::GrammarError;
use std::collections::BTreeSet;

/// The closed namespace. Anything else is `Unsafe`, not `Syntax` — an
/// unrecognized name is exactly the attempt-to-reference-the-host-environment
/// case this compiler exists to reject.
const ALLOWED_IDENTS: &[&str] = &[
    "Word",
    "Literal",
    "CaselessLiteral",
    "Optional",
    "Suppress",
    "suppress",
    "nums",
    "alphas",
    "alphanums",
    "printables",
    "hexnums",
    "punc8bit",
    "lineEnd",
    "exact",
    "min",
    "max",
];

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

/// Parse a full token stream into an [`Expr`]. Trailing tokens after a
/// complete expression are a `Syntax` error.
pub fn parse(tokens: &[Token]) -> Result<Expr, GrammarError> {
    let mut p = Parser { tokens, pos: 0 };
    let expr = p.parse_first_alt()?;
    if p.pos != p.tokens.len() {
        return Err(GrammarError::syntax(format!("unexpected trailing tokens at position {}", p.pos)));
    }
    Ok(expr)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, want: &Token) -> Result<(), GrammarError> {
        match self.bump() {
            Some(ref t) if t == want => Ok(()),
            other => Err(GrammarError::syntax(format!("expected {want:?}, found {other:?}"))),
        }
    }

    fn expect_ident_checked(&mut self) -> Result<String, GrammarError> {
        match self.bump() {
            Some(Token::Ident(name)) => {
                if ALLOWED_IDENTS.contains(&name.as_str()) {
                    Ok(name)
                } else {
                    Err(GrammarError::unsafe_(format!("unknown identifier '{name}'")))
                }
            }
            other => Err(GrammarError::syntax(format!("expected identifier, found {other:?}"))),
        }
    }

    fn parse_first_alt(&mut self) -> Result<Expr, GrammarError> {
        let mut lhs = self.parse_longest_alt()?;
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.bump();
            let rhs = self.parse_longest_alt()?;
            lhs = Expr::FirstAlt(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_longest_alt(&mut self) -> Result<Expr, GrammarError> {
        let mut lhs = self.parse_seq()?;
        while matches!(self.peek(), Some(Token::Caret)) {
            self.bump();
            let rhs = self.parse_seq()?;
            lhs = Expr::LongestAlt(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_seq(&mut self) -> Result<Expr, GrammarError> {
        let mut lhs = self.parse_postfix()?;
        while matches!(self.peek(), Some(Token::Plus)) {
            self.bump();
            let rhs = self.parse_postfix()?;
            lhs = Expr::Seq(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_postfix(&mut self) -> Result<Expr, GrammarError> {
        let mut expr = self.parse_atom()?;
        loop {
            if matches!(self.peek(), Some(Token::Dot)) {
                let save = self.pos;
                self.bump();
                match self.expect_ident_checked() {
                    Ok(name) if name == "suppress" => {
                        self.expect(&Token::LParen)?;
                        self.expect(&Token::RParen)?;
                        expr = Expr::Suppress(Box::new(expr));
                    }
                    Ok(name) => {
                        return Err(GrammarError::unsafe_(format!(
                            "attribute access '.{name}(...)' is not allowed (only '.suppress()')"
                        )));
                    }
                    Err(e) => {
                        self.pos = save;
                        return Err(e);
                    }
                }
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr, GrammarError> {
        match self.peek().cloned() {
            Some(Token::LParen) => {
                self.bump();
                let inner = self.parse_first_alt()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(_)) => {
                let name = self.expect_ident_checked()?;
                match name.as_str() {
                    "Word" => self.parse_word_call(),
                    "Literal" => self.parse_one_string_call(Expr::Literal),
                    "CaselessLiteral" => self.parse_one_string_call(Expr::CaselessLiteral),
                    "Optional" => self.parse_one_expr_call(|e| Expr::Optional(Box::new(e))),
                    "Suppress" => self.parse_one_expr_call(|e| Expr::Suppress(Box::new(e))),
                    "lineEnd" => Ok(Expr::LineEnd),
                    other => Err(GrammarError::syntax(format!("'{other}' is not valid in atom position"))),
                }
            }
            other => Err(GrammarError::syntax(format!("expected an atom, found {other:?}"))),
        }
    }

    fn parse_one_string_call(&mut self, ctor: fn(String) -> Expr) -> Result<Expr, GrammarError> {
        self.expect(&Token::LParen)?;
        let s = match self.bump() {
            Some(Token::Str(s)) => s,
            other => return Err(GrammarError::syntax(format!("expected a string literal, found {other:?}"))),
        };
        self.expect(&Token::RParen)?;
        Ok(ctor(s))
    }

    fn parse_one_expr_call(&mut self, ctor: fn(Expr) -> Expr) -> Result<Expr, GrammarError> {
        self.expect(&Token::LParen)?;
        let inner = self.parse_first_alt()?;
        self.expect(&Token::RParen)?;
        Ok(ctor(inner))
    }

    fn parse_word_call(&mut self) -> Result<Expr, GrammarError> {
        self.expect(&Token::LParen)?;
        let class = match self.bump() {
            Some(Token::Ident(name)) if ALLOWED_IDENTS.contains(&name.as_str()) => match name.as_str() {
                "nums" => CharClass::Nums,
                "alphas" => CharClass::Alphas,
                "alphanums" => CharClass::Alphanums,
                "printables" => CharClass::Printables,
                "hexnums" => CharClass::Hexnums,
                "punc8bit" => CharClass::Punc8Bit,
                other => return Err(GrammarError::syntax(format!("'{other}' is not a character class"))),
            },
            Some(Token::Ident(name)) => return Err(GrammarError::unsafe_(format!("unknown identifier '{name}'"))),
            Some(Token::Str(custom)) => CharClass::Custom(custom.chars().collect::<BTreeSet<_>>()),
            other => return Err(GrammarError::syntax(format!("expected a character class, found {other:?}"))),
        };

        let mut bounds = WordBounds::default();
        while matches!(self.peek(), Some(Token::Comma)) {
            self.bump();
            let key = self.expect_ident_checked()?;
            self.expect(&Token::Eq)?;
            let value = match self.bump() {
                Some(Token::Int(n)) if n >= 0 => n as usize,
                other => return Err(GrammarError::syntax(format!("expected a non-negative integer, found {other:?}"))),
            };
            match key.as_str() {
                "exact" => bounds.exact = Some(value),
                "min" => bounds.min = Some(value),
                "max" => bounds.max = Some(value),
                other => return Err(GrammarError::syntax(format!("unknown Word() keyword '{other}'"))),
            }
        }
        self.expect(&Token::RParen)?;

        if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
            if min > max {
                return Err(GrammarError::syntax(format!("Word() min={min} is greater than max={max}")));
            }
        }

        Ok(Expr::Word { class, bounds })
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::lex;
    use super::*;

    fn parsed(src: &str) -> Expr {
        parse(&lex(src).unwrap()).unwrap()
    }

    #[test]
    fn parses_word_with_exact() {
        let expr = parsed("Word(nums, exact=4)");
        assert_eq!(
            expr,
            Expr::Word { class: CharClass::Nums, bounds: WordBounds { exact: Some(4), min: None, max: None } }
        );
    }

    #[test]
    fn parses_custom_charset() {
        let expr = parsed("Word('01', exact=1)");
        assert_eq!(
            expr,
            Expr::Word {
                class: CharClass::Custom(['0', '1'].into_iter().collect()),
                bounds: WordBounds { exact: Some(1), min: None, max: None }
            }
        );
    }

    #[test]
    fn parses_sequence_and_grouped_alternation() {
        let src = "(Literal('1') + Word(nums, exact=3)) ^ (Literal('2') + Word('01', exact=1) + Word(nums, exact=2))";
        let expr = parsed(src);
        assert!(matches!(expr, Expr::LongestAlt(_, _)));
    }

    #[test]
    fn rejects_unknown_identifier() {
        let err = parse(&lex("Word(frobnicate)").unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::error::GrammarErrorKind::Unsafe);
    }

    #[test]
    fn rejects_attribute_access_other_than_suppress() {
        let err = parse(&lex("Literal('x').upper()").unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::error::GrammarErrorKind::Unsafe);
    }

    #[test]
    fn parses_suppress_postfix() {
        let expr = parsed("Literal('x').suppress()");
        assert!(matches!(expr, Expr::Suppress(_)));
    }

    #[test]
    fn rejects_min_greater_than_max() {
        assert!(parse(&lex("Word(nums, min=5, max=2)").unwrap()).is_err());
    }
}
