//! The `defined` pseudo-operator (spec §4.6 / C99 6.10.1p1).
//!
//! `defined X` and `defined(X)` must be resolved *before* the rest of an
//! `#if`/`#elif` line undergoes macro expansion — expanding `X` first would
//! make `defined` unable to ask "is `X` a macro?" at all. This module knows
//! the `defined` grammar but nothing about a macro table; the caller
//! supplies an `is_defined` predicate (backed by whatever the driver's
//! macro table looks like) so this crate never needs to depend on
//! `cppp-pp`.

use cppp_lex::{Punct, Token, TokenKind};
use cppp_util::{SourceMap, Span};

use crate::error::EvalError;

/// Replace every `defined X` / `defined(X)` occurrence in `tokens` with a
/// single synthetic [`TokenKind::Number`] token spelling `1` or `0`.
///
/// Whitespace/newline tokens are passed through unchanged; everything else
/// that isn't part of a `defined` form is passed through unchanged too.
pub fn resolve_defined(
    tokens: &[Token],
    mut is_defined: impl FnMut(&str) -> bool,
    sources: &mut SourceMap,
    errors: &mut Vec<(EvalError, Span)>,
) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        if is_defined_keyword(tok, sources) {
            let defined_span = tok.span;
            let mut j = i + 1;
            skip_trivia(tokens, &mut j);

            let is_paren_form = matches!(
                tokens.get(j),
                Some(Token {
                    kind: TokenKind::Punct(Punct::LParen),
                    ..
                })
            );
            if is_paren_form {
                j += 1;
                skip_trivia(tokens, &mut j);
            }

            let name_tok = tokens.get(j).copied();
            if matches!(name_tok, Some(t) if t.kind == TokenKind::Identifier) {
                j += 1;
            }

            let mut well_formed = name_tok.is_some_and(|t| t.kind == TokenKind::Identifier);
            if is_paren_form {
                skip_trivia(tokens, &mut j);
                let closed = matches!(
                    tokens.get(j),
                    Some(Token {
                        kind: TokenKind::Punct(Punct::RParen),
                        ..
                    })
                );
                well_formed &= closed;
                if closed {
                    j += 1;
                }
            }

            let value = if well_formed {
                let name = sources.span_text(name_tok.unwrap().span).unwrap_or("");
                is_defined(name)
            } else {
                errors.push((EvalError::ExpectedExpression, defined_span));
                false
            };

            let buffer = sources.add_synthetic("<defined>", if value { "1" } else { "0" });
            out.push(Token::new(
                TokenKind::Number,
                Span {
                    buffer,
                    start: 0,
                    len: 1,
                },
            ));
            i = j;
        } else {
            out.push(tok);
            i += 1;
        }
    }
    out
}

fn is_defined_keyword(tok: Token, sources: &SourceMap) -> bool {
    tok.kind == TokenKind::Identifier && sources.span_text(tok.span) == Ok("defined")
}

fn skip_trivia(tokens: &[Token], i: &mut usize) {
    while let Some(t) = tokens.get(*i) {
        if t.is_whitespace_like() {
            *i += 1;
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppp_lex::Lexer;

    fn lex(src: &str, sources: &mut SourceMap) -> Vec<Token> {
        let (passed, _) = cppp_lex::prepass(src);
        let buf = sources.add_buffer("t.c", passed.clone());
        let mut lexer = Lexer::new(buf, &passed);
        lexer.tokenize()
    }

    fn spelled(sources: &SourceMap, tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .filter(|t| !t.is_whitespace_like() && !t.is_eof())
            .map(|t| sources.span_text(t.span).unwrap().to_string())
            .collect()
    }

    #[test]
    fn resolves_parenthesized_defined_true() {
        let mut sources = SourceMap::new();
        let tokens = lex("defined(FOO)", &mut sources);
        let mut errors = Vec::new();
        let out = resolve_defined(&tokens, |n| n == "FOO", &mut sources, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(spelled(&sources, &out), vec!["1"]);
    }

    #[test]
    fn resolves_bare_defined_false() {
        let mut sources = SourceMap::new();
        let tokens = lex("defined BAR", &mut sources);
        let mut errors = Vec::new();
        let out = resolve_defined(&tokens, |n| n == "FOO", &mut sources, &mut errors);
        assert_eq!(spelled(&sources, &out), vec!["0"]);
    }

    #[test]
    fn leaves_unrelated_tokens_untouched() {
        let mut sources = SourceMap::new();
        let tokens = lex("defined(FOO) && BAR", &mut sources);
        let mut errors = Vec::new();
        let out = resolve_defined(&tokens, |n| n == "FOO", &mut sources, &mut errors);
        assert_eq!(spelled(&sources, &out), vec!["1", "&&", "BAR"]);
    }

    #[test]
    fn missing_operand_is_an_error() {
        let mut sources = SourceMap::new();
        let tokens = lex("defined", &mut sources);
        let mut errors = Vec::new();
        let out = resolve_defined(&tokens, |_| false, &mut sources, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(spelled(&sources, &out), vec!["0"]);
    }
}
