//! Directive dispatch (spec §4.7): `#include`, `#define`, `#undef`,
//! `#if`/`#ifdef`/`#ifndef`/`#elif`/`#else`/`#endif`, `#warning`, `#error`,
//! `#line`, `#pragma`.
//!
//! Functions here take explicit parameters rather than one bundled context
//! struct — evaluating a controlling expression needs a shared borrow of
//! the macro table alongside mutable borrows of the source map and
//! interner, and keeping those as separate bindings (rather than fields
//! reached through one `&mut`) keeps every borrow trivially disjoint.

use bumpalo::Bump;
use cppp_eval::defined::resolve_defined;
use cppp_lex::{HeaderKind, Punct, Token, TokenKind};
use cppp_util::diagnostic::codes::W_USER_WARNING;
use cppp_util::{DiagnosticBuilder, Handler, Interner, SourceMap, Span, Symbol};

use crate::conditional::ConditionalStack;
use crate::error::{DirectiveError, IncludeError, MacroError};
use crate::expand::{expand_line, ExpandContext};
use crate::macros::{Macro, MacroKind, MacroTable, SpacedToken};

pub enum DirectiveOutcome {
    Handled,
    Include {
        kind: HeaderKind,
        name: String,
        span: Span,
    },
    PragmaOnce,
}

/// Dispatch one directive line. `args` is everything on the line after the
/// leading `#`; `hash_span` is the `#` token's own span, used as the anchor
/// for diagnostics that don't have a more specific location.
#[allow(clippy::too_many_arguments)]
pub fn dispatch(
    args: &[Token],
    hash_span: Span,
    conditional: &mut ConditionalStack,
    macros: &mut MacroTable,
    sources: &mut SourceMap,
    interner: &mut Interner,
    diagnostics: &mut Handler,
    arena: &Bump,
    expansion_depth_limit: usize,
) -> DirectiveOutcome {
    let mut i = 0;
    skip_trivia(args, &mut i);
    let Some(name_tok) = args.get(i).copied() else {
        // A lone `#` on a line is the null directive: valid, does nothing.
        return DirectiveOutcome::Handled;
    };
    let name = if name_tok.kind == TokenKind::Identifier {
        sources.span_text(name_tok.span).unwrap_or("").to_string()
    } else {
        String::new()
    };
    i += 1;
    skip_trivia(args, &mut i);
    let rest = &args[i.min(args.len())..];

    match name.as_str() {
        "if" => {
            let cond = if conditional.is_active() {
                evaluate_controlling_expr(
                    rest,
                    macros,
                    sources,
                    interner,
                    diagnostics,
                    arena,
                    expansion_depth_limit,
                )
            } else {
                false
            };
            log::debug!("#if -> {}", if cond { "Taking" } else { "Skipping" });
            if let Err(e) = conditional.push_if(cond, hash_span) {
                emit_directive_error(diagnostics, sources, e, hash_span);
            }
            return DirectiveOutcome::Handled;
        }
        "ifdef" | "ifndef" => {
            let cond = if conditional.is_active() {
                let defined = lookup_name(rest, sources, interner, macros);
                if name == "ifndef" {
                    !defined
                } else {
                    defined
                }
            } else {
                false
            };
            if let Err(e) = conditional.push_if(cond, hash_span) {
                emit_directive_error(diagnostics, sources, e, hash_span);
            }
            return DirectiveOutcome::Handled;
        }
        "elif" => {
            // `cond` is only meaningful while this frame is still
            // `Skipping`; evaluating it when the stack is empty, taking, or
            // already done risks spurious diagnostics from a controlling
            // expression the frame can never act on.
            let should_eval = conditional.depth() > 0 && !conditional.is_active();
            let cond = if should_eval {
                evaluate_controlling_expr(
                    rest,
                    macros,
                    sources,
                    interner,
                    diagnostics,
                    arena,
                    expansion_depth_limit,
                )
            } else {
                false
            };
            if let Err(e) = conditional.handle_elif(cond, hash_span) {
                emit_directive_error(diagnostics, sources, e, hash_span);
            }
            return DirectiveOutcome::Handled;
        }
        "else" => {
            if let Err(e) = conditional.handle_else(hash_span) {
                emit_directive_error(diagnostics, sources, e, hash_span);
            }
            return DirectiveOutcome::Handled;
        }
        "endif" => {
            if let Err(e) = conditional.handle_endif() {
                emit_directive_error(diagnostics, sources, e, hash_span);
            }
            return DirectiveOutcome::Handled;
        }
        _ => {}
    }

    // Everything below is a non-conditional directive: per the skipping
    // discipline, these are only interpreted while the stack is active.
    if !conditional.is_active() {
        return DirectiveOutcome::Handled;
    }

    match name.as_str() {
        "include" => handle_include(rest, hash_span, sources, diagnostics),
        "define" => {
            handle_define(rest, hash_span, macros, sources, interner, diagnostics);
            DirectiveOutcome::Handled
        }
        "undef" => {
            handle_undef(rest, hash_span, sources, interner, macros, diagnostics);
            DirectiveOutcome::Handled
        }
        "warning" => {
            let message = line_text(rest, sources);
            diagnostics.emit(
                DiagnosticBuilder::warning(message)
                    .code(W_USER_WARNING)
                    .span(hash_span)
                    .build(sources),
            );
            DirectiveOutcome::Handled
        }
        "error" => {
            let message = line_text(rest, sources);
            emit_directive_error(diagnostics, sources, DirectiveError::UserError(message), hash_span);
            DirectiveOutcome::Handled
        }
        "line" => DirectiveOutcome::Handled,
        "pragma" => handle_pragma(rest, sources),
        _ => {
            emit_directive_error(diagnostics, sources, DirectiveError::UnknownDirective, hash_span);
            DirectiveOutcome::Handled
        }
    }
}

fn lookup_name(
    rest: &[Token],
    sources: &SourceMap,
    interner: &mut Interner,
    macros: &MacroTable,
) -> bool {
    let mut i = 0;
    skip_trivia(rest, &mut i);
    match rest.get(i) {
        Some(t) if t.kind == TokenKind::Identifier => {
            let text = sources.span_text(t.span).unwrap_or("");
            let sym = interner.intern(text);
            macros.is_defined(sym)
        }
        _ => false,
    }
}

#[allow(clippy::too_many_arguments)]
fn evaluate_controlling_expr(
    rest: &[Token],
    macros: &MacroTable,
    sources: &mut SourceMap,
    interner: &mut Interner,
    diagnostics: &mut Handler,
    arena: &Bump,
    expansion_depth_limit: usize,
) -> bool {
    let mut defined_errors = Vec::new();
    let resolved = {
        let is_defined = |name: &str| -> bool {
            let sym = interner.intern(name);
            macros.is_defined(sym)
        };
        resolve_defined(rest, is_defined, sources, &mut defined_errors)
    };
    for (err, span) in defined_errors {
        diagnostics.emit(
            DiagnosticBuilder::error(err.to_string())
                .code(err.code())
                .span(span)
                .build(sources),
        );
    }

    let mut macro_errors = Vec::new();
    let expanded = {
        let mut ctx = ExpandContext {
            macros,
            sources: &mut *sources,
            interner: &mut *interner,
            arena,
            errors: &mut macro_errors,
            expansion_depth_limit,
        };
        expand_line(&resolved, &mut ctx)
    };
    for (err, span) in macro_errors {
        emit_macro_error(diagnostics, sources, err, span);
    }

    let outcome = cppp_eval::evaluate(&expanded, &*sources);
    for (err, span) in outcome.errors {
        diagnostics.emit(
            DiagnosticBuilder::error(err.to_string())
                .code(err.code())
                .span(span)
                .build(sources),
        );
    }
    outcome.value != 0
}

fn handle_include(
    rest: &[Token],
    hash_span: Span,
    sources: &SourceMap,
    diagnostics: &mut Handler,
) -> DirectiveOutcome {
    let mut i = 0;
    skip_trivia(rest, &mut i);
    match rest.get(i) {
        Some(t) if matches!(t.kind, TokenKind::Header(_)) => {
            let kind = match t.kind {
                TokenKind::Header(k) => k,
                _ => unreachable!(),
            };
            let text = sources.span_text(t.span).unwrap_or("");
            let name = text
                .trim_start_matches(['"', '<'])
                .trim_end_matches(['"', '>'])
                .to_string();
            DirectiveOutcome::Include {
                kind,
                name,
                span: t.span,
            }
        }
        _ => {
            emit_include_error(diagnostics, sources, IncludeError::Malformed, hash_span);
            DirectiveOutcome::Handled
        }
    }
}

fn handle_define(
    args: &[Token],
    hash_span: Span,
    macros: &mut MacroTable,
    sources: &SourceMap,
    interner: &mut Interner,
    diagnostics: &mut Handler,
) {
    let mut i = 0;
    skip_trivia(args, &mut i);
    let Some(name_tok) = args.get(i).copied() else {
        emit_directive_error(diagnostics, sources, DirectiveError::MalformedDefine, hash_span);
        return;
    };
    if name_tok.kind != TokenKind::Identifier {
        emit_directive_error(diagnostics, sources, DirectiveError::MalformedDefine, hash_span);
        return;
    }
    let name_text = sources.span_text(name_tok.span).unwrap_or("").to_string();
    let name_sym = interner.intern(&name_text);
    i += 1;

    let is_function_like =
        matches!(args.get(i), Some(t) if t.kind == TokenKind::Punct(Punct::LParen));

    let kind = if is_function_like {
        i += 1;
        match parse_param_list(args, &mut i, interner, sources, diagnostics, hash_span) {
            Some((params, variadic)) => MacroKind::FunctionLike { params, variadic },
            None => return,
        }
    } else {
        MacroKind::ObjectLike
    };

    skip_trivia(args, &mut i);
    let body_tokens = &args[i.min(args.len())..];
    let body = build_spaced_body(body_tokens);

    if let Err(err) = validate_body(&body, &kind, sources, interner) {
        emit_macro_error(diagnostics, sources, err, hash_span);
        return;
    }

    let mac = Macro {
        name: name_sym,
        kind,
        body,
        def_span: hash_span,
    };
    if let Err(err) = macros.define(mac, sources) {
        emit_macro_error(diagnostics, sources, err, hash_span);
    }
}

fn parse_param_list(
    args: &[Token],
    i: &mut usize,
    interner: &mut Interner,
    sources: &SourceMap,
    diagnostics: &mut Handler,
    hash_span: Span,
) -> Option<(Vec<Symbol>, bool)> {
    let mut params: Vec<Symbol> = Vec::new();
    let mut variadic = false;

    skip_trivia(args, i);
    if matches!(args.get(*i), Some(t) if t.kind == TokenKind::Punct(Punct::RParen)) {
        *i += 1;
        return Some((params, false));
    }

    loop {
        skip_trivia(args, i);
        match args.get(*i) {
            Some(t) if t.kind == TokenKind::Punct(Punct::Ellipsis) => {
                variadic = true;
                *i += 1;
                break;
            }
            Some(t) if t.kind == TokenKind::Identifier => {
                let text = sources.span_text(t.span).unwrap_or("").to_string();
                let sym = interner.intern(&text);
                if params.contains(&sym) {
                    emit_macro_error(
                        diagnostics,
                        sources,
                        MacroError::DuplicateParam(text),
                        hash_span,
                    );
                    return None;
                }
                params.push(sym);
                *i += 1;
            }
            _ => {
                emit_directive_error(diagnostics, sources, DirectiveError::MalformedDefine, hash_span);
                return None;
            }
        }
        skip_trivia(args, i);
        match args.get(*i) {
            Some(t) if t.kind == TokenKind::Punct(Punct::Comma) => {
                *i += 1;
            }
            Some(t) if t.kind == TokenKind::Punct(Punct::RParen) => break,
            _ => {
                emit_directive_error(diagnostics, sources, DirectiveError::MalformedDefine, hash_span);
                return None;
            }
        }
    }

    skip_trivia(args, i);
    if matches!(args.get(*i), Some(t) if t.kind == TokenKind::Punct(Punct::RParen)) {
        *i += 1;
        Some((params, variadic))
    } else {
        emit_directive_error(diagnostics, sources, DirectiveError::MalformedDefine, hash_span);
        None
    }
}

fn build_spaced_body(tokens: &[Token]) -> Vec<SpacedToken> {
    let mut out = Vec::new();
    let mut space_before = false;
    for &tok in tokens {
        if tok.is_whitespace_like() || tok.is_eof() {
            space_before = true;
            continue;
        }
        out.push(SpacedToken {
            token: tok,
            space_before,
        });
        space_before = false;
    }
    out
}

fn validate_body(
    body: &[SpacedToken],
    kind: &MacroKind,
    sources: &SourceMap,
    interner: &mut Interner,
) -> Result<(), MacroError> {
    if let Some(first) = body.first() {
        if first.token.kind == TokenKind::Punct(Punct::HashHash) {
            return Err(MacroError::PasteMisuse);
        }
    }
    if let Some(last) = body.last() {
        if last.token.kind == TokenKind::Punct(Punct::HashHash) {
            return Err(MacroError::PasteMisuse);
        }
    }

    if let MacroKind::FunctionLike { params, variadic } = kind {
        let va_sym = if *variadic {
            Some(interner.intern("__VA_ARGS__"))
        } else {
            None
        };
        for (idx, st) in body.iter().enumerate() {
            if st.token.kind != TokenKind::Punct(Punct::Hash) {
                continue;
            }
            let ok = match body.get(idx + 1) {
                Some(next) if next.token.kind == TokenKind::Identifier => {
                    let text = sources.span_text(next.token.span).unwrap_or("");
                    let sym = interner.intern(text);
                    params.contains(&sym) || Some(sym) == va_sym
                }
                _ => false,
            };
            if !ok {
                return Err(MacroError::StringizeMisuse);
            }
        }
    }

    Ok(())
}

fn handle_undef(
    rest: &[Token],
    hash_span: Span,
    sources: &SourceMap,
    interner: &mut Interner,
    macros: &mut MacroTable,
    diagnostics: &mut Handler,
) {
    let mut i = 0;
    skip_trivia(rest, &mut i);
    match rest.get(i) {
        Some(t) if t.kind == TokenKind::Identifier => {
            let text = sources.span_text(t.span).unwrap_or("").to_string();
            let sym = interner.intern(&text);
            macros.undef(sym);
        }
        _ => emit_directive_error(diagnostics, sources, DirectiveError::MalformedDefine, hash_span),
    }
}

fn handle_pragma(rest: &[Token], sources: &SourceMap) -> DirectiveOutcome {
    let mut i = 0;
    skip_trivia(rest, &mut i);
    if let Some(t) = rest.get(i) {
        if t.kind == TokenKind::Identifier && sources.span_text(t.span) == Ok("once") {
            return DirectiveOutcome::PragmaOnce;
        }
    }
    DirectiveOutcome::Handled
}

fn line_text(tokens: &[Token], sources: &SourceMap) -> String {
    let mut out = String::new();
    let mut prev_was_trivia = true;
    for tok in tokens {
        if tok.is_whitespace_like() || tok.is_eof() {
            prev_was_trivia = true;
            continue;
        }
        if !out.is_empty() && prev_was_trivia {
            out.push(' ');
        }
        out.push_str(sources.span_text(tok.span).unwrap_or(""));
        prev_was_trivia = false;
    }
    out
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

fn emit_directive_error(
    diagnostics: &mut Handler,
    sources: &SourceMap,
    err: DirectiveError,
    span: Span,
) {
    diagnostics.emit(
        DiagnosticBuilder::error(err.to_string())
            .code(err.code())
            .span(span)
            .build(sources),
    );
}

pub(crate) fn emit_macro_error(diagnostics: &mut Handler, sources: &SourceMap, err: MacroError, span: Span) {
    let builder = if err.code().prefix == "W" {
        DiagnosticBuilder::warning(err.to_string())
    } else {
        DiagnosticBuilder::error(err.to_string())
    };
    diagnostics.emit(builder.code(err.code()).span(span).build(sources));
}

pub(crate) fn emit_include_error(diagnostics: &mut Handler, sources: &SourceMap, err: IncludeError, span: Span) {
    diagnostics.emit(
        DiagnosticBuilder::error(err.to_string())
            .code(err.code())
            .span(span)
            .build(sources),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppp_lex::{prepass, Lexer};
    use cppp_util::BufferId;

    fn lex(sources: &mut SourceMap, text: &str) -> Vec<Token> {
        let (passed, _) = prepass(text);
        let buf = sources.add_buffer("t.c", passed.clone());
        let mut lexer = Lexer::new(buf, sources.text(buf).unwrap());
        lexer.tokenize()
    }

    /// Mirrors what the real line driver does for `#include`: lex the
    /// `include` keyword normally, then switch the same lexer into
    /// header-name mode for the remainder, since a generic `tokenize()`
    /// would otherwise split `<stdio.h>` into ordinary punctuators.
    fn lex_include_line(sources: &mut SourceMap, text: &str) -> Vec<Token> {
        let (passed, _) = prepass(text);
        let buf = sources.add_buffer("t.c", passed.clone());
        let mut lexer = Lexer::new(buf, sources.text(buf).unwrap());
        let mut out = vec![lexer.next_token()]; // "include"
        let ws = lexer.next_token();
        out.push(ws);
        if let Some(header) = lexer.next_header_token() {
            out.push(header);
        }
        out
    }

    fn hash_span() -> Span {
        Span {
            buffer: BufferId(0),
            start: 0,
            len: 1,
        }
    }

    struct Fixture {
        sources: SourceMap,
        interner: Interner,
        macros: MacroTable,
        conditional: ConditionalStack,
        diagnostics: Handler,
        arena: Bump,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                sources: SourceMap::new(),
                interner: Interner::new(),
                macros: MacroTable::new(),
                conditional: ConditionalStack::new(64),
                diagnostics: Handler::new(),
                arena: Bump::new(),
            }
        }

        fn dispatch(&mut self, text: &str) -> DirectiveOutcome {
            let tokens = lex(&mut self.sources, text);
            let rest: Vec<Token> = tokens.into_iter().filter(|t| !t.is_eof()).collect();
            dispatch(
                &rest,
                hash_span(),
                &mut self.conditional,
                &mut self.macros,
                &mut self.sources,
                &mut self.interner,
                &mut self.diagnostics,
                &self.arena,
                200,
            )
        }
    }

    #[test]
    fn define_object_like_then_if_evaluates_true() {
        let mut fx = Fixture::new();
        fx.dispatch("define MAX 100");
        assert!(fx.diagnostics.diagnostics().is_empty());
        fx.dispatch("if MAX > 50");
        assert!(fx.conditional.is_active());
    }

    #[test]
    fn ifdef_checks_macro_table() {
        let mut fx = Fixture::new();
        fx.dispatch("define FEATURE 1");
        fx.dispatch("ifdef FEATURE");
        assert!(fx.conditional.is_active());
        fx.dispatch("endif");
        fx.dispatch("ifndef FEATURE");
        assert!(!fx.conditional.is_active());
    }

    #[test]
    fn else_and_endif_close_group() {
        let mut fx = Fixture::new();
        fx.dispatch("if 0");
        assert!(!fx.conditional.is_active());
        fx.dispatch("else");
        assert!(fx.conditional.is_active());
        fx.dispatch("endif");
        assert!(fx.conditional.is_active());
    }

    #[test]
    fn elif_inside_skipping_branch_can_take() {
        let mut fx = Fixture::new();
        fx.dispatch("if 0");
        fx.dispatch("elif 1");
        assert!(fx.conditional.is_active());
    }

    #[test]
    fn define_then_undef_removes_macro() {
        let mut fx = Fixture::new();
        fx.dispatch("define FOO 1");
        let sym = fx.interner.intern("FOO");
        assert!(fx.macros.is_defined(sym));
        fx.dispatch("undef FOO");
        assert!(!fx.macros.is_defined(sym));
    }

    #[test]
    fn function_like_define_with_stray_paste_is_an_error() {
        let mut fx = Fixture::new();
        fx.dispatch("define BAD(x) x##");
        assert!(fx.diagnostics.has_errors());
    }

    #[test]
    fn include_line_produces_outcome_with_parsed_name() {
        let mut fx = Fixture::new();
        let tokens = lex_include_line(&mut fx.sources, "include <stdio.h>");
        let outcome = dispatch(
            &tokens,
            hash_span(),
            &mut fx.conditional,
            &mut fx.macros,
            &mut fx.sources,
            &mut fx.interner,
            &mut fx.diagnostics,
            &fx.arena,
            200,
        );
        match outcome {
            DirectiveOutcome::Include { kind, name, .. } => {
                assert_eq!(kind, HeaderKind::Angled);
                assert_eq!(name, "stdio.h");
            }
            _ => panic!("expected Include outcome"),
        }
    }

    #[test]
    fn unknown_directive_is_reported() {
        let mut fx = Fixture::new();
        fx.dispatch("bogus");
        assert!(fx.diagnostics.has_errors());
    }

    #[test]
    fn pragma_once_is_signaled_distinctly_from_other_pragmas() {
        let mut fx = Fixture::new();
        assert!(matches!(
            fx.dispatch("pragma once"),
            DirectiveOutcome::PragmaOnce
        ));
        assert!(matches!(
            fx.dispatch("pragma pack(1)"),
            DirectiveOutcome::Handled
        ));
    }

    #[test]
    fn error_directive_is_reported_as_error_with_message() {
        let mut fx = Fixture::new();
        fx.dispatch("error \"boom\"");
        assert!(fx.diagnostics.has_errors());
    }

    #[test]
    fn directives_inside_skipped_region_other_than_conditional_are_ignored() {
        let mut fx = Fixture::new();
        fx.dispatch("if 0");
        fx.dispatch("define SHOULD_NOT_EXIST 1");
        let sym = fx.interner.intern("SHOULD_NOT_EXIST");
        assert!(!fx.macros.is_defined(sym));
        assert!(fx.diagnostics.diagnostics().is_empty());
    }
}
