//! The macro expansion engine (spec §4.8) — the algorithmic heart of the
//! core. Implements argument collection, stringize (`#`), paste (`##`), and
//! rescanning under Prosser's hide-set ("blue paint") rule so that
//! self-referential and mutually-recursive macros terminate.
//!
//! Hide sets are carried per-token (not per-scan) because distinct tokens in
//! the same output stream can legitimately carry different hide sets once
//! argument substitution has mixed text from several call sites.

use std::rc::Rc;

use bumpalo::Bump;
use cppp_lex::{Lexer, Punct, Token, TokenKind};
use cppp_util::{Interner, SourceMap, Span, Symbol};
use rustc_hash::FxHashSet;

use crate::error::MacroError;
use crate::macros::{Macro, MacroKind, MacroTable};

type HideSet = Rc<FxHashSet<Symbol>>;

#[derive(Clone)]
struct Hs(Token, HideSet);

/// Everything the expander needs that outlives a single call.
pub struct ExpandContext<'a> {
    pub macros: &'a MacroTable,
    pub sources: &'a mut SourceMap,
    pub interner: &'a mut Interner,
    /// Scratch arena for text synthesized by `##`/`#` before it's handed to
    /// the `SourceMap` as a owned, permanent buffer. `bumpalo` lets the many
    /// small per-paste allocations made across one session share a single
    /// backing block instead of each becoming its own heap allocation.
    pub arena: &'a Bump,
    pub errors: &'a mut Vec<(MacroError, Span)>,
    pub expansion_depth_limit: usize,
}

/// Macro-expand one logical line (or any other free-standing token
/// sequence) with an empty initial hide set.
pub fn expand_line(tokens: &[Token], ctx: &mut ExpandContext) -> Vec<Token> {
    let empty: HideSet = Rc::new(FxHashSet::default());
    let input: Vec<Hs> = tokens.iter().map(|t| Hs(*t, empty.clone())).collect();
    expand_sequence(input, ctx, 0)
        .into_iter()
        .map(|Hs(t, _)| t)
        .collect()
}

fn expand_sequence(input: Vec<Hs>, ctx: &mut ExpandContext, depth: usize) -> Vec<Hs> {
    if depth > ctx.expansion_depth_limit {
        if let Some(Hs(t, _)) = input.first() {
            ctx.errors.push((MacroError::ExpansionDepth, t.span));
        }
        return input;
    }

    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let Hs(tok, hide) = input[i].clone();

        if tok.kind == TokenKind::Identifier {
            let name = ctx.sources.span_text(tok.span).unwrap_or("").to_string();
            let sym = ctx.interner.intern(&name);
            if hide.contains(&sym) {
                log::trace!("'{name}' is in its own hide set, left unexpanded");
            } else {
                if let Some(mac) = ctx.macros.get(sym) {
                    match mac.kind.clone() {
                        MacroKind::ObjectLike => {
                            log::trace!("expanding object-like macro '{name}'");
                            let new_hide = add_to_hide(&hide, sym);
                            let body: Vec<Hs> = mac
                                .body
                                .iter()
                                .map(|st| Hs(st.token, new_hide.clone()))
                                .collect();
                            let expanded = expand_sequence(body, ctx, depth + 1);
                            out.extend(expanded);
                            i += 1;
                            continue;
                        }
                        MacroKind::FunctionLike { params, variadic } => {
                            let mut j = i + 1;
                            skip_trivia(&input, &mut j);
                            let has_call = matches!(
                                input.get(j),
                                Some(Hs(Token { kind: TokenKind::Punct(Punct::LParen), .. }, _))
                            );
                            if has_call {
                                if let Some(call) = collect_arguments(&input, j) {
                                    match build_final_args(call.args, &call.commas, &params, variadic)
                                    {
                                        Ok(final_args) => {
                                            log::trace!("expanding function-like macro '{name}' with {} argument(s)", final_args.len());
                                            let new_hide = intersect_then_add(&hide, &call.rparen_hide, sym);
                                            let body = substitute(
                                                mac,
                                                &final_args,
                                                variadic,
                                                ctx,
                                                tok.span,
                                            );
                                            let body = union_hide(body, &new_hide);
                                            let expanded = expand_sequence(body, ctx, depth + 1);
                                            out.extend(expanded);
                                            i = call.end_idx + 1;
                                            continue;
                                        }
                                        Err(()) => {
                                            ctx.errors.push((MacroError::ArgumentCount, tok.span));
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        out.push(Hs(tok, hide));
        i += 1;
    }
    out
}

fn add_to_hide(hide: &HideSet, sym: Symbol) -> HideSet {
    let mut set = (**hide).clone();
    set.insert(sym);
    Rc::new(set)
}

fn intersect_then_add(a: &HideSet, b: &HideSet, sym: Symbol) -> HideSet {
    let mut set: FxHashSet<Symbol> = a.intersection(b).copied().collect();
    set.insert(sym);
    Rc::new(set)
}

fn union_hide(tokens: Vec<Hs>, add: &HideSet) -> Vec<Hs> {
    tokens
        .into_iter()
        .map(|Hs(t, h)| {
            let merged: FxHashSet<Symbol> = h.union(add).copied().collect();
            Hs(t, Rc::new(merged))
        })
        .collect()
}

fn skip_trivia(input: &[Hs], i: &mut usize) {
    while let Some(Hs(t, _)) = input.get(*i) {
        if t.is_whitespace_like() {
            *i += 1;
        } else {
            break;
        }
    }
}

fn trim_trivia(tokens: &mut Vec<Hs>) {
    while tokens.first().is_some_and(|Hs(t, _)| t.is_whitespace_like()) {
        tokens.remove(0);
    }
    while tokens.last().is_some_and(|Hs(t, _)| t.is_whitespace_like()) {
        tokens.pop();
    }
}

struct ArgsResult {
    args: Vec<Vec<Hs>>,
    commas: Vec<Hs>,
    end_idx: usize,
    rparen_hide: HideSet,
}

/// Collect the arguments of a function-like macro call. `lparen_idx` is the
/// index of the `(` itself in `input`. Newlines inside the argument list are
/// whitespace, not terminators (resolved Open Question, SPEC_FULL.md §9):
/// the list simply extends until the matching `)`.
fn collect_arguments(input: &[Hs], lparen_idx: usize) -> Option<ArgsResult> {
    let mut depth = 1usize;
    let mut i = lparen_idx + 1;
    let mut args: Vec<Vec<Hs>> = vec![Vec::new()];
    let mut commas = Vec::new();
    loop {
        let Hs(tok, hide) = input.get(i)?.clone();
        match tok.kind {
            TokenKind::Punct(Punct::LParen) => {
                depth += 1;
                args.last_mut().unwrap().push(Hs(tok, hide));
            }
            TokenKind::Punct(Punct::RParen) => {
                depth -= 1;
                if depth == 0 {
                    for a in args.iter_mut() {
                        trim_trivia(a);
                    }
                    return Some(ArgsResult {
                        args,
                        commas,
                        end_idx: i,
                        rparen_hide: hide,
                    });
                }
                args.last_mut().unwrap().push(Hs(tok, hide));
            }
            TokenKind::Punct(Punct::Comma) if depth == 1 => {
                commas.push(Hs(tok, hide));
                args.push(Vec::new());
            }
            TokenKind::Eof => return None,
            _ => args.last_mut().unwrap().push(Hs(tok, hide)),
        }
        i += 1;
    }
}

/// Validate argument count and, for variadic macros, fold the trailing
/// arguments into a single `__VA_ARGS__` slot joined by their original
/// comma tokens.
fn build_final_args(
    mut args: Vec<Vec<Hs>>,
    commas: &[Hs],
    params: &[Symbol],
    variadic: bool,
) -> Result<Vec<Vec<Hs>>, ()> {
    if params.is_empty() && !variadic && args.len() == 1 && args[0].is_empty() {
        args.clear();
    }

    if variadic {
        if args.len() < params.len() {
            return Err(());
        }
        let fixed = params.len();
        let mut final_args: Vec<Vec<Hs>> = args[..fixed].to_vec();
        let mut tail = Vec::new();
        for (k, arg) in args.iter().enumerate().skip(fixed) {
            if k > fixed {
                tail.push(commas[k - 1].clone());
            }
            tail.extend(arg.clone());
        }
        final_args.push(tail);
        Ok(final_args)
    } else {
        if args.len() != params.len() {
            return Err(());
        }
        Ok(args)
    }
}

/// One substitution site in a macro body, before `##` is resolved.
enum Elem {
    /// A run of tokens coming from one site (a literal body token, a
    /// stringize result, or a (possibly multi-token) parameter argument).
    /// `is_va_args` marks a chunk that came from the variadic tail, so the
    /// GNU `, ## __VA_ARGS__` comma-elision rule can recognize it even when
    /// empty.
    Chunk(Vec<Hs>, bool),
    Paste(Span),
}

fn substitute(
    mac: &Macro,
    args: &[Vec<Hs>],
    variadic: bool,
    ctx: &mut ExpandContext,
    call_span: Span,
) -> Vec<Hs> {
    let params: &[Symbol] = match &mac.kind {
        MacroKind::FunctionLike { params, .. } => params,
        MacroKind::ObjectLike => &[],
    };
    let va_args_sym = if variadic {
        Some(ctx.interner.intern("__VA_ARGS__"))
    } else {
        None
    };
    let param_index = |sym: Symbol| -> Option<usize> {
        if Some(sym) == va_args_sym {
            return Some(params.len());
        }
        params.iter().position(|&p| p == sym)
    };

    let body = &mac.body;
    let mut elems: Vec<Elem> = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let st = body[i];
        let text = ctx.sources.span_text(st.token.span).unwrap_or("");

        // `# param` -> stringize.
        if st.token.kind == TokenKind::Punct(Punct::Hash) {
            if let Some(next) = body.get(i + 1) {
                let next_name = ctx.sources.span_text(next.token.span).unwrap_or("");
                let next_sym = ctx.interner.intern(next_name);
                if next.token.kind == TokenKind::Identifier {
                    if let Some(idx) = param_index(next_sym) {
                        let arg = args.get(idx).cloned().unwrap_or_default();
                        let text = stringize(&arg, ctx.sources);
                        let quoted = format!("\"{text}\"");
                        let buf = ctx.sources.add_synthetic("<stringize>", quoted);
                        let span = Span {
                            buffer: buf,
                            start: 0,
                            len: (2 + text.len()) as u32,
                        };
                        elems.push(Elem::Chunk(
                            vec![Hs(
                                Token::new(TokenKind::StringLiteral, span),
                                Rc::new(FxHashSet::default()),
                            )],
                            false,
                        ));
                        i += 2;
                        continue;
                    }
                }
            }
            elems.push(Elem::Chunk(vec![Hs(st.token, Rc::new(FxHashSet::default()))], false));
            i += 1;
            continue;
        }

        if st.token.kind == TokenKind::Punct(Punct::HashHash) {
            elems.push(Elem::Paste(st.token.span));
            i += 1;
            continue;
        }

        if st.token.kind == TokenKind::Identifier {
            let sym = ctx.interner.intern(text);
            if let Some(idx) = param_index(sym) {
                let raw = args.get(idx).cloned().unwrap_or_default();
                let adjacent_to_paste = matches!(body.get(i + 1), Some(s) if s.token.kind == TokenKind::Punct(Punct::HashHash))
                    || (i > 0
                        && matches!(body[i - 1].token.kind, TokenKind::Punct(Punct::HashHash)));
                let chunk = if adjacent_to_paste {
                    if raw.is_empty() {
                        vec![Hs(
                            Token::new(TokenKind::Placemarker, Span::empty(call_span.buffer)),
                            Rc::new(FxHashSet::default()),
                        )]
                    } else {
                        raw
                    }
                } else {
                    expand_sequence(raw, ctx, 0)
                };
                elems.push(Elem::Chunk(chunk, Some(sym) == va_args_sym));
                i += 1;
                continue;
            }
        }

        elems.push(Elem::Chunk(
            vec![Hs(st.token, Rc::new(FxHashSet::default()))],
            false,
        ));
        i += 1;
    }

    resolve_pastes(elems, ctx)
}

fn resolve_pastes(elems: Vec<Elem>, ctx: &mut ExpandContext) -> Vec<Hs> {
    let mut chunks: Vec<(Vec<Hs>, bool)> = Vec::new();
    let mut i = 0;
    while i < elems.len() {
        match &elems[i] {
            Elem::Chunk(c, va) => {
                chunks.push((c.clone(), *va));
            }
            Elem::Paste(span) => {
                let (left, _) = chunks.pop().unwrap_or((Vec::new(), false));
                let (right, right_is_va) = match elems.get(i + 1) {
                    Some(Elem::Chunk(c, va)) => {
                        i += 1;
                        (c.clone(), *va)
                    }
                    _ => (Vec::new(), false),
                };
                let pasted = paste_chunks(left, right, right_is_va, *span, ctx);
                chunks.push((pasted, false));
            }
        }
        i += 1;
    }
    chunks.into_iter().flat_map(|(c, _)| c).collect()
}

fn paste_chunks(
    mut left: Vec<Hs>,
    right: Vec<Hs>,
    right_is_va_args: bool,
    op_span: Span,
    ctx: &mut ExpandContext,
) -> Vec<Hs> {
    if right.is_empty() {
        if right_is_va_args {
            if let Some(Hs(last, _)) = left.last() {
                if last.kind == TokenKind::Punct(Punct::Comma) {
                    left.pop();
                }
            }
        }
        return left;
    }
    if left.is_empty() {
        return right;
    }

    let Hs(a, a_hide) = left.pop().unwrap();
    let mut right = right;
    let Hs(b, b_hide) = right.remove(0);

    let mut result = left;
    result.extend(try_paste(a, a_hide, b, b_hide, op_span, ctx));
    result.extend(right);
    result
}

/// Attempt to paste `a` and `b` into a single token. When the concatenation
/// doesn't relex as one token, the operator is a no-op rather than a
/// silent drop: both original tokens are kept (each under its own hide
/// set) alongside a diagnostic, so the rest of the line still reads as the
/// author wrote it.
fn try_paste(a: Token, a_hide: HideSet, b: Token, b_hide: HideSet, op_span: Span, ctx: &mut ExpandContext) -> Vec<Hs> {
    if a.is_placemarker() {
        return vec![Hs(b, b_hide)];
    }
    if b.is_placemarker() {
        return vec![Hs(a, a_hide)];
    }

    let text_a = ctx.sources.span_text(a.span).unwrap_or("");
    let text_b = ctx.sources.span_text(b.span).unwrap_or("");
    let mut owned = String::with_capacity(text_a.len() + text_b.len());
    owned.push_str(text_a);
    owned.push_str(text_b);
    let combined: &str = ctx.arena.alloc_str(&owned);

    let buf = ctx.sources.add_synthetic("<paste>", combined.to_string());
    let source = ctx.sources.text(buf).unwrap_or("").to_string();
    let mut lexer = Lexer::new(buf, &source);
    let tokens: Vec<Token> = lexer
        .tokenize()
        .into_iter()
        .filter(|t| !t.is_whitespace_like() && !t.is_eof())
        .collect();

    if tokens.len() == 1 && lexer.take_errors().is_empty() {
        let tok = tokens[0];
        if tok.span.start == 0 && tok.span.len as usize == combined.len() {
            return vec![Hs(tok, a_hide)];
        }
    }

    ctx.errors
        .push((MacroError::PasteProducedInvalidToken, op_span));
    vec![Hs(a, a_hide), Hs(b, b_hide)]
}

/// Spec §4.8: normalize whitespace between tokens to a single space, trim
/// the ends, and escape `\`/`"` so the result is valid inside a string
/// literal.
fn stringize(tokens: &[Hs], sources: &SourceMap) -> String {
    let mut pieces: Vec<&str> = Vec::new();
    let mut pending_space = false;
    for Hs(tok, _) in tokens {
        if tok.is_whitespace_like() {
            if !pieces.is_empty() {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            pieces.push(" ");
            pending_space = false;
        }
        pieces.push(sources.span_text(tok.span).unwrap_or(""));
    }
    let mut out = String::new();
    for piece in pieces {
        if piece == " " {
            out.push(' ');
            continue;
        }
        for ch in piece.chars() {
            if ch == '\\' || ch == '"' {
                out.push('\\');
            }
            out.push(ch);
        }
    }
    out
}
