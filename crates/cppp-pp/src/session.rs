//! The per-translation-unit driver (spec §4.9) and its external interface
//! (spec §6): [`PreprocessSession::new`] / [`PreprocessSession::preprocess`].
//!
//! The driver's job is purely mechanical: split pre-passed text into
//! logical lines, hand `#`-lines to [`crate::directive::dispatch`], and
//! macro-expand everything else via [`crate::expand::expand_line`]. All of
//! the actual preprocessing semantics live in `directive`, `expand`,
//! `conditional` and `include` — this module only wires them together and
//! owns the state (source map, interner, macro table) that has to survive
//! across an entire session, including nested `#include`s.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use bumpalo::Bump;
use cppp_lex::{prepass, LexError, Lexer, Punct, Token, TokenKind};
use cppp_util::diagnostic::{Diagnostic, DiagnosticBuilder};
use cppp_util::{BufferId, Handler, Interner, SourceMap, Span};

use crate::conditional::ConditionalStack;
use crate::directive::{self, DirectiveOutcome};
use crate::error::IncludeError;
use crate::expand::{expand_line, ExpandContext};
use crate::include::{FsIncludeResolver, IncludeResolver, PragmaOnceTracker};
use crate::macros::{Macro, MacroKind, MacroTable, SpacedToken};

/// Quote-form and angle-form search directories for `#include` (spec §6's
/// `IncludePath`), handed to the default filesystem resolver.
#[derive(Clone, Debug, Default)]
pub struct IncludePath {
    pub quote_dirs: Vec<PathBuf>,
    pub angle_dirs: Vec<PathBuf>,
}

/// A `-D name` / `-D name=value` entry, or one of the standard predefined
/// macros the driver (not the core) is responsible for supplying (spec §6).
#[derive(Clone, Debug)]
pub struct MacroDef {
    pub name: String,
    pub value: Option<String>,
}

impl MacroDef {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Everything [`PreprocessSession::new`] needs to set up a session (spec
/// §10 "Configuration"): initial macro entries, the include search path,
/// the include-depth and expansion-depth limits (both defaulted to
/// standards-conformant minimums, overridable upward), and whether
/// `#pragma once` tracking is enabled.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub initial_macros: Vec<MacroDef>,
    pub include_path: IncludePath,
    pub include_depth_limit: usize,
    pub expansion_depth_limit: usize,
    pub conditional_depth_limit: usize,
    pub pragma_once_enabled: bool,
    /// Value substituted for `__STDC_VERSION__`. `None` omits the macro.
    pub stdc_version: Option<String>,
    /// Value substituted for `__DATE__`, already quoted if a string literal
    /// is wanted (e.g. `"\"Jan  1 2026\""`). Falls back to the standard's
    /// "unknown date" spelling when not supplied.
    pub date: Option<String>,
    /// As `date`, for `__TIME__`.
    pub time: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_macros: Vec::new(),
            include_path: IncludePath::default(),
            include_depth_limit: 200,
            expansion_depth_limit: 200,
            conditional_depth_limit: 256,
            pragma_once_enabled: true,
            stdc_version: Some("201112L".to_string()),
            date: None,
            time: None,
        }
    }
}

/// One token of the driver-facing output stream (spec §6): `(kind,
/// source_name, line, col, text)`. `Newline` tokens separate logical lines;
/// a downstream parser is free to discard whitespace/newline tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedToken {
    pub kind: TokenKind,
    pub source_name: String,
    pub line: u32,
    pub col: u32,
    pub text: String,
}

/// A preprocessing session: owns the source map, symbol interner, and
/// macro table for one translation unit, plus whatever state needs to
/// survive across nested `#include`s ([`PragmaOnceTracker`]). Per spec §5,
/// a session never shares this state with any other session.
pub struct PreprocessSession {
    config: SessionConfig,
    sources: SourceMap,
    interner: Interner,
    macros: MacroTable,
    arena: Bump,
    resolver: Box<dyn IncludeResolver>,
    pragma_once: PragmaOnceTracker,
    diagnostics: Handler,
    include_stack: Vec<PathBuf>,
    file_sym: cppp_util::Symbol,
    line_sym: cppp_util::Symbol,
}

impl PreprocessSession {
    /// Build a session from `config`, registering every initial macro (the
    /// standard predefined set plus any `-D` entries) up front. `__FILE__`
    /// and `__LINE__` are registered too, as placeholders: the driver
    /// recognizes them by symbol and substitutes the current location at
    /// the point of use rather than ever expanding their stored body.
    pub fn new(config: SessionConfig) -> Self {
        let mut sources = SourceMap::new();
        let mut interner = Interner::new();
        let mut macros = MacroTable::new();

        let file_sym = interner.intern("__FILE__");
        let line_sym = interner.intern("__LINE__");
        define_synthetic_object_like(&mut macros, &mut sources, &mut interner, "__FILE__", "1");
        define_synthetic_object_like(&mut macros, &mut sources, &mut interner, "__LINE__", "1");
        define_synthetic_object_like(&mut macros, &mut sources, &mut interner, "__STDC__", "1");
        if let Some(version) = &config.stdc_version {
            define_synthetic_object_like(&mut macros, &mut sources, &mut interner, "__STDC_VERSION__", version);
        }
        let date = config.date.clone().unwrap_or_else(|| "\"??? ?? ????\"".to_string());
        let time = config.time.clone().unwrap_or_else(|| "\"??:??:??\"".to_string());
        define_synthetic_object_like(&mut macros, &mut sources, &mut interner, "__DATE__", &date);
        define_synthetic_object_like(&mut macros, &mut sources, &mut interner, "__TIME__", &time);

        for def in &config.initial_macros {
            let body_text = def.value.clone().unwrap_or_else(|| "1".to_string());
            define_synthetic_object_like(&mut macros, &mut sources, &mut interner, &def.name, &body_text);
        }

        let resolver: Box<dyn IncludeResolver> = Box::new(FsIncludeResolver::new(
            config.include_path.quote_dirs.clone(),
            config.include_path.angle_dirs.clone(),
        ));

        Self {
            config,
            sources,
            interner,
            macros,
            arena: Bump::new(),
            resolver,
            pragma_once: PragmaOnceTracker::new(),
            diagnostics: Handler::new(),
            include_stack: Vec::new(),
            file_sym,
            line_sym,
        }
    }

    /// Swap in a different `#include` resolver (e.g. an in-memory test
    /// double or a build system's header map) instead of the default
    /// filesystem-backed one.
    pub fn set_include_resolver(&mut self, resolver: Box<dyn IncludeResolver>) {
        self.resolver = resolver;
    }

    /// Preprocess one translation unit. Returns every token emitted before
    /// processing stopped (either because the input was fully consumed or
    /// a fatal error cut it short), plus every diagnostic recorded.
    pub fn preprocess(&mut self, source: &str, source_name: &str) -> (Vec<EmittedToken>, Vec<Diagnostic>) {
        self.diagnostics = Handler::new();
        self.include_stack.clear();

        let (passed, prepass_errors) = prepass(source);
        let buf = self.sources.add_buffer(source_name.to_string(), passed.clone());

        let mut conditional = ConditionalStack::new(self.config.conditional_depth_limit);
        let mut output = Vec::new();
        let mut cut_short = false;
        for (err, start, len) in prepass_errors {
            let span = Span { buffer: buf, start, len };
            if self.emit_lex_error(err, span) {
                cut_short = true;
                break;
            }
        }
        if !cut_short {
            let _ = self.process_file(&mut conditional, &mut output, &passed, buf, None, 0);
        }

        for span in conditional.unterminated_spans() {
            let err = crate::error::DirectiveError::UnterminatedIf;
            self.diagnostics.emit(
                DiagnosticBuilder::error(err.to_string())
                    .code(err.code())
                    .span(span)
                    .build(&self.sources),
            );
        }

        (output, self.diagnostics.diagnostics().to_vec())
    }

    /// Drive one file's worth of pre-passed text, recursing into `#include`
    /// targets as they're encountered. `text` is owned by the caller (not
    /// borrowed from `self.sources`) specifically so that nested includes
    /// can freely register new buffers and emit diagnostics while this
    /// file's `Lexer` is still mid-stream over its own copy of the text.
    fn process_file(
        &mut self,
        conditional: &mut ConditionalStack,
        output: &mut Vec<EmittedToken>,
        text: &str,
        buf: BufferId,
        resolved_path: Option<&Path>,
        include_depth: usize,
    ) -> ControlFlow<()> {
        let mut lexer = Lexer::new(buf, text);

        loop {
            let was_active = conditional.is_active();
            let line = lex_logical_line(&self.sources, &mut lexer, was_active);

            for (err, span) in lexer.take_errors() {
                if self.emit_lex_error(err, span) {
                    return ControlFlow::Break(());
                }
            }

            let mut reached_eof = line.last().is_some_and(Token::is_eof);
            let mut terminator_is_newline = line.last().is_some_and(|t| t.kind == TokenKind::Newline);
            let mut terminator_tok = terminator_is_newline.then(|| line[line.len() - 1]);
            let mut content: Vec<Token> = if reached_eof || terminator_is_newline {
                line[..line.len() - 1].to_vec()
            } else {
                line
            };

            let mut idx = 0;
            skip_trivia(&content, &mut idx);
            let is_directive = matches!(content.get(idx), Some(t) if t.kind == TokenKind::Punct(Punct::Hash));

            if is_directive {
                let hash_span = content[idx].span;
                let args = &content[idx + 1..];
                let outcome = directive::dispatch(
                    args,
                    hash_span,
                    conditional,
                    &mut self.macros,
                    &mut self.sources,
                    &mut self.interner,
                    &mut self.diagnostics,
                    &self.arena,
                    self.config.expansion_depth_limit,
                );
                match outcome {
                    DirectiveOutcome::Handled => {}
                    DirectiveOutcome::PragmaOnce => {
                        if self.config.pragma_once_enabled {
                            if let Some(path) = resolved_path {
                                self.pragma_once.mark(path);
                            }
                        }
                    }
                    DirectiveOutcome::Include { kind, name, span } => {
                        if conditional.is_active() {
                            if let ControlFlow::Break(()) = self.do_include(
                                kind,
                                &name,
                                span,
                                resolved_path,
                                include_depth,
                                conditional,
                                output,
                            ) {
                                return ControlFlow::Break(());
                            }
                        }
                    }
                }
            } else if conditional.is_active() {
                // A function-like macro call's closing `)` need not share its
                // opening line (spec §9's resolved Open Question: newlines
                // inside the argument list are whitespace). Keep folding in
                // further physical lines, re-inserting each consumed line's
                // own terminator as an ordinary (whitespace-like) token in
                // the combined stream, until every call opened on this line
                // has closed or the file ends.
                while !reached_eof && call_still_open(&content, &self.macros, &self.sources, &mut self.interner) {
                    if let Some(tok) = terminator_tok.take() {
                        content.push(tok);
                    }
                    let next_line = lex_logical_line(&self.sources, &mut lexer, false);
                    for (err, span) in lexer.take_errors() {
                        if self.emit_lex_error(err, span) {
                            return ControlFlow::Break(());
                        }
                    }
                    reached_eof = next_line.last().is_some_and(Token::is_eof);
                    terminator_is_newline = next_line.last().is_some_and(|t| t.kind == TokenKind::Newline);
                    terminator_tok = terminator_is_newline.then(|| next_line[next_line.len() - 1]);
                    let next_content: &[Token] = if reached_eof || terminator_is_newline {
                        &next_line[..next_line.len() - 1]
                    } else {
                        &next_line[..]
                    };
                    content.extend_from_slice(next_content);
                }

                let substituted = self.substitute_magic_macros(&content, buf);
                let mut macro_errors = Vec::new();
                let expanded = {
                    let mut ctx = ExpandContext {
                        macros: &self.macros,
                        sources: &mut self.sources,
                        interner: &mut self.interner,
                        arena: &self.arena,
                        errors: &mut macro_errors,
                        expansion_depth_limit: self.config.expansion_depth_limit,
                    };
                    expand_line(&substituted, &mut ctx)
                };
                for (err, span) in macro_errors {
                    directive::emit_macro_error(&mut self.diagnostics, &self.sources, err, span);
                }
                for tok in expanded {
                    output.push(self.to_emitted(tok));
                }
            }

            if let Some(tok) = terminator_tok {
                output.push(self.to_emitted(tok));
            }

            if reached_eof {
                break;
            }
            if self.diagnostics.has_fatal() {
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    fn do_include(
        &mut self,
        kind: cppp_lex::HeaderKind,
        name: &str,
        span: Span,
        from: Option<&Path>,
        include_depth: usize,
        conditional: &mut ConditionalStack,
        output: &mut Vec<EmittedToken>,
    ) -> ControlFlow<()> {
        if include_depth >= self.config.include_depth_limit {
            let fatal = self.emit_include_error(IncludeError::DepthExceeded, span);
            return if fatal {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            };
        }

        match self.resolver.resolve(name, kind, from) {
            Ok((resolved, raw_text)) => {
                log::debug!("#include resolved '{name}' -> {}", resolved.display());
                if self.config.pragma_once_enabled && self.pragma_once.already_included(&resolved) {
                    log::debug!("{} already seen under #pragma once, skipping", resolved.display());
                    return ControlFlow::Continue(());
                }
                let (passed, prepass_errors) = prepass(&raw_text);
                let display_name = resolved.display().to_string();
                let buf = self.sources.add_buffer(display_name, passed.clone());
                for (err, start, len) in prepass_errors {
                    let span = Span { buffer: buf, start, len };
                    if self.emit_lex_error(err, span) {
                        return ControlFlow::Break(());
                    }
                }
                self.include_stack.push(resolved.clone());
                let result =
                    self.process_file(conditional, output, &passed, buf, Some(&resolved), include_depth + 1);
                self.include_stack.pop();
                result
            }
            Err(err) => {
                let fatal = self.emit_include_error(err, span);
                if fatal {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }

    /// Replace any bare `__FILE__`/`__LINE__` reference in `tokens` with the
    /// current location, ahead of ordinary macro expansion. Both stay
    /// registered in the macro table (so `#ifdef __FILE__` and `#undef
    /// __FILE__` behave normally); this pass only fires while the symbol is
    /// still defined, and for `__LINE__` only when its replacement list is
    /// still the untouched placeholder, so a user redefinition takes over
    /// exactly like any other macro.
    fn substitute_magic_macros(&mut self, tokens: &[Token], buf: BufferId) -> Vec<Token> {
        if !tokens.iter().any(|t| t.kind == TokenKind::Identifier) {
            return tokens.to_vec();
        }
        let mut out = Vec::with_capacity(tokens.len());
        for &tok in tokens {
            if tok.kind != TokenKind::Identifier {
                out.push(tok);
                continue;
            }
            let text = self.sources.span_text(tok.span).unwrap_or("");
            let sym = self.interner.intern(text);
            let is_untouched_placeholder = self
                .macros
                .get(sym)
                .is_some_and(|m| m.body.len() == 1 && self.sources.span_text(m.body[0].token.span) == Ok("1"));
            if sym == self.file_sym && is_untouched_placeholder {
                let name = self.sources.name(buf).unwrap_or("<unknown>");
                let quoted = format!("\"{name}\"");
                let synth_buf = self.sources.add_synthetic("<__FILE__>", quoted.clone());
                out.push(Token::new(
                    TokenKind::StringLiteral,
                    Span {
                        buffer: synth_buf,
                        start: 0,
                        len: quoted.len() as u32,
                    },
                ));
            } else if sym == self.line_sym && is_untouched_placeholder {
                let (line, _) = self.sources.line_col(buf, tok.span.start).unwrap_or((0, 0));
                let text = line.to_string();
                let synth_buf = self.sources.add_synthetic("<__LINE__>", text.clone());
                out.push(Token::new(
                    TokenKind::Number,
                    Span {
                        buffer: synth_buf,
                        start: 0,
                        len: text.len() as u32,
                    },
                ));
            } else {
                out.push(tok);
            }
        }
        out
    }

    fn to_emitted(&self, tok: Token) -> EmittedToken {
        let source_name = self.sources.name(tok.span.buffer).unwrap_or("<unknown>").to_string();
        let (line, col) = self
            .sources
            .line_col(tok.span.buffer, tok.span.start)
            .unwrap_or((0, 0));
        let text = self.sources.span_text(tok.span).unwrap_or("").to_string();
        EmittedToken {
            kind: tok.kind,
            source_name,
            line,
            col,
            text,
        }
    }

    /// Returns whether the error was fatal (and processing should stop).
    fn emit_lex_error(&mut self, err: LexError, span: Span) -> bool {
        let fatal = matches!(err, LexError::UnterminatedComment);
        let builder = if fatal {
            DiagnosticBuilder::fatal(err.to_string())
        } else {
            DiagnosticBuilder::error(err.to_string())
        };
        self.diagnostics
            .emit(builder.code(err.code()).span(span).build(&self.sources));
        fatal
    }

    /// Returns whether the error was fatal.
    fn emit_include_error(&mut self, err: IncludeError, span: Span) -> bool {
        let fatal = matches!(err, IncludeError::DepthExceeded | IncludeError::IoFailure(..));
        let builder = if fatal {
            DiagnosticBuilder::fatal(err.to_string())
        } else {
            DiagnosticBuilder::error(err.to_string())
        };
        self.diagnostics
            .emit(builder.code(err.code()).span(span).build(&self.sources));
        fatal
    }
}

fn define_synthetic_object_like(
    macros: &mut MacroTable,
    sources: &mut SourceMap,
    interner: &mut Interner,
    name: &str,
    body_text: &str,
) {
    let buf = sources.add_synthetic(format!("<predefined {name}>"), body_text.to_string());
    let sym = interner.intern(name);
    let span = Span {
        buffer: buf,
        start: 0,
        len: body_text.len() as u32,
    };
    let body = vec![SpacedToken {
        token: Token::new(sniff_kind(body_text), span),
        space_before: false,
    }];
    let mac = Macro {
        name: sym,
        kind: MacroKind::ObjectLike,
        body,
        def_span: span,
    };
    // Predefined macros never conflict with each other or a first
    // definition, so the only possible error here is a prior `-D` of the
    // same name — in which case the later entry simply wins, matching the
    // "last `-D` wins" convention most compilers use.
    let _ = macros.define(mac, sources);
}

/// A predefined macro's replacement text is always a single literal (a
/// number or a quoted string), never anything that needs real lexing — this
/// just picks the `TokenKind` a real lexer would have assigned it so the
/// emitted token stream looks exactly like an ordinary `#define`'s would.
fn sniff_kind(text: &str) -> TokenKind {
    match text.as_bytes().first() {
        Some(b'"') => TokenKind::StringLiteral,
        Some(b) if b.is_ascii_digit() => TokenKind::Number,
        _ => TokenKind::Identifier,
    }
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

/// True once `line`'s trailing token completes a `[ws]* # [ws]* include`
/// prefix — i.e. right after the `include` keyword itself has just been
/// lexed generically, and before any further token for this line has been
/// consumed. This is the narrow window in which the driver must switch the
/// lexer into header-name mode (spec §4.4): a generic `next_token()` call
/// would otherwise split `<stdio.h>` into ordinary punctuators.
fn line_so_far_is_include_directive(line: &[Token], sources: &SourceMap) -> bool {
    let mut i = 0;
    skip_trivia(line, &mut i);
    if !matches!(line.get(i), Some(t) if t.kind == TokenKind::Punct(Punct::Hash)) {
        return false;
    }
    i += 1;
    skip_trivia(line, &mut i);
    match line.get(i) {
        Some(t) if t.kind == TokenKind::Identifier && i + 1 == line.len() => {
            sources.span_text(t.span) == Ok("include")
        }
        _ => false,
    }
}

/// Lex one logical line: tokens up to and including the terminating
/// `Newline`/`Eof`, switching the lexer into header-name mode right after an
/// `#include`'s keyword when `allow_include_header` is set (the caller
/// already knows whether the conditional stack is active and so whether this
/// switch can matter).
fn lex_logical_line(sources: &SourceMap, lexer: &mut Lexer, allow_include_header: bool) -> Vec<Token> {
    let mut line: Vec<Token> = Vec::new();
    loop {
        let tok = lexer.next_token();
        let is_eof = tok.is_eof();
        let is_newline = tok.kind == TokenKind::Newline;
        line.push(tok);
        if is_eof || is_newline {
            break;
        }
        if allow_include_header && line_so_far_is_include_directive(&line, sources) {
            let ws = lexer.next_token();
            let ws_is_line_end = ws.is_eof() || ws.kind == TokenKind::Newline;
            line.push(ws);
            if ws_is_line_end {
                break;
            }
            if let Some(header) = lexer.next_header_token() {
                line.push(header);
            }
        }
    }
    line
}

/// True when `tokens` ends mid-argument-list of a function-like macro call:
/// some identifier bound to a function-like macro is followed (after
/// whitespace) by an unparenthesized `(` whose matching `)` hasn't appeared
/// yet. Spec §9's resolved Open Question treats embedded newlines as
/// ordinary whitespace inside such an argument list, so the driver must keep
/// pulling in physical lines while this holds.
///
/// Deliberately narrow: only a call already open by the end of `tokens` is
/// tracked. An identifier seen while a call is pending is never itself
/// treated as the start of a new (nested) call scan — nested calls are still
/// handled correctly because their parens simply add to the open depth.
fn call_still_open(tokens: &[Token], macros: &MacroTable, sources: &SourceMap, interner: &mut Interner) -> bool {
    let mut depth: Option<usize> = None;
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        match depth {
            None => {
                if tok.kind == TokenKind::Identifier {
                    let text = sources.span_text(tok.span).unwrap_or("");
                    let sym = interner.intern(text);
                    let is_function_like = matches!(
                        macros.get(sym).map(|m| &m.kind),
                        Some(MacroKind::FunctionLike { .. })
                    );
                    if is_function_like {
                        let mut j = i + 1;
                        while tokens.get(j).is_some_and(|t| t.is_whitespace_like()) {
                            j += 1;
                        }
                        if matches!(tokens.get(j), Some(t) if t.kind == TokenKind::Punct(Punct::LParen)) {
                            depth = Some(1);
                            i = j + 1;
                            continue;
                        }
                    }
                }
            }
            Some(d) => match tok.kind {
                TokenKind::Punct(Punct::LParen) => depth = Some(d + 1),
                TokenKind::Punct(Punct::RParen) => depth = if d == 1 { None } else { Some(d - 1) },
                _ => {}
            },
        }
        i += 1;
    }
    depth.is_some()
}
