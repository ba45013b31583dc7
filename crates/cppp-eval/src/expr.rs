//! Precedence-climbing evaluator for `#if`/`#elif` controlling expressions
//! (spec §4.6).
//!
//! Operates on an already `defined`-resolved, already macro-expanded token
//! stream: every surviving `Identifier` is therefore *not* a macro name and
//! evaluates to `0` per the standard's "remaining identifiers are replaced
//! with 0" rule. Arithmetic is two's-complement `long` (`i64`) throughout,
//! wrapping on overflow rather than panicking.

use cppp_lex::{Punct, Token, TokenKind};
use cppp_util::{SourceMap, Span};

use crate::error::EvalError;

/// Result of evaluating a controlling expression: the value, plus every
/// error encountered along the way (evaluation never stops at the first
/// error — it keeps going so the caller can report everything at once,
/// matching the rest of the core's "accumulate diagnostics" style).
pub struct EvalOutcome {
    pub value: i64,
    pub errors: Vec<(EvalError, Span)>,
}

/// Evaluate a fully-prepared `#if`/`#elif` token stream.
pub fn evaluate(tokens: &[Token], sources: &SourceMap) -> EvalOutcome {
    let mut p = Parser {
        tokens,
        pos: 0,
        sources,
        errors: Vec::new(),
    };
    let value = p.parse_conditional(true);
    if !p.at_end() {
        let span = p.current_span();
        p.errors.push((EvalError::TrailingTokens, span));
    }
    EvalOutcome {
        value,
        errors: p.errors,
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    sources: &'a SourceMap,
    errors: Vec<(EvalError, Span)>,
}

impl<'a> Parser<'a> {
    fn skip_trivia(&mut self) {
        while let Some(t) = self.tokens.get(self.pos) {
            if t.is_whitespace_like() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&mut self) -> Option<Token> {
        self.skip_trivia();
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    fn at_end(&mut self) -> bool {
        self.peek().map_or(true, |t| t.is_eof())
    }

    fn current_span(&mut self) -> Span {
        self.peek().map(|t| t.span).unwrap_or_else(|| Span {
            buffer: cppp_util::BufferId(0),
            start: 0,
            len: 0,
        })
    }

    fn record(&mut self, err: EvalError, span: Span) {
        self.errors.push((err, span));
    }

    fn peek_punct(&mut self) -> Option<Punct> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Punct(p),
                ..
            }) => Some(p),
            _ => None,
        }
    }

    fn eat_punct(&mut self, want: Punct) -> bool {
        if self.peek_punct() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// `cond-expr ::= binary-expr ('?' conditional ':' conditional)?`
    fn parse_conditional(&mut self, live: bool) -> i64 {
        let cond = self.parse_binary(0, live);
        if self.eat_punct(Punct::Question) {
            let then_live = live && cond != 0;
            let then_val = self.parse_conditional(then_live);
            if !self.eat_punct(Punct::Colon) {
                let span = self.current_span();
                self.record(EvalError::ExpectedColon, span);
            }
            let else_live = live && cond == 0;
            let else_val = self.parse_conditional(else_live);
            if cond != 0 {
                then_val
            } else {
                else_val
            }
        } else {
            cond
        }
    }

    /// Classic precedence climbing over the binary operators (spec §4.6's
    /// precedence table, highest `*`/`/`/`%` down to lowest `||`).
    fn parse_binary(&mut self, min_prec: u8, live: bool) -> i64 {
        let mut lhs = self.parse_unary(live);
        loop {
            let Some(op) = self.peek_punct() else { break };
            let Some(prec) = binary_precedence(op) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let op_span = self.current_span();
            self.bump();

            let rhs_live = match op {
                Punct::AndAnd => live && lhs != 0,
                Punct::OrOr => live && lhs == 0,
                _ => live,
            };
            let rhs = self.parse_binary(prec + 1, rhs_live);
            lhs = self.apply_binary(op, lhs, rhs, live, op_span);
        }
        lhs
    }

    fn apply_binary(&mut self, op: Punct, lhs: i64, rhs: i64, live: bool, span: Span) -> i64 {
        use Punct::*;
        match op {
            Star => lhs.wrapping_mul(rhs),
            Slash => self.checked_div(lhs, rhs, live, span, i64::wrapping_div),
            Percent => self.checked_div(lhs, rhs, live, span, i64::wrapping_rem),
            Plus => lhs.wrapping_add(rhs),
            Minus => lhs.wrapping_sub(rhs),
            LShift => lhs.wrapping_shl((rhs & 63) as u32),
            RShift => lhs.wrapping_shr((rhs & 63) as u32),
            Lt => (lhs < rhs) as i64,
            Gt => (lhs > rhs) as i64,
            Le => (lhs <= rhs) as i64,
            Ge => (lhs >= rhs) as i64,
            EqEq => (lhs == rhs) as i64,
            Ne => (lhs != rhs) as i64,
            Amp => lhs & rhs,
            Caret => lhs ^ rhs,
            Pipe => lhs | rhs,
            AndAnd => ((lhs != 0) && (rhs != 0)) as i64,
            OrOr => ((lhs != 0) || (rhs != 0)) as i64,
            _ => unreachable!("not a binary operator"),
        }
    }

    fn checked_div(
        &mut self,
        lhs: i64,
        rhs: i64,
        live: bool,
        span: Span,
        op: fn(i64, i64) -> i64,
    ) -> i64 {
        if rhs == 0 {
            if live {
                self.record(EvalError::DivisionByZero, span);
            }
            0
        } else {
            op(lhs, rhs)
        }
    }

    /// `unary-expr ::= ('+' | '-' | '!' | '~') unary-expr | primary-expr`
    fn parse_unary(&mut self, live: bool) -> i64 {
        match self.peek_punct() {
            Some(Punct::Plus) => {
                self.bump();
                self.parse_unary(live)
            }
            Some(Punct::Minus) => {
                self.bump();
                self.parse_unary(live).wrapping_neg()
            }
            Some(Punct::Bang) => {
                self.bump();
                (self.parse_unary(live) == 0) as i64
            }
            Some(Punct::Tilde) => {
                self.bump();
                !self.parse_unary(live)
            }
            _ => self.parse_primary(live),
        }
    }

    fn parse_primary(&mut self, live: bool) -> i64 {
        let Some(tok) = self.peek() else {
            let span = self.current_span();
            self.record(EvalError::ExpectedExpression, span);
            return 0;
        };

        match tok.kind {
            TokenKind::Punct(Punct::LParen) => {
                self.bump();
                let inner = self.parse_conditional(live);
                if !self.eat_punct(Punct::RParen) {
                    if live {
                        self.record(EvalError::UnmatchedParen, tok.span);
                    }
                }
                inner
            }
            TokenKind::Number => {
                self.bump();
                self.eval_number(tok, live)
            }
            TokenKind::CharLiteral => {
                self.bump();
                self.eval_char_literal(tok, live)
            }
            TokenKind::Identifier => {
                // Not resolved by macro expansion, so: not a macro. Spec
                // §4.6 / C99 6.10.1p4: evaluates to 0.
                self.bump();
                0
            }
            TokenKind::StringLiteral => {
                self.bump();
                if live {
                    self.record(EvalError::StringLiteralOperand, tok.span);
                }
                0
            }
            _ => {
                self.bump();
                if live {
                    self.record(EvalError::ExpectedExpression, tok.span);
                }
                0
            }
        }
    }

    fn eval_number(&mut self, tok: Token, live: bool) -> i64 {
        let text = self.sources.span_text(tok.span).unwrap_or("0");
        if is_floating_constant(text) {
            if live {
                self.record(EvalError::FloatingConstant, tok.span);
            }
            return 0;
        }
        parse_integer_literal(text)
    }

    fn eval_char_literal(&mut self, tok: Token, _live: bool) -> i64 {
        let text = self.sources.span_text(tok.span).unwrap_or("''");
        parse_char_literal(text)
    }
}

/// Binary operator precedence, highest first (spec §4.6). `?:` and its
/// operands are handled separately by [`Parser::parse_conditional`].
fn binary_precedence(op: Punct) -> Option<u8> {
    use Punct::*;
    Some(match op {
        Star | Slash | Percent => 10,
        Plus | Minus => 9,
        LShift | RShift => 8,
        Lt | Gt | Le | Ge => 7,
        EqEq | Ne => 6,
        Amp => 5,
        Caret => 4,
        Pipe => 3,
        AndAnd => 2,
        OrOr => 1,
        _ => return None,
    })
}

fn is_floating_constant(text: &str) -> bool {
    let is_hex = text.len() > 1 && (text.starts_with("0x") || text.starts_with("0X"));
    if is_hex {
        // Hex floats use `p`/`P` for the exponent; a bare `.` with no `p`
        // exponent is a (nonstandard but tolerated) hex constant here.
        text.contains('p') || text.contains('P')
    } else {
        text.contains('.') || text.contains('e') || text.contains('E')
    }
}

/// Parse a pp-number's integer value with two's-complement wraparound,
/// ignoring any `u`/`U`/`l`/`L` suffix.
fn parse_integer_literal(text: &str) -> i64 {
    let bytes = text.as_bytes();
    let (radix, start): (i64, usize) = if bytes.len() > 1
        && bytes[0] == b'0'
        && (bytes[1] == b'x' || bytes[1] == b'X')
    {
        (16, 2)
    } else if bytes.len() > 1 && bytes[0] == b'0' {
        (8, 1)
    } else {
        (10, 0)
    };

    let mut value: i64 = 0;
    for &b in &bytes[start..] {
        let digit = match b {
            b'0'..=b'9' => (b - b'0') as i64,
            b'a'..=b'f' => (b - b'a' + 10) as i64,
            b'A'..=b'F' => (b - b'A' + 10) as i64,
            _ => break,
        };
        if digit >= radix {
            break;
        }
        value = value.wrapping_mul(radix).wrapping_add(digit);
    }
    value
}

/// Parse a (possibly multi-character) char-literal's value the way a
/// narrow `int`-sized char constant folds in most C implementations: each
/// source character or escape contributes one byte, shifted in from the
/// left.
fn parse_char_literal(text: &str) -> i64 {
    let inner = text
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(text);
    let mut value: i64 = 0;
    let mut chars = inner.bytes().peekable();
    while let Some(b) = chars.next() {
        let byte = if b == b'\\' {
            match chars.next() {
                Some(b'n') => b'\n',
                Some(b't') => b'\t',
                Some(b'r') => b'\r',
                Some(b'0') => 0,
                Some(b'a') => 0x07,
                Some(b'b') => 0x08,
                Some(b'f') => 0x0c,
                Some(b'v') => 0x0b,
                Some(b'\\') => b'\\',
                Some(b'\'') => b'\'',
                Some(b'"') => b'"',
                Some(other) => other,
                None => break,
            }
        } else {
            b
        };
        value = (value << 8) | byte as i64;
    }
    value
}
