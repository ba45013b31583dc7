//! The token model (spec §3/§4.2): every token, whether read from a file or
//! synthesized during macro expansion, carries one [`Span`] into a shared
//! [`cppp_util::SourceMap`].

use cppp_util::Span;

/// Which bracket style introduced a `Header` token, so the include resolver
/// knows whether to search quote-first or angle-only (spec §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderKind {
    /// `"name"` — search the including file's directory first.
    Quoted,
    /// `<name>` — search only the angle-bracket search list.
    Angled,
}

/// Punctuators, longest-match-first (spec §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Ellipsis,
    Arrow,
    PlusPlus,
    MinusMinus,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    CaretEq,
    PipeEq,
    AmpEq,
    LShift,
    RShift,
    LShiftEq,
    RShiftEq,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Ne,
    Bang,
    Tilde,
    Amp,
    AndAnd,
    Pipe,
    OrOr,
    Caret,
    Comma,
    Semicolon,
    Colon,
    Question,
    Hash,
    HashHash,
}

impl Punct {
    /// The literal spelling, as it would be re-emitted or stringized.
    pub fn spelling(self) -> &'static str {
        use Punct::*;
        match self {
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Dot => ".",
            Ellipsis => "...",
            Arrow => "->",
            PlusPlus => "++",
            MinusMinus => "--",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Assign => "=",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            CaretEq => "^=",
            PipeEq => "|=",
            AmpEq => "&=",
            LShift => "<<",
            RShift => ">>",
            LShiftEq => "<<=",
            RShiftEq => ">>=",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            EqEq => "==",
            Ne => "!=",
            Bang => "!",
            Tilde => "~",
            Amp => "&",
            AndAnd => "&&",
            Pipe => "|",
            OrOr => "||",
            Caret => "^",
            Comma => ",",
            Semicolon => ";",
            Colon => ":",
            Question => "?",
            Hash => "#",
            HashHash => "##",
        }
    }
}

/// What kind of lexeme a [`Token`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    /// A pp-number (spec §4.2): digits, possibly with embedded `.`, `e+`,
    /// `E-`, `p+`, `P-`, and trailing letters. Not yet interpreted as an
    /// `int`/`float`/etc. — that's the constant evaluator's job.
    Number,
    StringLiteral,
    CharLiteral,
    Punct(Punct),
    /// `"name"` or `<name>`, only produced when the lexer is asked to lex
    /// the remainder of an `#include` line in header-name mode.
    Header(HeaderKind),
    Whitespace,
    Newline,
    /// A zero-width placemarker, standing in for an omitted macro argument
    /// during `##` pasting (spec §4.8). Never emitted in final output.
    Placemarker,
    Eof,
}

/// One lexeme: a `kind` plus the `Span` of source (real or synthesized) it
/// came from. `Copy` because a `Span` is cheap and the text is always
/// recoverable from the owning `SourceMap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_placemarker(&self) -> bool {
        matches!(self.kind, TokenKind::Placemarker)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn is_whitespace_like(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Newline)
    }
}
