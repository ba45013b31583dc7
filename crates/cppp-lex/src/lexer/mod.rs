//! The tokenizer proper: dispatches on the next byte to the specialized
//! sub-lexers and assembles [`Token`]s with spans into the owning buffer.

pub mod header;
pub mod identifier;
pub mod number;
pub mod operator;
pub mod string;

use cppp_util::Span;

use crate::charclass::{is_char_delim, is_ident_start, is_newline, is_space, is_string_delim};
use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// Lexes one pre-passed buffer into a stream of [`Token`]s.
///
/// A `Lexer` does not own a [`cppp_util::Handler`] or [`cppp_util::SourceMap`]
/// — it only knows the [`cppp_util::BufferId`] its spans belong to. Errors
/// are collected internally as `(LexError, Span)` pairs and handed back via
/// [`Lexer::take_errors`], so the caller (which does own the session's
/// `SourceMap`) decides when and how to turn them into `Diagnostic`s.
pub struct Lexer<'src> {
    buffer: cppp_util::BufferId,
    cursor: Cursor<'src>,
    errors: Vec<(LexError, Span)>,
}

impl<'src> Lexer<'src> {
    pub fn new(buffer: cppp_util::BufferId, source: &'src str) -> Self {
        Self {
            buffer,
            cursor: Cursor::new(source),
            errors: Vec::new(),
        }
    }

    pub fn take_errors(&mut self) -> Vec<(LexError, Span)> {
        std::mem::take(&mut self.errors)
    }

    fn span(&self, start: u32) -> Span {
        Span {
            buffer: self.buffer,
            start,
            len: self.cursor.pos() - start,
        }
    }

    fn record(&mut self, err: LexError, span: Span) {
        self.errors.push((err, span));
    }

    /// Lex the whole buffer eagerly, including a trailing `Eof` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.is_eof();
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    /// Lex and return the next token, including whitespace and newlines —
    /// directive handling needs to see newlines to find line ends, and
    /// macro expansion needs to know whether whitespace separated two
    /// tokens (to decide whether pasting them would be legal).
    pub fn next_token(&mut self) -> Token {
        let start = self.cursor.pos();

        let Some(b0) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, self.span(start));
        };

        if is_newline(b0) {
            self.cursor.bump();
            return Token::new(TokenKind::Newline, self.span(start));
        }

        if is_space(b0) {
            self.cursor.eat_while(is_space);
            return Token::new(TokenKind::Whitespace, self.span(start));
        }

        if is_ident_start(b0) {
            self.cursor.bump();
            identifier::lex_identifier_rest(&mut self.cursor);
            return Token::new(TokenKind::Identifier, self.span(start));
        }

        if b0.is_ascii_digit() {
            self.cursor.bump();
            number::lex_number_rest(&mut self.cursor);
            return Token::new(TokenKind::Number, self.span(start));
        }

        // `.` followed by a digit is also a pp-number (e.g. `.5`); otherwise
        // fall through to punctuator handling so `...`/`.` still work.
        if b0 == b'.' && self.cursor.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.cursor.bump();
            number::lex_number_rest(&mut self.cursor);
            return Token::new(TokenKind::Number, self.span(start));
        }

        if is_string_delim(b0) {
            self.cursor.bump();
            if let Err(err) = string::lex_quoted_rest(&mut self.cursor, b'"') {
                let span = self.span(start);
                self.record(err, span);
            }
            return Token::new(TokenKind::StringLiteral, self.span(start));
        }

        if is_char_delim(b0) {
            self.cursor.bump();
            if let Err(err) = string::lex_quoted_rest(&mut self.cursor, b'\'') {
                let span = self.span(start);
                self.record(err, span);
            }
            return Token::new(TokenKind::CharLiteral, self.span(start));
        }

        if let Some(punct) = operator::lex_punct(&mut self.cursor) {
            return Token::new(TokenKind::Punct(punct), self.span(start));
        }

        // Nothing recognized: consume exactly one byte so the scan always
        // makes progress, and report it.
        self.cursor.bump();
        let span = self.span(start);
        self.record(LexError::InvalidByte(b0), span);
        Token::new(TokenKind::Identifier, span)
    }

    /// Lex a header-name token, for use only right after an `#include`
    /// keyword's leading whitespace has been skipped (spec §4.4). Returns
    /// `None` if the next byte isn't `"` or `<`.
    pub fn next_header_token(&mut self) -> Option<Token> {
        let start = self.cursor.pos();
        match header::lex_header_name(&mut self.cursor) {
            None => None,
            Some(Some(kind)) => Some(Token::new(TokenKind::Header(kind), self.span(start))),
            Some(None) => {
                let span = self.span(start);
                self.record(LexError::UnterminatedLiteral, span);
                Some(Token::new(TokenKind::Header(crate::token::HeaderKind::Angled), span))
            }
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    pub fn pos(&self) -> u32 {
        self.cursor.pos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf() -> cppp_util::BufferId {
        cppp_util::BufferId(0)
    }

    #[test]
    fn lexes_a_simple_define_line() {
        let mut lexer = Lexer::new(buf(), "#define MAX 100\n");
        let kinds: Vec<_> = lexer.tokenize().into_iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![
                Punct(crate::token::Punct::Hash),
                Identifier,
                Whitespace,
                Identifier,
                Whitespace,
                Number,
                Newline,
                Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_and_char_literals() {
        let mut lexer = Lexer::new(buf(), r#" "abc" 'x' "#);
        let kinds: Vec<_> = lexer.tokenize().into_iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::StringLiteral));
        assert!(kinds.contains(&TokenKind::CharLiteral));
    }

    #[test]
    fn reports_unterminated_string() {
        let mut lexer = Lexer::new(buf(), "\"abc");
        lexer.tokenize();
        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, LexError::UnterminatedLiteral);
    }

    #[test]
    fn reports_invalid_byte_and_keeps_scanning() {
        let mut lexer = Lexer::new(buf(), "a @ b");
        let tokens = lexer.tokenize();
        assert!(!tokens.is_empty());
        let errors = lexer.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].0, LexError::InvalidByte(b'@')));
    }

    #[test]
    fn lexes_include_header_name_on_request() {
        let mut lexer = Lexer::new(buf(), "<stdio.h>\n");
        let tok = lexer.next_header_token().expect("header token");
        assert_eq!(
            tok.kind,
            TokenKind::Header(crate::token::HeaderKind::Angled)
        );
    }
}
