//! Lex-stage error taxonomy (spec §7 "Lex errors").

use cppp_util::diagnostic::DiagnosticCode;
use cppp_util::diagnostic::codes::{
    E_LEX_INVALID_BYTE, E_LEX_NEWLINE_IN_LITERAL, E_LEX_UNTERMINATED_COMMENT,
    E_LEX_UNTERMINATED_LITERAL,
};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("missing terminating character in string or character literal")]
    UnterminatedLiteral,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unexpected byte 0x{0:02x} outside any recognized token")]
    InvalidByte(u8),
    #[error("missing terminating character before end of line")]
    NewlineInLiteral,
}

impl LexError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            LexError::UnterminatedLiteral => E_LEX_UNTERMINATED_LITERAL,
            LexError::UnterminatedComment => E_LEX_UNTERMINATED_COMMENT,
            LexError::InvalidByte(_) => E_LEX_INVALID_BYTE,
            LexError::NewlineInLiteral => E_LEX_NEWLINE_IN_LITERAL,
        }
    }
}
