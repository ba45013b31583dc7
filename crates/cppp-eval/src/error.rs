//! Constant-expression error taxonomy (spec §7 "Expression errors").

use cppp_util::diagnostic::DiagnosticCode;
use cppp_util::diagnostic::codes::{E_EXPR_DIV_BY_ZERO, E_EXPR_SYNTAX};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("expected an expression")]
    ExpectedExpression,
    #[error("expected ')'")]
    UnmatchedParen,
    #[error("expected ':' to complete '?:'")]
    ExpectedColon,
    #[error("a string literal is not valid in a constant expression")]
    StringLiteralOperand,
    #[error("a floating constant is not valid in an integer constant expression")]
    FloatingConstant,
    #[error("division by zero in constant expression")]
    DivisionByZero,
    #[error("trailing tokens after constant expression")]
    TrailingTokens,
}

impl EvalError {
    pub fn code(self) -> DiagnosticCode {
        match self {
            EvalError::DivisionByZero => E_EXPR_DIV_BY_ZERO,
            _ => E_EXPR_SYNTAX,
        }
    }
}
