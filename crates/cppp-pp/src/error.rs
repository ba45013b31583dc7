//! Error taxonomy for directive handling, macro definition/expansion, and
//! `#include` resolution (spec §7).

use cppp_util::diagnostic::DiagnosticCode;
use cppp_util::diagnostic::codes::*;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("'#' not followed by a recognized directive name")]
    UnknownDirective,
    #[error("malformed macro definition")]
    MalformedDefine,
    #[error("#elif without a matching #if")]
    StrayElif,
    #[error("#elif after #else")]
    ElifAfterElse,
    #[error("#else without a matching #if")]
    StrayElse,
    #[error("#else after #else")]
    DuplicateElse,
    #[error("#endif without a matching #if")]
    StrayEndif,
    #[error("conditional nesting exceeds the configured limit")]
    ConditionalDepthExceeded,
    #[error("unterminated #if: missing #endif before end of input")]
    UnterminatedIf,
    #[error("{0}")]
    UserError(String),
}

impl DirectiveError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            DirectiveError::UnknownDirective => E_DIRECTIVE_UNKNOWN,
            DirectiveError::MalformedDefine => E_DIRECTIVE_MALFORMED_DEFINE,
            DirectiveError::StrayElif | DirectiveError::ElifAfterElse => E_DIRECTIVE_STRAY_ELIF,
            DirectiveError::StrayElse => E_DIRECTIVE_STRAY_ELSE,
            DirectiveError::DuplicateElse => E_DIRECTIVE_DUPLICATE_ELSE,
            DirectiveError::StrayEndif => E_DIRECTIVE_STRAY_ENDIF,
            DirectiveError::ConditionalDepthExceeded => E_DIRECTIVE_DEPTH_EXCEEDED,
            DirectiveError::UnterminatedIf => E_DIRECTIVE_UNTERMINATED_IF,
            DirectiveError::UserError(_) => E_USER_ERROR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("macro redefined with a different replacement list")]
    IncompatibleRedefinition,
    #[error("macro call has the wrong number of arguments")]
    ArgumentCount,
    #[error("'##' cannot occur at the start or end of a replacement list")]
    PasteMisuse,
    #[error("'#' is not followed by a macro parameter")]
    StringizeMisuse,
    #[error("macro expansion exceeded the configured depth limit")]
    ExpansionDepth,
    #[error("duplicate macro parameter name '{0}'")]
    DuplicateParam(String),
    #[error("'##' pasted two tokens that do not form a valid token")]
    PasteProducedInvalidToken,
}

impl MacroError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            MacroError::IncompatibleRedefinition => E_MACRO_REDEFINITION,
            MacroError::ArgumentCount => E_MACRO_ARG_COUNT,
            MacroError::PasteMisuse => E_MACRO_PASTE_MISUSE,
            MacroError::StringizeMisuse => E_MACRO_STRINGIZE_MISUSE,
            MacroError::ExpansionDepth => E_MACRO_EXPANSION_DEPTH,
            MacroError::DuplicateParam(_) => E_MACRO_DUPLICATE_PARAM,
            MacroError::PasteProducedInvalidToken => W_MACRO_PASTE_INVALID_TOKEN,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IncludeError {
    #[error("'{0}' not found in any search directory")]
    NotFound(String),
    #[error("#include nesting exceeds the configured limit")]
    DepthExceeded,
    #[error("error reading '{0}': {1}")]
    IoFailure(String, String),
    #[error("malformed #include directive")]
    Malformed,
}

impl IncludeError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            IncludeError::NotFound(_) => E_INCLUDE_NOT_FOUND,
            IncludeError::DepthExceeded => E_INCLUDE_DEPTH_EXCEEDED,
            IncludeError::IoFailure(..) => E_INCLUDE_IO_FAILURE,
            IncludeError::Malformed => E_INCLUDE_MALFORMED,
        }
    }
}
