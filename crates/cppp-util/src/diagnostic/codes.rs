//! Stable diagnostic codes, one family per error taxonomy bucket in spec §7.
//!
//! Codes are greppable and documentable independent of the (deliberately
//! casual) English message text, matching the production pattern of
//! diagnostic catalogs in mature compiler front ends.

/// A stable identifier for one kind of diagnostic, e.g. `E1003`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DiagnosticCode {
    pub prefix: &'static str,
    pub number: u32,
}

impl DiagnosticCode {
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    pub fn as_string(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:04}", self.prefix, self.number)
    }
}

macro_rules! codes {
    ($($name:ident = ($prefix:expr, $num:expr)),* $(,)?) => {
        $(pub const $name: DiagnosticCode = DiagnosticCode::new($prefix, $num);)*
    };
}

codes! {
    // Lex errors (§7 "Lex errors")
    E_LEX_UNTERMINATED_LITERAL = ("E", 1001),
    E_LEX_UNTERMINATED_COMMENT = ("E", 1002),
    E_LEX_INVALID_BYTE = ("E", 1003),
    E_LEX_NEWLINE_IN_LITERAL = ("E", 1004),
    W_LEX_SPLICE_IN_LITERAL = ("W", 1005),

    // Directive errors
    E_DIRECTIVE_UNKNOWN = ("E", 2001),
    E_DIRECTIVE_MALFORMED_DEFINE = ("E", 2002),
    E_DIRECTIVE_STRAY_ELSE = ("E", 2003),
    E_DIRECTIVE_STRAY_ELIF = ("E", 2004),
    E_DIRECTIVE_STRAY_ENDIF = ("E", 2005),
    E_DIRECTIVE_DUPLICATE_ELSE = ("E", 2006),
    E_DIRECTIVE_DEPTH_EXCEEDED = ("E", 2007),
    E_DIRECTIVE_UNTERMINATED_IF = ("E", 2008),

    // Include errors
    E_INCLUDE_NOT_FOUND = ("E", 3001),
    E_INCLUDE_DEPTH_EXCEEDED = ("E", 3002),
    E_INCLUDE_IO_FAILURE = ("E", 3003),
    E_INCLUDE_MALFORMED = ("E", 3004),

    // Macro errors
    E_MACRO_ARG_COUNT = ("E", 4001),
    E_MACRO_PASTE_MISUSE = ("E", 4002),
    E_MACRO_STRINGIZE_MISUSE = ("E", 4003),
    E_MACRO_EXPANSION_DEPTH = ("E", 4004),
    E_MACRO_REDEFINITION = ("E", 4005),
    W_MACRO_PASTE_INVALID_TOKEN = ("W", 4006),
    E_MACRO_DUPLICATE_PARAM = ("E", 4007),

    // Expression errors
    E_EXPR_SYNTAX = ("E", 5001),
    E_EXPR_DIV_BY_ZERO = ("E", 5002),

    // User-directed
    E_USER_ERROR = ("E", 6001),
    W_USER_WARNING = ("W", 6002),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(E_LEX_INVALID_BYTE.as_string(), "E1003");
        assert_eq!(E_USER_ERROR.to_string(), "E6001");
    }
}
