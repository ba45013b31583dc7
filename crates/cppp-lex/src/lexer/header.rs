//! `#include` header-name lexing (spec §4.4).
//!
//! A header name is recognized only when the lexer is explicitly asked for
//! one, right after an `#include` keyword — outside that context `<` and
//! `"` are ordinary punctuator/string lexemes, never header names.

use crate::cursor::Cursor;
use crate::token::HeaderKind;

/// Attempt to lex a header name starting at the cursor's current position.
/// Returns `None` (consuming nothing) if the next byte is neither `"` nor
/// `<`; returns `Some(None)` if the opening delimiter was seen but no
/// matching close appeared before end-of-line.
pub fn lex_header_name(cursor: &mut Cursor<'_>) -> Option<Option<HeaderKind>> {
    match cursor.peek()? {
        b'"' => {
            cursor.bump();
            if scan_until(cursor, b'"') {
                Some(Some(HeaderKind::Quoted))
            } else {
                Some(None)
            }
        }
        b'<' => {
            cursor.bump();
            if scan_until(cursor, b'>') {
                Some(Some(HeaderKind::Angled))
            } else {
                Some(None)
            }
        }
        _ => None,
    }
}

fn scan_until(cursor: &mut Cursor<'_>, close: u8) -> bool {
    loop {
        match cursor.peek() {
            None => return false,
            Some(b'\n') => return false,
            Some(b) if b == close => {
                cursor.bump();
                return true;
            }
            Some(_) => {
                cursor.bump();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_quoted_header_name() {
        let mut c = Cursor::new("\"local.h\"\n");
        assert_eq!(lex_header_name(&mut c), Some(Some(HeaderKind::Quoted)));
        assert_eq!(c.slice_from(0), "\"local.h\"");
    }

    #[test]
    fn lexes_angled_header_name() {
        let mut c = Cursor::new("<stdio.h>\n");
        assert_eq!(lex_header_name(&mut c), Some(Some(HeaderKind::Angled)));
        assert_eq!(c.slice_from(0), "<stdio.h>");
    }

    #[test]
    fn reports_missing_close_before_newline() {
        let mut c = Cursor::new("<stdio.h\nint x;");
        assert_eq!(lex_header_name(&mut c), Some(None));
    }

    #[test]
    fn returns_none_when_not_a_header_name_start() {
        let mut c = Cursor::new("FOO");
        assert_eq!(lex_header_name(&mut c), None);
        assert_eq!(c.pos(), 0);
    }
}
