//! String and character literal lexing (spec §4.2).
//!
//! Contents are copied through uninterpreted — the core never decodes
//! escape sequences, it only needs to find the matching closing quote
//! without tripping over an escaped one.

use crate::cursor::Cursor;
use crate::error::LexError;

/// Consume a string or character literal body, the caller having already
/// consumed the opening quote (`quote` is `"` or `'`).
///
/// Returns `Err` (having still consumed up to end-of-line or end-of-input)
/// if the literal is never closed.
pub fn lex_quoted_rest(cursor: &mut Cursor<'_>, quote: u8) -> Result<(), LexError> {
    loop {
        match cursor.peek() {
            None => return Err(LexError::UnterminatedLiteral),
            Some(b'\n') => return Err(LexError::NewlineInLiteral),
            Some(b'\\') => {
                cursor.bump();
                // An escaped newline inside a literal would already have
                // been spliced away by the textual pre-pass; anything else
                // (including a stray trailing backslash) is just consumed.
                if cursor.peek().is_some() {
                    cursor.bump();
                }
            }
            Some(b) if b == quote => {
                cursor.bump();
                return Ok(());
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
    fn consumes_simple_string_body() {
        let mut c = Cursor::new(r#"hello";"#);
        assert_eq!(lex_quoted_rest(&mut c, b'"'), Ok(()));
        assert_eq!(c.slice_from(0), "hello\"");
    }

    #[test]
    fn handles_escaped_quote() {
        let mut c = Cursor::new(r#"a\"b";"#);
        assert_eq!(lex_quoted_rest(&mut c, b'"'), Ok(()));
        assert_eq!(c.slice_from(0), r#"a\"b""#);
    }

    #[test]
    fn reports_unterminated_at_end_of_input() {
        let mut c = Cursor::new("abc");
        assert_eq!(lex_quoted_rest(&mut c, b'"'), Err(LexError::UnterminatedLiteral));
    }

    #[test]
    fn reports_unterminated_at_newline() {
        let mut c = Cursor::new("abc\ndef");
        assert_eq!(lex_quoted_rest(&mut c, b'"'), Err(LexError::NewlineInLiteral));
    }

    #[test]
    fn consumes_char_literal_body() {
        let mut c = Cursor::new(r"\n';");
        assert_eq!(lex_quoted_rest(&mut c, b'\''), Ok(()));
        assert_eq!(c.slice_from(0), r"\n'");
    }
}
