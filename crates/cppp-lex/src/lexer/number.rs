//! pp-number lexemes (spec §4.2).
//!
//! A pp-number is deliberately loose: it is *not* yet validated as a legal
//! C integer or floating constant (that's the constant evaluator's job, and
//! only for tokens that actually appear in a controlling expression). It is
//! any maximal run starting with a digit (or `.` followed by a digit) and
//! continuing through digits, letters, underscores, embedded `.`, and the
//! sign-carrying exponent pairs `e+`/`e-`/`E+`/`E-`/`p+`/`p-`/`P+`/`P-`.

use crate::charclass::{is_exponent_letter, is_number_continue, is_sign};
use crate::cursor::Cursor;

/// Consume the rest of a pp-number whose first byte the caller already
/// consumed (either a digit, or a `.` that was confirmed to be followed by
/// a digit).
pub fn lex_number_rest(cursor: &mut Cursor<'_>) {
    loop {
        match cursor.peek() {
            Some(b) if is_exponent_letter(b) && cursor.peek_at(1).is_some_and(is_sign) => {
                cursor.bump();
                cursor.bump();
            }
            Some(b) if is_number_continue(b) => {
                cursor.bump();
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_plain_integer() {
        let mut c = Cursor::new("12345;");
        let start = c.pos();
        lex_number_rest(&mut c);
        assert_eq!(c.slice_from(start), "12345");
    }

    #[test]
    fn consumes_float_with_dot() {
        let mut c = Cursor::new("3.14f ");
        let start = c.pos();
        lex_number_rest(&mut c);
        assert_eq!(c.slice_from(start), "3.14f");
    }

    #[test]
    fn consumes_decimal_exponent_with_sign() {
        let mut c = Cursor::new("1e-10 ");
        let start = c.pos();
        lex_number_rest(&mut c);
        assert_eq!(c.slice_from(start), "1e-10");
    }

    #[test]
    fn consumes_hex_float_with_p_exponent() {
        let mut c = Cursor::new("0x1.8p+3 ");
        let start = c.pos();
        lex_number_rest(&mut c);
        assert_eq!(c.slice_from(start), "0x1.8p+3");
    }

    #[test]
    fn stops_before_unrelated_punctuator() {
        let mut c = Cursor::new("42+1");
        let start = c.pos();
        lex_number_rest(&mut c);
        assert_eq!(c.slice_from(start), "42");
    }
}
