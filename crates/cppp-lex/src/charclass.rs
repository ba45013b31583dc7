//! Byte-level character classes (spec §4.1).
//!
//! The core is scannerless and ASCII-only for identifiers (Unicode
//! identifiers are an explicit non-goal), so classification works directly
//! on bytes rather than decoded `char`s.

#[inline]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0b | 0x0c)
}

#[inline]
pub fn is_newline(b: u8) -> bool {
    b == b'\n'
}

#[inline]
pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline]
pub fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

/// First character of an identifier: letter or underscore.
#[inline]
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Trailing character of an identifier: letter, digit, or underscore.
#[inline]
pub fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Characters a pp-number may continue with once started: digits, letters,
/// `.`, and the floating/hex exponent sign pairs (`e+`, `e-`, `p+`, `p-`)
/// are handled by the caller since they need one byte of lookahead.
#[inline]
pub fn is_number_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

#[inline]
pub fn is_exponent_letter(b: u8) -> bool {
    matches!(b, b'e' | b'E' | b'p' | b'P')
}

#[inline]
pub fn is_sign(b: u8) -> bool {
    matches!(b, b'+' | b'-')
}

#[inline]
pub fn is_string_delim(b: u8) -> bool {
    b == b'"'
}

#[inline]
pub fn is_char_delim(b: u8) -> bool {
    b == b'\''
}

/// Graphic, non-identifier, non-digit: the class punctuators are drawn from.
/// Used to fast-reject a byte before the longest-match punctuator table even
/// runs.
#[inline]
pub fn is_punct(b: u8) -> bool {
    b.is_ascii_graphic() && !is_ident_continue(b)
}

/// One of the three opening grouping delimiters: `(`, `[`, `{`.
#[inline]
pub fn is_paren(b: u8) -> bool {
    matches!(b, b'(' | b'[' | b'{')
}
