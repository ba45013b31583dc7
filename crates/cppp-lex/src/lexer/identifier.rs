//! Identifier and keyword-shaped lexemes (spec §4.2).
//!
//! The core never distinguishes C keywords from ordinary identifiers — that
//! split belongs to the (out-of-scope) C parser. Everything that starts
//! with a letter or underscore and continues with letters, digits, or
//! underscores is just `TokenKind::Identifier`.

use crate::charclass::is_ident_continue;
use crate::cursor::Cursor;

/// Consume the rest of an identifier whose first byte the caller already
/// matched with `is_ident_start` and consumed.
pub fn lex_identifier_rest(cursor: &mut Cursor<'_>) {
    cursor.eat_while(is_ident_continue);
}
