//! Punctuator lexing (spec §4.2): longest match wins.

use crate::charclass::{is_paren, is_punct};
use crate::cursor::Cursor;
use crate::token::Punct;

/// Try to consume one punctuator at the cursor's current position. Returns
/// `None` (consuming nothing) if the current byte doesn't start one.
pub fn lex_punct(cursor: &mut Cursor<'_>) -> Option<Punct> {
    let b0 = cursor.peek()?;
    if !is_punct(b0) {
        return None;
    }
    let b1 = cursor.peek_at(1);
    let b2 = cursor.peek_at(2);

    macro_rules! take {
        ($n:expr, $p:expr) => {{
            for _ in 0..$n {
                cursor.bump();
            }
            return Some($p);
        }};
    }

    match (b0, b1, b2) {
        (b'.', Some(b'.'), Some(b'.')) => take!(3, Punct::Ellipsis),
        (b'<', Some(b'<'), Some(b'=')) => take!(3, Punct::LShiftEq),
        (b'>', Some(b'>'), Some(b'=')) => take!(3, Punct::RShiftEq),
        (b'#', Some(b'#'), _) => take!(2, Punct::HashHash),
        (b'-', Some(b'>'), _) => take!(2, Punct::Arrow),
        (b'+', Some(b'+'), _) => take!(2, Punct::PlusPlus),
        (b'-', Some(b'-'), _) => take!(2, Punct::MinusMinus),
        (b'<', Some(b'<'), _) => take!(2, Punct::LShift),
        (b'>', Some(b'>'), _) => take!(2, Punct::RShift),
        (b'<', Some(b'='), _) => take!(2, Punct::Le),
        (b'>', Some(b'='), _) => take!(2, Punct::Ge),
        (b'=', Some(b'='), _) => take!(2, Punct::EqEq),
        (b'!', Some(b'='), _) => take!(2, Punct::Ne),
        (b'&', Some(b'&'), _) => take!(2, Punct::AndAnd),
        (b'|', Some(b'|'), _) => take!(2, Punct::OrOr),
        (b'+', Some(b'='), _) => take!(2, Punct::PlusEq),
        (b'-', Some(b'='), _) => take!(2, Punct::MinusEq),
        (b'*', Some(b'='), _) => take!(2, Punct::StarEq),
        (b'/', Some(b'='), _) => take!(2, Punct::SlashEq),
        (b'%', Some(b'='), _) => take!(2, Punct::PercentEq),
        (b'^', Some(b'='), _) => take!(2, Punct::CaretEq),
        (b'|', Some(b'='), _) => take!(2, Punct::PipeEq),
        (b'&', Some(b'='), _) => take!(2, Punct::AmpEq),
        (b, ..) if is_paren(b) => take!(
            1,
            match b {
                b'(' => Punct::LParen,
                b'[' => Punct::LBracket,
                b'{' => Punct::LBrace,
                _ => unreachable!("is_paren only matches '(', '[', '{'"),
            }
        ),
        (b')', ..) => take!(1, Punct::RParen),
        (b']', ..) => take!(1, Punct::RBracket),
        (b'}', ..) => take!(1, Punct::RBrace),
        (b'.', ..) => take!(1, Punct::Dot),
        (b'+', ..) => take!(1, Punct::Plus),
        (b'-', ..) => take!(1, Punct::Minus),
        (b'*', ..) => take!(1, Punct::Star),
        (b'/', ..) => take!(1, Punct::Slash),
        (b'%', ..) => take!(1, Punct::Percent),
        (b'=', ..) => take!(1, Punct::Assign),
        (b'<', ..) => take!(1, Punct::Lt),
        (b'>', ..) => take!(1, Punct::Gt),
        (b'!', ..) => take!(1, Punct::Bang),
        (b'~', ..) => take!(1, Punct::Tilde),
        (b'&', ..) => take!(1, Punct::Amp),
        (b'|', ..) => take!(1, Punct::Pipe),
        (b'^', ..) => take!(1, Punct::Caret),
        (b',', ..) => take!(1, Punct::Comma),
        (b';', ..) => take!(1, Punct::Semicolon),
        (b':', ..) => take!(1, Punct::Colon),
        (b'?', ..) => take!(1, Punct::Question),
        (b'#', ..) => take!(1, Punct::Hash),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_longest_shift_assign() {
        let mut c = Cursor::new("<<=x");
        assert_eq!(lex_punct(&mut c), Some(Punct::LShiftEq));
        assert_eq!(c.pos(), 3);
    }

    #[test]
    fn matches_hashhash_before_hash() {
        let mut c = Cursor::new("##x");
        assert_eq!(lex_punct(&mut c), Some(Punct::HashHash));
    }

    #[test]
    fn matches_single_hash_without_pasting() {
        let mut c = Cursor::new("#x");
        assert_eq!(lex_punct(&mut c), Some(Punct::Hash));
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn matches_ellipsis_over_two_dots() {
        let mut c = Cursor::new("...");
        assert_eq!(lex_punct(&mut c), Some(Punct::Ellipsis));
    }

    #[test]
    fn matches_single_dot_when_not_ellipsis() {
        let mut c = Cursor::new(".5");
        assert_eq!(lex_punct(&mut c), Some(Punct::Dot));
        assert_eq!(c.pos(), 1);
    }

    #[test]
    fn returns_none_on_non_punctuator() {
        let mut c = Cursor::new("abc");
        assert_eq!(lex_punct(&mut c), None);
        assert_eq!(c.pos(), 0);
    }
}
