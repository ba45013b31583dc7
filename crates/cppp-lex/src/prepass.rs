//! Textual pre-pass (spec §4.3): line splicing, then comment elision.
//!
//! This runs once per buffer, before the buffer is ever handed to a
//! [`cppp_util::SourceMap`] — everything downstream (lexer, directive
//! handling, macro expansion) only ever sees spliced, comment-free text, so
//! no span ever needs to be "re-offset" after the fact.

use crate::error::LexError;

/// Phase 2: delete every backslash immediately followed by a newline,
/// joining the physical lines it separated into one logical line.
///
/// A backslash followed by `\r\n` counts too, for files with CRLF line
/// endings; the `\r` is dropped along with the rest of the splice.
fn splice_lines(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if bytes.get(i + 1) == Some(&b'\n') {
                i += 2;
                continue;
            }
            if bytes.get(i + 1) == Some(&b'\r') && bytes.get(i + 2) == Some(&b'\n') {
                i += 3;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Phase 3 (comment half): replace every comment with a single space,
/// while leaving string and character literal contents untouched — `//`
/// or `/*` inside a string literal is not a comment.
///
/// Newlines swallowed by a block comment are re-emitted (as bare `\n`s
/// after the replacement space) so downstream line numbers still match the
/// original file; only the comment's own text is lost.
fn strip_comments(input: &str) -> (String, Vec<(LexError, u32, u32)>) {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut errors = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' => {
                let quote = b;
                out.push(quote as char);
                i += 1;
                while i < bytes.len() {
                    let c = bytes[i];
                    out.push(c as char);
                    i += 1;
                    if c == b'\\' && i < bytes.len() {
                        out.push(bytes[i] as char);
                        i += 1;
                        continue;
                    }
                    if c == quote || c == b'\n' {
                        break;
                    }
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i += 2;
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                out.push(' ');
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let comment_start = out.len() as u32;
                i += 2;
                let mut newlines = 0u32;
                let mut terminated = false;
                loop {
                    if i >= bytes.len() {
                        break;
                    }
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        i += 2;
                        terminated = true;
                        break;
                    }
                    if bytes[i] == b'\n' {
                        newlines += 1;
                    }
                    i += 1;
                }
                if !terminated {
                    errors.push((LexError::UnterminatedComment, comment_start, 1));
                }
                out.push(' ');
                for _ in 0..newlines {
                    out.push('\n');
                }
            }
            _ => {
                out.push(b as char);
                i += 1;
            }
        }
    }
    (out, errors)
}

/// Run the full textual pre-pass: splice, then strip comments.
///
/// Idempotent on its own output — a buffer that has already been through
/// this pass contains no splices and no comments, so running it again is a
/// no-op. The returned errors carry byte offsets into the *returned* text
/// (not the original input), so they're ready to become a [`Span`] as soon
/// as the caller registers that text as a buffer.
///
/// [`Span`]: cppp_util::Span
pub fn prepass(input: &str) -> (String, Vec<(LexError, u32, u32)>) {
    strip_comments(&splice_lines(input))
}
