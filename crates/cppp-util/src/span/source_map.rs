//! The buffer arena: owns every byte of text a session ever reads or
//! synthesizes, so that `Span`s can be cheap `Copy` values instead of
//! lifetime-carrying slices.

use super::{BufferId, Span};
use crate::error::{SourceMapError, SourceMapResult};
use crate::index_vec::IndexVec;

struct Buffer {
    /// Human-readable name: a file path for real input, or a description
    /// like `<paste of CAT>` for synthesized text.
    name: String,
    text: String,
    /// Byte offset of the start of each line, for O(log n) line/col lookup.
    /// Always starts with `0`.
    line_starts: Vec<u32>,
}

fn compute_line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

/// Owns every input and synthesized text buffer for one preprocessing
/// session.
///
/// Buffers are immutable once added: the textual pre-pass (line splicing,
/// comment elision) must run *before* a buffer is handed to
/// [`SourceMap::add_buffer`], since byte offsets inside a buffer are assumed
/// stable for its entire lifetime.
#[derive(Default)]
pub struct SourceMap {
    buffers: IndexVec<BufferId, Buffer>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            buffers: IndexVec::new(),
        }
    }

    /// Register a finalized (post-pre-pass) buffer and return its id.
    pub fn add_buffer(&mut self, name: impl Into<String>, text: impl Into<String>) -> BufferId {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        self.buffers.push(Buffer {
            name: name.into(),
            text,
            line_starts,
        })
    }

    /// Register bytes synthesized during macro expansion (stringize, paste,
    /// or a placemarker). `origin` should describe where the text came from,
    /// e.g. `"<paste result>"`, for use in diagnostics.
    pub fn add_synthetic(&mut self, origin: impl Into<String>, text: impl Into<String>) -> BufferId {
        self.add_buffer(origin, text)
    }

    pub fn name(&self, buffer: BufferId) -> SourceMapResult<&str> {
        self.buffers
            .get(buffer)
            .map(|b| b.name.as_str())
            .ok_or(SourceMapError::UnknownBuffer(buffer))
    }

    pub fn text(&self, buffer: BufferId) -> SourceMapResult<&str> {
        self.buffers
            .get(buffer)
            .map(|b| b.text.as_str())
            .ok_or(SourceMapError::UnknownBuffer(buffer))
    }

    /// Slice out the bytes a `Span` refers to.
    pub fn span_text(&self, span: Span) -> SourceMapResult<&str> {
        let buf = self
            .buffers
            .get(span.buffer)
            .ok_or(SourceMapError::UnknownBuffer(span.buffer))?;
        let start = span.start as usize;
        let end = span.end() as usize;
        buf.text
            .get(start..end)
            .ok_or(SourceMapError::SpanOutOfBounds {
                buffer_len: buf.text.len(),
                start: span.start,
                end: span.end(),
            })
    }

    /// 1-based `(line, column)` for a byte offset within `buffer`.
    pub fn line_col(&self, buffer: BufferId, offset: u32) -> SourceMapResult<(u32, u32)> {
        let buf = self
            .buffers
            .get(buffer)
            .ok_or(SourceMapError::UnknownBuffer(buffer))?;
        let idx = match buf.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = buf.line_starts[idx];
        let line = (idx + 1) as u32;
        let column = offset - line_start + 1;
        Ok((line, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_buffer_has_one_line_start() {
        let mut map = SourceMap::new();
        let id = map.add_buffer("a.c", "int x;");
        assert_eq!(map.line_col(id, 4).unwrap(), (1, 5));
    }

    #[test]
    fn multi_line_buffer_tracks_line_starts() {
        let mut map = SourceMap::new();
        let id = map.add_buffer("a.c", "line1\nline2\nline3");
        assert_eq!(map.line_col(id, 0).unwrap(), (1, 1));
        assert_eq!(map.line_col(id, 6).unwrap(), (2, 1));
        assert_eq!(map.line_col(id, 12).unwrap(), (3, 1));
    }

    #[test]
    fn span_text_slices_correctly() {
        let mut map = SourceMap::new();
        let id = map.add_buffer("a.c", "#define X 1");
        let span = Span {
            buffer: id,
            start: 8,
            len: 1,
        };
        assert_eq!(map.span_text(span).unwrap(), "X");
    }

    #[test]
    fn out_of_bounds_span_errors() {
        let mut map = SourceMap::new();
        let id = map.add_buffer("a.c", "abc");
        let span = Span {
            buffer: id,
            start: 0,
            len: 100,
        };
        assert!(map.span_text(span).is_err());
    }

    #[test]
    fn unknown_buffer_errors() {
        let map = SourceMap::new();
        let bogus = super::BufferId(42);
        assert!(map.name(bogus).is_err());
    }
}
