//! Error types for this crate's own bookkeeping (symbol table, source map).
//!
//! Preprocessing-level diagnostics (unterminated literal, stray `#else`, ...)
//! are modeled as [`crate::Diagnostic`] values, not `Result`s, since the core
//! keeps going after most of them (see spec §7). The error types here back
//! the small number of operations that are genuinely "this cannot continue":
//! looking up a symbol or span that was never registered.

use thiserror::Error;

/// Error type for symbol interning operations.
#[derive(Debug, Error)]
pub enum SymbolError {
    /// A `Symbol` was looked up whose index has no entry in this session's
    /// interner (almost always a symbol from the wrong session).
    #[error("symbol index {index} is not registered in this interner")]
    NotFound { index: u32 },
}

/// Error type for source map / buffer arena operations.
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// A `BufferId` was dereferenced that the map never minted.
    #[error("buffer id {0:?} is not registered in this source map")]
    UnknownBuffer(crate::span::BufferId),

    /// A `Span` referenced bytes outside the bounds of its buffer.
    #[error("span out of bounds: buffer has {buffer_len} bytes, span is {start}..{end}")]
    SpanOutOfBounds {
        buffer_len: usize,
        start: u32,
        end: u32,
    },

    /// A line number was requested that does not exist in the buffer.
    #[error("invalid line number: {line} (buffer has {max_lines} lines)")]
    InvalidLineNumber { line: u32, max_lines: u32 },
}

/// Result alias for symbol operations.
pub type SymbolResult<T> = std::result::Result<T, SymbolError>;

/// Result alias for source map operations.
pub type SourceMapResult<T> = std::result::Result<T, SourceMapError>;
