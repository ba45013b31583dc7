//! Source locations: `(buffer, start, len)` triples into a [`SourceMap`].
//!
//! The design notes call out the teacher's pattern of growing a shared text
//! buffer and re-offsetting parallel range arrays as something to avoid. This
//! module is the fix: every buffer a session ever sees — an input file, an
//! `#include`, or bytes synthesized by stringize/paste — gets a stable
//! [`BufferId`] in the arena, and every [`Span`] is just an index into that
//! arena plus a byte range. Nothing is ever re-offset after the fact.

mod source_map;

pub use source_map::SourceMap;

use crate::define_idx;

define_idx! {
    /// Identifies one immutable text buffer owned by a [`SourceMap`].
    BufferId
}

/// A byte range within a single buffer of a [`SourceMap`].
///
/// `Span` is deliberately `Copy` and carries no line/column information —
/// that is computed on demand from the owning `SourceMap`'s line-start table
/// (§4.2's "binary search line table" technique), since almost no span is
/// ever actually rendered to a human.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub buffer: BufferId,
    pub start: u32,
    pub len: u32,
}

impl Span {
    /// A span of zero length at the start of `buffer`. Used for placemarker
    /// tokens and other zero-width synthetic positions.
    pub fn empty(buffer: BufferId) -> Self {
        Self {
            buffer,
            start: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Build the span that covers `self` through the end of `other`
    /// (inclusive), for merging adjacent token spans into one diagnostic
    /// range. Both spans must belong to the same buffer.
    pub fn to(&self, other: Span) -> Span {
        debug_assert_eq!(self.buffer, other.buffer, "cannot merge spans across buffers");
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span {
            buffer: self.buffer,
            start,
            len: end - start,
        }
    }
}
