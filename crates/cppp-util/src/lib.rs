//! cppp-util - Foundation types shared by every stage of the preprocessor core.
//!
//! This crate has no notion of C syntax. It provides the plumbing every other
//! crate in the workspace builds on:
//!
//! - [`symbol`]: interned identifiers (`Symbol`), owned by a session rather
//!   than a process-wide global, since sessions never share mutable state.
//! - [`span`]: `(buffer, start, len)` source locations and the arena
//!   ([`span::SourceMap`]) that owns every buffer a session ever reads or
//!   synthesizes.
//! - [`diagnostic`]: severities, diagnostic codes, and a fluent builder for
//!   constructing the `(severity, source_name, line, col, message)` tuples
//!   described by the driver-facing API.
//! - [`index_vec`]: typed-index vectors, used wherever the core would
//!   otherwise reach for a raw `usize`.
//! - [`error`]: `thiserror`-derived error types for this crate's own
//!   fallible operations (symbol/span bookkeeping, not preprocessing errors
//!   — those live in `cppp-lex`/`cppp-eval`/`cppp-pp` next to the stage that
//!   raises them).

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{BufferId, SourceMap, Span};
pub use symbol::{Interner, Symbol};
