//! cppp-pp — the driver: directive dispatch, the macro table and expansion
//! engine, conditional inclusion, and `#include` resolution, wired together
//! by [`session::PreprocessSession`] into the external interface described
//! in the design notes (spec §6).
//!
//! `cppp-lex` turns bytes into tokens and knows nothing of `#`; `cppp-eval`
//! evaluates an already-expanded controlling expression and knows nothing of
//! macros. This crate is where those pieces meet a logical line at a time.

pub mod conditional;
pub mod directive;
pub mod error;
pub mod expand;
pub mod include;
pub mod macros;
pub mod session;

pub use conditional::ConditionalStack;
pub use error::{DirectiveError, IncludeError, MacroError};
pub use include::{FsIncludeResolver, IncludeResolver, PragmaOnceTracker};
pub use macros::{Macro, MacroKind, MacroTable};
pub use session::{EmittedToken, IncludePath, MacroDef, PreprocessSession, SessionConfig};
