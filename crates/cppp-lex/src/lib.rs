//! cppp-lex — byte-level lexer and textual pre-pass for the preprocessor
//! core.
//!
//! This crate knows nothing about directives or macro expansion; it turns
//! pre-passed source bytes into a flat [`token::Token`] stream. `cppp-pp`
//! drives the [`lexer::Lexer`] line by line and interprets what comes out.

pub mod charclass;
pub mod cursor;
pub mod error;
pub mod lexer;
pub mod prepass;
pub mod token;

pub use error::LexError;
pub use lexer::Lexer;
pub use prepass::prepass;
pub use token::{HeaderKind, Punct, Token, TokenKind};
