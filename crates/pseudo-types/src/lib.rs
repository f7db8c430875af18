//! Shared types for the pseudocode interpreter.
//!
//! This crate defines the AST node types, source spans and the
//! syntax-time error types shared by the lexer, the parser and the
//! execution engine.

mod error;
mod span;
pub mod ast;

pub use error::{SyntaxError, SyntaxErrors, MAX_ERRORS};
pub use span::{SourceFile, Span};
