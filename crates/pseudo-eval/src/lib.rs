//! Pseudocode tree-walking interpreter.
//!
//! Executes a parsed [`Program`](pseudo_types::ast::Program) directly. State
//! lives in a scope arena rooted at the `Program` scope, which persists
//! across [`Interpreter::run`] calls so a REPL can feed it one input at a
//! time. Console and file access go through the [`Console`] and
//! [`FileManager`] traits.

mod builtins;
pub mod callable;
pub mod console;
pub mod error;
pub mod files;
mod interp;
pub mod scope;
pub mod value;

pub use console::{CapturedConsole, Console, StdConsole};
pub use error::{ErrorKind, EvalResult, RuntimeError};
pub use files::{DiskFiles, FileManager, MemoryFiles};
pub use interp::{ControlFlow, Interpreter, InterpreterOptions};
pub use value::{format_real, DataType, Value};
