//! Host for the pseudocode interpreter: the `pseudo` binary's argument
//! parsing, logging setup, diagnostics rendering, file driver and REPL.

pub mod cli;
pub mod diagnostics;
pub mod driver;
pub mod logging;
pub mod repl;
