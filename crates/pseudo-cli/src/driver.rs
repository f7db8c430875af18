//! Source → Lexer → Parser → Interpreter, plus error reporting.

use std::io;
use std::path::Path;

use pseudo_eval::{Interpreter, RuntimeError};
use pseudo_lexer::Lexer;
use pseudo_parser::Parser;
use pseudo_types::ast::Program;
use pseudo_types::{SourceFile, SyntaxErrors};
use serde::Serialize;
use thiserror::Error;

use crate::diagnostics;

/// Why a program did not run to completion.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{} syntax error(s)", .0.total_errors)]
    Syntax(SyntaxErrors),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Read a program file.
pub fn load(path: &Path) -> Result<SourceFile, RunError> {
    let name = path.display().to_string();
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(SourceFile::new(name, text)),
        Err(source) => Err(RunError::Read { path: name, source }),
    }
}

/// Lex and parse, merging both passes' errors.
pub fn parse_source(source: &SourceFile) -> Result<Program, SyntaxErrors> {
    let lexed = Lexer::new(source).lex();
    let mut errors = lexed.errors;
    let parsed = Parser::new(lexed.tokens, source).parse();
    errors.extend(parsed.errors);
    match parsed.program {
        Some(program) if !errors.has_errors() => Ok(program),
        _ => Err(errors),
    }
}

/// Parse `source` and run it on `interp`, closing any files left open.
pub fn execute(source: &SourceFile, interp: &mut Interpreter) -> Result<(), RunError> {
    let program = parse_source(source).map_err(RunError::Syntax)?;
    tracing::debug!(file = %source.name, stmts = program.body.stmts.len(), "parsed");
    let result = interp.run(&program);
    interp.finish();
    result.map_err(RunError::from)
}

/// Human-readable report for the terminal.
///
/// Runtime errors are preceded by a blank line to set them apart from
/// whatever the program printed.
pub fn render(error: &RunError, source: Option<&SourceFile>) -> String {
    match (error, source) {
        (RunError::Syntax(errors), _) => diagnostics::render_syntax(errors),
        (RunError::Runtime(e), Some(source)) => {
            format!("\n{}", diagnostics::render_runtime(e, source))
        }
        _ => format!("{}: {error}\n", diagnostics::error_label()),
    }
}

#[derive(Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
enum JsonReport<'a> {
    Read {
        file: &'a str,
        message: String,
    },
    Syntax {
        errors: &'a [pseudo_types::SyntaxError],
        total_errors: usize,
    },
    Runtime {
        file: &'a str,
        message: String,
        error: &'a RuntimeError,
    },
}

/// Machine-readable report for `--json`.
pub fn render_json(error: &RunError, file: &str) -> String {
    let report = match error {
        RunError::Read { source, .. } => JsonReport::Read {
            file,
            message: source.to_string(),
        },
        RunError::Syntax(errors) => JsonReport::Syntax {
            errors: &errors.errors,
            total_errors: errors.total_errors,
        },
        RunError::Runtime(e) => JsonReport::Runtime {
            file,
            message: e.message(),
            error: e,
        },
    };
    serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!("{{\"phase\":\"internal\",\"message\":\"{e}\"}}"))
}
