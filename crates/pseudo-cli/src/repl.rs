//! Interactive read-eval-print loop.
//!
//! Each input is parsed as a small program and run in one persistent root
//! scope, so declarations and routines carry over. Lines that open a block
//! switch to continuation mode until an empty line.

use std::io::{self, Write};
use std::path::Path;

use pseudo_eval::{Console, Interpreter, InterpreterOptions};
use pseudo_types::SourceFile;

use crate::diagnostics;
use crate::driver;

pub const PROMPT: &str = "> ";
pub const CONTINUATION_PROMPT: &str = ". ";

const BLOCK_KEYWORDS: &[&str] = &[
    "IF",
    "CASE",
    "WHILE",
    "REPEAT",
    "FOR",
    "PROCEDURE",
    "FUNCTION",
];

/// Builds interpreters for the session root and for each `INCLUDE`.
pub type InterpreterFactory = Box<dyn Fn(InterpreterOptions) -> Interpreter>;

/// `true` when `line` starts a construct that spans several lines.
///
/// `TYPE` counts only in its record form; `TYPE P = ^INTEGER` is complete.
pub fn starts_block(line: &str) -> bool {
    match line.split_whitespace().next() {
        Some("TYPE") => !line.contains('='),
        Some(word) => BLOCK_KEYWORDS.contains(&word),
        None => false,
    }
}

pub struct Repl {
    options: InterpreterOptions,
    factory: InterpreterFactory,
    interp: Interpreter,
    inputs: usize,
}

impl Repl {
    /// A session on the real console and filesystem.
    pub fn new(options: InterpreterOptions) -> Self {
        Self::with_factory(options, Box::new(Interpreter::new))
    }

    pub fn with_factory(mut options: InterpreterOptions, factory: InterpreterFactory) -> Self {
        options.echo_expressions = true;
        let interp = factory(options.clone());
        Self {
            options,
            factory,
            interp,
            inputs: 0,
        }
    }

    /// Read commands from `input` until `EXIT` or end of input.
    ///
    /// Prompts and diagnostics go to `out`; program output and echoed
    /// values go through the interpreter's own console.
    pub fn run<W: Write>(&mut self, input: &mut dyn Console, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Pseudocode {} (type EXIT to quit)",
            env!("CARGO_PKG_VERSION")
        )?;
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;
            let Some(line) = input.read_line()? else {
                writeln!(out)?;
                break;
            };
            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            if command == "EXIT" {
                break;
            }
            if let Some(path) = command.strip_prefix("INCLUDE ") {
                self.include(path.trim().trim_matches('"'), out)?;
                continue;
            }

            let mut text = line.clone();
            if starts_block(command) {
                loop {
                    write!(out, "{CONTINUATION_PROMPT}")?;
                    out.flush()?;
                    match input.read_line()? {
                        Some(next) if !next.trim().is_empty() => {
                            text.push('\n');
                            text.push_str(&next);
                        }
                        _ => break,
                    }
                }
            }
            self.eval(&text, out)?;
        }
        self.interp.finish();
        Ok(())
    }

    fn eval<W: Write>(&mut self, text: &str, out: &mut W) -> io::Result<()> {
        self.inputs += 1;
        let source = SourceFile::new(format!("<input {}>", self.inputs), text);
        let program = match driver::parse_source(&source) {
            Ok(program) => program,
            Err(errors) => return write!(out, "{}", diagnostics::render_syntax(&errors)),
        };
        if let Err(e) = self.interp.run(&program) {
            write!(out, "{}", diagnostics::render_runtime(&e, &source))?;
        }
        Ok(())
    }

    /// Run a file in a fresh root, leaving the session untouched.
    fn include<W: Write>(&mut self, path: &str, out: &mut W) -> io::Result<()> {
        tracing::debug!(file = path, "include");
        let source = match driver::load(Path::new(path)) {
            Ok(source) => source,
            Err(e) => return write!(out, "{}", driver::render(&e, None)),
        };
        let options = InterpreterOptions {
            echo_expressions: false,
            ..self.options.clone()
        };
        let mut fresh = (self.factory)(options);
        if let Err(e) = driver::execute(&source, &mut fresh) {
            write!(out, "{}", driver::render(&e, Some(&source)))?;
        }
        Ok(())
    }
}
