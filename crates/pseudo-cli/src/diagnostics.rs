//! Rendering syntax and runtime errors for the terminal.
//!
//! Every diagnostic has the same shape:
//!
//! ```text
//! error: Division by 0
//!  --> prog.pseudo:3:6
//!   |
//! 3 | x <- 10 / 0
//!   |      ^^^^^^
//!   = in scope 'Program'
//! ```

use colored::{ColoredString, Colorize};
use pseudo_eval::RuntimeError;
use pseudo_types::{SourceFile, Span, SyntaxErrors};

use crate::cli::ColorChoice;

/// Apply `--color`, honouring `NO_COLOR` and `FORCE_COLOR` in auto mode.
pub fn init_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            if std::env::var_os("NO_COLOR").is_some() {
                colored::control::set_override(false);
            } else if std::env::var_os("FORCE_COLOR").is_some() {
                colored::control::set_override(true);
            }
        }
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

fn arrow() -> ColoredString {
    "-->".blue()
}

fn pipe() -> ColoredString {
    "|".blue()
}

fn note_equals() -> ColoredString {
    "=".cyan()
}

/// One diagnostic in the shared shape.
fn render(
    message: &str,
    file: &str,
    span: Span,
    source_line: Option<&str>,
    note: Option<&str>,
) -> String {
    let line_no = span.start_line.to_string();
    let gutter = " ".repeat(line_no.len());
    let mut out = format!("{}: {}\n", error_label(), message.bold());
    out.push_str(&format!("{gutter}{} {file}:{span}\n", arrow()));

    if let Some(text) = source_line {
        let (pad, width) = underline(text, span);
        out.push_str(&format!("{gutter} {}\n", pipe()));
        out.push_str(&format!("{} {} {text}\n", line_no.blue().bold(), pipe()));
        out.push_str(&format!(
            "{gutter} {} {pad}{}\n",
            pipe(),
            "^".repeat(width).red().bold()
        ));
    }
    if let Some(note) = note {
        out.push_str(&format!("{gutter} {} {note}\n", note_equals()));
    }
    out
}

/// Leading padding and caret count for `span` on `text`.
///
/// Tabs before the span are kept so the caret lines up in the terminal.
fn underline(text: &str, span: Span) -> (String, usize) {
    let start = span.start_col.saturating_sub(1) as usize;
    let pad: String = text
        .chars()
        .chain(std::iter::repeat(' '))
        .take(start)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let remaining = text.chars().count().saturating_sub(start).max(1);
    let width = (span.width_on_first_line() as usize).min(remaining);
    (pad, width)
}

/// Render a runtime error against the program it was raised in.
pub fn render_runtime(error: &RuntimeError, source: &SourceFile) -> String {
    let note = format!("in scope '{}'", error.scope);
    render(
        &error.message(),
        &source.name,
        error.span,
        source.line(error.span.start_line),
        Some(&note),
    )
}

/// Render every kept syntax error, then a count of the dropped ones.
pub fn render_syntax(errors: &SyntaxErrors) -> String {
    let mut out = String::new();
    for (i, error) in errors.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line = (!error.source_line.is_empty()).then_some(error.source_line.as_str());
        out.push_str(&render(&error.message, &error.file, error.span, line, None));
    }
    let dropped = errors.total_errors.saturating_sub(errors.errors.len());
    if dropped > 0 {
        out.push_str(&format!("\n... and {dropped} more errors\n"));
    }
    out
}
