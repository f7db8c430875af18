//! Console seam for `OUTPUT` and `INPUT`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

pub trait Console {
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Next input line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Locked stdout and stdin.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim_end_matches(&['\n', '\r'][..]).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }
}

#[derive(Debug, Default)]
struct Captured {
    output: Vec<String>,
    input: VecDeque<String>,
}

/// In-memory console. Clones share the same buffers, so a host can keep
/// one handle and give the other to the interpreter.
#[derive(Debug, Clone, Default)]
pub struct CapturedConsole {
    inner: Rc<RefCell<Captured>>,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console whose `INPUT` lines come from `lines`.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Self::default();
        console
            .inner
            .borrow_mut()
            .input
            .extend(lines.into_iter().map(Into::into));
        console
    }

    pub fn push_input(&self, line: impl Into<String>) {
        self.inner.borrow_mut().input.push_back(line.into());
    }

    pub fn output(&self) -> Vec<String> {
        self.inner.borrow().output.clone()
    }

    pub fn take_output(&self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().output)
    }
}

impl Console for CapturedConsole {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.borrow_mut().output.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.inner.borrow_mut().input.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_handles_share_buffers() {
        let host = CapturedConsole::with_input(["first", "second"]);
        let mut engine = host.clone();
        engine.write_line("hello").unwrap();
        assert_eq!(engine.read_line().unwrap().as_deref(), Some("first"));
        host.push_input("third");
        assert_eq!(engine.read_line().unwrap().as_deref(), Some("second"));
        assert_eq!(engine.read_line().unwrap().as_deref(), Some("third"));
        assert_eq!(engine.read_line().unwrap(), None);
        assert_eq!(host.take_output(), vec!["hello".to_string()]);
        assert!(host.output().is_empty());
    }
}
