//! File handles for `OPENFILE`, `READFILE`, `WRITEFILE` and `CLOSEFILE`.
//!
//! The engine never touches the filesystem itself; it talks to a
//! [`FileManager`] installed in the interpreter. [`DiskFiles`] backs the CLI,
//! [`MemoryFiles`] backs tests and embedding hosts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use pseudo_types::ast::FileMode;

pub trait FileManager {
    /// Open `name`. WRITE truncates, APPEND creates when missing, READ
    /// requires the file to exist.
    fn open(&mut self, name: &str, mode: FileMode) -> io::Result<()>;

    /// Mode of an open file; `None` when it is not open.
    fn mode(&self, name: &str) -> Option<FileMode>;

    fn is_open(&self, name: &str) -> bool {
        self.mode(name).is_some()
    }

    /// Close `name`, flushing pending writes. `false` when it was not open.
    fn close(&mut self, name: &str) -> bool;

    /// Next line without its terminator; empty at end of file.
    fn read_line(&mut self, name: &str) -> io::Result<String>;

    fn write_line(&mut self, name: &str, text: &str) -> io::Result<()>;

    fn eof(&mut self, name: &str) -> io::Result<bool>;

    /// Names of every open file.
    fn open_files(&self) -> Vec<String>;
}

fn not_open(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("file '{name}' is not open"))
}

fn wrong_mode(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("file '{name}' is not open in a suitable mode"),
    )
}

// ══════════════════════════════════════════════════════════════════════════════
// Disk
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
enum DiskHandle {
    Reader(BufReader<File>),
    Writer(FileMode, BufWriter<File>),
}

/// Files on disk, named relative to `base`.
#[derive(Debug, Default)]
pub struct DiskFiles {
    base: Option<PathBuf>,
    handles: HashMap<String, DiskHandle>,
}

impl DiskFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative file names against `base` instead of the working directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
            handles: HashMap::new(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(name),
            None => PathBuf::from(name),
        }
    }
}

impl FileManager for DiskFiles {
    fn open(&mut self, name: &str, mode: FileMode) -> io::Result<()> {
        let path = self.path(name);
        let handle = match mode {
            FileMode::Read => DiskHandle::Reader(BufReader::new(File::open(path)?)),
            FileMode::Write => DiskHandle::Writer(mode, BufWriter::new(File::create(path)?)),
            FileMode::Append => DiskHandle::Writer(
                mode,
                BufWriter::new(OpenOptions::new().create(true).append(true).open(path)?),
            ),
        };
        self.handles.insert(name.to_string(), handle);
        Ok(())
    }

    fn mode(&self, name: &str) -> Option<FileMode> {
        self.handles.get(name).map(|h| match h {
            DiskHandle::Reader(_) => FileMode::Read,
            DiskHandle::Writer(mode, _) => *mode,
        })
    }

    fn close(&mut self, name: &str) -> bool {
        match self.handles.remove(name) {
            Some(DiskHandle::Writer(_, mut writer)) => {
                if let Err(e) = writer.flush() {
                    tracing::warn!(file = name, error = %e, "flush on close failed");
                }
                true
            }
            Some(DiskHandle::Reader(_)) => true,
            None => false,
        }
    }

    fn read_line(&mut self, name: &str) -> io::Result<String> {
        match self.handles.get_mut(name) {
            Some(DiskHandle::Reader(reader)) => {
                let mut line = String::new();
                reader.read_line(&mut line)?;
                let len = line.trim_end_matches(&['\n', '\r'][..]).len();
                line.truncate(len);
                Ok(line)
            }
            Some(DiskHandle::Writer(..)) => Err(wrong_mode(name)),
            None => Err(not_open(name)),
        }
    }

    fn write_line(&mut self, name: &str, text: &str) -> io::Result<()> {
        match self.handles.get_mut(name) {
            Some(DiskHandle::Writer(_, writer)) => writeln!(writer, "{text}"),
            Some(DiskHandle::Reader(_)) => Err(wrong_mode(name)),
            None => Err(not_open(name)),
        }
    }

    fn eof(&mut self, name: &str) -> io::Result<bool> {
        match self.handles.get_mut(name) {
            Some(DiskHandle::Reader(reader)) => Ok(reader.fill_buf()?.is_empty()),
            Some(DiskHandle::Writer(..)) => Err(wrong_mode(name)),
            None => Err(not_open(name)),
        }
    }

    fn open_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handles.keys().cloned().collect();
        names.sort();
        names
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Memory
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct MemoryHandle {
    mode: FileMode,
    cursor: usize,
}

#[derive(Debug, Default)]
struct MemoryStore {
    contents: HashMap<String, String>,
    handles: HashMap<String, MemoryHandle>,
}

/// An in-memory file system. Clones share state, so a host can seed files
/// and read results back through its own handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    inner: Rc<RefCell<MemoryStore>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, contents: impl Into<String>) {
        self.inner
            .borrow_mut()
            .contents
            .insert(name.into(), contents.into());
    }

    pub fn contents(&self, name: &str) -> Option<String> {
        self.inner.borrow().contents.get(name).cloned()
    }
}

impl FileManager for MemoryFiles {
    fn open(&mut self, name: &str, mode: FileMode) -> io::Result<()> {
        let mut store = self.inner.borrow_mut();
        match mode {
            FileMode::Read if !store.contents.contains_key(name) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file '{name}'"),
                ));
            }
            FileMode::Read => {}
            FileMode::Write => {
                store.contents.insert(name.to_string(), String::new());
            }
            FileMode::Append => {
                store.contents.entry(name.to_string()).or_default();
            }
        }
        store
            .handles
            .insert(name.to_string(), MemoryHandle { mode, cursor: 0 });
        Ok(())
    }

    fn mode(&self, name: &str) -> Option<FileMode> {
        self.inner.borrow().handles.get(name).map(|h| h.mode)
    }

    fn close(&mut self, name: &str) -> bool {
        self.inner.borrow_mut().handles.remove(name).is_some()
    }

    fn read_line(&mut self, name: &str) -> io::Result<String> {
        let mut guard = self.inner.borrow_mut();
        let store = &mut *guard;
        let handle = store.handles.get_mut(name).ok_or_else(|| not_open(name))?;
        if handle.mode != FileMode::Read {
            return Err(wrong_mode(name));
        }
        let text = store.contents.get(name).map_or("", String::as_str);
        let rest = text.get(handle.cursor..).unwrap_or("");
        let (line, consumed) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        handle.cursor += consumed;
        Ok(line.trim_end_matches('\r').to_string())
    }

    fn write_line(&mut self, name: &str, text: &str) -> io::Result<()> {
        let mut guard = self.inner.borrow_mut();
        let store = &mut *guard;
        let handle = store.handles.get(name).ok_or_else(|| not_open(name))?;
        if handle.mode == FileMode::Read {
            return Err(wrong_mode(name));
        }
        let contents = store.contents.entry(name.to_string()).or_default();
        contents.push_str(text);
        contents.push('\n');
        Ok(())
    }

    fn eof(&mut self, name: &str) -> io::Result<bool> {
        let store = self.inner.borrow();
        let handle = store.handles.get(name).ok_or_else(|| not_open(name))?;
        if handle.mode != FileMode::Read {
            return Err(wrong_mode(name));
        }
        let len = store.contents.get(name).map_or(0, String::len);
        Ok(handle.cursor >= len)
    }

    fn open_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.borrow().handles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn memory_read_lines_until_eof() {
        let mut files = MemoryFiles::new();
        files.insert("in.txt", "alpha\r\nbeta\n");
        files.open("in.txt", FileMode::Read).unwrap();
        assert!(!files.eof("in.txt").unwrap());
        assert_eq!(files.read_line("in.txt").unwrap(), "alpha");
        assert_eq!(files.read_line("in.txt").unwrap(), "beta");
        assert!(files.eof("in.txt").unwrap());
        assert_eq!(files.read_line("in.txt").unwrap(), "");
    }

    #[test]
    fn memory_write_truncates_and_append_extends() {
        let mut files = MemoryFiles::new();
        files.insert("log.txt", "old\n");
        files.open("log.txt", FileMode::Write).unwrap();
        files.write_line("log.txt", "one").unwrap();
        files.close("log.txt");
        files.open("log.txt", FileMode::Append).unwrap();
        files.write_line("log.txt", "two").unwrap();
        assert_eq!(files.contents("log.txt").as_deref(), Some("one\ntwo\n"));
        assert_eq!(files.mode("log.txt"), Some(FileMode::Append));
        assert!(files.close("log.txt"));
        assert!(!files.close("log.txt"));
    }

    #[test]
    fn memory_read_requires_existing_file() {
        let mut files = MemoryFiles::new();
        assert!(files.open("missing.txt", FileMode::Read).is_err());
        assert!(!files.is_open("missing.txt"));
    }

    #[test]
    fn disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = DiskFiles::with_base(dir.path());
        files.open("out.txt", FileMode::Write).unwrap();
        files.write_line("out.txt", "first").unwrap();
        files.write_line("out.txt", "second").unwrap();
        assert_eq!(files.open_files(), vec!["out.txt".to_string()]);
        assert!(files.close("out.txt"));

        files.open("out.txt", FileMode::Append).unwrap();
        files.write_line("out.txt", "third").unwrap();
        files.close("out.txt");

        files.open("out.txt", FileMode::Read).unwrap();
        let mut lines = Vec::new();
        while !files.eof("out.txt").unwrap() {
            lines.push(files.read_line("out.txt").unwrap());
        }
        assert_eq!(lines, vec!["first", "second", "third"]);
        assert!(files.write_line("out.txt", "nope").is_err());
    }

    #[test]
    fn disk_read_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = DiskFiles::with_base(dir.path());
        assert!(files.open("absent.txt", FileMode::Read).is_err());
    }
}
