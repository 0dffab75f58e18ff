//! Input sources for a merge run.
//!
//! The engine reads every source strictly forward, one physical line at a
//! time, through [`LineSource`]. [`LogInput`] describes a source before it
//! is opened: its display name (used for the component label), its size
//! (used for progress scaling) and, for files, its location on disk.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A forward-only reader of physical lines.
pub trait LineSource {
    /// Append the next line, including its terminator if present, to `buf`.
    /// Returns the number of bytes appended; `0` means end of stream.
    fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
}

/// Adapts any [`BufRead`] into a [`LineSource`].
pub struct LineReader<R> {
    inner: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> LineSource for LineReader<R> {
    fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.inner.read_until(b'\n', buf)
    }
}

/// A source that can be opened for merging.
pub trait LogInput {
    /// Name used for diagnostics and component label derivation.
    fn display_name(&self) -> &str;

    /// Size in bytes, used to scale progress. `0` if unknown.
    fn size_hint(&self) -> u64;

    /// Location on disk, if any. Used to refuse merging a file into itself.
    fn location(&self) -> Option<&Path> {
        None
    }

    /// Open the source for reading from the start.
    fn open(&self) -> io::Result<Box<dyn LineSource>>;
}

impl<T: LogInput + ?Sized> LogInput for &T {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn size_hint(&self) -> u64 {
        (**self).size_hint()
    }

    fn location(&self) -> Option<&Path> {
        (**self).location()
    }

    fn open(&self) -> io::Result<Box<dyn LineSource>> {
        (**self).open()
    }
}

impl<T: LogInput + ?Sized> LogInput for Box<T> {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn size_hint(&self) -> u64 {
        (**self).size_hint()
    }

    fn location(&self) -> Option<&Path> {
        (**self).location()
    }

    fn open(&self) -> io::Result<Box<dyn LineSource>> {
        (**self).open()
    }
}

/// A log file on disk.
#[derive(Clone, Debug)]
pub struct FileInput {
    path: PathBuf,
    name: String,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogInput for FileInput {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn size_hint(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn open(&self) -> io::Result<Box<dyn LineSource>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(LineReader::new(BufReader::new(file))))
    }
}

/// An in-memory log, for embedding callers and tests.
#[derive(Clone, Debug)]
pub struct MemoryInput {
    name: String,
    data: Arc<[u8]>,
}

impl MemoryInput {
    pub fn new(name: impl Into<String>, data: impl AsRef<[u8]>) -> Self {
        Self {
            name: name.into(),
            data: Arc::from(data.as_ref()),
        }
    }
}

impl LogInput for MemoryInput {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn size_hint(&self) -> u64 {
        self.data.len() as u64
    }

    fn open(&self) -> io::Result<Box<dyn LineSource>> {
        Ok(Box::new(LineReader::new(Cursor::new(Arc::clone(&self.data)))))
    }
}

/// Returns `true` if both paths name the same file. Falls back to comparing
/// the paths as given when either cannot be canonicalised.
pub(crate) fn same_location(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
