//! Stream handles and their release discipline.
//!
//! Input streams are released silently. Output streams flush on release;
//! a failure at that point goes to the diagnostic sink and is swallowed so
//! it never replaces the error (or success) of the operation that opened
//! the stream. Callers that care about the flush result call `flush` or
//! `sync` themselves before releasing.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diagnostics::DiagnosticSink;

#[derive(Debug)]
pub struct InputStream {
    inner: File,
    path: PathBuf,
}

impl InputStream {
    pub(crate) fn new(inner: File, path: PathBuf) -> Self {
        Self { inner, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the stream. Nothing to report on the read side.
    pub fn close(self) {}
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

pub struct OutputStream {
    inner: Option<BufWriter<File>>,
    path: PathBuf,
    sink: Arc<dyn DiagnosticSink>,
}

impl OutputStream {
    pub(crate) fn new(file: File, path: PathBuf, capacity: usize, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            inner: Some(BufWriter::with_capacity(capacity, file)),
            path,
            sink,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered bytes and force them to stable storage.
    pub fn sync(&mut self) -> io::Result<()> {
        let w = self.writer()?;
        w.flush()?;
        w.get_ref().sync_all()
    }

    /// Release the stream, reporting (not returning) a failed flush.
    pub fn close(mut self) {
        self.release();
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::other("output stream already released"))
    }

    fn release(&mut self) {
        if let Some(mut w) = self.inner.take()
            && let Err(e) = w.flush()
        {
            self.sink.report(&format!(
                "got error releasing output stream for {}: {}",
                self.path.display(),
                e
            ));
        }
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        self.release();
    }
}
