//! Chunked stream copy.
//!
//! Reads up to `chunk_size` bytes at a time until the source reports end of
//! data (a zero-length read), writes every chunk straight to the
//! destination and flushes the destination once at the end.
//!
//! Neither handle is closed here; releasing them is the caller's job. There
//! is no retry: the first failed read, write or flush aborts the copy and is
//! returned as-is, leaving whatever was already written in place.

use std::io::{self, Read, Write};

/// Chunk size used when the configuration does not override it.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Copy `source` into `destination`; returns the number of bytes copied.
/// A `chunk_size` of zero is treated as one.
pub fn copy<R, W>(source: &mut R, destination: &mut W, chunk_size: usize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        destination.write_all(&buf[..n])?;
        total += n as u64;
    }
    destination.flush()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Counts flushes so the single-flush contract can be checked.
    #[derive(Default)]
    struct CountingSink {
        data: Vec<u8>,
        writes: usize,
        flushes: usize,
    }

    impl Write for CountingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct FailAfter {
        left: usize,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.left == 0 {
                return Err(io::Error::other("injected read failure"));
            }
            let n = buf.len().min(self.left);
            buf[..n].fill(b'x');
            self.left -= n;
            Ok(n)
        }
    }

    #[test]
    fn copies_across_chunk_boundaries_and_flushes_once() {
        let data: Vec<u8> = (0..2500u32).map(|i| (i % 251) as u8).collect();
        let mut src = Cursor::new(data.clone());
        let mut sink = CountingSink::default();
        let n = copy(&mut src, &mut sink, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(n, 2500);
        assert_eq!(sink.data, data);
        assert_eq!(sink.writes, 3);
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn empty_source_still_flushes() {
        let mut src = Cursor::new(Vec::<u8>::new());
        let mut sink = CountingSink::default();
        assert_eq!(copy(&mut src, &mut sink, 16).unwrap(), 0);
        assert_eq!(sink.flushes, 1);
        assert_eq!(sink.writes, 0);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let mut src = Cursor::new(b"abc".to_vec());
        let mut sink = CountingSink::default();
        assert_eq!(copy(&mut src, &mut sink, 0).unwrap(), 3);
        assert_eq!(sink.data, b"abc");
    }

    #[test]
    fn read_failure_aborts_without_flush() {
        let mut src = FailAfter { left: 10 };
        let mut sink = CountingSink::default();
        let err = copy(&mut src, &mut sink, 4).unwrap_err();
        assert_eq!(err.to_string(), "injected read failure");
        assert_eq!(sink.data.len(), 10);
        assert_eq!(sink.flushes, 0);
    }
}
