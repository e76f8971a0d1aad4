//! Buffered stream copy with a reusable buffer.
//!
//! One [`CopyBuffer`] is allocated per archive and reused for every entry,
//! so unpacking thousands of small files does not allocate per file.

use std::io::Read;
use std::io::Write;
use std::io::{self};

/// I/O buffer size (64KB), matching typical filesystem block sizes.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Heap buffer reused across copy operations.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies everything from `reader` to `writer` through `buffer`.
///
/// Interrupted reads are retried. Returns the number of bytes copied.
///
/// # Errors
///
/// Returns the first read or write error.
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total += bytes_read as u64;
    }

    Ok(total)
}
