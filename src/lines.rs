//! Minimal line source shared by the format readers.
//!
//! [`LineReader`](LineReader) yields one line at a time from any
//! `io::Read` instance, with the line terminator stripped. Reaching the
//! end of the stream is an ordinary condition reported as `Ok(None)`,
//! never an error; only true I/O failures are returned as `Err`.

use std::io::{self, BufRead};

use buffer_redux::BufReader;

use super::trim_cr;

const BUFSIZE: usize = 64 * 1024;

/// Lazy line cursor over a readable stream.
///
/// Lines are read into an internal buffer that is reused between calls,
/// so the slice returned by [`next_line`](LineReader::next_line) is only
/// valid until the next call. UNIX (LF) and Windows (CRLF) line endings
/// are handled, also mixed within the same input; old Mac-style (CR)
/// endings are not recognized as terminators.
pub struct LineReader<R: io::Read> {
    buffer: BufReader<R>,
    line: Vec<u8>,
    line_num: u64,
}

impl<R> LineReader<R>
where
    R: io::Read,
{
    /// Creates a new line reader with the default buffer size of 64 KiB.
    #[inline]
    pub fn new(reader: R) -> LineReader<R> {
        LineReader::with_capacity(reader, BUFSIZE)
    }

    /// Creates a new line reader with a given buffer capacity. The
    /// minimum allowed capacity is 3.
    #[inline]
    pub fn with_capacity(reader: R, capacity: usize) -> LineReader<R> {
        assert!(capacity >= 3);
        LineReader {
            buffer: BufReader::with_capacity(capacity, reader),
            line: vec![],
            line_num: 0,
        }
    }

    /// Returns the next line with its terminator stripped, or `Ok(None)`
    /// at the end of the stream. A line that is empty in the input is
    /// returned as an empty slice, it does not end the stream.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.line.clear();
        let n_read = self.buffer.read_until(b'\n', &mut self.line)?;
        if n_read == 0 {
            return Ok(None);
        }
        self.line_num += 1;
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
        }
        let len = trim_cr(&self.line).len();
        self.line.truncate(len);
        Ok(Some(&self.line))
    }

    /// 1-based number of the line last returned by
    /// [`next_line`](LineReader::next_line); 0 before the first call.
    #[inline]
    pub fn line_num(&self) -> u64 {
        self.line_num
    }
}
