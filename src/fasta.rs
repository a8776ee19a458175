//! FASTA reading and writing
//!
//! # Example
//!
//! This example reads some multi-line content and writes it back with
//! each sequence flattened to a single line:
//!
//! ```
//! use flatseq::fasta::{self, Reader};
//!
//! let input = b">id1 a description
//! ACGT
//! ACGT
//! >id2
//! TGCA
//! ";
//!
//! let mut reader = Reader::new(&input[..]);
//! let mut output = vec![];
//!
//! let n = fasta::write_oneline(&mut reader, &mut output).unwrap();
//!
//! assert_eq!(n, 2);
//! assert_eq!(&output[..], &b">id1 a description\nACGTACGT\n>id2\nTGCA\n"[..]);
//! ```
//!
//! # Details on parsing behaviour
//!
//! * The parser handles UNIX (LF) and Windows (CRLF) line endings, but not
//!   old Mac-style (CR) endings. LF and CRLF may be mixed within the same
//!   file. FASTA writing always uses UNIX line endings.
//! * Empty lines are allowed anywhere in the file, they will just be
//!   ignored. The first non-empty line must start with `>`, indicating the
//!   first header; otherwise [`Error::InvalidStart`](Error::InvalidStart)
//!   is returned.
//! * The header line is split on ASCII whitespace: the first token (minus
//!   the leading `>`) becomes the record [`id`](Record::id), the remaining
//!   tokens joined by single spaces become the [`desc`](Record::desc).
//!   A header without a description yields an empty `desc`, never an
//!   error.
//! * If two consecutive header lines are encountered without intermediate
//!   sequence lines, the first record will have an empty sequence. The
//!   same is true if the input ends directly after a header line. The
//!   record is still emitted.
//! * Any non-header line between two headers is treated as sequence data
//!   unconditionally and appended without separators.
//! * Empty input will result in `None` being returned immediately by
//!   [`Reader::next`](Reader::next) and in empty iterators for
//!   `RecordsIter` / `RecordsIntoIter`.
//! * Once `next()` has returned `None` or an error, every subsequent call
//!   returns `None`. This is a terminal state, not an error.

use std::error;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::{self, Utf8Error};

use log::debug;

use crate::lines::LineReader;

/// Parser for FASTA files.
///
/// The reader holds exactly one line of lookahead: when the header of the
/// *next* record is encountered while accumulating sequence lines, it is
/// kept in the lookahead buffer and consumed by the following call to
/// [`next`](Reader::next).
pub struct Reader<R: io::Read> {
    lines: LineReader<R>,
    /// header line of the upcoming record, stashed by the previous call
    ahead: Option<Vec<u8>>,
    started: bool,
    finished: bool,
}

impl<R> Reader<R>
where
    R: io::Read,
{
    /// Creates a new reader with the default buffer size of 64 KiB
    ///
    /// # Example:
    ///
    /// ```
    /// use flatseq::fasta::Reader;
    /// let fasta = b">id\nSEQUENCE";
    ///
    /// let mut reader = Reader::new(&fasta[..]);
    /// let record = reader.next().unwrap().unwrap();
    /// assert_eq!(record.id(), Ok("id"));
    /// ```
    #[inline]
    pub fn new(reader: R) -> Reader<R> {
        Reader {
            lines: LineReader::new(reader),
            ahead: None,
            started: false,
            finished: false,
        }
    }

    /// Creates a new reader with a given buffer capacity. The minimum
    /// allowed capacity is 3.
    #[inline]
    pub fn with_capacity(reader: R, capacity: usize) -> Reader<R> {
        Reader {
            lines: LineReader::with_capacity(reader, capacity),
            ahead: None,
            started: false,
            finished: false,
        }
    }

    /// Reads the next FASTA record and returns it as an owned
    /// [`Record`](Record).
    ///
    /// # Example:
    ///
    /// ```no_run
    /// use flatseq::fasta::Reader;
    ///
    /// let mut reader = Reader::from_path("seqs.fasta").unwrap();
    ///
    /// while let Some(record) = reader.next() {
    ///     let record = record.unwrap();
    ///     println!("{}", record.id().unwrap());
    /// }
    /// ```
    pub fn next(&mut self) -> Option<Result<Record, Error>> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            if let Err(e) = self.init() {
                self.finished = true;
                return Some(Err(e));
            }
        }

        let head = match self.ahead.take() {
            Some(head) => head,
            None => {
                self.finished = true;
                return None;
            }
        };
        let mut record = parse_head(&head);

        // accumulate sequence lines until the next header or end of input
        loop {
            match self.lines.next_line() {
                Ok(Some(line)) if line.first() == Some(&b'>') => {
                    self.ahead = Some(line.to_vec());
                    break;
                }
                Ok(Some(line)) => record.seq.extend_from_slice(line),
                Ok(None) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(Error::Io(e)));
                }
            }
        }
        Some(Ok(record))
    }

    // Moves to the first header line, ignoring empty lines. On success,
    // the header sits in the lookahead buffer; `ahead == None` afterwards
    // means the input holds no records at all.
    fn init(&mut self) -> Result<(), Error> {
        loop {
            match self.lines.next_line()? {
                Some(line) if line.is_empty() => {}
                Some(line) if line[0] == b'>' => {
                    self.ahead = Some(line.to_vec());
                    return Ok(());
                }
                Some(line) => {
                    let found = line[0];
                    return Err(Error::InvalidStart {
                        line: self.lines.line_num(),
                        found,
                    });
                }
                None => return Ok(()),
            }
        }
    }

    /// Reads all remaining records into a vector, preserving input order.
    /// Stops at the first error.
    pub fn read_all(&mut self) -> Result<Vec<Record>, Error> {
        let records: Result<Vec<_>, _> = self.records().collect();
        if let Ok(ref r) = records {
            debug!("read {} FASTA records", r.len());
        }
        records
    }

    /// Returns a borrowed iterator over all FASTA records.
    ///
    /// # Example
    ///
    /// ```
    /// use flatseq::fasta::{Reader, Record};
    ///
    /// let fasta = b">id1
    /// ACGT
    /// >id2
    /// TGCA";
    ///
    /// let mut reader = Reader::new(&fasta[..]);
    ///
    /// let records: Result<Vec<_>, _> = reader
    ///     .records()
    ///     .collect();
    ///
    /// assert_eq!(records.unwrap(),
    ///     vec![
    ///         Record { id: b"id1".to_vec(), desc: vec![], seq: b"ACGT".to_vec() },
    ///         Record { id: b"id2".to_vec(), desc: vec![], seq: b"TGCA".to_vec() }
    ///     ]
    /// );
    /// ```
    pub fn records(&mut self) -> RecordsIter<R> {
        RecordsIter { rdr: self }
    }

    /// Returns an iterator over all FASTA records like
    /// [`Reader::records`](Reader::records), but with the difference that
    /// it owns the underlying reader.
    pub fn into_records(self) -> RecordsIntoIter<R> {
        RecordsIntoIter { rdr: self }
    }
}

impl Reader<File> {
    /// Creates a reader from a file path.
    ///
    /// # Example:
    ///
    /// ```no_run
    /// use flatseq::fasta::Reader;
    ///
    /// let mut reader = Reader::from_path("seqs.fasta").unwrap();
    ///
    /// // (... do something with the reader)
    /// ```
    #[inline]
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Reader<File>> {
        File::open(path).map(Reader::new)
    }
}

// Splits a header line into ID (first whitespace token minus the leading
// '>') and description (remaining tokens joined by single spaces).
fn parse_head(head: &[u8]) -> Record {
    let mut record = Record::default();
    let after = &head[1..];
    let mut parts = after.splitn(2, |b: &u8| b.is_ascii_whitespace());
    if let Some(id) = parts.next() {
        record.id.extend_from_slice(id);
    }
    if let Some(rest) = parts.next() {
        for token in rest
            .split(|b: &u8| b.is_ascii_whitespace())
            .filter(|t| !t.is_empty())
        {
            if !record.desc.is_empty() {
                record.desc.push(b' ');
            }
            record.desc.extend_from_slice(token);
        }
    }
    record
}

/// Borrowed iterator of `Record`
pub struct RecordsIter<'a, R>
where
    R: io::Read + 'a,
{
    rdr: &'a mut Reader<R>,
}

impl<'a, R> Iterator for RecordsIter<'a, R>
where
    R: io::Read + 'a,
{
    type Item = Result<Record, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.rdr.next()
    }
}

/// Iterator of `Record` that owns the underlying reader
pub struct RecordsIntoIter<R: io::Read> {
    rdr: Reader<R>,
}

impl<R> Iterator for RecordsIntoIter<R>
where
    R: io::Read,
{
    type Item = Result<Record, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        self.rdr.next()
    }
}

/// FASTA parsing error
#[derive(Debug)]
pub enum Error {
    /// io::Error
    Io(io::Error),
    /// First non-empty line does not start with `>`
    InvalidStart {
        /// line number (1-based)
        line: u64,
        /// byte that was found instead
        found: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => e.fmt(f),
            Error::InvalidStart { line, found } => write!(
                f,
                "FASTA parse error: expected '>' but found '{}' at file start, line {}.",
                (found as char).escape_default(),
                line
            ),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::InvalidStart { .. } => None,
        }
    }
}

/// An owned FASTA record.
///
/// `id` holds the token immediately following `>` up to the first
/// whitespace, `desc` the remaining header tokens joined by single spaces
/// (possibly empty), and `seq` the concatenation of every sequence line
/// without separators (possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Vec<u8>,
    pub desc: Vec<u8>,
    pub seq: Vec<u8>,
}

impl Record {
    /// Return the ID of the record as string slice
    #[inline]
    pub fn id(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(&self.id)
    }

    /// Return the description of the record as string slice; empty if the
    /// header carried no description.
    #[inline]
    pub fn desc(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(&self.desc)
    }

    /// Return the full header line (without `>`) as it would be written
    /// out: the ID, followed by a space and the description if one is
    /// present.
    pub fn head(&self) -> Vec<u8> {
        let mut head = self.id.clone();
        if !self.desc.is_empty() {
            head.push(b' ');
            head.extend_from_slice(&self.desc);
        }
        head
    }

    /// Write the record to the given `io::Write` instance. The sequence
    /// will occupy one line only.
    #[inline]
    pub fn write<W: io::Write>(&self, writer: W) -> io::Result<()> {
        write_parts(writer, &self.id, self.desc_opt(), &self.seq)
    }

    /// Write the record to the given `io::Write` instance. The sequence is
    /// wrapped to produce multi-line FASTA with a maximum width specified
    /// by `wrap`.
    #[inline]
    pub fn write_wrap<W: io::Write>(&self, mut writer: W, wrap: usize) -> io::Result<()> {
        write_id_desc(&mut writer, &self.id, self.desc_opt())?;
        write_wrap_seq(&mut writer, &self.seq, wrap)
    }

    #[inline]
    fn desc_opt(&self) -> Option<&[u8]> {
        if self.desc.is_empty() {
            None
        } else {
            Some(&self.desc)
        }
    }
}

/// Drives a [`Reader`](Reader) to exhaustion and writes each record to
/// `writer` as exactly two lines: the header and the flattened sequence.
/// Returns the number of records written.
///
/// Records are written in input order; two records sharing an ID are both
/// written. Records read before an error occurred have already been
/// written when the error is returned.
pub fn write_oneline<R, W>(reader: &mut Reader<R>, mut writer: W) -> Result<u64, Error>
where
    R: io::Read,
    W: io::Write,
{
    let mut n_written = 0;
    while let Some(result) = reader.next() {
        let record = result?;
        record.write(&mut writer)?;
        n_written += 1;
    }
    Ok(n_written)
}

/// Writes data (not necessarily stored in a `Record` instance) to the FASTA format.
#[inline]
pub fn write_to<W>(mut writer: W, head: &[u8], seq: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    write_head(&mut writer, head)?;
    write_seq(&mut writer, seq)
}

/// Writes data to the FASTA format. ID and description parts of the header are supplied
/// separately instead of a whole header line.
#[inline]
pub fn write_parts<W>(mut writer: W, id: &[u8], desc: Option<&[u8]>, seq: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    write_id_desc(&mut writer, id, desc)?;
    write_seq(&mut writer, seq)
}

/// Writes only the sequence header.
#[inline]
pub fn write_head<W>(mut writer: W, head: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    writer.write_all(b">")?;
    writer.write_all(head)?;
    writer.write_all(b"\n")
}

/// Writes only the sequence header given ID and description parts.
#[inline]
pub fn write_id_desc<W>(mut writer: W, id: &[u8], desc: Option<&[u8]>) -> io::Result<()>
where
    W: io::Write,
{
    writer.write_all(b">")?;
    writer.write_all(id)?;
    if let Some(d) = desc {
        writer.write_all(b" ")?;
        writer.write_all(d)?;
    }
    writer.write_all(b"\n")
}

/// Writes only the sequence line.
#[inline]
pub fn write_seq<W>(mut writer: W, seq: &[u8]) -> io::Result<()>
where
    W: io::Write,
{
    writer.write_all(seq)?;
    writer.write_all(b"\n")
}

/// Writes the sequence line, and wraps the output to a maximum width specified by `wrap`.
#[inline]
pub fn write_wrap_seq<W>(mut writer: W, seq: &[u8], wrap: usize) -> io::Result<()>
where
    W: io::Write,
{
    assert!(wrap > 0);
    for chunk in seq.chunks(wrap) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
