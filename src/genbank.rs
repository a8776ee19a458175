//! GenBank CDS translation extraction
//!
//! [`CdsReader`](CdsReader) scans a GenBank flat file line by line and
//! emits one entry per CDS feature block that carries a complete
//! `/translation` qualifier. The translation value usually spans many
//! continuation lines with a fixed-width annotation indent; the reader
//! reconstructs it into a single contiguous protein sequence.
//!
//! Each entry is named after the block's `/gene` qualifier. If the block
//! has no gene symbol, the `/locus_tag` qualifier is used instead. A block
//! offering neither before its translation is malformed input and reported
//! as [`Error::MissingName`](Error::MissingName).
//!
//! # Example
//!
//! ```
//! use flatseq::genbank::CdsReader;
//!
//! let gbk = b"     CDS             1..9
//!                      /gene=\"abc\"
//!                      /translation=\"MKV\"
//! ";
//!
//! let translations = CdsReader::new(&gbk[..]).translations().unwrap();
//! assert_eq!(translations[&b"abc"[..]], b"MKV".to_vec());
//! ```
//!
//! # Details on parsing behaviour
//!
//! * A line containing `CDS` opens a feature block. The `/gene` qualifier
//!   is resolved from the first line after it: if that line carries
//!   `/gene="..."` the value is captured, otherwise the block is marked as
//!   having no gene symbol. Qualifier order within a block follows GenBank
//!   convention and is not re-validated.
//! * `/locus_tag="..."` is captured wherever it appears within the block.
//! * On the `/translation` line, a value enclosed in two quotes is
//!   complete and emitted immediately. With only an opening quote, the
//!   remainder of the line starts the value and every following line
//!   continues it, with the fixed [`QUALIFIER_INDENT`](QUALIFIER_INDENT)
//!   columns stripped, until a line containing the closing quote.
//! * A block cut off by the end of input before its closing quote never
//!   emits an entry. The incomplete entry is dropped and a warning is
//!   logged; everything completed before that point is still returned.

use std::collections::HashMap;
use std::error;
use std::fmt;
use std::fs::File;
use std::io;
use std::mem;
use std::path::Path;
use std::str::{self, Utf8Error};

use log::{debug, warn};
use memchr::memchr;
use memchr::memmem;

use crate::lines::LineReader;

/// Content column where feature-qualifier continuation text begins in
/// GenBank flat files.
pub const QUALIFIER_INDENT: usize = 21;

/// A single CDS feature with a reconstructed translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cds {
    /// Gene name, or the locus tag if the block had no gene symbol.
    pub name: Vec<u8>,
    /// Protein sequence with all continuation lines joined.
    pub translation: Vec<u8>,
}

impl Cds {
    /// Return the entry name as string slice
    #[inline]
    pub fn name(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(&self.name)
    }

    /// Return the translation as string slice
    #[inline]
    pub fn translation(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(&self.translation)
    }
}

// Block-scoped cursor state. `gene: None` means the gene qualifier has
// not been looked at yet; `Some(empty)` means it was resolved as absent.
// The two are distinct: an empty string is a valid resolved value.
enum State {
    Idle,
    InBlock {
        gene: Option<Vec<u8>>,
        locus_tag: Option<Vec<u8>>,
    },
    InTranslation {
        name: Vec<u8>,
        partial: Vec<u8>,
    },
}

// Outcome of feeding one line to the state machine.
enum Step {
    Continue,
    Emit(Cds),
    MissingName,
}

/// Parser for CDS translations in GenBank flat files.
pub struct CdsReader<R: io::Read> {
    lines: LineReader<R>,
    state: State,
    finished: bool,
}

impl<R> CdsReader<R>
where
    R: io::Read,
{
    /// Creates a new reader with the default buffer size of 64 KiB
    #[inline]
    pub fn new(reader: R) -> CdsReader<R> {
        CdsReader {
            lines: LineReader::new(reader),
            state: State::Idle,
            finished: false,
        }
    }

    /// Creates a new reader with a given buffer capacity. The minimum
    /// allowed capacity is 3.
    #[inline]
    pub fn with_capacity(reader: R, capacity: usize) -> CdsReader<R> {
        CdsReader {
            lines: LineReader::with_capacity(reader, capacity),
            state: State::Idle,
            finished: false,
        }
    }

    /// Scans forward to the next completed CDS block and returns its
    /// entry. Returns `None` once the input is exhausted; after that (or
    /// after an error), every subsequent call returns `None`.
    pub fn next_cds(&mut self) -> Option<Result<Cds, Error>> {
        if self.finished {
            return None;
        }
        loop {
            match self.lines.next_line() {
                Ok(Some(line)) => match step(&mut self.state, line) {
                    Step::Continue => {}
                    Step::Emit(cds) => return Some(Ok(cds)),
                    Step::MissingName => {
                        let line_num = self.lines.line_num();
                        self.finished = true;
                        return Some(Err(Error::MissingName { line: line_num }));
                    }
                },
                Ok(None) => {
                    self.finished = true;
                    if !matches!(self.state, State::Idle) {
                        warn!("GenBank input ended inside a CDS block, incomplete entry dropped");
                    }
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(Error::Io(e)));
                }
            }
        }
    }

    /// Drains the reader into a name → translation mapping.
    ///
    /// When two CDS blocks resolve to the same name, the entry of the
    /// later block overwrites the earlier one. Use
    /// [`next_cds`](CdsReader::next_cds) directly if the file order of
    /// entries matters.
    pub fn translations(mut self) -> Result<HashMap<Vec<u8>, Vec<u8>>, Error> {
        let mut translations = HashMap::new();
        while let Some(result) = self.next_cds() {
            let cds = result?;
            translations.insert(cds.name, cds.translation);
        }
        debug!("collected {} CDS translations", translations.len());
        Ok(translations)
    }
}

impl CdsReader<File> {
    /// Creates a reader from a file path.
    #[inline]
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<CdsReader<File>> {
        File::open(path).map(CdsReader::new)
    }
}

// Advances the state machine by one line.
fn step(state: &mut State, line: &[u8]) -> Step {
    match state {
        State::Idle => {
            if memmem::find(line, b"CDS").is_some() {
                *state = State::InBlock {
                    gene: None,
                    locus_tag: None,
                };
            }
            Step::Continue
        }
        State::InBlock { gene, locus_tag } => {
            if gene.is_none() {
                // first line of the block decides: captured or absent
                *gene = Some(quoted_value(line, b"/gene=").unwrap_or_default());
            }
            if let Some(tag) = quoted_value(line, b"/locus_tag=") {
                *locus_tag = Some(tag);
            }
            if memmem::find(line, b"/translation").is_none() {
                return Step::Continue;
            }
            let name = match gene.as_ref().filter(|g| !g.is_empty()) {
                Some(gene) => gene.clone(),
                None => match locus_tag {
                    Some(tag) => tag.clone(),
                    None => return Step::MissingName,
                },
            };
            let after_open = match memchr(b'"', line) {
                Some(open) => &line[open + 1..],
                None => &[][..],
            };
            match memchr(b'"', after_open) {
                Some(close) => {
                    // both quotes on one line, the value is complete
                    let translation = after_open[..close].to_vec();
                    *state = State::Idle;
                    Step::Emit(Cds { name, translation })
                }
                None => {
                    *state = State::InTranslation {
                        name,
                        partial: after_open.to_vec(),
                    };
                    Step::Continue
                }
            }
        }
        State::InTranslation { name, partial } => match memchr(b'"', line) {
            Some(close) => {
                if close > QUALIFIER_INDENT {
                    partial.extend_from_slice(&line[QUALIFIER_INDENT..close]);
                }
                let cds = Cds {
                    name: mem::take(name),
                    translation: mem::take(partial),
                };
                *state = State::Idle;
                Step::Emit(cds)
            }
            None => {
                partial.extend_from_slice(line.get(QUALIFIER_INDENT..).unwrap_or(b""));
                Step::Continue
            }
        },
    }
}

// Returns the first double-quoted value following `key` in `line`.
fn quoted_value(line: &[u8], key: &[u8]) -> Option<Vec<u8>> {
    let rest = &line[memmem::find(line, key)? + key.len()..];
    let rest = &rest[memchr(b'"', rest)? + 1..];
    let close = memchr(b'"', rest)?;
    Some(rest[..close].to_vec())
}

/// Drives a [`CdsReader`](CdsReader) to exhaustion and writes each entry
/// to `writer` in FASTA form: `>` and the name, the translation on one
/// line, then a blank separator line. Entries appear in file order,
/// including repeated names. Returns the number of entries written.
pub fn write_fasta<R, W>(reader: &mut CdsReader<R>, mut writer: W) -> Result<u64, Error>
where
    R: io::Read,
    W: io::Write,
{
    let mut n_written = 0;
    while let Some(result) = reader.next_cds() {
        let cds = result?;
        writer.write_all(b">")?;
        writer.write_all(&cds.name)?;
        writer.write_all(b"\n")?;
        writer.write_all(&cds.translation)?;
        writer.write_all(b"\n\n")?;
        n_written += 1;
    }
    Ok(n_written)
}

/// GenBank parsing error
#[derive(Debug)]
pub enum Error {
    /// io::Error
    Io(io::Error),
    /// A CDS block reached its `/translation` qualifier with neither a
    /// `/gene` nor a `/locus_tag` qualifier to name the entry by.
    MissingName {
        /// line number (1-based) of the `/translation` qualifier
        line: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => e.fmt(f),
            Error::MissingName { line } => write!(
                f,
                "GenBank parse error: CDS block with a translation but no '/gene' or '/locus_tag' qualifier, line {}.",
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
            Error::MissingName { .. } => None,
        }
    }
}
