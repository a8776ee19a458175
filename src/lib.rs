//! This library provides streaming, line-oriented readers for two
//! biological flat-file formats: multi-line FASTA and GenBank annotation
//! files.
//!
//! The FASTA parser turns arbitrarily wrapped sequence files into owned
//! [`fasta::Record`](fasta/struct.Record.html) values using a single line
//! of lookahead, and can re-serialize them with the sequence flattened to
//! one line. The GenBank reader scans CDS feature blocks and reconstructs
//! the `/translation` qualifier, which is usually split across many
//! fixed-width continuation lines, keyed by gene name or locus tag.
//!
//! Both readers pull records on demand: nothing is parsed until asked for,
//! and each reader instance owns its own cursor, so independent inputs can
//! be processed side by side without coordination. A single reader must be
//! driven by one consumer at a time.
//!
//! # Example FASTA parser:
//!
//! This code prints the ID string from each FASTA record.
//!
//! ```no_run
//! use flatseq::fasta::Reader;
//!
//! let mut reader = Reader::from_path("seqs.fasta").unwrap();
//!
//! while let Some(record) = reader.next() {
//!     let record = record.expect("Error reading record");
//!     println!("{}", record.id().unwrap());
//! }
//! ```
//!
//! # Example GenBank translation extraction:
//!
//! ```no_run
//! use flatseq::genbank::CdsReader;
//!
//! let reader = CdsReader::from_path("annotations.gbk").unwrap();
//! let translations = reader.translations().unwrap();
//! for (name, translation) in &translations {
//!     println!("{}: {} aa",
//!              String::from_utf8_lossy(name),
//!              translation.len());
//! }
//! ```
//!
//! # More detailed documentation
//!
//! Please refer to the module docs for the exact parsing behaviour:
//!
//! * [`fasta module`](fasta) and [`fasta::Reader`](fasta/struct.Reader.html)
//! * [`genbank module`](genbank) and [`genbank::CdsReader`](genbank/struct.CdsReader.html)

extern crate buffer_redux;
extern crate memchr;

#[macro_use]
extern crate serde_derive;
extern crate serde;

pub mod fasta;
pub mod genbank;
pub mod lines;

/// Remove a final '\r' from a byte slice
#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    if let Some((&b'\r', remaining)) = line.split_last() {
        remaining
    } else {
        line
    }
}
