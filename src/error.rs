//! Error types for the ypbank_txn library.

use crate::types::RecordKind;
use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while encoding or decoding TXN files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing CSV.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A file must contain at least one batch.
    #[error("not enough batches (minimum 1 required)")]
    InsufficientBatches,

    /// A line started with a byte that is not a known record tag.
    #[error("unexpected record type {tag:?} at line {line}, expected one of 0, 1, 2, 7, 9")]
    UnexpectedRecordType { line: usize, tag: char },

    /// A transaction record or batch trailer appeared with no open batch.
    #[error("{kind} at line {line} appears outside of a batch")]
    OutOfSequence { line: usize, kind: RecordKind },

    /// A second file header was found.
    #[error("duplicate file header at line {line}")]
    DuplicateFileHeader { line: usize },

    /// A line had the wrong length for its record kind.
    #[error("bad {kind}: expected {expected} columns, got {actual}")]
    BadLength {
        kind: RecordKind,
        expected: usize,
        actual: usize,
    },

    /// A sub-field could not be parsed (strict mode only).
    #[error("bad {kind}: field {field} has unparseable value {value:?}")]
    BadField {
        kind: RecordKind,
        field: &'static str,
        value: String,
    },

    /// A transaction record failed validation.
    #[error("invalid record can't be processed (batch {batch}, record {index})")]
    InvalidRecord { batch: usize, index: usize },

    /// A record amount is too large for its column.
    #[error("amount of record {index} in batch {batch} does not fit in its column")]
    AmountOverflow { batch: usize, index: usize },

    /// Trailer counts or sums are too large for their columns.
    #[error("{scope} totals do not fit in the trailer columns")]
    TotalsOverflow { scope: String },

    /// Invalid date format.
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// Invalid format specified.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl Error {
    /// The record kind this error refers to, if any.
    pub fn record_kind(&self) -> Option<RecordKind> {
        match self {
            Error::OutOfSequence { kind, .. }
            | Error::BadLength { kind, .. }
            | Error::BadField { kind, .. } => Some(*kind),
            Error::InvalidRecord { .. } | Error::AmountOverflow { .. } => {
                Some(RecordKind::Transaction)
            }
            Error::DuplicateFileHeader { .. } => Some(RecordKind::FileHeader),
            _ => None,
        }
    }
}
