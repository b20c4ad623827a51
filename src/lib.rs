//! YP Bank TXN Library
//!
//! A library for reading and writing fixed-width TXN bank transaction files.
//!
//! # File Layout
//!
//! A TXN file is a sequence of fixed-width lines, each starting with a
//! one-character record tag:
//!
//! - **0**: file header (170 columns)
//! - **1**: batch header (170 columns)
//! - **2**: transaction record (168 columns)
//! - **7**: batch trailer with the batch's debit/credit totals (170 columns)
//! - **9**: file trailer with the file's debit/credit totals (170 columns)
//!
//! Lines end with `\n` or `\r\n`. Amounts are written with two decimals and
//! no sign, dates as `YYYYMMDD`.
//!
//! # Features
//!
//! - Encode and decode each record kind
//! - Write whole files, computing batch and file trailers from the records
//! - Read whole files, with lenient or strict sub-field parsing
//! - Cross-check trailer totals against the records
//! - Export to and import from CSV
//!
//! # Examples
//!
//! ## Writing a file
//!
//! ```no_run
//! use std::fs::File;
//! use std::str::FromStr;
//! use rust_decimal::Decimal;
//! use ypbank_txn::{Record, TxnFile};
//!
//! let mut txn = TxnFile::new("123456".into(), "ABC PTY LIMITED".into());
//! txn.batches[0].header.routing_number = "182-222".into();
//! txn.batches[0].add_record(Record {
//!     routing_number: "182-222".into(),
//!     account_number: "123456789".into(),
//!     indicator: "DR".into(),
//!     amount: Decimal::from_str("2721.78")?,
//!     ..Record::default()
//! });
//!
//! let mut output = File::create("output.txn")?;
//! txn.write_to(&mut output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Reading and verifying a file
//!
//! ```no_run
//! use std::fs::File;
//! use ypbank_txn::{totals, TxnFile};
//!
//! let mut input = File::open("Test_TXN_20170123.txn")?;
//! let txn = TxnFile::from_read(&mut input)?;
//! for mismatch in totals::verify(&txn) {
//!     println!("{}", mismatch);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod field;
pub mod record;
pub mod totals;
pub mod writer;
pub mod reader;
pub mod csv_format;

use std::str::FromStr;

// Re-export commonly used types
pub use error::{Error, Result};
pub use field::ParseMode;
pub use reader::{ReaderConfig, TxnReader};
pub use record::{FixedWidthRecord, TxnLine};
pub use types::{
    Batch, BatchHeader, BatchTrailer, BatchType, FileHeader, FileTrailer, Indicator, Record,
    RecordKind, TxnFile,
};
pub use writer::{TxnWriter, WriterConfig};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Fixed-width TXN format
    Txn,
    /// CSV format
    Csv,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "txn" | "fixed" => Ok(Format::Txn),
            "csv" => Ok(Format::Csv),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

impl Format {
    /// Get file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Txn => "txn",
            Format::Csv => "csv",
        }
    }
}
