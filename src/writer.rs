//! TXN file writer.
//!
//! [`TxnWriter`] emits the file header, each batch (header, records, computed
//! trailer) and finally the file trailer. Output is buffered; call
//! [`TxnWriter::flush`] once the file has been written. A file that fails
//! validation is rejected before any of it is buffered.
//!
//! If an I/O error occurs, the writer remembers it and every later write or
//! flush fails with the same error without touching the underlying sink.

use crate::error::{Error, Result};
use crate::field::amount_fits;
use crate::record::FixedWidthRecord;
use crate::totals::Totals;
use crate::types::{BatchTrailer, TxnFile};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::{self, BufWriter, Write};

/// Writer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriterConfig {
    /// For banks that don't summarise credit/debit transactions: all trailer
    /// counts and sums are written as zero.
    pub omit_batch_totals: bool,
    /// Terminate lines with `\r\n` instead of `\n`.
    pub crlf_line_endings: bool,
}

impl WriterConfig {
    fn line_ending(&self) -> &'static [u8] {
        if self.crlf_line_endings {
            b"\r\n"
        } else {
            b"\n"
        }
    }
}

/// First I/O failure, replayed on every later call.
#[derive(Debug, Clone)]
struct StickyError {
    kind: io::ErrorKind,
    message: String,
}

impl StickyError {
    fn to_error(&self) -> Error {
        Error::Io(io::Error::new(self.kind, self.message.clone()))
    }
}

/// Buffered writer for whole TXN files.
#[derive(Debug)]
pub struct TxnWriter<W: Write> {
    config: WriterConfig,
    inner: BufWriter<W>,
    error: Option<StickyError>,
}

impl<W: Write> TxnWriter<W> {
    /// Create a writer with the default configuration.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, WriterConfig::default())
    }

    /// Create a writer with explicit options.
    pub fn with_config(writer: W, config: WriterConfig) -> Self {
        TxnWriter {
            config,
            inner: BufWriter::new(writer),
            error: None,
        }
    }

    /// The writer's options.
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Write the entire file.
    ///
    /// Batch trailers and the file trailer's counts and sums are computed
    /// from the records and stored back into `file` before being written.
    /// Every record is validated and every total checked against its column
    /// before the first line is buffered, so a file rejected here leaves
    /// nothing behind in the writer.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ypbank_txn::{TxnFile, TxnWriter};
    ///
    /// let mut file = TxnFile::new("123456".into(), "ABC PTY LIMITED".into());
    /// let mut writer = TxnWriter::new(std::io::stdout());
    /// writer.write(&mut file)?;
    /// writer.flush()?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write(&mut self, file: &mut TxnFile) -> Result<()> {
        self.check()?;
        if file.batches.is_empty() {
            return Err(Error::InsufficientBatches);
        }

        let batch_totals = self.summarise(file)?;
        let mut file_totals = Totals::default();
        for (index, (batch, totals)) in file.batches.iter_mut().zip(&batch_totals).enumerate() {
            let reference = u32::try_from(index).unwrap_or(u32::MAX);
            batch.trailer = BatchTrailer::summarise(&batch.header, reference, totals);
            file_totals.merge(totals);
        }
        if !file_totals.fits_trailer() {
            return Err(Error::TotalsOverflow {
                scope: "file".to_string(),
            });
        }
        file.trailer.set_totals(&file_totals);

        self.write_line(&file.header.encode())?;
        for (index, batch) in file.batches.iter().enumerate() {
            self.write_line(&batch.header.encode())?;
            for record in &batch.records {
                self.write_line(&record.encode())?;
            }
            self.write_line(&batch.trailer.encode())?;
            debug!(
                "Wrote batch {} with {} records ({})",
                index,
                batch.records.len(),
                batch_totals[index]
            );
        }
        self.write_line(&file.trailer.encode())
    }

    /// Validate every record and aggregate each batch.
    fn summarise(&self, file: &TxnFile) -> Result<Vec<Totals>> {
        let mut all = Vec::with_capacity(file.batches.len());
        for (batch, contents) in file.batches.iter().enumerate() {
            let mut totals = Totals::default();
            for (index, record) in contents.records.iter().enumerate() {
                if !record.is_valid() {
                    return Err(Error::InvalidRecord { batch, index });
                }
                if !amount_fits(&record.amount) {
                    return Err(Error::AmountOverflow { batch, index });
                }
                if !self.config.omit_batch_totals {
                    totals.observe(index, record);
                }
            }
            if !totals.fits_trailer() {
                return Err(Error::TotalsOverflow {
                    scope: format!("batch {}", batch),
                });
            }
            all.push(totals);
        }
        Ok(all)
    }

    /// Flush buffered lines to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.check()?;
        let result = self.inner.flush();
        self.remember(result)
    }

    /// Report any error that occurred during a previous write or flush.
    pub fn error(&self) -> Option<Error> {
        self.error.as_ref().map(StickyError::to_error)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        self.inner
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    fn check(&self) -> Result<()> {
        match &self.error {
            Some(sticky) => Err(sticky.to_error()),
            None => Ok(()),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.check()?;
        let ending = self.config.line_ending();
        let result = self
            .inner
            .write_all(line.as_bytes())
            .and_then(|_| self.inner.write_all(ending));
        self.remember(result)
    }

    fn remember(&mut self, result: io::Result<()>) -> Result<()> {
        result.map_err(|e| {
            self.error = Some(StickyError {
                kind: e.kind(),
                message: e.to_string(),
            });
            Error::Io(e)
        })
    }
}

impl TxnFile {
    /// Write the file to any destination implementing `Write` and flush it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use ypbank_txn::TxnFile;
    ///
    /// let mut txn = TxnFile::new("123456".into(), "ABC PTY LIMITED".into());
    /// let mut file = File::create("output.txn")?;
    /// txn.write_to(&mut file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        self.write_to_with(writer, WriterConfig::default())
    }

    /// Same as [`TxnFile::write_to`] with explicit writer options.
    pub fn write_to_with<W: Write>(&mut self, writer: &mut W, config: WriterConfig) -> Result<()> {
        let mut txn_writer = TxnWriter::with_config(writer, config);
        txn_writer.write(self)?;
        txn_writer.flush()
    }
}
