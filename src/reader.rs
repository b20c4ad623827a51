//! TXN file reader.
//!
//! Lines are classified by their leading tag and decoded one at a time. While
//! assembling a [`TxnFile`], the reader tracks which batch is open: a batch
//! header opens one, a batch trailer closes it, and a transaction record or
//! batch trailer arriving with no open batch is a sequencing error.
//!
//! Trailer totals are taken from the file as-is; use
//! [`crate::totals::verify`] to cross-check them against the records.

use crate::error::{Error, Result};
use crate::field::ParseMode;
use crate::record::TxnLine;
use crate::types::{Batch, RecordKind, TxnFile};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read};

/// Reader options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// How malformed numeric and date sub-fields are handled.
    pub mode: ParseMode,
    /// Drop transaction records that fail validation instead of aborting.
    pub skip_invalid_records: bool,
}

/// Buffered reader for TXN files.
#[derive(Debug)]
pub struct TxnReader<R: Read> {
    config: ReaderConfig,
    inner: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl<R: Read> TxnReader<R> {
    /// Create a reader with the default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ReaderConfig::default())
    }

    /// Create a reader with explicit options.
    pub fn with_config(reader: R, config: ReaderConfig) -> Self {
        TxnReader {
            config,
            inner: BufReader::new(reader),
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// One-based number of the line most recently read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read and decode the next line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<TxnLine>> {
        self.buffer.clear();
        if self.inner.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let tag = self.buffer.as_bytes()[0];
        let kind = RecordKind::from_tag(tag).ok_or_else(|| Error::UnexpectedRecordType {
            line: self.line_number,
            tag: self.buffer.chars().next().unwrap_or_default(),
        })?;
        TxnLine::decode(kind, &self.buffer, self.config.mode).map(Some)
    }

    /// Read every remaining line and assemble the file.
    ///
    /// End of input ends the read successfully. Reading also stops after the
    /// file trailer.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use ypbank_txn::TxnReader;
    ///
    /// let file = File::open("Test_TXN_20170123.txn")?;
    /// let txn = TxnReader::new(file).read_all()?;
    /// println!("{} batches", txn.batches.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_all(&mut self) -> Result<TxnFile> {
        let mut file = TxnFile::default();
        let mut seen_header = false;
        let mut current: Option<usize> = None;

        while let Some(line) = self.next_line()? {
            match line {
                TxnLine::FileHeader(header) => {
                    if seen_header {
                        return Err(Error::DuplicateFileHeader {
                            line: self.line_number,
                        });
                    }
                    seen_header = true;
                    file.header = header;
                }
                TxnLine::BatchHeader(header) => {
                    file.batches.push(Batch {
                        header,
                        ..Batch::default()
                    });
                    current = Some(file.batches.len() - 1);
                }
                TxnLine::Record(record) => {
                    let index = self.open_batch(current, RecordKind::Transaction)?;
                    let batch = &mut file.batches[index];
                    if record.is_valid() {
                        batch.records.push(record);
                    } else if self.config.skip_invalid_records {
                        warn!(
                            "Skipping invalid record at line {} (batch {}, record {})",
                            self.line_number,
                            index,
                            batch.records.len()
                        );
                    } else {
                        return Err(Error::InvalidRecord {
                            batch: index,
                            index: batch.records.len(),
                        });
                    }
                }
                TxnLine::BatchTrailer(trailer) => {
                    let index = self.open_batch(current, RecordKind::BatchTrailer)?;
                    let batch = &mut file.batches[index];
                    batch.trailer = trailer;
                    debug!("Read batch {} with {} records", index, batch.records.len());
                    current = None;
                }
                TxnLine::FileTrailer(trailer) => {
                    file.trailer = trailer;
                    if !self.inner.fill_buf()?.is_empty() {
                        warn!("Ignoring data after file trailer at line {}", self.line_number);
                    }
                    break;
                }
            }
        }

        if !seen_header {
            warn!("File has no file header");
        }
        Ok(file)
    }

    fn open_batch(&self, current: Option<usize>, kind: RecordKind) -> Result<usize> {
        current.ok_or_else(|| Error::OutOfSequence {
            line: self.line_number,
            kind,
        })
    }
}

impl TxnFile {
    /// Parse a TXN file from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use ypbank_txn::TxnFile;
    ///
    /// let mut file = File::open("Test_TXN_20170123.txn")?;
    /// let txn = TxnFile::from_read(&mut file)?;
    /// println!("{} records", txn.record_count());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        Self::from_read_with(reader, ReaderConfig::default())
    }

    /// Same as [`TxnFile::from_read`] with explicit reader options.
    pub fn from_read_with<R: Read>(reader: &mut R, config: ReaderConfig) -> Result<Self> {
        TxnReader::with_config(reader, config).read_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FixedWidthRecord;
    use crate::types::{BatchHeader, BatchTrailer, FileHeader, FileTrailer, Record};
    use rust_decimal::Decimal;
    use std::io::Cursor;
    use std::str::FromStr;

    fn record(indicator: &str, amount: &str) -> Record {
        Record {
            routing_number: "182-222".into(),
            indicator: indicator.into(),
            amount: Decimal::from_str(amount).unwrap(),
            ..Record::default()
        }
    }

    fn lines(encoded: &[String]) -> String {
        encoded.iter().map(|l| format!("{}\n", l)).collect()
    }

    fn read(input: &str) -> Result<TxnFile> {
        TxnFile::from_read(&mut Cursor::new(input.as_bytes()))
    }

    #[test]
    fn test_read_structure() {
        let input = lines(&[
            FileHeader::default().encode(),
            BatchHeader::default().encode(),
            record("DR", "1.00").encode(),
            record("CR", "2.00").encode(),
            BatchTrailer::default().encode(),
            BatchHeader::default().encode(),
            BatchTrailer::default().encode(),
            FileTrailer::default().encode(),
        ]);
        let file = read(&input).unwrap();
        assert_eq!(file.batches.len(), 2);
        assert_eq!(file.batches[0].records.len(), 2);
        assert_eq!(file.batches[1].records.len(), 0);
    }

    #[test]
    fn test_empty_input() {
        let file = read("").unwrap();
        assert!(file.batches.is_empty());
    }

    #[test]
    fn test_unexpected_record_type() {
        let input = lines(&[FileHeader::default().encode(), "5".repeat(170)]);
        match read(&input) {
            Err(Error::UnexpectedRecordType { line, tag }) => {
                assert_eq!(line, 2);
                assert_eq!(tag, '5');
            }
            other => panic!("expected UnexpectedRecordType, got {:?}", other),
        }
    }

    #[test]
    fn test_record_before_batch_header() {
        let input = lines(&[FileHeader::default().encode(), record("DR", "1.00").encode()]);
        assert!(matches!(
            read(&input),
            Err(Error::OutOfSequence {
                line: 2,
                kind: RecordKind::Transaction
            })
        ));
    }

    #[test]
    fn test_record_after_batch_trailer() {
        let input = lines(&[
            BatchHeader::default().encode(),
            BatchTrailer::default().encode(),
            record("DR", "1.00").encode(),
        ]);
        assert!(matches!(read(&input), Err(Error::OutOfSequence { line: 3, .. })));
    }

    #[test]
    fn test_trailer_without_batch() {
        let input = lines(&[BatchTrailer::default().encode()]);
        assert!(matches!(
            read(&input),
            Err(Error::OutOfSequence {
                kind: RecordKind::BatchTrailer,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_file_header() {
        let input = lines(&[FileHeader::default().encode(), FileHeader::default().encode()]);
        assert!(matches!(read(&input), Err(Error::DuplicateFileHeader { line: 2 })));
    }

    #[test]
    fn test_invalid_record() {
        let input = lines(&[
            BatchHeader::default().encode(),
            record("DR", "1.00").encode(),
            record("XX", "2.00").encode(),
        ]);
        assert!(matches!(
            read(&input),
            Err(Error::InvalidRecord { batch: 0, index: 1 })
        ));

        let config = ReaderConfig {
            skip_invalid_records: true,
            ..ReaderConfig::default()
        };
        let file = TxnFile::from_read_with(&mut Cursor::new(input.as_bytes()), config).unwrap();
        assert_eq!(file.batches[0].records.len(), 1);
    }

    #[test]
    fn test_bad_line_length() {
        let input = format!("{}\n1 too short\n", FileHeader::default().encode());
        assert!(matches!(
            read(&input),
            Err(Error::BadLength {
                kind: RecordKind::BatchHeader,
                ..
            })
        ));
    }

    #[test]
    fn test_stops_after_file_trailer() {
        let input = lines(&[
            BatchHeader::default().encode(),
            FileTrailer::default().encode(),
            "garbage".to_string(),
        ]);
        let file = read(&input).unwrap();
        assert_eq!(file.batches.len(), 1);
    }

    #[test]
    fn test_next_line() {
        let input = lines(&[BatchHeader::default().encode(), record("CR", "3.00").encode()]);
        let mut reader = TxnReader::new(Cursor::new(input.into_bytes()));
        assert_eq!(
            reader.next_line().unwrap().map(|l| l.kind()),
            Some(RecordKind::BatchHeader)
        );
        assert_eq!(
            reader.next_line().unwrap().map(|l| l.kind()),
            Some(RecordKind::Transaction)
        );
        assert_eq!(reader.line_number(), 2);
        assert!(reader.next_line().unwrap().is_none());
    }
}
