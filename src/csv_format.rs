//! CSV export and import of transaction records.
//!
//! One CSV row per transaction record. The `batch` column holds the batch
//! position; on import, consecutive rows with the same batch number form one
//! batch whose header is taken from the first row.

use crate::error::{Error, Result};
use crate::field::format_amount;
use crate::totals::Totals;
use crate::types::{Batch, BatchHeader, Record, TxnFile};
use chrono::NaiveDate;
use csv::{Reader, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::str::FromStr;

/// Transaction records grouped into batches, as exchanged via CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTransactions {
    /// Batches in file order. Trailers are left at their defaults.
    pub batches: Vec<Batch>,
}

/// CSV row structure.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(alias = "Batch")]
    batch: usize,
    #[serde(alias = "BSB", alias = "bsb")]
    routing_number: String,
    #[serde(alias = "Account Number", default)]
    account_number: String,
    #[serde(alias = "Account Name", default)]
    account_name: String,
    #[serde(alias = "Date", alias = "date")]
    transaction_date: String,
    #[serde(alias = "Amount")]
    amount: String,
    #[serde(alias = "Indicator")]
    indicator: String,
    #[serde(alias = "Transaction Code", default)]
    transaction_code: String,
    #[serde(alias = "Description", default)]
    description: String,
    #[serde(alias = "Reference", default)]
    reference_number: u64,
    #[serde(alias = "Secondary Reference", default)]
    secondary_reference: String,
    #[serde(alias = "Cheque Number", default)]
    cheque_number: String,
}

impl CsvTransactions {
    /// Parse CSV rows from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use ypbank_txn::csv_format::CsvTransactions;
    ///
    /// let mut file = File::open("transactions.csv")?;
    /// let csv = CsvTransactions::from_read(&mut file)?;
    /// println!("{} batches", csv.batches.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut csv_reader = Reader::from_reader(reader);
        let mut batches: Vec<Batch> = Vec::new();
        let mut current_batch: Option<usize> = None;

        for result in csv_reader.deserialize() {
            let row: CsvRow = result?;
            let record = Record {
                routing_number: row.routing_number.trim().to_string(),
                account_number: row.account_number.trim().to_string(),
                account_name: row.account_name.trim().to_string(),
                transaction_date: Self::parse_date(&row.transaction_date)?,
                amount: Self::parse_amount(&row.amount)?,
                indicator: row.indicator.trim().to_uppercase(),
                transaction_code: row.transaction_code.trim().to_string(),
                description: row.description.trim().to_string(),
                reference_number: row.reference_number,
                secondary_reference: row.secondary_reference.trim().to_string(),
                cheque_number: row.cheque_number.trim().to_string(),
            };

            if current_batch != Some(row.batch) {
                let header = BatchHeader {
                    routing_number: record.routing_number.clone(),
                    account_number: record.account_number.clone(),
                    account_name: record.account_name.clone(),
                    transaction_date: record.transaction_date,
                    ..BatchHeader::default()
                };
                batches.push(Batch {
                    header,
                    ..Batch::default()
                });
                current_batch = Some(row.batch);
            }
            if let Some(batch) = batches.last_mut() {
                batch.records.push(record);
            }
        }

        // The header carries the batch's net amount.
        for batch in &mut batches {
            let (amount, indicator) = Totals::from_records(&batch.records).net();
            batch.header.amount = amount;
            batch.header.indicator = indicator.as_str().to_string();
        }

        Ok(CsvTransactions { batches })
    }

    /// Write one CSV row per record to any destination implementing `Write`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut csv_writer = Writer::from_writer(writer);

        for (index, batch) in self.batches.iter().enumerate() {
            for record in &batch.records {
                let row = CsvRow {
                    batch: index,
                    routing_number: record.routing_number.clone(),
                    account_number: record.account_number.clone(),
                    account_name: record.account_name.clone(),
                    transaction_date: record.transaction_date.format("%Y-%m-%d").to_string(),
                    amount: format_amount(&record.amount),
                    indicator: record.indicator.clone(),
                    transaction_code: record.transaction_code.clone(),
                    description: record.description.clone(),
                    reference_number: record.reference_number,
                    secondary_reference: record.secondary_reference.clone(),
                    cheque_number: record.cheque_number.clone(),
                };
                csv_writer.serialize(row)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Wrap the batches in a file for the given customer.
    pub fn into_file(self, customer_number: String, customer_name: String) -> TxnFile {
        let mut file = TxnFile::new(customer_number, customer_name);
        file.batches = self.batches;
        file
    }

    fn parse_date(date_str: &str) -> Result<NaiveDate> {
        let formats = ["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y"];

        for format in formats {
            if let Ok(date) = NaiveDate::parse_from_str(date_str.trim(), format) {
                return Ok(date);
            }
        }

        Err(Error::InvalidDate(date_str.to_string()))
    }

    fn parse_amount(amount_str: &str) -> Result<Decimal> {
        let cleaned = amount_str.trim().replace(',', "");

        Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount(amount_str.to_string()))
    }
}

impl From<&TxnFile> for CsvTransactions {
    fn from(file: &TxnFile) -> Self {
        CsvTransactions {
            batches: file.batches.clone(),
        }
    }
}
