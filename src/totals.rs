//! Debit/credit aggregation for batch and file trailers.
//!
//! The writer folds every record of a batch into a [`Totals`], turns it into
//! the batch trailer and merges it into the file-wide totals, so the file
//! trailer is the sum of the batch trailers by construction. [`verify`] runs
//! the same aggregation over a decoded file and reports every trailer that
//! disagrees with its records.

use crate::field::amount_fits;
use crate::types::{BatchHeader, BatchTrailer, BatchType, FileTrailer, Indicator, Record, TxnFile};
use log::warn;
use rust_decimal::Decimal;
use std::fmt;

/// Largest count a six-column trailer field holds.
pub const MAX_TRAILER_COUNT: u32 = 999_999;

/// Debit and credit counts and sums.
///
/// Amounts are always accumulated as absolute values; the direction comes
/// from the record's indicator. Counts and sums saturate instead of
/// overflowing, so a saturated value never fits its trailer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub debit_transactions: u32,
    pub credit_transactions: u32,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
}

impl Totals {
    /// Aggregate a slice of records.
    pub fn from_records(records: &[Record]) -> Self {
        let mut totals = Totals::default();
        for (index, record) in records.iter().enumerate() {
            totals.observe(index, record);
        }
        totals
    }

    /// Fold one record in. Returns false if its indicator is neither `DR` nor
    /// `CR`; such records are logged and left out of the totals.
    pub fn observe(&mut self, index: usize, record: &Record) -> bool {
        match record.indicator.parse::<Indicator>() {
            Ok(Indicator::Debit) => {
                self.debit_transactions = self.debit_transactions.saturating_add(1);
                self.debit_amount = self.debit_amount.saturating_add(record.amount.abs());
                true
            }
            Ok(Indicator::Credit) => {
                self.credit_transactions = self.credit_transactions.saturating_add(1);
                self.credit_amount = self.credit_amount.saturating_add(record.amount.abs());
                true
            }
            Err(_) => {
                warn!(
                    "Unknown transaction type {:?} in record {}, excluded from totals",
                    record.indicator, index
                );
                false
            }
        }
    }

    /// Add another set of totals to this one.
    pub fn merge(&mut self, other: &Totals) {
        self.debit_transactions = self.debit_transactions.saturating_add(other.debit_transactions);
        self.credit_transactions = self
            .credit_transactions
            .saturating_add(other.credit_transactions);
        self.debit_amount = self.debit_amount.saturating_add(other.debit_amount);
        self.credit_amount = self.credit_amount.saturating_add(other.credit_amount);
    }

    /// Whether every count and sum fits its trailer column.
    pub fn fits_trailer(&self) -> bool {
        self.debit_transactions <= MAX_TRAILER_COUNT
            && self.credit_transactions <= MAX_TRAILER_COUNT
            && amount_fits(&self.debit_amount)
            && amount_fits(&self.credit_amount)
    }

    /// Net amount (credits minus debits) as an absolute value and direction.
    ///
    /// A zero net is reported as a credit.
    pub fn net(&self) -> (Decimal, Indicator) {
        let net = self.credit_amount - self.debit_amount;
        let indicator = if net < Decimal::ZERO {
            Indicator::Debit
        } else {
            Indicator::Credit
        };
        (net.abs(), indicator)
    }
}

impl From<&BatchTrailer> for Totals {
    fn from(trailer: &BatchTrailer) -> Self {
        Totals {
            debit_transactions: trailer.total_debit_transactions,
            credit_transactions: trailer.total_credit_transactions,
            debit_amount: trailer.total_debit_amount,
            credit_amount: trailer.total_credit_amount,
        }
    }
}

impl From<&FileTrailer> for Totals {
    fn from(trailer: &FileTrailer) -> Self {
        Totals {
            debit_transactions: trailer.total_debit_transactions,
            credit_transactions: trailer.total_credit_transactions,
            debit_amount: trailer.total_debit_amount,
            credit_amount: trailer.total_credit_amount,
        }
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} debits totalling {}, {} credits totalling {}",
            self.debit_transactions, self.debit_amount, self.credit_transactions, self.credit_amount
        )
    }
}

impl BatchTrailer {
    /// Build the trailer for the batch at position `reference` in the file.
    ///
    /// Routing number, account and transaction date are copied from the
    /// batch header.
    pub fn summarise(header: &BatchHeader, reference: u32, totals: &Totals) -> Self {
        let (amount, indicator) = totals.net();
        BatchTrailer {
            routing_number: header.routing_number.clone(),
            account_number: header.account_number.clone(),
            account_name: header.account_name.clone(),
            transaction_date: header.transaction_date,
            amount,
            indicator,
            batch_type: BatchType::Transactions,
            reference_number: reference,
            total_debit_transactions: totals.debit_transactions,
            total_credit_transactions: totals.credit_transactions,
            total_debit_amount: totals.debit_amount,
            total_credit_amount: totals.credit_amount,
        }
    }
}

impl FileTrailer {
    /// Overwrite the trailer's counts and sums.
    pub fn set_totals(&mut self, totals: &Totals) {
        self.total_debit_transactions = totals.debit_transactions;
        self.total_credit_transactions = totals.credit_transactions;
        self.total_debit_amount = totals.debit_amount;
        self.total_credit_amount = totals.credit_amount;
    }
}

/// A trailer that disagrees with the records it summarises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Batch trailer counts or sums differ from its records.
    BatchTotals {
        batch: usize,
        computed: Totals,
        trailer: Totals,
    },
    /// Batch trailer net amount or direction differs from its own sums.
    BatchNet {
        batch: usize,
        computed: (Decimal, Indicator),
        trailer: (Decimal, Indicator),
    },
    /// Batch trailer reference is not the batch position.
    BatchReference { batch: usize, found: u32 },
    /// File trailer counts or sums differ from all records in the file.
    FileTotals { computed: Totals, trailer: Totals },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::BatchTotals {
                batch,
                computed,
                trailer,
            } => write!(
                f,
                "Batch {} totals differ: records have {}, trailer says {}",
                batch, computed, trailer
            ),
            Mismatch::BatchNet {
                batch,
                computed,
                trailer,
            } => write!(
                f,
                "Batch {} net amount differs: expected {} {}, trailer says {} {}",
                batch, computed.0, computed.1, trailer.0, trailer.1
            ),
            Mismatch::BatchReference { batch, found } => {
                write!(f, "Batch {} trailer has reference number {}", batch, found)
            }
            Mismatch::FileTotals { computed, trailer } => write!(
                f,
                "File totals differ: records have {}, trailer says {}",
                computed, trailer
            ),
        }
    }
}

/// Recompute every trailer of `file` from its records and list the differences.
pub fn verify(file: &TxnFile) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    let mut file_totals = Totals::default();

    for (batch, contents) in file.batches.iter().enumerate() {
        let computed = Totals::from_records(&contents.records);
        let trailer = Totals::from(&contents.trailer);
        if computed != trailer {
            mismatches.push(Mismatch::BatchTotals {
                batch,
                computed,
                trailer,
            });
        }

        let net = trailer.net();
        let found = (contents.trailer.amount, contents.trailer.indicator);
        if net != found {
            mismatches.push(Mismatch::BatchNet {
                batch,
                computed: net,
                trailer: found,
            });
        }

        if contents.trailer.reference_number as usize != batch {
            mismatches.push(Mismatch::BatchReference {
                batch,
                found: contents.trailer.reference_number,
            });
        }

        file_totals.merge(&computed);
    }

    let trailer = Totals::from(&file.trailer);
    if file_totals != trailer {
        mismatches.push(Mismatch::FileTotals {
            computed: file_totals,
            trailer,
        });
    }

    mismatches
}
