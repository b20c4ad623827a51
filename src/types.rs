//! Record types making up a TXN file.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five kinds of line that can appear in a TXN file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// First line of the file, tag `0`.
    FileHeader,
    /// Opens a batch, tag `1`.
    BatchHeader,
    /// A single transaction, tag `2`.
    Transaction,
    /// Closes a batch, tag `7`.
    BatchTrailer,
    /// Last line of the file, tag `9`.
    FileTrailer,
}

impl RecordKind {
    /// Leading type tag of lines of this kind.
    pub fn tag(&self) -> u8 {
        match self {
            RecordKind::FileHeader => b'0',
            RecordKind::BatchHeader => b'1',
            RecordKind::Transaction => b'2',
            RecordKind::BatchTrailer => b'7',
            RecordKind::FileTrailer => b'9',
        }
    }

    /// Line width excluding the terminator.
    pub fn width(&self) -> usize {
        match self {
            RecordKind::Transaction => 168,
            _ => 170,
        }
    }

    /// Look up the record kind for a leading tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'0' => Some(RecordKind::FileHeader),
            b'1' => Some(RecordKind::BatchHeader),
            b'2' => Some(RecordKind::Transaction),
            b'7' => Some(RecordKind::BatchTrailer),
            b'9' => Some(RecordKind::FileTrailer),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::FileHeader => "file header",
            RecordKind::BatchHeader => "batch header",
            RecordKind::Transaction => "transaction record",
            RecordKind::BatchTrailer => "batch trailer",
            RecordKind::FileTrailer => "file trailer",
        };
        f.write_str(name)
    }
}

/// Debit/Credit indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Indicator {
    /// Debit, written as `DR`.
    Debit,
    /// Credit, written as `CR`.
    #[default]
    Credit,
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DR" => Ok(Indicator::Debit),
            "CR" => Ok(Indicator::Credit),
            _ => Err(format!("Invalid debit/credit indicator: {}", s)),
        }
    }
}

impl Indicator {
    /// Two-letter code as written in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Debit => "DR",
            Indicator::Credit => "CR",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Batch type carried by the batch trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BatchType {
    /// Account transactions, `ST`.
    Transactions,
    /// Payments, `SP`.
    #[default]
    Payments,
}

impl FromStr for BatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ST" => Ok(BatchType::Transactions),
            "SP" => Ok(BatchType::Payments),
            _ => Err(format!("Invalid batch type: {}", s)),
        }
    }
}

impl BatchType {
    /// Two-letter code as written in the file.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchType::Transactions => "ST",
            BatchType::Payments => "SP",
        }
    }
}

/// File header, the first line of every file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileHeader {
    /// Customer number, written zero-filled to 8 digits.
    pub customer_number: String,

    /// Customer name, e.g. `AAA LEGAL SERVICES`.
    pub customer_name: String,

    /// Remitter name, e.g. `MACQUARIE BANK`.
    pub remitter_name: String,

    /// Date the file was created.
    pub file_created: NaiveDate,

    /// Processing date.
    pub processing_date: NaiveDate,

    /// e.g. `ACCOUNT TRANSACTIONS` or `DEFT PAYMENTS`.
    pub description: String,
}

/// Batch header, opens each batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchHeader {
    /// Routing number in the form `182-222`.
    pub routing_number: String,

    /// Account number, e.g. `116217011`.
    pub account_number: String,

    /// Account name.
    pub account_name: String,

    /// Transaction date.
    pub transaction_date: NaiveDate,

    /// Batch amount, set by the caller.
    pub amount: Decimal,

    /// `DR` or `CR`.
    pub indicator: String,
}

/// A single transaction line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Routing number in the form `182-222`.
    pub routing_number: String,

    /// Account number.
    pub account_number: String,

    /// Account name.
    pub account_name: String,

    /// Transaction date.
    pub transaction_date: NaiveDate,

    /// Transaction amount. The direction comes from `indicator`, never from the sign.
    pub amount: Decimal,

    /// `DR` or `CR`. Anything else makes the record invalid.
    pub indicator: String,

    /// Usually `13` for debits and `50` for credits.
    pub transaction_code: String,

    /// Free text description.
    pub description: String,

    /// Reference number.
    pub reference_number: u64,

    /// Secondary reference, unused by general products.
    pub secondary_reference: String,

    /// Cheque number.
    pub cheque_number: String,
}

/// Batch trailer, closes each batch and carries its totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchTrailer {
    pub routing_number: String,
    pub account_number: String,
    pub account_name: String,
    pub transaction_date: NaiveDate,

    /// Absolute value of credits minus debits.
    pub amount: Decimal,

    /// Direction of the net amount.
    pub indicator: Indicator,

    pub batch_type: BatchType,

    /// Zero-based position of the batch in the file.
    pub reference_number: u32,

    pub total_debit_transactions: u32,
    pub total_credit_transactions: u32,
    pub total_debit_amount: Decimal,
    pub total_credit_amount: Decimal,
}

/// File trailer, the last line of every file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileTrailer {
    /// Customer number, normally copied from the header.
    pub customer_number: String,

    /// Customer name, normally copied from the header.
    pub customer_name: String,

    /// Number of debits in the file.
    pub total_debit_transactions: u32,

    /// Number of credits in the file.
    pub total_credit_transactions: u32,

    /// Total value of debits in the file.
    pub total_debit_amount: Decimal,

    /// Total value of credits in the file.
    pub total_credit_amount: Decimal,
}

/// A batch: header, records and trailer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Batch {
    pub header: BatchHeader,
    pub records: Vec<Record>,
    pub trailer: BatchTrailer,
}

impl Batch {
    /// Create an empty batch dated today.
    pub fn new() -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            header: BatchHeader {
                transaction_date: today,
                ..BatchHeader::default()
            },
            records: Vec::new(),
            trailer: BatchTrailer {
                transaction_date: today,
                batch_type: BatchType::Payments,
                ..BatchTrailer::default()
            },
        }
    }

    /// Add a record to the batch.
    pub fn add_record(&mut self, record: Record) {
        self.records.push(record);
    }
}

/// A whole TXN file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TxnFile {
    pub header: FileHeader,
    pub batches: Vec<Batch>,
    pub trailer: FileTrailer,
}

impl TxnFile {
    /// Create a file for a customer with one empty batch and today's dates.
    pub fn new(customer_number: String, customer_name: String) -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            header: FileHeader {
                customer_number: customer_number.clone(),
                customer_name: customer_name.clone(),
                remitter_name: String::new(),
                file_created: today,
                processing_date: today,
                description: "ACCOUNT TRANSACTIONS".to_string(),
            },
            batches: vec![Batch::new()],
            trailer: FileTrailer {
                customer_number,
                customer_name,
                ..FileTrailer::default()
            },
        }
    }

    /// Total number of transaction records across all batches.
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(|b| b.records.len()).sum()
    }
}
