//! Record codec: encoding and decoding of the five TXN line kinds.
//!
//! Each record kind has a fixed column map. Encoding never fails and always
//! produces a line of exactly [`RecordKind::width`] characters, without the
//! terminator. Decoding requires the terminator and checks the line length
//! before any column is read.

use crate::error::Result;
use crate::field::{
    format_amount, format_date, pad_line, push_field, push_number, Columns, Justify, ParseMode,
    AMOUNT_WIDTH,
};
use crate::types::{BatchHeader, BatchTrailer, FileHeader, FileTrailer, Record, RecordKind};
use regex::Regex;
use std::sync::OnceLock;

/// A record that maps onto a single fixed-width line.
pub trait FixedWidthRecord: Sized {
    /// The kind of line this record occupies.
    const KIND: RecordKind;

    /// Render the record as a fixed-width line, without terminator.
    fn encode(&self) -> String;

    /// Read the record's columns out of a length-checked line.
    fn from_columns(columns: &Columns<'_>) -> Result<Self>;

    /// Decode a terminated line, defaulting malformed sub-fields.
    fn decode(line: &str) -> Result<Self> {
        Self::decode_with(line, ParseMode::Lenient)
    }

    /// Decode a terminated line with an explicit parse mode.
    fn decode_with(line: &str, mode: ParseMode) -> Result<Self> {
        let columns = Columns::new(line, Self::KIND, mode)?;
        Self::from_columns(&columns)
    }
}

fn start_line(kind: RecordKind) -> String {
    let mut line = String::with_capacity(kind.width());
    line.push(kind.tag() as char);
    line
}

// Layout: tag [0], customer number [1,9), customer name [9,44),
// remitter name [44,64), file created [64,72), processing date [72,80),
// description [80,100), blank to 170.
impl FixedWidthRecord for FileHeader {
    const KIND: RecordKind = RecordKind::FileHeader;

    fn encode(&self) -> String {
        let mut line = start_line(Self::KIND);
        push_field(&mut line, &self.customer_number, 8, Justify::Zero);
        push_field(&mut line, &self.customer_name, 35, Justify::Left);
        push_field(&mut line, &self.remitter_name, 20, Justify::Left);
        push_field(&mut line, &format_date(&self.file_created), 8, Justify::Left);
        push_field(&mut line, &format_date(&self.processing_date), 8, Justify::Left);
        push_field(&mut line, &self.description, 20, Justify::Left);
        pad_line(line, Self::KIND.width())
    }

    fn from_columns(columns: &Columns<'_>) -> Result<Self> {
        Ok(FileHeader {
            customer_number: columns.text(1..9),
            customer_name: columns.text(9..44),
            remitter_name: columns.text(44..64),
            file_created: columns.date(64..72, "file created")?,
            processing_date: columns.date(72..80, "processing date")?,
            description: columns.text(80..100),
        })
    }
}

// Layout: tag [0], routing number [1,8), account number [8,17),
// account name [17,52), transaction date [52,60), amount [60,76),
// indicator [76,78), blank to 170.
impl FixedWidthRecord for BatchHeader {
    const KIND: RecordKind = RecordKind::BatchHeader;

    fn encode(&self) -> String {
        let mut line = start_line(Self::KIND);
        push_field(&mut line, &self.routing_number, 7, Justify::Left);
        push_field(&mut line, &self.account_number, 9, Justify::Left);
        push_field(&mut line, &self.account_name, 35, Justify::Left);
        push_field(&mut line, &format_date(&self.transaction_date), 8, Justify::Left);
        push_field(&mut line, &format_amount(&self.amount), AMOUNT_WIDTH, Justify::Right);
        push_field(&mut line, &self.indicator, 2, Justify::Left);
        pad_line(line, Self::KIND.width())
    }

    fn from_columns(columns: &Columns<'_>) -> Result<Self> {
        Ok(BatchHeader {
            routing_number: columns.text(1..8),
            account_number: columns.text(8..17),
            account_name: columns.text(17..52),
            transaction_date: columns.date(52..60, "transaction date")?,
            amount: columns.amount(60..76, "amount")?,
            indicator: columns.text(76..78),
        })
    }
}

fn routing_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{3}-\d{3}$").expect("routing number pattern is valid"))
}

impl Record {
    /// Basic checks on a transaction record.
    ///
    /// The indicator must be exactly `DR` or `CR` and the routing number must
    /// look like `182-222`.
    pub fn is_valid(&self) -> bool {
        matches!(self.indicator.as_str(), "DR" | "CR")
            && routing_number_pattern().is_match(&self.routing_number)
    }
}

// Layout: tag [0], routing number [1,8), account number [8,17),
// account name [17,52), transaction date [52,60), amount [60,76),
// indicator [76,78), transaction code [78,80), description [80,120),
// reference number [120,130), secondary reference [130,140),
// cheque number [140,148), blank to 168.
impl FixedWidthRecord for Record {
    const KIND: RecordKind = RecordKind::Transaction;

    fn encode(&self) -> String {
        let mut line = start_line(Self::KIND);
        push_field(&mut line, &self.routing_number, 7, Justify::Right);
        push_field(&mut line, &self.account_number, 9, Justify::Right);
        push_field(&mut line, &self.account_name, 35, Justify::Left);
        push_field(&mut line, &format_date(&self.transaction_date), 8, Justify::Left);
        push_field(&mut line, &format_amount(&self.amount), AMOUNT_WIDTH, Justify::Right);
        push_field(&mut line, &self.indicator, 2, Justify::Left);
        push_field(&mut line, &self.transaction_code, 2, Justify::Left);
        push_field(&mut line, &self.description, 40, Justify::Left);
        push_number(&mut line, self.reference_number, 10, Justify::Left, "reference number");
        push_field(&mut line, &self.secondary_reference, 10, Justify::Left);
        push_field(&mut line, &self.cheque_number, 8, Justify::Left);
        pad_line(line, Self::KIND.width())
    }

    fn from_columns(columns: &Columns<'_>) -> Result<Self> {
        Ok(Record {
            routing_number: columns.text(1..8),
            account_number: columns.text(8..17),
            account_name: columns.text(17..52),
            transaction_date: columns.date(52..60, "transaction date")?,
            amount: columns.amount(60..76, "amount")?,
            indicator: columns.text(76..78),
            transaction_code: columns.text(78..80),
            description: columns.text(80..120),
            reference_number: columns.parse(120..130, "reference number")?,
            secondary_reference: columns.text(130..140),
            cheque_number: columns.text(140..148),
        })
    }
}

// Layout: tag [0], routing number [1,8), account number [8,17),
// account name [17,52), transaction date [52,60), amount [60,76),
// indicator [76,78), batch type [78,80), reference number [80,86),
// debit count [86,92), credit count [92,98), debit amount [98,114),
// credit amount [114,130), blank to 170.
impl FixedWidthRecord for BatchTrailer {
    const KIND: RecordKind = RecordKind::BatchTrailer;

    fn encode(&self) -> String {
        let mut line = start_line(Self::KIND);
        push_field(&mut line, &self.routing_number, 7, Justify::Right);
        push_field(&mut line, &self.account_number, 9, Justify::Right);
        push_field(&mut line, &self.account_name, 35, Justify::Left);
        push_field(&mut line, &format_date(&self.transaction_date), 8, Justify::Left);
        push_field(&mut line, &format_amount(&self.amount), AMOUNT_WIDTH, Justify::Right);
        push_field(&mut line, self.indicator.as_str(), 2, Justify::Left);
        push_field(&mut line, self.batch_type.as_str(), 2, Justify::Left);
        push_number(&mut line, self.reference_number, 6, Justify::Zero, "batch reference number");
        push_number(
            &mut line,
            self.total_debit_transactions,
            6,
            Justify::Right,
            "total debit transactions",
        );
        push_number(
            &mut line,
            self.total_credit_transactions,
            6,
            Justify::Right,
            "total credit transactions",
        );
        push_field(
            &mut line,
            &format_amount(&self.total_debit_amount),
            AMOUNT_WIDTH,
            Justify::Right,
        );
        push_field(
            &mut line,
            &format_amount(&self.total_credit_amount),
            AMOUNT_WIDTH,
            Justify::Right,
        );
        pad_line(line, Self::KIND.width())
    }

    fn from_columns(columns: &Columns<'_>) -> Result<Self> {
        Ok(BatchTrailer {
            routing_number: columns.text(1..8),
            account_number: columns.text(8..17),
            account_name: columns.text(17..52),
            transaction_date: columns.date(52..60, "transaction date")?,
            amount: columns.amount(60..76, "amount")?,
            indicator: columns.parse(76..78, "indicator")?,
            batch_type: columns.parse(78..80, "batch type")?,
            reference_number: columns.parse(80..86, "reference number")?,
            total_debit_transactions: columns.parse(86..92, "total debit transactions")?,
            total_credit_transactions: columns.parse(92..98, "total credit transactions")?,
            total_debit_amount: columns.amount(98..114, "total debit amount")?,
            total_credit_amount: columns.amount(114..130, "total credit amount")?,
        })
    }
}

// Layout: tag [0], customer number [1,9), customer name [9,44),
// debit count [44,50), credit count [50,56), debit amount [56,72),
// credit amount [72,88), blank to 170.
impl FixedWidthRecord for FileTrailer {
    const KIND: RecordKind = RecordKind::FileTrailer;

    fn encode(&self) -> String {
        let mut line = start_line(Self::KIND);
        push_field(&mut line, &self.customer_number, 8, Justify::Zero);
        push_field(&mut line, &self.customer_name, 35, Justify::Left);
        push_number(
            &mut line,
            self.total_debit_transactions,
            6,
            Justify::Left,
            "total debit transactions",
        );
        push_number(
            &mut line,
            self.total_credit_transactions,
            6,
            Justify::Left,
            "total credit transactions",
        );
        push_field(
            &mut line,
            &format_amount(&self.total_debit_amount),
            AMOUNT_WIDTH,
            Justify::Left,
        );
        push_field(
            &mut line,
            &format_amount(&self.total_credit_amount),
            AMOUNT_WIDTH,
            Justify::Left,
        );
        pad_line(line, Self::KIND.width())
    }

    fn from_columns(columns: &Columns<'_>) -> Result<Self> {
        Ok(FileTrailer {
            customer_number: columns.text(1..9),
            customer_name: columns.text(9..44),
            total_debit_transactions: columns.parse(44..50, "total debit transactions")?,
            total_credit_transactions: columns.parse(50..56, "total credit transactions")?,
            total_debit_amount: columns.amount(56..72, "total debit amount")?,
            total_credit_amount: columns.amount(72..88, "total credit amount")?,
        })
    }
}

/// One decoded line of a TXN file.
#[derive(Debug, Clone, PartialEq)]
pub enum TxnLine {
    FileHeader(FileHeader),
    BatchHeader(BatchHeader),
    Record(Record),
    BatchTrailer(BatchTrailer),
    FileTrailer(FileTrailer),
}

impl TxnLine {
    /// Decode a line already classified by its leading tag.
    pub fn decode(kind: RecordKind, line: &str, mode: ParseMode) -> Result<Self> {
        Ok(match kind {
            RecordKind::FileHeader => TxnLine::FileHeader(FileHeader::decode_with(line, mode)?),
            RecordKind::BatchHeader => TxnLine::BatchHeader(BatchHeader::decode_with(line, mode)?),
            RecordKind::Transaction => TxnLine::Record(Record::decode_with(line, mode)?),
            RecordKind::BatchTrailer => TxnLine::BatchTrailer(BatchTrailer::decode_with(line, mode)?),
            RecordKind::FileTrailer => TxnLine::FileTrailer(FileTrailer::decode_with(line, mode)?),
        })
    }

    /// The record kind of this line.
    pub fn kind(&self) -> RecordKind {
        match self {
            TxnLine::FileHeader(_) => RecordKind::FileHeader,
            TxnLine::BatchHeader(_) => RecordKind::BatchHeader,
            TxnLine::Record(_) => RecordKind::Transaction,
            TxnLine::BatchTrailer(_) => RecordKind::BatchTrailer,
            TxnLine::FileTrailer(_) => RecordKind::FileTrailer,
        }
    }
}
