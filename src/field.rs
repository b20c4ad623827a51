//! Fixed-width field formatting and parsing.
//!
//! Every record line is a sequence of columns of fixed width. Encoding pads or
//! truncates each value into its column; decoding slices the column back out,
//! trims the padding and converts it to a typed value.
//!
//! Decoding follows a [`ParseMode`]: in lenient mode a numeric or date column
//! that fails to parse is replaced by its zero value (`0`, `0.00` or
//! `1970-01-01`) and a warning is logged; in strict mode it is an error.
//! Blank numeric columns decode to zero in both modes.

use crate::error::{Error, Result};
use crate::types::RecordKind;
use chrono::NaiveDate;
use log::warn;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Date layout used by every date column.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Width of every amount column.
pub const AMOUNT_WIDTH: usize = 16;

/// How a value is placed in its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    /// Left justified, blank filled.
    Left,
    /// Right justified, blank filled.
    Right,
    /// Right justified, zero filled.
    Zero,
}

/// How malformed sub-fields are handled while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    /// Default the field to its zero value and log a warning.
    #[default]
    Lenient,
    /// Fail with [`Error::BadField`].
    Strict,
}

/// Append `value` to `line` as a column of exactly `width` characters.
///
/// Values longer than the column are truncated. Characters outside ASCII are
/// replaced by `?` so column widths stay byte-exact.
pub fn push_field(line: &mut String, value: &str, width: usize, justify: Justify) {
    let content: String = value
        .chars()
        .take(width)
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect();
    let fill = width - content.len();

    match justify {
        Justify::Left => {
            line.push_str(&content);
            line.extend(std::iter::repeat(' ').take(fill));
        }
        Justify::Right => {
            line.extend(std::iter::repeat(' ').take(fill));
            line.push_str(&content);
        }
        Justify::Zero => {
            line.extend(std::iter::repeat('0').take(fill));
            line.push_str(&content);
        }
    }
}

/// Append a number as a column of `width` characters.
///
/// A number with more digits than the column holds keeps its leading digits,
/// as text would, and a warning naming `field` is logged.
pub fn push_number<T: fmt::Display>(
    line: &mut String,
    value: T,
    width: usize,
    justify: Justify,
    field: &str,
) {
    let digits = value.to_string();
    if digits.len() > width {
        warn!(
            "{} {} does not fit in {} columns, written as {}",
            field,
            digits,
            width,
            &digits[..width]
        );
    }
    push_field(line, &digits, width, justify);
}

/// Pad `line` with trailing spaces, or truncate it, to exactly `width`.
pub fn pad_line(mut line: String, width: usize) -> String {
    if line.len() > width {
        line.truncate(width);
    } else {
        let fill = width - line.len();
        line.extend(std::iter::repeat(' ').take(fill));
    }
    line
}

/// Render an amount with exactly two fraction digits and no sign.
///
/// Rounds half to even; the sign is carried by a separate indicator column.
pub fn format_amount(amount: &Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{:.2}", rounded)
}

/// Whether `amount` renders within an amount column.
pub fn amount_fits(amount: &Decimal) -> bool {
    format_amount(amount).len() <= AMOUNT_WIDTH
}

/// Render a date as `YYYYMMDD`.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Column accessor over a single record line.
#[derive(Debug, Clone, Copy)]
pub struct Columns<'a> {
    line: &'a str,
    kind: RecordKind,
    mode: ParseMode,
}

impl<'a> Columns<'a> {
    /// Check the line length for `kind` and strip the terminator.
    ///
    /// The line must be exactly the record width followed by `\n` or `\r\n`.
    pub fn new(line: &'a str, kind: RecordKind, mode: ParseMode) -> Result<Self> {
        let width = kind.width();
        let body = line
            .strip_suffix("\r\n")
            .or_else(|| line.strip_suffix('\n'))
            .filter(|body| body.len() == width)
            .ok_or_else(|| Error::BadLength {
                kind,
                expected: width,
                actual: line.trim_end_matches(&['\r', '\n'][..]).len(),
            })?;

        let columns = Columns {
            line: body,
            kind,
            mode,
        };
        if body.as_bytes().first() != Some(&kind.tag()) {
            columns.reject::<()>("record type", body.get(0..1).unwrap_or(""))?;
        }
        Ok(columns)
    }

    /// Trimmed text of a column.
    pub fn text(&self, range: Range<usize>) -> String {
        self.raw(range).to_string()
    }

    /// Parse a column with `FromStr`, falling back per the parse mode.
    pub fn parse<T>(&self, range: Range<usize>, field: &'static str) -> Result<T>
    where
        T: FromStr + Default,
    {
        let value = self.raw(range);
        if value.is_empty() {
            return Ok(T::default());
        }
        match value.parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => self.reject(field, value),
        }
    }

    /// Parse a fixed-point amount column.
    pub fn amount(&self, range: Range<usize>, field: &'static str) -> Result<Decimal> {
        self.parse::<Decimal>(range, field)
    }

    /// Parse a `YYYYMMDD` date column.
    pub fn date(&self, range: Range<usize>, field: &'static str) -> Result<NaiveDate> {
        let value = self.raw(range);
        match NaiveDate::parse_from_str(value, DATE_FORMAT) {
            Ok(date) => Ok(date),
            Err(_) => self.reject(field, value),
        }
    }

    fn raw(&self, range: Range<usize>) -> &'a str {
        self.line.get(range).unwrap_or("").trim()
    }

    fn reject<T: Default>(&self, field: &'static str, value: &str) -> Result<T> {
        match self.mode {
            ParseMode::Strict => Err(Error::BadField {
                kind: self.kind,
                field,
                value: value.to_string(),
            }),
            ParseMode::Lenient => {
                warn!(
                    "{}: field {} has unparseable value {:?}, using default",
                    self.kind, field, value
                );
                Ok(T::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of(kind: RecordKind, body: &str) -> String {
        let mut line = String::new();
        line.push(kind.tag() as char);
        line.push_str(body);
        let mut line = pad_line(line, kind.width());
        line.push('\n');
        line
    }

    #[test]
    fn test_push_field_justification() {
        let mut line = String::new();
        push_field(&mut line, "AB", 4, Justify::Left);
        push_field(&mut line, "CD", 4, Justify::Right);
        push_field(&mut line, "12", 4, Justify::Zero);
        assert_eq!(line, "AB    CD0012");
    }

    #[test]
    fn test_push_field_truncates() {
        let mut line = String::new();
        push_field(&mut line, "ABCDEFGH", 5, Justify::Right);
        assert_eq!(line, "ABCDE");
    }

    #[test]
    fn test_push_field_replaces_non_ascii() {
        let mut line = String::new();
        push_field(&mut line, "CAFÉ", 5, Justify::Left);
        assert_eq!(line, "CAF? ");
    }

    #[test]
    fn test_push_number() {
        let mut line = String::new();
        push_number(&mut line, 42u32, 6, Justify::Zero, "reference number");
        push_number(&mut line, 7u32, 3, Justify::Left, "count");
        assert_eq!(line, "0000427  ");

        let mut wide = String::new();
        push_number(&mut wide, 12345678901u64, 10, Justify::Left, "reference number");
        assert_eq!(wide, "1234567890");
    }

    #[test]
    fn test_amount_fits() {
        assert!(amount_fits(&Decimal::from_str("9999999999999.99").unwrap()));
        assert!(amount_fits(&Decimal::from_str("-9999999999999.994").unwrap()));
        assert!(!amount_fits(&Decimal::from_str("10000000000000.00").unwrap()));
        assert!(!amount_fits(&Decimal::MAX));
    }

    #[test]
    fn test_pad_line() {
        assert_eq!(pad_line("abc".to_string(), 5), "abc  ");
        assert_eq!(pad_line("abcdef".to_string(), 4), "abcd");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&Decimal::from_str("1210").unwrap()), "1210.00");
        assert_eq!(format_amount(&Decimal::from_str("2721.78").unwrap()), "2721.78");
        assert_eq!(format_amount(&Decimal::from_str("2.345").unwrap()), "2.34");
        assert_eq!(format_amount(&Decimal::from_str("2.355").unwrap()), "2.36");
        assert_eq!(format_amount(&Decimal::from_str("-15.5").unwrap()), "15.50");
        assert_eq!(format_amount(&Decimal::from_str("1234567.891").unwrap()), "1234567.89");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 23).unwrap();
        assert_eq!(format_date(&date), "20170123");
    }

    #[test]
    fn test_columns_length_check() {
        let line = line_of(RecordKind::BatchHeader, "");
        assert!(Columns::new(&line, RecordKind::BatchHeader, ParseMode::Lenient).is_ok());

        let crlf = format!("{}\r\n", line.trim_end_matches('\n'));
        assert!(Columns::new(&crlf, RecordKind::BatchHeader, ParseMode::Lenient).is_ok());

        let no_terminator = line.trim_end_matches('\n');
        assert!(Columns::new(no_terminator, RecordKind::BatchHeader, ParseMode::Lenient).is_err());

        let short = format!("{}\n", &line[..100]);
        match Columns::new(&short, RecordKind::BatchHeader, ParseMode::Lenient) {
            Err(Error::BadLength {
                kind,
                expected,
                actual,
            }) => {
                assert_eq!(kind, RecordKind::BatchHeader);
                assert_eq!(expected, 170);
                assert_eq!(actual, 100);
            }
            other => panic!("expected BadLength, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_defaults() {
        let line = line_of(RecordKind::FileTrailer, "2024XX31  abc   ");
        let cols = Columns::new(&line, RecordKind::FileTrailer, ParseMode::Lenient).unwrap();
        assert_eq!(
            cols.date(1..9, "date").unwrap(),
            NaiveDate::default()
        );
        assert_eq!(cols.parse::<u32>(9..16, "count").unwrap(), 0);
        assert_eq!(cols.amount(20..30, "amount").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_strict_rejects() {
        let line = line_of(RecordKind::FileTrailer, "2024XX31  abc   ");
        let cols = Columns::new(&line, RecordKind::FileTrailer, ParseMode::Strict).unwrap();
        match cols.date(1..9, "date") {
            Err(Error::BadField { field, value, .. }) => {
                assert_eq!(field, "date");
                assert_eq!(value, "2024XX31");
            }
            other => panic!("expected BadField, got {:?}", other),
        }
        assert!(cols.parse::<u32>(9..16, "count").is_err());
        assert_eq!(cols.amount(20..30, "amount").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_strict_checks_tag() {
        let line = line_of(RecordKind::FileTrailer, "");
        assert!(Columns::new(&line, RecordKind::FileHeader, ParseMode::Lenient).is_ok());
        assert!(Columns::new(&line, RecordKind::FileHeader, ParseMode::Strict).is_err());
    }
}
