//! Integration tests for the converter and verifier binaries.

use assert_cmd::Command;
use predicates::prelude::*;
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use tempfile::TempDir;
use ypbank_txn::{Record, TxnFile};

fn write_demo_txn(dir: &TempDir) -> String {
    let mut txn = TxnFile::new("123456".into(), "ABC PTY LIMITED".into());
    txn.batches[0].header.routing_number = "182-222".into();
    for (indicator, amount) in [("DR", "2721.78"), ("CR", "1210.00"), ("DR", "120.00"), ("CR", "2448.96")] {
        txn.batches[0].add_record(Record {
            routing_number: "182-222".into(),
            account_number: "123456789".into(),
            account_name: "DEMO ACCOUNT NUMBER 2".into(),
            indicator: indicator.into(),
            amount: Decimal::from_str(amount).unwrap(),
            ..Record::default()
        });
    }

    let path = dir.path().join("demo.txn");
    let mut file = fs::File::create(&path).unwrap();
    txn.write_to(&mut file).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn verify_consistent_file() {
    let dir = TempDir::new().unwrap();
    let path = write_demo_txn(&dir);

    Command::cargo_bin("ypbank_txn_verify")
        .unwrap()
        .args(["--file", path.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("match its 4 records in 1 batches"));
}

#[test]
fn verify_reports_tampered_trailer() {
    let dir = TempDir::new().unwrap();
    let path = write_demo_txn(&dir);

    // Change the file trailer's debit count from 2 to 3.
    let text = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let last = lines.len() - 1;
    lines[last].replace_range(44..45, "3");
    let tampered: String = lines.iter().map(|l| format!("{}\n", l)).collect();
    fs::write(&path, tampered).unwrap();

    Command::cargo_bin("ypbank_txn_verify")
        .unwrap()
        .args(["--file", path.as_str()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("File totals differ"));
}

#[test]
fn convert_txn_to_csv_and_back() {
    let dir = TempDir::new().unwrap();
    let txn_path = write_demo_txn(&dir);
    let csv_path = dir.path().join("demo.csv");
    let back_path = dir.path().join("back.txn");

    Command::cargo_bin("ypbank_txn_convert")
        .unwrap()
        .args(["-i", txn_path.as_str(), "--input-format", "txn", "--output-format", "csv"])
        .arg("-o")
        .arg(&csv_path)
        .assert()
        .success();

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("batch,routing_number"));
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.contains("2721.78,DR"));

    Command::cargo_bin("ypbank_txn_convert")
        .unwrap()
        .arg("-i")
        .arg(&csv_path)
        .args([
            "--input-format",
            "csv",
            "--output-format",
            "txn",
            "--customer-number",
            "123456",
            "--customer-name",
            "ABC PTY LIMITED",
        ])
        .arg("-o")
        .arg(&back_path)
        .assert()
        .success();

    let mut file = fs::File::open(&back_path).unwrap();
    let back = TxnFile::from_read(&mut file).unwrap();
    assert_eq!(back.record_count(), 4);
    assert_eq!(back.trailer.customer_number, "00123456");
    assert_eq!(back.trailer.total_debit_amount, Decimal::from_str("2841.78").unwrap());
    assert_eq!(back.batches[0].trailer.amount, Decimal::from_str("817.18").unwrap());
}

#[test]
fn convert_rejects_unknown_format() {
    Command::cargo_bin("ypbank_txn_convert")
        .unwrap()
        .args(["--input-format", "mt940", "--output-format", "txn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}
