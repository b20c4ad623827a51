//! YP Bank TXN Verify - CLI tool for checking TXN trailers against their records.

use clap::Parser;
use std::fs::File;
use ypbank_txn::{totals, ParseMode, ReaderConfig, Result, TxnFile};

#[derive(Parser)]
#[command(name = "ypbank_txn_verify")]
#[command(about = "Check that TXN batch and file trailers match their records", long_about = None)]
struct Cli {
    /// TXN file path
    #[arg(long = "file")]
    file: String,

    /// Fail on malformed sub-fields instead of defaulting them
    #[arg(long)]
    strict: bool,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    let config = ReaderConfig {
        mode: if cli.strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        },
        ..ReaderConfig::default()
    };
    let mut file = File::open(&cli.file)?;
    let txn = TxnFile::from_read_with(&mut file, config)?;

    let report = build_report(&cli.file, &txn);
    println!("{}", report.text);

    Ok(report.consistent)
}

struct Report {
    text: String,
    consistent: bool,
}

fn build_report(path: &str, txn: &TxnFile) -> Report {
    let mismatches = totals::verify(txn);

    if mismatches.is_empty() {
        return Report {
            text: format!(
                "The trailers in '{}' match its {} records in {} batches.",
                path,
                txn.record_count(),
                txn.batches.len()
            ),
            consistent: true,
        };
    }

    let mut text = String::from("Differences found:\n");
    for mismatch in &mismatches {
        text.push_str("  - ");
        text.push_str(&mismatch.to_string());
        text.push('\n');
    }
    Report {
        text,
        consistent: false,
    }
}
