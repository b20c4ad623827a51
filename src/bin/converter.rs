//! YP Bank TXN Converter - CLI tool for converting between TXN and CSV.

use clap::Parser;
use std::fs::File;
use std::io::{self, Read, Write};
use ypbank_txn::{
    csv_format::CsvTransactions, Format, ParseMode, ReaderConfig, Result, TxnFile, WriterConfig,
};

#[derive(Parser)]
#[command(name = "ypbank_txn_convert")]
#[command(about = "Convert bank transaction files between TXN and CSV", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Input format (txn, csv)
    #[arg(long = "input-format")]
    input_format: String,

    /// Output format (txn, csv)
    #[arg(long = "output-format")]
    output_format: String,

    /// Output file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Customer number for the file header when reading CSV
    #[arg(long = "customer-number", default_value = "")]
    customer_number: String,

    /// Customer name for the file header when reading CSV
    #[arg(long = "customer-name", default_value = "")]
    customer_name: String,

    /// Remitter name for the file header when reading CSV
    #[arg(long = "remitter-name")]
    remitter_name: Option<String>,

    /// Terminate TXN lines with CRLF
    #[arg(long)]
    crlf: bool,

    /// Write zero debit/credit totals in TXN trailers
    #[arg(long = "omit-batch-totals")]
    omit_batch_totals: bool,

    /// Fail on malformed TXN sub-fields instead of defaulting them
    #[arg(long)]
    strict: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Parse formats
    let input_format = cli.input_format.parse::<Format>()?;
    let output_format = cli.output_format.parse::<Format>()?;

    // Process based on input file or stdin
    let mut txn = if let Some(ref input_path) = cli.input {
        let mut file = File::open(input_path)?;
        parse_input(&mut file, input_format, &cli)?
    } else {
        let mut stdin = io::stdin();
        parse_input(&mut stdin, input_format, &cli)?
    };

    // Output based on output file or stdout
    if let Some(ref output_path) = cli.output {
        let mut file = File::create(output_path)?;
        write_output(&mut file, &mut txn, output_format, &cli)?;
    } else {
        let mut stdout = io::stdout();
        write_output(&mut stdout, &mut txn, output_format, &cli)?;
    }

    Ok(())
}

fn parse_input<R: Read>(reader: &mut R, format: Format, cli: &Cli) -> Result<TxnFile> {
    match format {
        Format::Txn => {
            let config = ReaderConfig {
                mode: if cli.strict {
                    ParseMode::Strict
                } else {
                    ParseMode::Lenient
                },
                ..ReaderConfig::default()
            };
            TxnFile::from_read_with(reader, config)
        }
        Format::Csv => {
            let csv = CsvTransactions::from_read(reader)?;
            let mut txn = csv.into_file(cli.customer_number.clone(), cli.customer_name.clone());
            if let Some(ref remitter) = cli.remitter_name {
                txn.header.remitter_name = remitter.clone();
            }
            Ok(txn)
        }
    }
}

fn write_output<W: Write>(
    writer: &mut W,
    txn: &mut TxnFile,
    format: Format,
    cli: &Cli,
) -> Result<()> {
    match format {
        Format::Txn => {
            let config = WriterConfig {
                omit_batch_totals: cli.omit_batch_totals,
                crlf_line_endings: cli.crlf,
            };
            txn.write_to_with(writer, config)?;
        }
        Format::Csv => {
            let csv = CsvTransactions::from(&*txn);
            csv.write_to(writer)?;
        }
    }
    Ok(())
}
