#![forbid(unsafe_code)]

//! Batch groundwave predictions.
//!
//! Reads requests as JSON Lines, one per line, either as raw kernel records
//! or as transmitter/receiver links, and writes one result line per request in
//! the same order.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use lfmf::{predict_batch, ConfigError, InputRecord};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod args;
mod site;

use crate::args::{Args, USAGE};
use crate::site::Row;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Argument(String),

    #[error(transparent)]
    Options(#[from] ConfigError),

    #[error("cannot read input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: not a request: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("cannot write result: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() {
    init_logging();

    if let Err(error) = run() {
        tracing::error!(%error, "giving up");
        eprintln!("groundwave: {}", error);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<(), CliError> {
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    args.options.check()?;

    let records = match &args.input {
        Some(path) => read_records(BufReader::new(File::open(path)?))?,
        None => read_records(io::stdin().lock())?,
    };

    tracing::info!(rows = records.len(), input = ?args.input, "read requests");

    let results = predict_batch(&records, &args.options, args.dispatch);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for result in &results {
        serde_json::to_writer(&mut out, result)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    Ok(())
}

/// Parses every non-blank line into a kernel record.
fn read_records<R: BufRead>(reader: R) -> Result<Vec<InputRecord>, CliError> {
    let mut records = Vec::new();

    for (offset, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let row: Row = serde_json::from_str(&line).map_err(|source| CliError::Parse {
            line: offset + 1,
            source,
        })?;

        if let Row::Link(link) = &row {
            tracing::debug!(
                line = offset + 1,
                transmitter = %link.transmitter.site.name,
                receiver = %link.receiver.name,
                distance = link.distance(),
                "resolved link"
            );
        }

        records.push(row.record());
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfmf::{Dispatch, Options, OutputRecord};

    const INPUT: &str = r#"
{"h_tx__meter":50,"h_rx__meter":50,"f__mhz":0.5,"P_tx__watt":1000,"N_s":301,"d__km":50,"epsilon":15,"sigma":0.005,"pol":0}
{"h_tx__meter":50,"h_rx__meter":50,"f__mhz":0.5,"P_tx__watt":1000,"N_s":301,"d__km":50,"epsilon":15,"sigma":0.005,"pol":3}

{"transmitter":{"latitude":0,"longitude":0,"aboveground":10,"dielectric":80,"conductivity":5,"bending":315,"frequency":0.2,"power":100},"receiver":{"latitude":2,"longitude":0,"aboveground":2}}
"#;

    #[test]
    fn reads_records_and_links() {
        let records = read_records(INPUT.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].pol, 3);
        assert!((records[2].distance - 222.4).abs() < 0.1);

        let results = predict_batch(&records, &Options::default(), Dispatch::Sequential);
        assert_eq!(results[0].status_code, 0);
        assert_eq!(results[1], OutputRecord::failure(1008));
        assert_eq!(results[2].status_code, 0);
        assert_eq!(results[2].method_code, 1);
    }

    #[test]
    fn bad_line_is_located() {
        let input = "{\"h_tx__meter\":1}\n";
        match read_records(input.as_bytes()) {
            Err(CliError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected a parse error, got {:?}", other.map(|r| r.len())),
        }

        let input = "\n\nnot json\n";
        match read_records(input.as_bytes()) {
            Err(CliError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a parse error, got {:?}", other.map(|r| r.len())),
        }
    }
}
