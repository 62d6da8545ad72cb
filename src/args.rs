//! Command-line arguments.

use std::path::PathBuf;

use lfmf::{Dispatch, Options};

use crate::CliError;

pub const USAGE: &str = "\
Usage: groundwave [OPTIONS] [INPUT]

Reads JSON Lines requests from INPUT (or stdin) and writes one JSON result
per request to stdout.

Options:
  --max-terms N        Residue series terms (default 200)
  --tolerance T        Stop the series once a term is below T times the sum
  --max-iterations N   Newton steps per root (default 50)
  --sequential         Predict one request at a time
  -h, --help           Show this help

Set RUST_LOG (e.g. RUST_LOG=groundwave_lfmf=debug) for diagnostics on stderr.";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    pub options: Options,
    pub dispatch: Dispatch,
    pub input: Option<PathBuf>,
    pub help: bool,
}

impl Args {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--max-terms" => parsed.options.series.max_terms = value(&arg, args.next())?,
                "--tolerance" => {
                    parsed.options.series.convergence_tolerance = Some(value(&arg, args.next())?)
                }
                "--max-iterations" => parsed.options.max_root_iterations = value(&arg, args.next())?,
                "--sequential" => parsed.dispatch = Dispatch::Sequential,
                "--help" | "-h" => parsed.help = true,
                flag if flag.starts_with('-') && flag != "-" => {
                    return Err(CliError::Argument(format!("unknown option {}", flag)))
                }
                path => {
                    if parsed.input.is_some() {
                        return Err(CliError::Argument(format!("unexpected argument {}", path)));
                    }

                    // "-" means stdin
                    if path != "-" {
                        parsed.input = Some(PathBuf::from(path));
                    }
                }
            }
        }

        Ok(parsed)
    }
}

fn value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, CliError> {
    let value = value.ok_or_else(|| CliError::Argument(format!("{} needs a value", flag)))?;
    value
        .parse()
        .map_err(|_| CliError::Argument(format!("bad value for {}: {}", flag, value)))
}
