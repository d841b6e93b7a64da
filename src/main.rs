//! Command-line driver: `enigma <CONFIG> [INPUT] [OUTPUT]`.
//!
//! Reads a machine configuration, then converts the message stream from
//! INPUT (default stdin) to OUTPUT (default stdout). Failures are reported
//! as `Error: <message>` on stderr with exit status 1.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use enigma::{process, read_config};

/// Enigma rotor machine simulator
#[derive(Parser, Debug)]
#[command(name = "enigma")]
#[command(author, version, about = "Enigma rotor machine simulator", long_about = None)]
struct Cli {
    /// Machine configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Message file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Diagnostics on stderr, filtered by RUST_LOG (default warn).
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let text = fs::read_to_string(&cli.config)
        .with_context(|| format!("could not open {}", cli.config.display()))?;
    let mut machine = read_config(&text)?;
    tracing::info!(config = %cli.config.display(), "configuration loaded");

    match (&cli.input, &cli.output) {
        (Some(input), Some(output)) => {
            let reader = open_input(input)?;
            let writer = create_output(output)?;
            process(&mut machine, reader, writer)?;
        }
        (Some(input), None) => {
            process(&mut machine, open_input(input)?, io::stdout().lock())?;
        }
        (None, _) => {
            process(&mut machine, io::stdin().lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("could not open {}", path.display()))?;
    Ok(BufWriter::new(file))
}
