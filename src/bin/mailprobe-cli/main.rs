mod args;
mod output;

use anyhow::{Context, Result};
use mailprobe_lib::Verifier;
use tracing_subscriber::EnvFilter;

use std::io::{self, BufRead};

use crate::args::{Cli, Commands};
use crate::output::{OutputRow, any_invalid, write_reports};

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<Option<Vec<OutputRow>>> {
    let verifier = Verifier::system(cli.probe_options());
    let mut rows = Vec::new();

    if cli.stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let address = line.trim();
            if address.is_empty() {
                continue;
            }
            rows.push(OutputRow::new(address, verifier.verify(address)));
        }
    } else if let Some(Commands::Verify { email }) = &cli.cmd {
        rows.push(OutputRow::new(email.as_str(), verifier.verify(email)));
    } else {
        return Ok(None);
    }
    Ok(Some(rows))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let Some(rows) = run(&cli)? else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    };

    write_reports(&rows, &cli)?;

    // exit codes: 0 all valid, 2 any not valid, 1 fatal
    if any_invalid(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
