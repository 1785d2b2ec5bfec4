#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use crate::args::Cli;
use mailprobe_lib::VerificationResult;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct OutputRow {
    pub address: String,
    #[cfg_attr(feature = "with-serde", serde(flatten))]
    pub result: VerificationResult,
}

impl OutputRow {
    pub fn new(address: impl Into<String>, result: VerificationResult) -> Self {
        Self {
            address: address.into(),
            result,
        }
    }

    /// Accepting host for valid rows, otherwise the failure detail.
    pub fn detail(&self) -> String {
        match &self.result {
            VerificationResult::Valid { host, .. } => host.clone(),
            VerificationResult::MalformedAddress { reason } => reason.to_string(),
            VerificationResult::DomainResolutionFailed { diagnostic } => diagnostic.clone(),
            VerificationResult::AllHostsRejected { diagnostics } => diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|"),
            VerificationResult::InvalidFormat | VerificationResult::NoMailExchangers => {
                String::new()
            }
        }
    }
}

pub fn write_reports(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_invalid(rows: &[OutputRow]) -> bool {
    rows.iter().any(|row| !row.result.is_valid())
}

fn write_human(rows: &[OutputRow]) -> Result<()> {
    for row in rows {
        for line in human_lines(row) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn human_lines(row: &OutputRow) -> Vec<String> {
    let mut lines = Vec::new();
    if row.result.is_valid() {
        lines.push(format!("[OK]      {} :: {}", row.address, row.result));
    } else {
        lines.push(format!("[INVALID] {} :: {}", row.address, row.result));
    }
    for diagnostic in row.result.diagnostics() {
        lines.push(format!("          {}: {}", diagnostic.host, diagnostic.message));
    }
    lines
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=json requires the 'with-serde' feature")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=ndjson requires the 'with-serde' feature")
}

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=csv requires the 'with-csv' feature")
}

// address, status, valid, detail
#[cfg(feature = "with-csv")]
fn csv_record(row: &OutputRow) -> [String; 4] {
    [
        row.address.clone(),
        row.result.label().to_string(),
        row.result.is_valid().to_string(),
        row.detail(),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
