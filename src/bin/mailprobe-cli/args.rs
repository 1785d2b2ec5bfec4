use clap::{ArgAction, Parser, Subcommand};
use mailprobe_lib::ProbeOptions;
use mailprobe_lib::smtp_verify::{
    DEFAULT_HELO_NAME, DEFAULT_PROBE_SENDER, DEFAULT_TIMEOUT_MS, SMTP_PORT,
};

#[derive(Parser)]
#[command(
    name = "mailprobe-cli",
    version,
    about = "Checks whether e-mail addresses can receive mail"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// write report to file (JSON/NDJSON/CSV per --format)
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// envelope sender used for MAIL FROM
    #[arg(long = "from", default_value = DEFAULT_PROBE_SENDER)]
    pub probe_sender: String,

    /// name announced in EHLO/HELO
    #[arg(long, default_value = DEFAULT_HELO_NAME)]
    pub helo: String,

    /// per-host session budget (ms)
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// SMTP port
    #[arg(long, default_value_t = SMTP_PORT)]
    pub port: u16,

    /// log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// verify a single address
    Verify { email: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            probe_sender: self.probe_sender.clone(),
            helo_name: self.helo.clone(),
            timeout_ms: self.timeout_ms,
            port: self.port,
        }
    }

    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
