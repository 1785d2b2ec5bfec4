//! Single-host SMTP probing.
//!
//! [`probe_host`] opens a deadline-bounded session against one mail
//! exchanger and stops at the `RCPT TO` verdict. [`SmtpProber`] wraps it
//! behind the [`MailboxProbe`] trait consumed by the verifier.

mod error;
mod options;
mod probe;
mod session;
mod types;

pub use error::{ProbeError, ProbeErrorKind};
pub use options::{
    DEFAULT_HELO_NAME, DEFAULT_PROBE_SENDER, DEFAULT_TIMEOUT_MS, ProbeOptions, SMTP_PORT,
};
pub use probe::{MailboxProbe, SmtpProber, probe_host};
pub use types::{ProbeOutcome, SmtpReply, SmtpStage};
