#![forbid(unsafe_code)]
//! mailprobe_lib — checks whether an address can receive mail: syntax, MX
//! lookup, then an SMTP `RCPT TO` probe that never sends a message.

pub mod validator;
pub use validator::{AddressError, EmailAddress, is_valid_format};

pub mod mx;
pub use mx::{Error as MxError, LookupMx, MxRecord, MxStatus, SystemResolver, check_mx};

pub mod smtp_verify;
pub use smtp_verify::{
    MailboxProbe, ProbeError, ProbeErrorKind, ProbeOptions, ProbeOutcome, SmtpProber, probe_host,
};

pub mod verify;
pub use verify::{
    HostDiagnostic, VerificationResult, Verifier, verify_email, verify_email_with_options,
};
