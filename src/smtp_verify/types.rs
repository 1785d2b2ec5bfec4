use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use super::error::{ProbeError, ProbeErrorKind};

/// Step of the probe dialogue, used to label diagnostics.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpStage {
    Connect,
    Greeting,
    Ehlo,
    Helo,
    MailFrom,
    RcptTo,
}

impl fmt::Display for SmtpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
        })
    }
}

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message.replace('\n', " / "))
        }
    }
}

/// Per-host verdict handed back to the verifier.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub host: String,
    pub accepted: bool,
    pub diagnostic: Option<String>,
    pub error_kind: Option<ProbeErrorKind>,
    /// `[host] C: ...` / `[host] S: ...` lines of the dialogue.
    pub transcript: Vec<String>,
}

impl ProbeOutcome {
    pub fn accepted(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            accepted: true,
            diagnostic: None,
            error_kind: None,
            transcript: Vec::new(),
        }
    }

    pub fn failed(host: impl Into<String>, error: &ProbeError) -> Self {
        Self {
            host: host.into(),
            accepted: false,
            diagnostic: Some(error.to_string()),
            error_kind: Some(error.kind()),
            transcript: Vec::new(),
        }
    }

    pub fn with_transcript(mut self, transcript: Vec<String>) -> Self {
        self.transcript = transcript;
        self
    }
}
