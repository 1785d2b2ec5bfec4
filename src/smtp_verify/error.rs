use thiserror::Error;

use super::types::{SmtpReply, SmtpStage};

/// Why a probe against one host did not end in acceptance.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("SMTP dial error ({host}): {source}")]
    Dial {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("SMTP {stage} timed out ({host})")]
    Timeout { host: String, stage: SmtpStage },
    #[error("SMTP {stage} error ({host}): {reply}")]
    Rejected {
        host: String,
        stage: SmtpStage,
        reply: SmtpReply,
    },
    #[error("SMTP {stage} protocol error ({host}): {message}")]
    Protocol {
        host: String,
        stage: SmtpStage,
        message: String,
    },
}

/// Coarse classification of [`ProbeError`].
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeErrorKind {
    SmtpDial,
    SmtpTimeout,
    SmtpProtocol,
}

impl ProbeError {
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            Self::Dial { .. } => ProbeErrorKind::SmtpDial,
            Self::Timeout { .. } => ProbeErrorKind::SmtpTimeout,
            Self::Rejected { .. } | Self::Protocol { .. } => ProbeErrorKind::SmtpProtocol,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            Self::Dial { host, .. }
            | Self::Timeout { host, .. }
            | Self::Rejected { host, .. }
            | Self::Protocol { host, .. } => host,
        }
    }

    pub(crate) fn dial(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::Dial {
            host: host.into(),
            source,
        }
    }

    pub(crate) fn timeout(host: impl Into<String>, stage: SmtpStage) -> Self {
        Self::Timeout {
            host: host.into(),
            stage,
        }
    }

    pub(crate) fn protocol(
        host: impl Into<String>,
        stage: SmtpStage,
        message: impl Into<String>,
    ) -> Self {
        Self::Protocol {
            host: host.into(),
            stage,
            message: message.into(),
        }
    }

    /// Maps a socket error raised mid-session. Expired read/write timeouts
    /// surface as `WouldBlock` on Unix and `TimedOut` on Windows.
    pub(crate) fn io(host: impl Into<String>, stage: SmtpStage, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                Self::timeout(host, stage)
            }
            _ => Self::protocol(host, stage, err.to_string()),
        }
    }
}
