use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::smtp_verify::{ProbeErrorKind, ProbeOutcome};
use crate::validator::AddressError;

/// Why one mail exchanger did not accept the recipient.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDiagnostic {
    pub host: String,
    pub kind: Option<ProbeErrorKind>,
    pub message: String,
}

impl HostDiagnostic {
    pub(crate) fn from_outcome(outcome: ProbeOutcome) -> Self {
        let message = outcome
            .diagnostic
            .unwrap_or_else(|| format!("{} did not accept the recipient", outcome.host));
        Self {
            host: outcome.host,
            kind: outcome.error_kind,
            message,
        }
    }
}

impl fmt::Display for HostDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Terminal verdict of one verification run.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// `host` accepted the recipient. `diagnostics` lists the hosts that
    /// failed before it.
    Valid {
        host: String,
        diagnostics: Vec<HostDiagnostic>,
    },
    InvalidFormat,
    MalformedAddress {
        reason: AddressError,
    },
    NoMailExchangers,
    DomainResolutionFailed {
        diagnostic: String,
    },
    /// Every mail exchanger was tried; one diagnostic per host, in probing
    /// order.
    AllHostsRejected {
        diagnostics: Vec<HostDiagnostic>,
    },
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn diagnostics(&self) -> &[HostDiagnostic] {
        match self {
            Self::Valid { diagnostics, .. } | Self::AllHostsRejected { diagnostics } => {
                diagnostics
            }
            _ => &[],
        }
    }

    /// Stable snake_case name of the variant.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid { .. } => "valid",
            Self::InvalidFormat => "invalid_format",
            Self::MalformedAddress { .. } => "malformed_address",
            Self::NoMailExchangers => "no_mail_exchangers",
            Self::DomainResolutionFailed { .. } => "domain_resolution_failed",
            Self::AllHostsRejected { .. } => "all_hosts_rejected",
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid { host, .. } => write!(f, "valid (accepted by {host})"),
            Self::InvalidFormat => f.write_str("invalid format"),
            Self::MalformedAddress { reason } => write!(f, "malformed address: {reason}"),
            Self::NoMailExchangers => f.write_str("no mail exchangers"),
            Self::DomainResolutionFailed { diagnostic } => {
                write!(f, "domain resolution failed: {diagnostic}")
            }
            Self::AllHostsRejected { diagnostics } => {
                write!(f, "rejected by all {} mail exchangers", diagnostics.len())
            }
        }
    }
}
