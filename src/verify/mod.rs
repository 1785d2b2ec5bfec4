//! End-to-end address verification: format check, MX resolution, then SMTP
//! probing of each mail exchanger until one accepts the recipient.

mod types;


use std::fmt;

use crate::mx::{LookupMx, MxRecord, MxStatus, SystemResolver, resolve_mx};
use crate::smtp_verify::{MailboxProbe, ProbeOptions, SmtpProber};
use crate::validator::{EmailAddress, is_valid_format};

pub use types::{HostDiagnostic, VerificationResult};

#[derive(Debug, Clone, Copy)]
enum Stage {
    Unvalidated,
    FormatChecked,
    DomainResolved,
    HostProbing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unvalidated => "unvalidated",
            Self::FormatChecked => "format_checked",
            Self::DomainResolved => "domain_resolved",
            Self::HostProbing => "host_probing",
            Self::Done => "done",
        })
    }
}

/// Runs the verification pipeline against an injected resolver and prober.
///
/// Each call to [`Verifier::verify`] is independent; nothing is cached
/// between runs.
#[derive(Debug, Clone)]
pub struct Verifier<R, P> {
    resolver: R,
    prober: P,
}

impl Verifier<SystemResolver, SmtpProber> {
    /// System DNS configuration and live SMTP probing.
    pub fn system(options: ProbeOptions) -> Self {
        Self::new(SystemResolver, SmtpProber::new(options))
    }
}

impl<R, P> Verifier<R, P>
where
    R: LookupMx,
    P: MailboxProbe,
{
    pub fn new(resolver: R, prober: P) -> Self {
        Self { resolver, prober }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Verifies `address` and returns exactly one verdict.
    ///
    /// Syntax failures never touch the network. Mail exchangers are probed
    /// one at a time, lowest preference first, and probing stops at the
    /// first acceptance.
    pub fn verify(&self, address: &str) -> VerificationResult {
        let span = tracing::debug_span!("verify", address);
        let _guard = span.enter();

        let result = self.run(address);
        tracing::info!(stage = %Stage::Done, verdict = result.label(), "verification finished");
        result
    }

    fn run(&self, address: &str) -> VerificationResult {
        tracing::debug!(stage = %Stage::Unvalidated, "checking format");
        if !is_valid_format(address) {
            return VerificationResult::InvalidFormat;
        }

        let email = match EmailAddress::parse(address) {
            Ok(email) => email,
            Err(reason) => return VerificationResult::MalformedAddress { reason },
        };
        tracing::debug!(
            stage = %Stage::FormatChecked,
            domain = %email.domain,
            "resolving mail exchangers"
        );

        let records = match resolve_mx(&self.resolver, &email.domain) {
            Ok(MxStatus::Records(records)) => records,
            Ok(MxStatus::NoRecords) => return VerificationResult::NoMailExchangers,
            Err(err) => {
                tracing::warn!(domain = %email.domain, error = %err, "MX resolution failed");
                return VerificationResult::DomainResolutionFailed {
                    diagnostic: err.to_string(),
                };
            }
        };
        let hosts = probe_order(records);
        tracing::debug!(
            stage = %Stage::DomainResolved,
            hosts = hosts.len(),
            "mail exchangers resolved"
        );

        self.probe_hosts(&email, &hosts)
    }

    fn probe_hosts(&self, email: &EmailAddress, hosts: &[MxRecord]) -> VerificationResult {
        let mut diagnostics = Vec::with_capacity(hosts.len());
        for record in hosts {
            tracing::debug!(
                stage = %Stage::HostProbing,
                host = %record.exchange,
                preference = record.preference,
                "probing mail exchanger"
            );
            let outcome = self.prober.probe(&record.exchange, email);
            if outcome.accepted {
                return VerificationResult::Valid {
                    host: outcome.host,
                    diagnostics,
                };
            }
            let diagnostic = HostDiagnostic::from_outcome(outcome);
            tracing::warn!(
                host = %diagnostic.host,
                error = %diagnostic.message,
                "mail exchanger did not accept"
            );
            diagnostics.push(diagnostic);
        }
        VerificationResult::AllHostsRejected { diagnostics }
    }
}

/// Ascending preference; ties keep answer order. Each exchange appears once,
/// at its lowest preference.
pub(crate) fn probe_order(mut records: Vec<MxRecord>) -> Vec<MxRecord> {
    records.sort_by_key(|record| record.preference);
    let mut ordered: Vec<MxRecord> = Vec::with_capacity(records.len());
    for record in records {
        if !ordered.iter().any(|kept| kept.exchange == record.exchange) {
            ordered.push(record);
        }
    }
    ordered
}

/// Verifies `address` with default [`ProbeOptions`].
pub fn verify_email(address: &str) -> VerificationResult {
    verify_email_with_options(address, &ProbeOptions::default())
}

pub fn verify_email_with_options(address: &str, options: &ProbeOptions) -> VerificationResult {
    Verifier::system(options.clone()).verify(address)
}
