use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{Error, MxRecord, MxStatus};

/// Source of MX answers. The verifier takes one of these so that tests (and
/// callers with their own DNS stack) can inject answers.
pub trait LookupMx {
    /// Returns the records in answer order. An empty vector means the domain
    /// exists but declares no mail exchanger.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error>;
}

impl<T: LookupMx + ?Sized> LookupMx for &T {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        (**self).lookup_mx(domain)
    }
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            Err(err) if is_empty_answer(&err) => return Ok(Vec::new()),
            Err(err) => return Err(Error::lookup(domain, err)),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

/// Resolver built from the host's system configuration on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl LookupMx for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        let resolver = Resolver::from_system_conf().map_err(Error::resolver_init)?;
        resolver.lookup_mx(domain)
    }
}

/// Lookup MX records for `domain` using the system resolver.
pub fn check_mx(domain: &str) -> Result<MxStatus, Error> {
    resolve_mx(&SystemResolver, domain)
}

/// Queries `resolver` and normalizes the answer. Order is preserved; null MX
/// entries (RFC 7505) are dropped.
pub fn resolve_mx<R>(resolver: &R, domain: &str) -> Result<MxStatus, Error>
where
    R: LookupMx + ?Sized,
{
    let domain = normalize_domain(domain)?;
    let records: Vec<MxRecord> = resolver
        .lookup_mx(&domain)?
        .into_iter()
        .map(|record| MxRecord::new(record.preference, normalize_exchange(record.exchange)))
        .filter(|record| !record.exchange.is_empty())
        .collect();

    tracing::debug!(domain = %domain, count = records.len(), "MX answer");

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    Ok(trimmed.to_ascii_lowercase())
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

// NOERROR with an empty answer section. NXDOMAIN stays an error.
pub(crate) fn is_empty_answer(err: &ResolveError) -> bool {
    matches!(
        err.kind(),
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code != ResponseCode::NXDomain
    )
}
