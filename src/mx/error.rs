use thiserror::Error;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX lookup failed for {domain}: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    /// Failure reported by a resolver that does not go through trust-dns.
    #[error("MX lookup failed for {domain}: {reason}")]
    Unavailable { domain: String, reason: String },
}

impl MxError {
    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(
        domain: impl Into<String>,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Lookup {
            domain: domain.into(),
            source,
        }
    }

    pub fn unavailable(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            domain: domain.into(),
            reason: reason.into(),
        }
    }
}
