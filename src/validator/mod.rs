//! Syntactic address checks. Pure functions, no I/O.

mod domain;
mod local;
mod types;

pub use types::{AddressError, EmailAddress};

use domain::is_domain_permissive;
use local::is_local_permissive;

/// Returns `true` when `address` matches the permissive grammar
/// `local@domain.tld`.
///
/// The domain is taken after the last `@`. Extra separators on the local
/// side are not a grammar fault: each `@`-separated piece only has to use the
/// local charset, and [`EmailAddress::parse`] reports the repeated separator
/// afterwards.
pub fn is_valid_format(address: &str) -> bool {
    let Some((local, domain)) = address.rsplit_once('@') else {
        return false;
    };
    local.split('@').all(is_local_permissive) && is_domain_permissive(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_basic() {
        assert!(is_valid_format("alice@example.com"));
        assert!(is_valid_format("first.last+tag%x@sub.example-mail.org"));
    }

    #[test]
    fn rejects_without_separator() {
        assert!(!is_valid_format("not-an-email"));
        assert!(!is_valid_format(""));
    }

    #[test]
    fn rejects_bad_pieces() {
        assert!(!is_valid_format("@example.com"));
        assert!(!is_valid_format("alice@"));
        assert!(!is_valid_format("al ice@example.com"));
        assert!(!is_valid_format("alice@example"));
        assert!(!is_valid_format(" alice@example.com"));
        assert!(!is_valid_format("a@@example.com"));
    }

    #[test]
    fn repeated_separator_is_left_to_structure_check() {
        assert!(is_valid_format("a@b@c.com"));
        assert!(EmailAddress::parse("a@b@c.com").is_err());
    }
}
