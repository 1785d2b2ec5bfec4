use std::sync::LazyLock;

use regex::Regex;

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("domain pattern compiles")
});

/// Labels of letters, digits, `.` and `-`, ending in an alphabetic TLD of
/// two letters or more.
pub(crate) fn is_domain_permissive(domain: &str) -> bool {
    DOMAIN.is_match(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_domain_ok() {
        assert!(is_domain_permissive("example.com"));
        assert!(is_domain_permissive("mx-1.mail.example.co.uk"));
    }

    #[test]
    fn tld_rules() {
        assert!(!is_domain_permissive("example.c"));
        assert!(!is_domain_permissive("example.c0m"));
        assert!(!is_domain_permissive("localhost"));
        assert!(!is_domain_permissive("exa_mple.com"));
    }
}
