use std::fmt;

use thiserror::Error;

/// Structural faults of an address that passed the grammar check.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must contain a single '@' (found none)")]
    MissingSeparator,
    #[error("address must contain a single '@' (found {count})")]
    MultipleSeparators { count: usize },
}

/// An address split on its single `@` separator.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    pub local_part: String,
    pub domain: String,
}

impl EmailAddress {
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let parts: Vec<&str> = input.split('@').collect();
        match parts.as_slice() {
            [_] => Err(AddressError::MissingSeparator),
            [local, domain] => Ok(Self {
                local_part: (*local).to_string(),
                domain: (*domain).to_string(),
            }),
            _ => Err(AddressError::MultipleSeparators {
                count: parts.len() - 1,
            }),
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_single_separator() {
        let addr = EmailAddress::parse("alice@example.com").unwrap();
        assert_eq!(addr.local_part, "alice");
        assert_eq!(addr.domain, "example.com");
        assert_eq!(addr.to_string(), "alice@example.com");
    }

    #[test]
    fn rejects_missing_and_repeated_separator() {
        assert_eq!(
            EmailAddress::parse("example.com"),
            Err(AddressError::MissingSeparator)
        );
        assert_eq!(
            EmailAddress::parse("a@b@c.com"),
            Err(AddressError::MultipleSeparators { count: 2 })
        );
    }
}
