use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROBE_SENDER: &str = "test@example.com";
pub const DEFAULT_HELO_NAME: &str = "localhost";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const SMTP_PORT: u16 = 25;

/// Knobs for a single-host SMTP probe.
///
/// `timeout_ms` is one deadline for the whole session: connect, greeting and
/// every command round-trip share it.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Envelope sender used in `MAIL FROM`. Never the address under test.
    pub probe_sender: String,
    pub helo_name: String,
    pub timeout_ms: u64,
    pub port: u16,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            probe_sender: DEFAULT_PROBE_SENDER.to_string(),
            helo_name: DEFAULT_HELO_NAME.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            port: SMTP_PORT,
        }
    }
}

impl ProbeOptions {
    /// Per-host session budget. Never zero.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    pub fn helo_name(&self) -> &str {
        let trimmed = self.helo_name.trim();
        if trimmed.is_empty() {
            DEFAULT_HELO_NAME
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_probe_constants() {
        let options = ProbeOptions::default();
        assert_eq!(options.probe_sender, "test@example.com");
        assert_eq!(options.helo_name(), "localhost");
        assert_eq!(options.timeout(), Duration::from_secs(5));
        assert_eq!(options.port, 25);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let options = ProbeOptions {
            timeout_ms: 0,
            helo_name: "  ".to_string(),
            ..ProbeOptions::default()
        };
        assert_eq!(options.timeout(), Duration::from_millis(1));
        assert_eq!(options.helo_name(), "localhost");
    }
}
