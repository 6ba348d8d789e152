//! Best-effort verification of external links.
//!
//! Only consulted when external checking is enabled. A probe that cannot
//! reach the server reports that as a warning, never as a broken link.

use std::time::Duration;

/// HTTP status for "method not allowed"; some servers refuse `HEAD`.
const METHOD_NOT_ALLOWED: u16 = 405;

/// Result of probing one external URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with a success or redirect status.
    Reachable,
    /// The server answered with an error status (>= 400).
    Status(u16),
    /// No answer: DNS, TLS, connection, or timeout failure.
    Unreachable(String),
}

/// Extension point for checking network-reachable links.
pub trait ExternalProbe: Sync {
    /// Probe a single `http` or `https` URL.
    fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Probes URLs with a blocking `HEAD` request, falling back to `GET` when
/// the server rejects `HEAD`.
pub struct HttpProbe {
    /// Shared agent carrying the per-request timeout.
    agent: ureq::Agent,
}

impl HttpProbe {
    /// Build a probe whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        return Self { agent: config.into() };
    }
}

impl ExternalProbe for HttpProbe {
    fn probe(&self, url: &str) -> ProbeOutcome {
        tracing::debug!(url, "probing external link");
        let outcome = classify(self.agent.head(url).call());
        if outcome == ProbeOutcome::Status(METHOD_NOT_ALLOWED) {
            return classify(self.agent.get(url).call());
        }
        return outcome;
    }
}

/// Map a ureq call result onto a probe outcome.
fn classify<T>(result: Result<T, ureq::Error>) -> ProbeOutcome {
    return match result {
        Err(ureq::Error::StatusCode(code)) => ProbeOutcome::Status(code),
        Err(e) => ProbeOutcome::Unreachable(e.to_string()),
        Ok(_) => ProbeOutcome::Reachable,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_definitive() {
        let result: Result<(), ureq::Error> = Err(ureq::Error::StatusCode(404));
        assert_eq!(classify(result), ProbeOutcome::Status(404));
    }

    #[test]
    fn transport_errors_are_unreachable() {
        let result: Result<(), ureq::Error> = Err(ureq::Error::HostNotFound);
        assert!(matches!(classify(result), ProbeOutcome::Unreachable(_)));
    }

    #[test]
    fn success_is_reachable() {
        assert_eq!(classify::<()>(Ok(())), ProbeOutcome::Reachable);
    }
}
