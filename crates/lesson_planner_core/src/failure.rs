//! crates/lesson_planner_core/src/failure.rs
//!
//! Maps raw generation-service error text onto the error kinds the session cares about.
//!
//! The provider does not expose a stable error code for a rejected key, so this module
//! matches on message fragments. It is the only place such heuristics live; the marker
//! list has to be rechecked whenever the provider changes its error wording.

/// How a failed call to the generation service should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The credential was rejected; the session must be torn down.
    CredentialInvalid,
    /// Anything else: transport, quota, server or parse failures.
    Other,
}

const CREDENTIAL_MARKERS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "invalid api key",
    "requested entity was not found",
];

pub fn classify_service_failure(message: &str) -> FailureKind {
    let lowered = message.to_lowercase();
    if CREDENTIAL_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        FailureKind::CredentialInvalid
    } else {
        FailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rejected_key_messages() {
        assert_eq!(
            classify_service_failure("API key not valid. Please pass a valid API key."),
            FailureKind::CredentialInvalid
        );
        assert_eq!(
            classify_service_failure(r#"{"error":{"details":[{"reason":"API_KEY_INVALID"}]}}"#),
            FailureKind::CredentialInvalid
        );
        assert_eq!(
            classify_service_failure("Requested entity was not found."),
            FailureKind::CredentialInvalid
        );
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(
            classify_service_failure("Resource has been exhausted (e.g. check quota)."),
            FailureKind::Other
        );
        assert_eq!(classify_service_failure(""), FailureKind::Other);
    }
}
