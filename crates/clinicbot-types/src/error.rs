use thiserror::Error;

use crate::session::SessionStatus;

/// Lower-cased fragments of remote failure text that indicate a bad or
/// unknown API credential.
const INVALID_CREDENTIAL_MARKERS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "invalid api key",
    "requested entity was not found",
];

/// Errors from the remote RAG gateway.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("gateway used before a credential was established")]
    NotInitialized,

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("operation did not complete after {attempts} polls")]
    Timeout { attempts: u32 },
}

impl RagError {
    /// Whether this failure means the credential must be re-selected.
    ///
    /// Matches the explicit variant as well as remote failures whose text
    /// contains one of the known invalid-key / not-found markers.
    pub fn is_invalid_credential(&self) -> bool {
        match self {
            RagError::InvalidCredential(_) => true,
            other => is_invalid_credential_message(&other.to_string()),
        }
    }
}

/// Case-insensitive check of a failure message for invalid-credential markers.
pub fn is_invalid_credential_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    INVALID_CREDENTIAL_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Local form input rejected during patient verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed phone number: '{0}'")]
    InvalidPhone(String),

    #[error("malformed birthday: '{0}'")]
    InvalidBirthday(String),

    #[error("no patient registered with this phone number")]
    PatientNotFound,

    #[error("birthday does not match our records")]
    BirthdayMismatch,
}

/// Errors from session transitions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("'{action}' is not allowed while {from}")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },

    #[error("no API credential selected")]
    CredentialRequired,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("provisioning failed: {0}")]
    Provisioning(#[from] RagError),
}

/// Errors from credential storage.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("credential storage error: {0}")]
    Storage(String),
}
