//! OS keychain storage for the API key.
//!
//! Uses the `keyring` crate (macOS Keychain, Linux Secret Service, Windows
//! Credential Manager). One entry per service/user pair.

use secrecy::{ExposeSecret, SecretString};

use clinicbot_types::error::CredentialError;

/// Default keychain service name.
pub const DEFAULT_SERVICE: &str = "clinicbot";

/// Default keychain user (the entry key).
pub const DEFAULT_USER: &str = "GEMINI_API_KEY";

/// A single keychain entry holding the API key.
#[derive(Debug, Clone)]
pub struct KeychainStore {
    service: String,
    user: String,
}

impl KeychainStore {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Use a custom service name (useful for testing).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: DEFAULT_USER.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(&self.service, &self.user)
            .map_err(|e| CredentialError::Unavailable(format!("keychain entry error: {e}")))
    }

    /// Read the stored key, `None` if no entry exists.
    pub fn get(&self) -> Result<Option<SecretString>, CredentialError> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Unavailable(format!("keychain get error: {e}"))),
        }
    }

    pub fn set(&self, value: &SecretString) -> Result<(), CredentialError> {
        self.entry()?
            .set_password(value.expose_secret())
            .map_err(|e| CredentialError::Storage(format!("keychain set error: {e}")))
    }

    /// Remove the stored key. Returns whether an entry existed.
    pub fn delete(&self) -> Result<bool, CredentialError> {
        match self.entry()?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(CredentialError::Storage(format!("keychain delete error: {e}"))),
        }
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}
