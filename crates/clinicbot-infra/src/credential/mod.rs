//! API credential resolution.
//!
//! Resolution order: environment variable (`GEMINI_API_KEY`, then
//! `GOOGLE_API_KEY`), then the OS keychain. The interactive picker is
//! injected by the front-end as a prompt closure so this crate stays free
//! of terminal dependencies.

pub mod env;
pub mod keychain;

use std::fmt;

use secrecy::SecretString;
use tracing::{debug, info};

use clinicbot_core::credential::CredentialProbe;
use clinicbot_types::error::CredentialError;

pub use env::env_api_key;
pub use keychain::KeychainStore;

/// Interactive key prompt. `Ok(None)` means the operator cancelled.
pub type KeyPrompt = Box<dyn Fn() -> Result<Option<SecretString>, CredentialError> + Send + Sync>;

/// Where the active credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Env(&'static str),
    Keychain,
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Env(var) => write!(f, "environment (${var})"),
            CredentialSource::Keychain => write!(f, "OS keychain"),
            CredentialSource::Missing => write!(f, "not set"),
        }
    }
}

/// Env + keychain credential store implementing [`CredentialProbe`].
pub struct CredentialStore {
    keychain: Option<KeychainStore>,
    prompt: Option<KeyPrompt>,
}

impl CredentialStore {
    /// Environment first, then the default keychain entry.
    pub fn new() -> Self {
        Self::with_keychain(KeychainStore::new())
    }

    pub fn with_keychain(keychain: KeychainStore) -> Self {
        Self {
            keychain: Some(keychain),
            prompt: None,
        }
    }

    /// Environment variables only; nothing can be stored.
    pub fn env_only() -> Self {
        Self {
            keychain: None,
            prompt: None,
        }
    }

    /// Attach the interactive picker used by `open_credential_picker`.
    pub fn with_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn() -> Result<Option<SecretString>, CredentialError> + Send + Sync + 'static,
    {
        self.prompt = Some(Box::new(prompt));
        self
    }

    /// Resolve the credential and report its source.
    pub fn resolve(&self) -> (CredentialSource, Option<SecretString>) {
        if let Some((var, key)) = env_api_key() {
            return (CredentialSource::Env(var), Some(key));
        }

        let stored = self.keychain.as_ref().and_then(|kc| match kc.get() {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, "Keychain lookup failed, treating credential as missing");
                None
            }
        });
        match stored {
            Some(key) => (CredentialSource::Keychain, Some(key)),
            None => (CredentialSource::Missing, None),
        }
    }

    pub fn source(&self) -> CredentialSource {
        self.resolve().0
    }

    /// Save a key to the keychain.
    pub fn store(&self, key: &SecretString) -> Result<(), CredentialError> {
        let keychain = self.keychain.as_ref().ok_or_else(|| {
            CredentialError::Unavailable("no keychain configured".to_string())
        })?;
        keychain.set(key)?;
        info!("API key stored in keychain");
        Ok(())
    }

    /// Remove the keychain entry. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, CredentialError> {
        match &self.keychain {
            Some(keychain) => keychain.delete(),
            None => Ok(false),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProbe for CredentialStore {
    fn selected_credential(&self) -> Option<SecretString> {
        self.resolve().1
    }

    fn open_credential_picker(&self) -> Result<bool, CredentialError> {
        let Some(prompt) = &self.prompt else {
            return Ok(self.has_credential_selected());
        };
        match prompt()? {
            Some(key) => {
                self.store(&key)?;
                Ok(true)
            }
            None => Ok(self.has_credential_selected()),
        }
    }
}
