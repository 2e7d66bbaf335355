//! Environment variable credential source.
//!
//! Read-only and highest priority: a key exported in the shell overrides
//! whatever is stored in the keychain.

use secrecy::SecretString;

/// Variables checked in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// The first non-empty API key variable, with its name.
pub fn env_api_key() -> Option<(&'static str, SecretString)> {
    API_KEY_VARS.iter().find_map(|var| match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            Some((*var, SecretString::from(value.trim().to_string())))
        }
        // Unset, empty, or not valid Unicode: treat as absent.
        _ => None,
    })
}
