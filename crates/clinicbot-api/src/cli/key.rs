//! API key management commands: set, clear, status.

use anyhow::Result;
use console::style;
use dialoguer::Password;
use secrecy::{ExposeSecret, SecretString};

use clinicbot_infra::credential::{CredentialSource, CredentialStore};
use clinicbot_types::error::CredentialError;

/// Hidden prompt used as the credential picker. Blank input cancels.
pub fn prompt_for_key() -> Result<Option<SecretString>, CredentialError> {
    let value = Password::new()
        .with_prompt(format!("Enter your {} (blank to cancel)", style("Gemini API key").bold()))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| CredentialError::Unavailable(format!("prompt failed: {e}")))?;

    let value = value.trim();
    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(SecretString::from(value.to_string())))
    }
}

/// Mask a key for display, keeping only the last four characters.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Store a key in the OS keychain.
///
/// ```bash
/// clinicbot key set              # hidden prompt (recommended)
/// clinicbot key set --value ...  # scripts
/// ```
pub fn set_key(credentials: &CredentialStore, value: Option<&str>, json: bool) -> Result<()> {
    let key = match value {
        Some(v) if !v.trim().is_empty() => SecretString::from(v.trim().to_string()),
        Some(_) => anyhow::bail!("API key must not be empty"),
        None => match prompt_for_key()? {
            Some(key) => key,
            None => {
                println!("  {}", style("Cancelled.").dim());
                return Ok(());
            }
        },
    };

    credentials.store(&key)?;
    let masked = mask_key(key.expose_secret());

    if json {
        println!("{}", serde_json::json!({"set": true, "masked": masked}));
    } else {
        println!(
            "  {} API key stored in the OS keychain ({})",
            style("✓").green().bold(),
            masked
        );
        if let CredentialSource::Env(var) = credentials.source() {
            println!(
                "  {} ${var} is set and takes precedence over the keychain.",
                style("!").yellow().bold()
            );
        }
    }
    Ok(())
}

/// Remove the stored key.
pub fn clear_key(credentials: &CredentialStore, json: bool) -> Result<()> {
    let removed = credentials.clear()?;
    if json {
        println!("{}", serde_json::json!({"cleared": removed}));
    } else if removed {
        println!("  {} API key removed from the OS keychain", style("✓").green().bold());
    } else {
        println!("  {} No API key was stored", style("i").blue().bold());
    }
    Ok(())
}

/// Report where the active key comes from.
pub fn key_status(credentials: &CredentialStore, json: bool) -> Result<()> {
    let (source, key) = credentials.resolve();
    let masked = key.as_ref().map(|k| mask_key(k.expose_secret()));

    if json {
        println!(
            "{}",
            serde_json::json!({
                "selected": key.is_some(),
                "source": source.to_string(),
                "masked": masked,
            })
        );
        return Ok(());
    }

    println!();
    match masked {
        Some(masked) => println!(
            "  {} API key from {} ({})",
            style("✓").green().bold(),
            style(source).cyan(),
            style(masked).dim()
        ),
        None => println!(
            "  {} No API key. Set one with: {}",
            style("✗").red().bold(),
            style("clinicbot key set").yellow()
        ),
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_key("AIzaSyExample1234"), "****1234");
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key(""), "****");
    }
}
