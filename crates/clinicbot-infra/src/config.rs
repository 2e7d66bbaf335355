//! Configuration loader for the clinic assistant.
//!
//! Reads `config.toml` from the data directory (`~/.clinicbot/` in production)
//! and deserializes it into [`ClinicConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use clinicbot_types::config::{ClinicConfig, Locale};

/// Command-line overrides applied on top of the file configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub locale: Option<Locale>,
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`ClinicConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
/// - A relative `patients_file` is resolved against `data_dir`.
pub async fn load_config(data_dir: &Path) -> ClinicConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClinicConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClinicConfig::default();
        }
    };

    match toml::from_str::<ClinicConfig>(&content) {
        Ok(mut config) => {
            config.patients_file = config
                .patients_file
                .map(|p| resolve_relative(data_dir, p));
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClinicConfig::default()
        }
    }
}

/// Apply CLI overrides. Empty strings are ignored.
pub fn apply_overrides(mut config: ClinicConfig, overrides: &ConfigOverrides) -> ClinicConfig {
    if let Some(model) = overrides.model.as_deref().filter(|m| !m.trim().is_empty()) {
        config.model = model.trim().to_string();
    }
    if let Some(locale) = overrides.locale {
        config.locale = locale;
    }
    config
}

fn resolve_relative(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.poll.max_attempts, 120);
        assert!(config.patients_file.is_none());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
model = "gemini-2.5-pro"
locale = "en"
ready_hold_ms = 0
patients_file = "patients.toml"
extra_crisis_keywords = ["overdose"]

[poll]
initial_interval_ms = 1000
max_attempts = 10
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.ready_hold_ms, 0);
        assert_eq!(config.poll.initial_interval_ms, 1000);
        assert_eq!(config.poll.max_attempts, 10);
        assert_eq!(config.poll.max_interval_ms, 30_000);
        assert_eq!(config.extra_crisis_keywords, vec!["overdose".to_string()]);
        assert_eq!(config.patients_file, Some(tmp.path().join("patients.toml")));
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.model, "gemini-2.5-flash");
    }

    #[test]
    fn overrides_replace_model_and_locale() {
        let overrides = ConfigOverrides {
            model: Some("gemini-2.5-pro".to_string()),
            locale: Some(Locale::En),
        };
        let config = apply_overrides(ClinicConfig::default(), &overrides);
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.locale, Locale::En);

        let blank = ConfigOverrides {
            model: Some("  ".to_string()),
            locale: None,
        };
        let config = apply_overrides(ClinicConfig::default(), &blank);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.locale, Locale::ZhTw);
    }
}
