//! Mock patient identity directory.
//!
//! Built-in fixture patients, optionally replaced by a TOML file:
//!
//! ```toml
//! [[patients]]
//! name = "王小明"
//! phone = "0912-345-678"
//! birthday = "1990-05-17"
//! ```
//!
//! Phone numbers are normalized on load; entries with an unusable phone
//! number are skipped with a warning.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use clinicbot_core::identity::{PatientDirectory, normalize_phone};
use clinicbot_types::patient::Patient;

/// Errors loading a patient fixture file.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read patient file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse patient file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Deserialize)]
struct PatientFile {
    #[serde(default)]
    patients: Vec<Patient>,
}

/// In-memory patient directory keyed by normalized phone number.
#[derive(Debug, Clone)]
pub struct MockPatientDirectory {
    patients: Vec<Patient>,
}

impl MockPatientDirectory {
    /// Normalize and keep only patients with a valid phone number.
    pub fn new(patients: Vec<Patient>) -> Self {
        let patients = patients
            .into_iter()
            .filter_map(|mut p| match normalize_phone(&p.phone_key) {
                Ok(phone) => {
                    p.phone_key = phone;
                    Some(p)
                }
                Err(e) => {
                    warn!(patient = %p.name, error = %e, "Skipping patient with invalid phone");
                    None
                }
            })
            .collect();
        Self { patients }
    }

    /// Fixture patients for demos and tests.
    pub fn builtin() -> Self {
        let fixture = |name: &str, phone: &str, birthday: &str| Patient {
            name: name.to_string(),
            phone_key: phone.to_string(),
            birthday_key: birthday.to_string(),
        };
        Self::new(vec![
            fixture("王小明", "0912345678", "1990-05-17"),
            fixture("陳美玲", "0922333444", "1985-11-03"),
            fixture("林志豪", "0933555777", "1978-02-28"),
            fixture("Alex Chen", "0911222333", "2000-01-01"),
        ])
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DirectoryError> {
        let file: PatientFile = toml::from_str(content)?;
        Ok(Self::new(file.patients))
    }

    /// Load from `path`.
    pub async fn load(path: &Path) -> Result<Self, DirectoryError> {
        let content = tokio::fs::read_to_string(path).await?;
        let directory = Self::from_toml_str(&content)?;
        info!(path = %path.display(), count = directory.len(), "Loaded patient directory");
        Ok(directory)
    }

    /// Load from `path` if given, falling back to the built-in fixture on error.
    pub async fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::load(path).await {
            Ok(directory) => directory,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using built-in patients");
                Self::builtin()
            }
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

impl PatientDirectory for MockPatientDirectory {
    async fn find_by_phone(&self, phone_key: &str) -> Option<Patient> {
        self.patients
            .iter()
            .find(|p| p.phone_key == phone_key)
            .cloned()
    }
}
