use serde::{Deserialize, Serialize};

/// A patient record from the identity lookup.
///
/// Read-only reference data; keys are stored in their normalized form
/// (phone digits only, birthday as `YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub name: String,
    #[serde(rename = "phone")]
    pub phone_key: String,
    #[serde(rename = "birthday")]
    pub birthday_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_deserialize_from_toml_fixture_shape() {
        let toml_str = r#"
name = "王小明"
phone = "0912345678"
birthday = "1990-05-17"
"#;
        let patient: Patient = toml::from_str(toml_str).unwrap();
        assert_eq!(patient.name, "王小明");
        assert_eq!(patient.phone_key, "0912345678");
        assert_eq!(patient.birthday_key, "1990-05-17");
    }
}
