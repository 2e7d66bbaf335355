//! Patient identity verification.
//!
//! `PatientDirectory` is the port to the (mock) identity store. Raw form
//! input is normalized here before lookup: phone numbers down to their
//! digits in local `09xxxxxxxx` form, birthdays to a calendar date.

use chrono::NaiveDate;

use clinicbot_types::error::ValidationError;
use clinicbot_types::patient::Patient;

/// Accepted birthday input formats.
const BIRTHDAY_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y.%m.%d"];

/// Read-only lookup of registered patients.
pub trait PatientDirectory: Send + Sync {
    /// Find a patient by normalized phone key.
    fn find_by_phone(
        &self,
        phone_key: &str,
    ) -> impl std::future::Future<Output = Option<Patient>> + Send;
}

/// Normalize a phone number to `09` followed by eight digits.
///
/// Spaces, dashes, dots and parentheses are ignored; the `+886` country
/// prefix is converted to the local leading `0`.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    let local = match compact.strip_prefix("+886") {
        Some(rest) => format!("0{}", rest.trim_start_matches('0')),
        None => compact,
    };

    let valid = local.len() == 10
        && local.starts_with("09")
        && local.bytes().all(|b| b.is_ascii_digit());
    if valid {
        Ok(local)
    } else {
        Err(ValidationError::InvalidPhone(raw.to_string()))
    }
}

/// Parse a birthday in any accepted format.
pub fn parse_birthday(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    BIRTHDAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidBirthday(raw.to_string()))
}

/// Verify raw form input against the directory.
///
/// Validates both fields before any lookup, then distinguishes an unknown
/// phone number from a birthday mismatch.
pub async fn lookup_patient<D: PatientDirectory>(
    directory: &D,
    raw_phone: &str,
    raw_birthday: &str,
) -> Result<Patient, ValidationError> {
    let phone_key = normalize_phone(raw_phone)?;
    let birthday = parse_birthday(raw_birthday)?;

    let patient = directory
        .find_by_phone(&phone_key)
        .await
        .ok_or(ValidationError::PatientNotFound)?;

    let matches = match parse_birthday(&patient.birthday_key) {
        Ok(recorded) => recorded == birthday,
        Err(_) => patient.birthday_key.trim() == raw_birthday.trim(),
    };
    if matches {
        Ok(patient)
    } else {
        Err(ValidationError::BirthdayMismatch)
    }
}
