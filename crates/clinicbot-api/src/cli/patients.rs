//! `clinicbot patients`: list the mock identity directory.

use anyhow::Result;
use console::style;

use clinicbot_infra::patients::MockPatientDirectory;

pub fn list_patients(directory: &MockPatientDirectory, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(directory.patients())?);
        return Ok(());
    }

    println!();
    if directory.is_empty() {
        println!("  {} No patients configured", style("i").blue().bold());
    }
    for patient in directory.patients() {
        println!(
            "  {}  {}  {}",
            style(&patient.name).cyan().bold(),
            patient.phone_key,
            style(&patient.birthday_key).dim()
        );
    }
    println!();
    Ok(())
}
