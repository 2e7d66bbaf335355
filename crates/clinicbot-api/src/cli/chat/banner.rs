//! Startup banner.

use std::path::Path;

use console::style;

use clinicbot_types::config::Locale;

/// Print the banner shown once when the assistant starts.
pub fn print_banner(model: &str, locale: Locale, data_dir: &Path) {
    println!();
    println!("  {} {}", style("+").red().bold(), style("Clinic Assistant").cyan().bold());
    println!(
        "  {}",
        style("Answers patient questions from your clinic's own documents").dim()
    );
    println!();
    println!("  {}   {}", style("Model:").bold(), style(model).dim());
    println!("  {}  {}", style("Locale:").bold(), style(locale).dim());
    println!("  {}    {}", style("Data:").bold(), style(data_dir.display()).dim());
    println!();
    println!("  {}", style("Ctrl+C ends the session and removes uploaded documents").dim());
    println!("  {}", style("---").dim());
    println!();
}
