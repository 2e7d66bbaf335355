//! CLI command definitions for the `clinicbot` binary.
//!
//! Uses clap derive macros for argument parsing. Running without a
//! subcommand starts the interactive assistant.

pub mod chat;
pub mod key;
pub mod patients;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clinicbot_types::config::Locale;

/// Clinic assistant: answer patient questions from your clinic's documents.
#[derive(Parser)]
#[command(name = "clinicbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Generative model used for answers (overrides config.toml).
    #[arg(long, global = true, env = "CLINICBOT_MODEL")]
    pub model: Option<String>,

    /// Language of patient-facing text: zh-TW or en.
    #[arg(long, global = true, value_parser = parse_locale)]
    pub locale: Option<Locale>,

    /// Data directory (defaults to $CLINICBOT_DATA_DIR or ~/.clinicbot).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive assistant (default).
    Chat,

    /// Manage the Gemini API key stored in the OS keychain.
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },

    /// List the mock patients available for identity verification.
    Patients,
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Store an API key (prompts when --value is omitted).
    Set {
        /// Key value, for scripts. Prefer the hidden prompt.
        #[arg(long)]
        value: Option<String>,
    },

    /// Remove the stored API key.
    Clear,

    /// Show where the active API key comes from.
    Status,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    s.parse()
}

impl Cli {
    /// Log filter directive derived from `-v`/`--quiet`.
    ///
    /// `None` leaves the choice to `RUST_LOG` or the default.
    pub fn log_directive(&self) -> Option<&'static str> {
        match self.verbose {
            0 if self.quiet => Some("error"),
            0 => None,
            1 => Some("info,clinicbot=debug,clinicbot_core=debug,clinicbot_infra=debug"),
            _ => Some("trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["clinicbot"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_directive(), None);
    }

    #[test]
    fn global_overrides_parse() {
        let cli = Cli::try_parse_from([
            "clinicbot",
            "--locale",
            "en",
            "--model",
            "gemini-2.5-pro",
            "-vv",
            "chat",
        ])
        .unwrap();
        assert_eq!(cli.locale, Some(Locale::En));
        assert_eq!(cli.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(cli.log_directive(), Some("trace"));
        assert!(matches!(cli.command, Some(Commands::Chat)));
    }

    #[test]
    fn key_subcommands_parse() {
        let cli = Cli::try_parse_from(["clinicbot", "key", "set", "--value", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Key { action: KeyCommand::Set { value: Some(ref v) } }) if v == "abc"
        ));
        let cli = Cli::try_parse_from(["clinicbot", "--quiet", "key", "status"]).unwrap();
        assert_eq!(cli.log_directive(), Some("error"));
    }

    #[test]
    fn bad_locale_is_rejected() {
        assert!(Cli::try_parse_from(["clinicbot", "--locale", "fr"]).is_err());
    }
}
