//! Configuration types for the clinic assistant.
//!
//! `ClinicConfig` represents the top-level `config.toml`. Every field has a
//! default so an empty or missing file yields a working configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Language of all fixed user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "en")]
    En,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::ZhTw
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::ZhTw => write!(f, "zh-TW"),
            Locale::En => write!(f, "en"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "zh-tw" | "zh" => Ok(Locale::ZhTw),
            "en" | "en-us" => Ok(Locale::En),
            other => Err(format!("unsupported locale: '{other}'")),
        }
    }
}

/// Polling policy for long-running remote operations.
///
/// The wait before poll `k` (0-based) is
/// `initial_interval_ms * multiplier^k`, capped at `max_interval_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_initial_interval_ms() -> u64 {
    3_000
}

fn default_max_interval_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_max_attempts() -> u32 {
    120
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl PollConfig {
    /// Delay to wait before the given 0-based poll attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(64) as i32);
        let ms = (self.initial_interval_ms as f64 * factor).min(self.max_interval_ms as f64);
        Duration::from_millis(ms.max(0.0) as u64)
    }
}

/// Top-level configuration loaded from `{data_dir}/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// Generative model used for grounded answers and question generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative-AI API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub locale: Locale,

    /// Instruction prepended to every grounded query.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    #[serde(default)]
    pub poll: PollConfig,

    /// How long the "ready" progress state is held before leaving Uploading.
    #[serde(default = "default_ready_hold_ms")]
    pub ready_hold_ms: u64,

    /// How long a failed binding message stays up before the form resets.
    #[serde(default = "default_binding_reset_ms")]
    pub binding_reset_ms: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional TOML file replacing the built-in mock patients.
    #[serde(default)]
    pub patients_file: Option<PathBuf>,

    /// Additional crisis keywords appended to the built-in set.
    #[serde(default)]
    pub extra_crisis_keywords: Vec<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_system_instruction() -> String {
    "You are a friendly clinic assistant. Answer the patient's question using only \
     the clinic documents provided through file search. If the documents do not \
     contain the answer, say so and suggest contacting the clinic. Reply in the \
     same language the patient used. Never give a diagnosis."
        .to_string()
}

fn default_ready_hold_ms() -> u64 {
    500
}

fn default_binding_reset_ms() -> u64 {
    2_500
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            locale: Locale::default(),
            system_instruction: default_system_instruction(),
            poll: PollConfig::default(),
            ready_hold_ms: default_ready_hold_ms(),
            binding_reset_ms: default_binding_reset_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            patients_file: None,
            extra_crisis_keywords: Vec::new(),
        }
    }
}

impl ClinicConfig {
    pub fn ready_hold(&self) -> Duration {
        Duration::from_millis(self.ready_hold_ms)
    }

    pub fn binding_reset(&self) -> Duration {
        Duration::from_millis(self.binding_reset_ms)
    }
}
