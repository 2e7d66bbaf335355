//! Crisis keyword detection.
//!
//! Runs synchronously on every outbound patient message, before anything
//! is sent to the remote answering service. A match short-circuits the
//! query and produces the fixed crisis-support reply instead.

use clinicbot_types::message::Message;

use crate::i18n::Catalog;

/// Built-in self-harm / suicide indicators (Traditional Chinese and English).
///
/// Stored lower-case; input is lower-cased before matching.
const BUILTIN_KEYWORDS: &[&str] = &[
    // zh-TW
    "自殺",
    "自杀",
    "想死",
    "不想活",
    "活不下去",
    "輕生",
    "自殘",
    "割腕",
    "結束生命",
    "結束自己的生命",
    "跳樓",
    // en
    "suicide",
    "suicidal",
    "kill myself",
    "end my life",
    "want to die",
    "self-harm",
    "self harm",
    "hurt myself",
];

/// Case-insensitive multilingual crisis keyword matcher.
#[derive(Debug, Clone)]
pub struct CrisisDetector {
    keywords: Vec<String>,
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self {
            keywords: BUILTIN_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl CrisisDetector {
    /// Built-in keywords plus operator-configured extras.
    pub fn with_extra_keywords<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut detector = Self::default();
        for keyword in extra {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !detector.keywords.contains(&keyword) {
                detector.keywords.push(keyword);
            }
        }
        detector
    }

    /// Whether `text` contains any crisis keyword.
    pub fn is_crisis(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// The crisis-support reply, or `None` if `text` is not a crisis message.
    pub fn screen(&self, text: &str, catalog: &Catalog) -> Option<Message> {
        self.is_crisis(text)
            .then(|| Message::crisis(catalog.crisis_response()))
    }

    #[cfg(test)]
    fn keywords(&self) -> &[String] {
        &self.keywords
    }
}
