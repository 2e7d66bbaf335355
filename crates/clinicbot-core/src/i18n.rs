//! Localized fixed text shown to patients and operators.
//!
//! Every user-facing string that does not come from the remote model lives
//! here, keyed by [`Locale`].

use clinicbot_types::config::Locale;
use clinicbot_types::error::ValidationError;

/// Text catalog for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Catalog {
    locale: Locale,
}

impl Catalog {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Document label used when no files were uploaded.
    pub fn generic_label(&self) -> String {
        match self.locale {
            Locale::ZhTw => "診所 AI 助理".to_string(),
            Locale::En => "Clinic AI Assistant".to_string(),
        }
    }

    /// Label for a multi-document knowledge base.
    pub fn documents_label(&self, first: &str, count: usize) -> String {
        match self.locale {
            Locale::ZhTw => format!("{first} 等 {count} 份文件"),
            Locale::En => format!("{first} and {} more", count.saturating_sub(1)),
        }
    }

    /// Greeting seeded into the chat after identity verification.
    pub fn welcome(&self, patient_name: &str, document_label: &str) -> String {
        match self.locale {
            Locale::ZhTw => format!(
                "{patient_name} 您好！我是「{document_label}」的小幫手，\
                 可以回答關於本診所的各種問題。\n請問今天有什麼可以幫您的嗎？"
            ),
            Locale::En => format!(
                "Hello {patient_name}! I'm the assistant for \"{document_label}\" and \
                 can answer questions about the clinic.\nHow can I help you today?"
            ),
        }
    }

    /// Reply appended when a chat query fails.
    pub fn apology(&self) -> String {
        match self.locale {
            Locale::ZhTw => "抱歉，目前無法取得回覆，請稍後再試一次。".to_string(),
            Locale::En => {
                "Sorry, I couldn't get an answer right now. Please try again in a moment."
                    .to_string()
            }
        }
    }

    /// Fixed crisis-support reply with hotline numbers.
    pub fn crisis_response(&self) -> String {
        match self.locale {
            Locale::ZhTw => "聽起來您現在很不好受，謝謝您願意說出來。您並不孤單，\
                 請立即與專業人員聯繫：\n\
                 安心專線 1925（24 小時）\n\
                 生命線 1995\n\
                 張老師專線 1980\n\
                 如有立即危險，請撥打 119 或 110。"
                .to_string(),
            Locale::En => "It sounds like you are going through something very painful, and \
                 I'm glad you said something. You are not alone. Please reach out now:\n\
                 Taiwan Suicide Prevention Line 1925 (24 hours)\n\
                 Lifeline 1995\n\
                 Teacher Chang 1980\n\
                 If you are in immediate danger, call 119 or 110."
                .to_string(),
        }
    }

    /// Fallback example questions when the remote list is unusable.
    pub fn default_questions(&self) -> Vec<String> {
        let questions: &[&str] = match self.locale {
            Locale::ZhTw => &[
                "診所的看診時間是什麼時候？",
                "初診需要攜帶哪些證件？",
                "如何預約掛號？",
                "診所提供哪些服務項目？",
            ],
            Locale::En => &[
                "What are the clinic's opening hours?",
                "What should I bring to my first visit?",
                "How do I book an appointment?",
                "Which services does the clinic offer?",
            ],
        };
        questions.iter().map(|q| q.to_string()).collect()
    }

    pub fn credential_required(&self) -> String {
        match self.locale {
            Locale::ZhTw => "請先選擇 API 金鑰再開始設定。".to_string(),
            Locale::En => "Please select an API key before starting setup.".to_string(),
        }
    }

    pub fn invalid_credential(&self) -> String {
        match self.locale {
            Locale::ZhTw => "API 金鑰無效或找不到對應專案，請重新選擇金鑰。".to_string(),
            Locale::En => {
                "The API key is invalid or its project was not found. Please select a key again."
                    .to_string()
            }
        }
    }

    pub fn provisioning_failed(&self, detail: &str) -> String {
        match self.locale {
            Locale::ZhTw => format!("建立知識庫時發生錯誤：{detail}"),
            Locale::En => format!("Setting up the knowledge base failed: {detail}"),
        }
    }

    pub fn step_creating_store(&self) -> String {
        match self.locale {
            Locale::ZhTw => "正在建立知識庫…".to_string(),
            Locale::En => "Creating knowledge base...".to_string(),
        }
    }

    pub fn step_uploading(&self) -> String {
        match self.locale {
            Locale::ZhTw => "正在上傳文件".to_string(),
            Locale::En => "Uploading document".to_string(),
        }
    }

    pub fn step_generating_questions(&self) -> String {
        match self.locale {
            Locale::ZhTw => "正在產生範例問題…".to_string(),
            Locale::En => "Generating example questions...".to_string(),
        }
    }

    pub fn step_ready(&self) -> String {
        match self.locale {
            Locale::ZhTw => "準備完成！".to_string(),
            Locale::En => "All set!".to_string(),
        }
    }

    /// Heading of the identity-binding form.
    pub fn binding_title(&self, document_label: &str) -> String {
        match self.locale {
            Locale::ZhTw => format!("「{document_label}」已就緒，請先驗證您的身分。"),
            Locale::En => format!("\"{document_label}\" is ready. Please verify your identity."),
        }
    }

    pub fn phone_prompt(&self) -> String {
        match self.locale {
            Locale::ZhTw => "手機號碼（留空返回）".to_string(),
            Locale::En => "Mobile number (blank to go back)".to_string(),
        }
    }

    pub fn birthday_prompt(&self) -> String {
        match self.locale {
            Locale::ZhTw => "生日（YYYY-MM-DD）".to_string(),
            Locale::En => "Birthday (YYYY-MM-DD)".to_string(),
        }
    }

    /// Label shown next to the patient's chat input.
    pub fn patient_label(&self) -> String {
        match self.locale {
            Locale::ZhTw => "您".to_string(),
            Locale::En => "You".to_string(),
        }
    }

    /// Heading above the example question list.
    pub fn example_questions_title(&self) -> String {
        match self.locale {
            Locale::ZhTw => "您可以試著問：".to_string(),
            Locale::En => "You could ask:".to_string(),
        }
    }

    /// Inline binding-form message for a rejected verification.
    pub fn validation(&self, err: &ValidationError) -> String {
        match (self.locale, err) {
            (Locale::ZhTw, ValidationError::InvalidPhone(_)) => {
                "手機號碼格式不正確，請輸入 09 開頭的 10 位數字。".to_string()
            }
            (Locale::ZhTw, ValidationError::InvalidBirthday(_)) => {
                "生日格式不正確，請輸入 YYYY-MM-DD。".to_string()
            }
            (Locale::ZhTw, ValidationError::PatientNotFound) => {
                "查無此手機號碼的病歷資料。".to_string()
            }
            (Locale::ZhTw, ValidationError::BirthdayMismatch) => {
                "生日與病歷資料不符，請再確認。".to_string()
            }
            (Locale::En, ValidationError::InvalidPhone(_)) => {
                "Invalid phone number. Enter 10 digits starting with 09.".to_string()
            }
            (Locale::En, ValidationError::InvalidBirthday(_)) => {
                "Invalid birthday. Use YYYY-MM-DD.".to_string()
            }
            (Locale::En, ValidationError::PatientNotFound) => {
                "No patient record matches this phone number.".to_string()
            }
            (Locale::En, ValidationError::BirthdayMismatch) => {
                "The birthday does not match our records.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_questions_within_bounds() {
        for locale in [Locale::ZhTw, Locale::En] {
            let questions = Catalog::new(locale).default_questions();
            assert!((2..=4).contains(&questions.len()));
        }
    }

    #[test]
    fn test_crisis_response_lists_hotlines() {
        for locale in [Locale::ZhTw, Locale::En] {
            let text = Catalog::new(locale).crisis_response();
            assert!(text.contains("1925"));
            assert!(text.contains("1995"));
        }
    }

    #[test]
    fn test_welcome_addresses_patient() {
        let text = Catalog::new(Locale::En).welcome("Alice", "Clinic AI Assistant");
        assert!(text.contains("Alice"));
        let text = Catalog::new(Locale::ZhTw).welcome("王小明", "診所 AI 助理");
        assert!(text.contains("王小明"));
    }

    #[test]
    fn test_documents_label() {
        assert_eq!(
            Catalog::new(Locale::En).documents_label("a.pdf", 3),
            "a.pdf and 2 more"
        );
        assert_eq!(
            Catalog::new(Locale::ZhTw).documents_label("a.pdf", 3),
            "a.pdf 等 3 份文件"
        );
    }
}
