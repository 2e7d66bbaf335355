//! Slash commands available on the chat screen.
//!
//! Anything that does not start with `/` is a question for the assistant.

use console::style;

#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    /// List the suggested example questions.
    Questions,
    /// Send example question by zero-based index.
    Ask(usize),
    /// Reprint the conversation so far.
    History,
    Clear,
    /// End the session and return to the welcome menu.
    End,
    /// End the session and quit.
    Exit,
    Unknown(String),
}

/// Parse input as a slash command; `None` for ordinary messages.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/questions" | "/examples" => ChatCommand::Questions,
        "/ask" => match arg.map(str::parse::<usize>) {
            Some(Ok(n)) if n >= 1 => ChatCommand::Ask(n - 1),
            _ => ChatCommand::Unknown("/ask needs a question number, e.g. /ask 1".to_string()),
        },
        "/history" => ChatCommand::History,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/end" | "/new" => ChatCommand::End,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        other => match other[1..].parse::<usize>() {
            Ok(n) if n >= 1 => ChatCommand::Ask(n - 1),
            _ => ChatCommand::Unknown(other.to_string()),
        },
    };
    Some(command)
}

pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/questions", "List suggested questions"),
        ("/ask <n>", "Ask suggested question n (or just /<n>)"),
        ("/history", "Show the conversation so far"),
        ("/clear", "Clear the screen"),
        ("/end", "End the session and remove the documents"),
        ("/exit", "End the session and quit"),
    ];

    let mut out = format!("\n  {}\n\n", style("Available commands:").bold());
    for (cmd, description) in rows {
        out.push_str(&format!("  {} {}\n", style(format!("{cmd:<12}")).cyan(), description));
    }
    out.push_str(&format!("\n  {}\n", style("Ctrl+D or Ctrl+C also quit").dim()));
    out
}

/// Numbered example questions under a localized title.
pub fn questions_text(title: &str, questions: &[String]) -> String {
    let mut out = format!("\n  {}\n", style(title).bold());
    for (i, question) in questions.iter().enumerate() {
        out.push_str(&format!("  {} {}\n", style(format!("/{}", i + 1)).cyan(), question));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse("營業時間?"), None);
        assert_eq!(parse("  what about /help"), None);
    }

    #[test]
    fn aliases_parse() {
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/QUIT"), Some(ChatCommand::Exit));
        assert_eq!(parse("/new"), Some(ChatCommand::End));
        assert_eq!(parse("/examples"), Some(ChatCommand::Questions));
    }

    #[test]
    fn ask_is_one_based() {
        assert_eq!(parse("/ask 1"), Some(ChatCommand::Ask(0)));
        assert_eq!(parse("/3"), Some(ChatCommand::Ask(2)));
        assert!(matches!(parse("/ask"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/ask 0"), Some(ChatCommand::Unknown(_))));
        assert!(matches!(parse("/0"), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn questions_are_numbered_from_one() {
        let text = console::strip_ansi_codes(&questions_text(
            "Try asking",
            &["Hours?".to_string(), "Parking?".to_string()],
        ))
        .into_owned();
        assert!(text.contains("/1 Hours?"));
        assert!(text.contains("/2 Parking?"));
    }

    #[test]
    fn unknown_command_keeps_name() {
        assert_eq!(parse("/bogus x"), Some(ChatCommand::Unknown("/bogus".to_string())));
    }
}
