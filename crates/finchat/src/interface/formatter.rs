//! Terminal rendering of turn outcomes, errors and history

use crate::bot::{Command, Session, TurnOutcome};
use finchat_llm::{Message, Role};

/// Formats chat output for a plain terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct CliFormatter;

impl CliFormatter {
    pub fn format_outcome(&self, outcome: &TurnOutcome) -> String {
        match outcome {
            TurnOutcome::Text(text) => text.clone(),
            TurnOutcome::Chart(chart) => format!("Chart saved to {}", chart.path.display()),
        }
    }

    pub fn format_error(&self, error: &str) -> String {
        format!("❌ Error: {error}")
    }

    pub fn format_help(&self) -> String {
        Command::help_text().trim().to_string()
    }

    /// One line per message, function calls shown with their arguments
    pub fn format_history(&self, session: &Session) -> String {
        if session.is_empty() {
            return "No messages yet.".to_string();
        }
        session
            .iter()
            .map(format_message)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn format_message(message: &Message) -> String {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Function => "function",
    };

    if let Some(call) = &message.function_call {
        return format!("[{role}] -> {}({})", call.name, call.arguments);
    }

    let text = message.text().unwrap_or_default();
    match &message.name {
        Some(name) => format!("[{role}:{name}] {text}"),
        None => format!("[{role}] {text}"),
    }
}
