//! REPL command parsing

use crate::error::{ChatError, Result};

/// Parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text forwarded to the model
    Query { text: String },
    /// Show usage
    Help,
    /// Print the session so far
    History,
    /// Leave the REPL
    Exit,
}

impl Command {
    /// Parse a line of input
    ///
    /// Returns `Ok(None)` for a blank line. Anything not starting with `/`
    /// is a query.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Some(Command::Query {
                text: input.to_string(),
            }));
        };

        let cmd = rest
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        let command = match cmd.as_str() {
            "help" | "h" | "?" => Command::Help,
            "history" | "hist" => Command::History,
            "exit" | "quit" | "q" => Command::Exit,
            "" => return Err(ChatError::Command("Empty command".to_string())),
            _ => return Err(ChatError::Command(format!("Unknown command: /{cmd}"))),
        };
        Ok(Some(command))
    }

    /// Usage text
    pub fn help_text() -> &'static str {
        r#"
finchat - stock technical analysis chat
=======================================

Ask in plain language, for example:
  What is the price of AAPL?
  Calculate the 50 day SMA for MSFT
  What's the 20 day EMA of TSLA?
  What is the RSI of NVDA?
  Show me the MACD for GOOGL
  Plot the stock price of AMZN

Commands:
  /help       Show this help (/h, /?)
  /history    Print the conversation so far
  /exit       Quit (/quit, /q, or Ctrl-D)
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        assert_eq!(
            Command::parse("  What is the RSI of AAPL? ").unwrap(),
            Some(Command::Query {
                text: "What is the RSI of AAPL?".to_string()
            })
        );
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help").unwrap(), Some(Command::Help));
        assert_eq!(Command::parse("/?").unwrap(), Some(Command::Help));
        assert_eq!(Command::parse("/HISTORY").unwrap(), Some(Command::History));
        assert_eq!(Command::parse("/exit").unwrap(), Some(Command::Exit));
        assert_eq!(Command::parse("/q").unwrap(), Some(Command::Exit));
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = Command::parse("/analyze AAPL").unwrap_err();
        assert!(matches!(err, ChatError::Command(msg) if msg == "Unknown command: /analyze"));
        assert!(Command::parse("/").is_err());
    }

    #[test]
    fn test_help_lists_commands() {
        let help = Command::help_text();
        assert!(help.contains("/help"));
        assert!(help.contains("/history"));
        assert!(help.contains("/exit"));
    }
}
