//! REPL command parsing and definitions
//!
//! Dot-commands share their prefix with words such as `.log` and
//! `.trigger`, so only the names listed here are treated as commands;
//! every other line goes to the interpreter.

use anyhow::{anyhow, Result};

/// Available REPL commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Show help information
    Help,
    /// Exit the REPL
    Quit,
    /// Show the data stack
    Stack,
    /// Empty the data stack
    ClearStack,
    /// List words by vocabulary
    Words,
    /// Show a word's attributes as JSON
    Describe(String),
    /// List running chrons
    Chrons,
    /// Toggle quiet mode
    Quiet,
    /// Toggle debug mode
    Debug,
}

const COMMAND_NAMES: &[&str] = &[
    "help",
    "h",
    "quit",
    "q",
    "exit",
    "stack",
    "clear-stack",
    "words",
    "describe",
    "chrons",
    "quiet",
    "debug",
];

/// Whether a line is a REPL command rather than interpreter input
pub fn is_command(input: &str) -> bool {
    input
        .trim()
        .strip_prefix('.')
        .and_then(|rest| rest.split_whitespace().next())
        .is_some_and(|name| COMMAND_NAMES.contains(&name))
}

/// Parse a command string into a ReplCommand
pub fn parse_command(input: &str) -> Result<ReplCommand> {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('.') else {
        return Err(anyhow!("Commands must start with '.'"));
    };

    let parts: Vec<&str> = rest.split_whitespace().collect();

    if parts.is_empty() {
        return Err(anyhow!("Empty command"));
    }

    match parts[0] {
        "help" | "h" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        "stack" => Ok(ReplCommand::Stack),
        "clear-stack" => Ok(ReplCommand::ClearStack),
        "words" => Ok(ReplCommand::Words),
        "describe" => {
            if parts.len() != 2 {
                return Err(anyhow!("Usage: .describe <word>"));
            }
            Ok(ReplCommand::Describe(parts[1].to_string()))
        }
        "chrons" => Ok(ReplCommand::Chrons),
        "quiet" => Ok(ReplCommand::Quiet),
        "debug" => Ok(ReplCommand::Debug),
        _ => Err(anyhow!("Unknown command: .{}", parts[0])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_command(".help").unwrap(), ReplCommand::Help);
        assert_eq!(parse_command(".h").unwrap(), ReplCommand::Help);
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_command(".quit").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command(".q").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command(".exit").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_describe() {
        assert_eq!(
            parse_command(".describe save-file").unwrap(),
            ReplCommand::Describe("save-file".to_string())
        );
    }

    #[test]
    fn test_parse_invalid_command() {
        assert!(parse_command(".invalid").is_err());
        assert!(parse_command("help").is_err()); // Missing dot
        assert!(parse_command(".describe").is_err()); // Missing argument
    }

    #[test]
    fn test_words_with_dot_prefix_are_not_commands() {
        assert!(is_command(".stack"));
        assert!(is_command("  .describe poll"));
        assert!(!is_command(".log"));
        assert!(!is_command(".trigger"));
        assert!(!is_command(".clear"));
        assert!(!is_command(r#""hi" .log"#));
    }
}
