//! Command handler for REPL built-in commands
//!
//! Provides the slash commands for session management and introspection.

use anyhow::Result;
use colored::*;

use crate::repl::session::ChatHistory;
use crate::types::EntryStatus;

/// Longest content preview shown per history line
const PREVIEW_CHARS: usize = 60;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History { limit: Option<usize> },
    Status,
    Reset,
    Exit,
    Clear,
    Unknown { input: String },
}

/// Command handler for parsing and executing REPL commands
pub struct CommandHandler {
    model: String,
    api_url: String,
}

impl CommandHandler {
    /// Create new command handler
    pub fn new(model: &str, api_url: &str) -> Self {
        CommandHandler {
            model: model.to_string(),
            api_url: api_url.to_string(),
        }
    }

    /// Parse input string into a command
    ///
    /// Complexity: O(1) string matching
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        // Not a command if doesn't start with /
        if !trimmed.starts_with('/') {
            return Command::Unknown {
                input: input.to_string(),
            };
        }

        let parts: Vec<&str> = trimmed[1..].split_whitespace().collect();
        if parts.is_empty() {
            return Command::Unknown {
                input: input.to_string(),
            };
        }

        match parts[0].to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "history" => {
                let limit = parts.get(1).and_then(|s| s.parse().ok());
                Command::History { limit }
            }
            "status" => Command::Status,
            "reset" => Command::Reset,
            "clear" | "cls" => Command::Clear,
            _ => Command::Unknown {
                input: input.to_string(),
            },
        }
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit
    pub fn execute(&mut self, command: Command, history: &mut ChatHistory) -> Result<bool> {
        match command {
            Command::Help => {
                self.show_help();
                Ok(true)
            }
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                Ok(false)
            }
            Command::History { limit } => {
                self.show_history(history, limit.unwrap_or(10));
                Ok(true)
            }
            Command::Status => {
                self.show_status(history);
                Ok(true)
            }
            Command::Reset => {
                history.reset();
                println!("{}", "Session reset. Conversation cleared.".yellow());
                Ok(true)
            }
            Command::Clear => {
                print!("\x1B[2J\x1B[1;1H"); // ANSI escape codes to clear screen
                Ok(true)
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
                Ok(true)
            }
        }
    }

    /// Display help information
    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = vec![
            ("/help, /h", "Show this help message"),
            ("/history [n]", "Show last n messages (default: 10)"),
            ("/status", "Show session status and settings"),
            ("/reset", "Clear the conversation"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<20} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type your question directly (no / prefix)");
        println!("  - Use {} for input history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    /// Display conversation history
    fn show_history(&self, history: &ChatHistory, limit: usize) {
        let mut entries = history.recent(limit);
        entries.reverse();

        if entries.is_empty() {
            println!("{}", "No messages yet.".yellow());
            return;
        }

        println!(
            "\n{}",
            format!("Conversation (last {}):", entries.len()).bold().cyan()
        );
        println!("{}", "=".repeat(60).cyan());

        for (i, entry) in entries.iter().enumerate() {
            let status_icon = match entry.status {
                EntryStatus::Sent => "✓".green(),
                EntryStatus::Error => "✗".red(),
                EntryStatus::Sending => "…".yellow(),
            };
            let speaker = match entry.role {
                crate::types::ChatRole::User => "you  ".cyan(),
                crate::types::ChatRole::Ai => "tutor".magenta(),
            };
            let time = format!("({})", entry.timestamp.format("%H:%M:%S")).dimmed();

            println!(
                "  {}. {} {} {} {}",
                (i + 1).to_string().cyan(),
                status_icon,
                speaker,
                preview(&entry.content, PREVIEW_CHARS),
                time
            );
        }
        println!();
    }

    /// Display session status
    fn show_status(&self, history: &ChatHistory) {
        println!("\n{}", "Session Status:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let duration = history.session_duration_secs();
        let hours = duration / 3600;
        let minutes = (duration % 3600) / 60;
        let seconds = duration % 60;

        let duration_str = if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        };

        println!("  Messages Stored:     {}", history.len().to_string().green());
        println!(
            "  Total Messages:      {}",
            history.entry_count().to_string().green()
        );
        println!(
            "  Completed Exchanges: {}",
            history.exchange_count().to_string().green()
        );
        println!("  Session Duration:    {}", duration_str.green());
        println!("  Model:               {}", self.model.green());
        println!("  Endpoint:            {}", self.api_url.green());
        println!();
    }
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

/// First line of `content`, truncated to `max` characters
fn preview(content: &str, max: usize) -> String {
    let first_line = content.lines().next().unwrap_or("");
    if first_line.chars().count() <= max {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max).collect();
        format!("{}...", cut)
    }
}
