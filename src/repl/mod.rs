//! REPL module for the interactive chat session
//!
//! Provides the read-eval-print loop with streamed replies, built-in
//! commands, and conversation context carried across turns.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use colored::*;
use futures_util::StreamExt;
use log::warn;

use crate::api::ChatClient;
use crate::repl::commands::{is_command, CommandHandler};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputEvent, InputHandler};
pub use crate::repl::session::ChatHistory;
use crate::types::{ApiReply, ChatEntry};

/// Reply text recorded when a request fails
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again.";

/// Line a buffered reply displays as: its text, or the apology when the
/// reply carries an error
pub fn reply_text(reply: &ApiReply) -> &str {
    if reply.is_ok() {
        &reply.text
    } else {
        APOLOGY
    }
}

/// REPL session coordinator
///
/// Manages the interactive loop with:
/// - Input handling (rustyline)
/// - Command processing
/// - Streamed reply rendering
/// - Conversation state
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    history: ChatHistory,
    display: DisplayManager,
    client: ChatClient,
}

impl ReplSession {
    /// Create a session with the default persistent input history
    pub fn new(client: ChatClient) -> Result<Self> {
        let input_handler = match InputHandler::default_history_path() {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };

        Ok(Self::with_input(client, input_handler))
    }

    /// Create a session around an existing input handler
    pub fn with_input(client: ChatClient, input_handler: InputHandler) -> Self {
        let command_handler = CommandHandler::new(client.model(), client.api_url());

        ReplSession {
            input_handler,
            command_handler,
            history: ChatHistory::new(),
            display: DisplayManager::new(),
            client,
        }
    }

    /// Show welcome banner
    pub fn show_welcome(&self, version: &str) {
        self.display.show_banner(version, self.client.model());
    }

    /// Run the interactive loop until exit
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.input_handler.read_line()? {
                InputEvent::Line(line) => {
                    if !self.handle_line(&line).await? {
                        break;
                    }
                }
                InputEvent::Interrupted => {
                    println!("^C");
                }
                InputEvent::Eof => {
                    println!("{}", "Goodbye!".green());
                    break;
                }
            }
        }

        self.save()
    }

    /// Handle one input line (command or question)
    ///
    /// Returns true if the session should continue, false to exit
    pub async fn handle_line(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        if is_command(input) {
            let command = self.command_handler.parse(input);
            return self.command_handler.execute(command, &mut self.history);
        }

        self.submit(input).await;
        Ok(true)
    }

    /// Send one question and stream the reply into the conversation.
    ///
    /// A failure never ends the session: the reply entry is replaced by an
    /// apology and the next prompt comes back. Fragments printed before a
    /// mid-stream failure stay on screen.
    async fn submit(&mut self, message: &str) {
        let prior = self.history.api_history();

        self.history.push(ChatEntry::user(message));
        let reply_id = self.history.push(ChatEntry::ai_placeholder());

        self.display.start_thinking();

        let stream = match self.client.chat_stream(message, &prior).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!("could not open reply stream: {}", err);
                self.display.show_error(&err.to_string());
                self.display.show_reply_line(APOLOGY);
                self.history.fail_entry(reply_id, APOLOGY);
                return;
            }
        };
        tokio::pin!(stream);

        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        let mut received_any = false;
        loop {
            tokio::select! {
                biased;

                _ = &mut interrupt => {
                    // Dropping the stream closes the connection
                    self.display.stop_thinking();
                    self.display.show_stream_break("interrupted");
                    self.history.fail_entry(reply_id, "(interrupted)");
                    return;
                }

                fragment = stream.next() => match fragment {
                    Some(Ok(text)) => {
                        if !received_any {
                            self.display.begin_reply();
                            received_any = true;
                        }
                        self.display.stream_fragment(&text);
                        self.history.append_content(reply_id, &text);
                    }
                    Some(Err(err)) => {
                        warn!("reply stream failed: {}", err);
                        if received_any {
                            self.display.show_stream_break(&err.to_string());
                        } else {
                            self.display.show_error(&err.to_string());
                            self.display.show_reply_line(APOLOGY);
                        }
                        self.history.fail_entry(reply_id, APOLOGY);
                        return;
                    }
                    None => break,
                }
            }
        }

        if received_any {
            self.display.end_reply();
        } else {
            self.display.stop_thinking();
        }
        self.history.complete_entry(reply_id);
    }

    /// Save input history, called on graceful shutdown
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }

    /// Get conversation history (immutable)
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Get conversation history (mutable)
    pub fn history_mut(&mut self) -> &mut ChatHistory {
        &mut self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DEFAULT_API_URL, DEFAULT_MODEL};

    fn offline_session() -> ReplSession {
        let client = ChatClient::with_config(DEFAULT_API_URL, "sk-test", DEFAULT_MODEL, 3)
            .expect("client");
        let input = InputHandler::new().expect("input handler");
        ReplSession::with_input(client, input)
    }

    #[tokio::test]
    async fn test_handle_command() {
        let mut session = offline_session();

        let result = session.handle_line("/help").await.unwrap();
        assert!(result);
    }

    #[tokio::test]
    async fn test_handle_exit_command() {
        let mut session = offline_session();

        let result = session.handle_line("/exit").await.unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn test_handle_empty_input() {
        let mut session = offline_session();

        assert!(session.handle_line("").await.unwrap());
        assert!(session.handle_line("   ").await.unwrap());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_reset_command_clears_history() {
        let mut session = offline_session();
        session.history_mut().push(ChatEntry::user("hello"));

        session.handle_line("/reset").await.unwrap();
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_reply_text_passes_successful_replies_through() {
        let reply = ApiReply::ok("circles come from ellipse()");
        assert_eq!(reply_text(&reply), "circles come from ellipse()");
    }

    #[test]
    fn test_reply_text_substitutes_apology_on_failure() {
        let reply = ApiReply::failed("HTTP 500: upstream unavailable");
        assert_eq!(reply_text(&reply), APOLOGY);
    }
}
