//! Display manager for the chat terminal UI
//!
//! Manages the thinking indicator, streamed reply rendering, and
//! color-coded status output.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Speaker label shown before every reply
const REPLY_LABEL: &str = "tutor> ";

/// Display manager for the chat UI
///
/// Features:
/// - Thinking indicator while waiting for the first fragment
/// - In-place streamed reply rendering
/// - Color-coded output
pub struct DisplayManager {
    thinking: Option<ProgressBar>,
    tick_interval: Duration,
}

impl DisplayManager {
    /// Create new display manager
    pub fn new() -> Self {
        DisplayManager {
            thinking: None,
            tick_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str) {
        let width = 64;
        let top = format!("{}", "=".repeat(width).cyan());
        let title = format!("  SketchBuddy {} - Processing Chat Tutor", version);
        let info = format!("  Model: {} | Mode: interactive", model);
        let bottom = format!("{}", "=".repeat(width).cyan());

        println!("\n{}", top);
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", bottom);
        println!(
            "Ask anything about Processing (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Show the thinking indicator while waiting for the reply to open
    pub fn start_thinking(&mut self) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message("Thinking...");
        spinner.enable_steady_tick(self.tick_interval);

        self.thinking = Some(spinner);
    }

    /// Remove the thinking indicator
    pub fn stop_thinking(&mut self) {
        if let Some(spinner) = self.thinking.take() {
            spinner.finish_and_clear();
        }
    }

    /// Stop the indicator and open the reply line
    pub fn begin_reply(&mut self) {
        self.stop_thinking();
        print!("{}", REPLY_LABEL.magenta().bold());
        let _ = io::stdout().flush();
    }

    /// Display one streamed fragment
    pub fn stream_fragment(&self, fragment: &str) {
        print!("{}", fragment);
        let _ = io::stdout().flush();
    }

    /// Close a streamed reply
    pub fn end_reply(&self) {
        println!("\n");
    }

    /// Print a complete reply on one label line
    pub fn show_reply_line(&mut self, text: &str) {
        self.stop_thinking();
        println!("{}{}\n", REPLY_LABEL.magenta().bold(), text);
    }

    /// Display error message
    pub fn show_error(&mut self, error: &str) {
        self.stop_thinking();
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Note an interruption under a partially printed reply
    pub fn show_stream_break(&self, detail: &str) {
        println!("\n{} {}\n", "✗".red(), detail.red());
    }

    /// True while the thinking indicator is visible
    pub fn is_thinking(&self) -> bool {
        self.thinking.is_some()
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}
