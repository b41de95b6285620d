//! Command-line argument parsing for SketchBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};

/// SketchBuddy - Processing tutor in your terminal
#[derive(Parser, Debug)]
#[command(name = "sketchbuddy")]
#[command(version)]
#[command(about = "Chat with a Processing tutor from your terminal", long_about = None)]
pub struct Args {
    /// Question to ask; omit for an interactive session
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Model to use (overrides configuration)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Chat completions endpoint (overrides configuration)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Wait for the complete reply instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except the reply)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Run configuration and connectivity checks
    Doctor,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Check flag combinations that parse but make no sense together
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_some() && self.question.is_some() {
            return Err("Cannot ask a question together with a subcommand.".to_string());
        }

        if self.no_stream && self.question.is_none() {
            return Err("The --no-stream flag requires a question.".to_string());
        }

        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Log filter handed to the logger at startup
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if the welcome banner should be shown
    pub fn show_banner(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
