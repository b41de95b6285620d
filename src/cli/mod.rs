//! CLI module for SketchBuddy
//!
//! Handles command-line argument parsing and dispatch.

pub mod args;

pub use args::{Args, Commands, Verbosity};
