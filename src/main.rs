//! SketchBuddy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use futures_util::StreamExt;
use std::io::Write;

use sketchbuddy::api::ChatClient;
use sketchbuddy::cli::{Args, Commands};
use sketchbuddy::config::{Config, API_KEY_ENV};
use sketchbuddy::repl::{reply_text, ReplSession};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.verbosity().log_filter()),
    )
    .init();

    if let Err(message) = args.validate() {
        eprintln!("{} {}", "Error:".red(), message);
        std::process::exit(2);
    }

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }

    match &args.command {
        Some(Commands::Chat) => {
            run_repl(&args, &config).await?;
        }
        Some(Commands::Doctor) => {
            run_doctor(&config).await;
        }
        Some(Commands::Config) => {
            show_config(&config)?;
        }
        None => {
            if let Some(question) = &args.question {
                let client = ChatClient::from_config(&config)?;
                if args.no_stream {
                    ask_once(&client, question).await;
                } else {
                    stream_once(&client, question).await?;
                }
            } else {
                run_repl(&args, &config).await?;
            }
        }
    }

    Ok(())
}

/// Stream one reply straight to stdout.
///
/// Fragments already printed stay on screen when the stream breaks; the
/// failure itself becomes the exit error.
async fn stream_once(client: &ChatClient, question: &str) -> Result<()> {
    let stream = client.chat_stream(question, &[]).await?;
    tokio::pin!(stream);

    let mut stdout = std::io::stdout();
    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(text) => {
                print!("{}", text);
                let _ = stdout.flush();
            }
            Err(err) => {
                println!();
                return Err(err).context("reply stream interrupted");
            }
        }
    }
    println!();

    Ok(())
}

/// Ask for one buffered reply and print it whole.
///
/// A failed reply prints the apology and exits nonzero; the client has
/// already logged the detail.
async fn ask_once(client: &ChatClient, question: &str) {
    let reply = client.ask(question, &[]).await;
    println!("{}", reply_text(&reply));

    if !reply.is_ok() {
        std::process::exit(1);
    }
}

/// Run the interactive session until exit or EOF
async fn run_repl(args: &Args, config: &Config) -> Result<()> {
    let client = ChatClient::from_config(config)?;
    let mut session = ReplSession::new(client)?;

    if args.verbosity().show_banner() {
        session.show_welcome(env!("CARGO_PKG_VERSION"));
    }

    session.run().await
}

/// Configuration and connectivity checks, exit code 1 when anything fails
async fn run_doctor(config: &Config) {
    println!("\nSketchBuddy health checks\n");
    let mut healthy = true;

    match Config::config_path() {
        Ok(path) if path.exists() => {
            println!("  {} config file: {}", "ok".green(), path.display());
        }
        Ok(path) => {
            println!(
                "  {} config file not found, defaults in use: {}",
                "--".yellow(),
                path.display()
            );
        }
        Err(err) => {
            healthy = false;
            println!("  {} config path: {}", "FAIL".red(), err);
        }
    }

    if config.has_api_key() {
        println!("  {} API key present", "ok".green());
    } else {
        healthy = false;
        println!(
            "  {} no API key; set {} or api_key in the config file",
            "FAIL".red(),
            API_KEY_ENV
        );
    }

    println!("  {} model: {}", "ok".green(), config.model);

    if config.has_api_key() {
        match ChatClient::from_config(config) {
            Ok(client) => match client.health_check().await {
                Ok(()) => {
                    println!(
                        "  {} endpoint answers chat requests: {}",
                        "ok".green(),
                        config.api_url
                    );
                }
                Err(err) => {
                    healthy = false;
                    println!("  {} endpoint check: {}", "FAIL".red(), err);
                }
            },
            Err(err) => {
                healthy = false;
                println!("  {} client setup: {}", "FAIL".red(), err);
            }
        }
    }

    println!();
    std::process::exit(if healthy { 0 } else { 1 });
}

/// Print the active configuration with the key masked
fn show_config(config: &Config) -> Result<()> {
    let path = Config::config_path()?;

    println!("\nSketchBuddy configuration ({})\n", path.display());
    println!("  api_url:      {}", config.api_url);
    println!("  model:        {}", config.model);
    println!(
        "  api_key:      {}",
        if config.has_api_key() {
            "set".to_string()
        } else {
            format!("not set ({} also checked)", API_KEY_ENV)
        }
    );
    println!("  max_attempts: {}", config.max_attempts);
    println!();

    Ok(())
}
