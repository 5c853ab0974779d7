// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emblem - personalized avatars for stream subscription events.
//!
//! This is the binary entry point.

mod app;
mod serve;
mod shutdown;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use emblem_config::model::EmblemConfig;
use emblem_core::{DeliveryTarget, EmblemError, MessageSink, Platform};
use emblem_dispatch::{AdminCommand, DispatchOutcome};

use crate::sink::JsonLineSink;

/// Emblem - personalized avatars for stream subscription events.
#[derive(Parser, Debug)]
#[command(name = "emblem", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read platform events as JSON lines on stdin and reply on stdout.
    Serve,
    /// Generate one avatar and print the chat reply.
    Generate {
        /// Broadcaster channel the avatar is for.
        channel: String,
        /// User to draw.
        user: String,
        /// Template name; random when omitted or unknown.
        #[arg(long)]
        style: Option<String>,
        #[arg(long, default_value = "twitch")]
        platform: Platform,
    },
    /// Print the effective configuration with credentials redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => emblem_config::load_and_validate_path(path),
        None => emblem_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            emblem_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => {
            init_tracing(&config.agent.log_level);
            serve::run_serve(config).await
        }
        Some(Commands::Generate {
            channel,
            user,
            style,
            platform,
        }) => {
            init_tracing(&config.agent.log_level);
            run_generate(config, platform, channel, user, style).await
        }
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("emblem: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// One-shot generation through the same dispatcher `serve` uses, so the
/// ignore list and history apply.
async fn run_generate(
    config: EmblemConfig,
    platform: Platform,
    channel: String,
    user: String,
    style: Option<String>,
) -> Result<(), EmblemError> {
    let sink = Arc::new(JsonLineSink::stdout());
    let dispatcher = app::build_dispatcher(&config, Arc::clone(&sink) as Arc<dyn MessageSink>).await?;
    let target = DeliveryTarget { platform, channel };

    let outcome = dispatcher
        .handle_command(&target, &config.agent.name, AdminCommand::Avatar { user, style })
        .await;

    match outcome {
        DispatchOutcome::Delivered(result) if result.is_success() => Ok(()),
        DispatchOutcome::Skipped { reason } => {
            eprintln!("emblem: skipped ({reason})");
            Ok(())
        }
        other => Err(EmblemError::Internal(format!("generation did not complete: {other:?}"))),
    }
}

fn print_config(config: &EmblemConfig) -> Result<(), EmblemError> {
    let rendered = toml::to_string_pretty(&config.redacted())
        .map_err(|e| EmblemError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Logs go to stderr; stdout carries reply lines.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("emblem={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
