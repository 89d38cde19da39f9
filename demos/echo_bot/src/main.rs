//! Echo Bot Example
//!
//! Logs what a traQ bot sees: messages, direct messages, channel joins and
//! pings. Which transport it listens on comes from `traq-bot.toml`:
//!
//! ```toml
//! [bot.transport]
//! type = "http-server"
//! port = 8080
//! verification_token = "..."
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot -- --config traq-bot.toml
//! TRAQ_BOT_BOT__TRANSPORT__TYPE=ws-client \
//! TRAQ_BOT_BOT__TRANSPORT__ACCESS_TOKEN=... cargo run --package echo-bot
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use traq_bot::prelude::*;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file; searched for when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`.
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Handler Functions
// ============================================================================

async fn log_message(event: MessageCreatedOrUpdatedEvent, seen: Arc<AtomicUsize>) {
    let count = seen.fetch_add(1, Ordering::Relaxed) + 1;
    let msg = &event.message;
    info!(
        count,
        channel = %msg.channel_id,
        "{} (@{}): {}",
        msg.user.display_id,
        msg.user.name,
        msg.plain_text
    );

    if let Some(content) = msg.plain_text.trim().strip_prefix("/echo ") {
        info!(reply = content, "Echo requested");
    }
}

async fn log_direct_message(event: MessageCreatedOrUpdatedEvent) {
    let msg = &event.message;
    info!("[DM] {} (@{}): {}", msg.user.display_id, msg.user.name, msg.plain_text);
}

async fn log_join(event: JoinOrLeftEvent) {
    info!(channel = %event.channel.name, "Joined channel");
}

async fn log_ping(event: PingEvent) {
    info!(time = %event.event_time, "PING");
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = BotRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build()?;

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);

    let router = EventRouter::builder()
        .on_initialize(|_cancel| async {
            info!("Echo bot ready");
        })
        .on_ping(|event, _cancel| log_ping(event))
        .on_join(|event, _cancel| log_join(event))
        .on_message_created(move |event, _cancel| log_message(event, Arc::clone(&counter)))
        .on_direct_message_created(|event, _cancel| log_direct_message(event))
        .build();

    runtime.run(router).await?;

    info!(messages = seen.load(Ordering::Relaxed), "Echo bot stopped");
    Ok(())
}
