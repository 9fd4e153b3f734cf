use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod bus;
mod chat;
mod config;
mod entity;
mod faq;
mod quick;
mod stub;
mod terminal;
mod view;
mod webhook;
mod widget;

const STUB_GREETING: &str = "Thanks for reaching out! This is the offline assistant.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        // Not fatal if .env doesn't exist
        info!("No .env file found or failed to load: {}", e);
    }

    // Logs go to stderr so they never tear the rendered widget on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::Config::parse();

    if config.stub {
        let addr = stub::spawn(stub::router(STUB_GREETING)).await?;
        config.webhook_url = format!("http://{}/webhook/chat", addr);
    }

    info!("Amigo chat starting against {}", config.webhook_url);

    let webhook = Arc::new(webhook::WebhookClient::new(
        config.webhook_url.clone(),
        config.webhook_action.clone(),
        config.request_timeout(),
    )?);

    let bus = Arc::new(bus::EventBus::new());
    let events = bus.subscribe();
    let (widget, replies) = widget::Widget::new(webhook, bus, config.quick_reply_delay());

    let terminal = terminal::Terminal::new(widget, replies, events, config.viewport_lines);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        res = terminal.run() => {
            if let Err(e) = res {
                error!("Chat stopped with error: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
