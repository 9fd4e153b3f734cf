use crate::webhook::{DEFAULT_ACTION, DEFAULT_WEBHOOK_URL};
use clap::Parser;
use std::time::Duration;

/// Terminal front-end for the Amigo support chat widget.
#[derive(Debug, Clone, Parser)]
#[command(name = "amigo-chat", version)]
pub struct Config {
    /// Webhook that answers visitor messages
    #[arg(long, env = "AMIGO_WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
    pub webhook_url: String,

    /// Value of the `action` query parameter sent with every request
    #[arg(long, env = "AMIGO_WEBHOOK_ACTION", default_value = DEFAULT_ACTION)]
    pub webhook_action: String,

    /// Pause before a quick option's canned reply appears
    #[arg(long, env = "AMIGO_QUICK_REPLY_DELAY_MS", default_value_t = 600)]
    pub quick_reply_delay_ms: u64,

    /// Give up on a webhook request after this long. Unbounded when unset.
    #[arg(long, env = "AMIGO_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Answer from a local stub webhook instead of the remote one
    #[arg(long, env = "AMIGO_STUB")]
    pub stub: bool,

    /// Lines of conversation kept on screen
    #[arg(long, env = "AMIGO_VIEWPORT_LINES", default_value_t = 24)]
    pub viewport_lines: usize,
}

impl Config {
    pub fn quick_reply_delay(&self) -> Duration {
        Duration::from_millis(self.quick_reply_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
