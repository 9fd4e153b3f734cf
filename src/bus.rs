use crate::chat::Message;
use crate::view::Theme;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A message was appended to the conversation
    MessageAppended(Message),

    /// The input field changed (keystroke or cleared after a send)
    InputChanged(String),

    /// The widget panel was opened or closed
    ChatToggled { open: bool },

    /// The FAQ drawer was opened or closed, or one of its items toggled
    FaqChanged { open: bool, expanded: Option<usize> },

    ThemeChanged(Theme),

    /// One of the onboarding surfaces went away for the rest of the session
    Dismissed(Surface),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    QuickOptions,
    PrivacyBanner,
    ClosedChatPrompt,
}

/// Room for every event a pasted block of input can raise before the
/// renderer wakes up. A lagging renderer redraws from widget state anyway.
pub const EVENT_CAPACITY: usize = 512;

pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: Event) {
        if self.tx.send(event).is_err() {
            trace!("No renderer subscribed, event dropped");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(Event::ChatToggled { open: true });
        bus.publish(Event::Dismissed(Surface::PrivacyBanner));

        assert!(matches!(rx.recv().await.unwrap(), Event::ChatToggled { open: true }));
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::Dismissed(Surface::PrivacyBanner)
        ));
    }

    #[tokio::test]
    async fn lagging_subscriber_recovers_with_latest_events() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        bus.publish(Event::InputChanged("a".into()));
        bus.publish(Event::InputChanged("ab".into()));
        bus.publish(Event::InputChanged("abc".into()));

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert!(matches!(rx.recv().await.unwrap(), Event::InputChanged(ref s) if s == "ab"));
        assert!(matches!(rx.recv().await.unwrap(), Event::InputChanged(ref s) if s == "abc"));
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(Event::InputChanged(String::new()));
    }
}
