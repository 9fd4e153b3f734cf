use crate::bus::{Event, EventBus, Surface};
use crate::chat::{Message, Prompt, SessionId};
use crate::faq::Accordion;
use crate::quick::{canned_reply, QuickOption};
use crate::view::Theme;
use crate::webhook::WebhookClient;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

pub const SEND_FAILURE: &str = "Sorry, there was an error sending your message. Please try again.";

/// Everything the widget shows, owned by one [`Widget`] for one visit.
#[derive(Debug, Clone)]
pub struct WidgetState {
    pub messages: Vec<Message>,
    pub input: String,
    pub session_id: SessionId,
    pub chat_open: bool,
    pub faq_open: bool,
    pub faq: Accordion,
    pub theme: Theme,
    pub show_quick_options: bool,
    pub show_privacy_banner: bool,
    pub show_closed_chat_prompt: bool,
}

impl WidgetState {
    fn new() -> Self {
        Self {
            messages: vec![Message::greeting()],
            input: String::new(),
            session_id: SessionId::generate(),
            chat_open: false,
            faq_open: false,
            faq: Accordion::default(),
            theme: Theme::default(),
            show_quick_options: true,
            show_privacy_banner: true,
            show_closed_chat_prompt: true,
        }
    }

    /// True while the conversation holds nothing but the greeting.
    pub fn is_onboarding(&self) -> bool {
        self.messages.len() == 1 && self.messages[0].sender.is_bot()
    }
}

/// A bot message produced off the event loop, tagged with the user message
/// that caused it.
#[derive(Debug)]
pub struct Reply {
    pub request_id: String,
    pub message: Message,
}

pub struct Widget {
    state: WidgetState,
    webhook: Arc<WebhookClient>,
    bus: Arc<EventBus>,
    replies: mpsc::UnboundedSender<Reply>,
    in_flight: HashMap<String, AbortHandle>,
    quick_reply_delay: Duration,
}

impl Widget {
    /// Starts a session. The returned receiver yields replies in the order
    /// they resolve; its owner hands each one back through [`Widget::deliver`].
    pub fn new(
        webhook: Arc<WebhookClient>,
        bus: Arc<EventBus>,
        quick_reply_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Reply>) {
        let (replies, rx) = mpsc::unbounded_channel();
        let state = WidgetState::new();
        info!("Chat session {} started", state.session_id);

        let widget = Self {
            state,
            webhook,
            bus,
            replies,
            in_flight: HashMap::new(),
            quick_reply_delay,
        };
        (widget, rx)
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.state.input = value.into();
        self.bus.publish(Event::InputChanged(self.state.input.clone()));
    }

    /// Sends the current input. Returns `false` without side effects when the
    /// input is blank.
    pub fn submit(&mut self) -> bool {
        let Some(prompt) = Prompt::parse(&self.state.input) else {
            return false;
        };

        let message = Message::user(prompt.as_str());
        let request_id = message.id.clone();
        self.append(message);
        self.set_input(String::new());

        let webhook = self.webhook.clone();
        let session_id = self.state.session_id.clone();
        self.dispatch(request_id, async move {
            webhook.send_message(&prompt, &session_id).await
        });
        true
    }

    /// Answers locally after a short pause; never touches the webhook.
    pub fn choose_quick_option(&mut self, option: QuickOption) {
        let text = option.text();
        let message = Message::user(text);
        let request_id = message.id.clone();
        self.append(message);

        let delay = self.quick_reply_delay;
        self.dispatch(request_id, async move {
            tokio::time::sleep(delay).await;
            Message::bot(canned_reply(text))
        });

        self.hide(Surface::QuickOptions);
        self.hide(Surface::PrivacyBanner);
    }

    /// Appends a resolved reply, whether or not the panel is open.
    pub fn deliver(&mut self, reply: Reply) {
        self.in_flight.remove(&reply.request_id);
        self.append(reply.message);
    }

    pub fn toggle_chat(&mut self) {
        let open = !self.state.chat_open;
        self.state.chat_open = open;
        self.bus.publish(Event::ChatToggled { open });
        if open {
            self.hide(Surface::ClosedChatPrompt);
        }
    }

    pub fn close_chat(&mut self) {
        if self.state.chat_open {
            self.toggle_chat();
        }
    }

    pub fn open_faq(&mut self) {
        self.state.faq_open = true;
        self.publish_faq();
    }

    pub fn close_faq(&mut self) {
        self.state.faq_open = false;
        self.state.faq.collapse();
        self.publish_faq();
    }

    /// Toggles a 0-based FAQ item, opening the drawer if needed.
    pub fn toggle_faq_item(&mut self, index: usize) -> bool {
        if !self.state.faq.toggle(index) {
            return false;
        }
        self.state.faq_open = true;
        self.publish_faq();
        true
    }

    pub fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        self.bus.publish(Event::ThemeChanged(self.state.theme));
    }

    pub fn dismiss_privacy_banner(&mut self) {
        self.hide(Surface::PrivacyBanner);
    }

    pub fn dismiss_closed_prompt(&mut self) {
        self.hide(Surface::ClosedChatPrompt);
    }

    fn append(&mut self, message: Message) {
        debug!("Appending {} message {}", message.sender, message.id);
        self.state.messages.push(message.clone());
        self.bus.publish(Event::MessageAppended(message));
    }

    fn hide(&mut self, surface: Surface) {
        let flag = match surface {
            Surface::QuickOptions => &mut self.state.show_quick_options,
            Surface::PrivacyBanner => &mut self.state.show_privacy_banner,
            Surface::ClosedChatPrompt => &mut self.state.show_closed_chat_prompt,
        };
        if *flag {
            *flag = false;
            self.bus.publish(Event::Dismissed(surface));
        }
    }

    fn publish_faq(&self) {
        self.bus.publish(Event::FaqChanged {
            open: self.state.faq_open,
            expanded: self.state.faq.expanded(),
        });
    }

    // Runs `reply` off the event loop. A failed task still yields a bot
    // message; an aborted one yields nothing.
    fn dispatch<F>(&mut self, request_id: String, reply: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let task = tokio::spawn(reply);
        self.in_flight
            .insert(request_id.clone(), task.abort_handle());

        let tx = self.replies.clone();
        tokio::spawn(async move {
            let message = match task.await {
                Ok(message) => message,
                Err(e) if e.is_cancelled() => return,
                Err(e) => {
                    error!("Error sending message: {}", e);
                    Message::bot(SEND_FAILURE)
                }
            };
            let _ = tx.send(Reply {
                request_id,
                message,
            });
        });
    }
}

impl Drop for Widget {
    fn drop(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        info!("Chat session {} ended", self.state.session_id);
    }
}
