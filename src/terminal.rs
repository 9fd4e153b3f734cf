use crate::bus::Event;
use crate::quick::QuickOption;
use crate::view;
use crate::widget::{Reply, Widget};
use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use crossterm::ExecutableCommand;
use std::borrow::Cow;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

pub const HELP: &str = "\
Type a message and press Enter to send it.
  /open  /close  /toggle     show or hide the chat panel
  /option <n>                pick a quick option
  /faq  /faq <n>  /faq close browse the FAQ drawer
  /dismiss privacy|prompt    hide the privacy notice or closed-chat prompt
  /theme                     switch light/dark
  /help  /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Open,
    Close,
    Toggle,
    Faq,
    FaqItem(usize),
    FaqClose,
    QuickOption(QuickOption),
    DismissPrivacy,
    DismissPrompt,
    Theme,
    Help,
    Quit,
    Unknown(String),
}

/// Turns one raw stdin line into text. Invalid UTF-8 is replaced rather
/// than rejected so a stray byte never ends the session.
pub fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!("Input line was not valid UTF-8, replaced invalid bytes");
            text
        }
    }
}

/// Anything not starting with `/` is message text.
pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("open", None) => Command::Open,
        ("close", None) => Command::Close,
        ("toggle", None) => Command::Toggle,
        ("faq", None) => Command::Faq,
        ("faq", Some("close")) => Command::FaqClose,
        ("faq", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Command::FaqItem(n - 1),
            _ => Command::Unknown(trimmed.to_string()),
        },
        ("option", Some(n)) => n
            .parse::<usize>()
            .ok()
            .and_then(QuickOption::from_index)
            .map(Command::QuickOption)
            .unwrap_or_else(|| Command::Unknown(trimmed.to_string())),
        ("dismiss", Some("privacy")) => Command::DismissPrivacy,
        ("dismiss", Some("prompt")) => Command::DismissPrompt,
        ("theme", None) => Command::Theme,
        ("help", None) => Command::Help,
        ("quit", None) | ("exit", None) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

pub struct Terminal {
    widget: Widget,
    replies: mpsc::UnboundedReceiver<Reply>,
    events: broadcast::Receiver<Event>,
    viewport: usize,
    notice: Option<String>,
}

impl Terminal {
    pub fn new(
        widget: Widget,
        replies: mpsc::UnboundedReceiver<Reply>,
        events: broadcast::Receiver<Event>,
        viewport: usize,
    ) -> Self {
        Self {
            widget,
            replies,
            events,
            viewport,
            notice: None,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
        self.redraw()?;

        loop {
            tokio::select! {
                line = lines.next_segment() => {
                    match line {
                        Ok(Some(bytes)) => {
                            if !self.handle(parse(&decode_line(&bytes))) {
                                break;
                            }
                            // Commands that change nothing still need their notice shown
                            if self.notice.is_some() {
                                self.redraw()?;
                            }
                        }
                        Ok(None) => {
                            info!("Input closed, leaving chat");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to read input, leaving chat: {}", e);
                            break;
                        }
                    }
                }
                Some(reply) = self.replies.recv() => {
                    self.widget.deliver(reply);
                    debug!("{} exchanges still in flight", self.widget.in_flight());
                }
                event = self.events.recv() => {
                    match event {
                        Ok(event) => debug!("Widget event: {:?}", event),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("Renderer skipped {} widget events", n);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                    // One redraw per burst of events
                    while self.events.try_recv().is_ok() {}
                    self.redraw()?;
                }
            }
        }

        Ok(())
    }

    /// Applies one command to the widget. Returns `false` when the visitor
    /// asked to leave.
    pub fn handle(&mut self, command: Command) -> bool {
        self.notice = None;
        let state = self.widget.state();

        match command {
            Command::Send(text) => {
                if !state.chat_open {
                    self.notice = Some("Open the chat with /open to send a message.".into());
                } else {
                    self.widget.set_input(text);
                    self.widget.submit();
                }
            }
            Command::Open => {
                if !state.chat_open {
                    self.widget.toggle_chat();
                }
            }
            Command::Close => self.widget.close_chat(),
            Command::Toggle => self.widget.toggle_chat(),
            Command::Faq => self.widget.open_faq(),
            Command::FaqItem(index) => {
                if !self.widget.toggle_faq_item(index) {
                    self.notice = Some(format!("There is no FAQ item {}.", index + 1));
                }
            }
            Command::FaqClose => self.widget.close_faq(),
            Command::QuickOption(option) => {
                if state.chat_open && state.is_onboarding() && state.show_quick_options {
                    self.widget.choose_quick_option(option);
                } else {
                    self.notice = Some("Quick options are no longer available.".into());
                }
            }
            Command::DismissPrivacy => self.widget.dismiss_privacy_banner(),
            Command::DismissPrompt => self.widget.dismiss_closed_prompt(),
            Command::Theme => self.widget.toggle_theme(),
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Quit => return false,
            Command::Unknown(raw) => {
                self.notice = Some(format!("Unknown command {}. Try /help.", raw));
            }
        }
        true
    }

    fn redraw(&self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.execute(Clear(ClearType::All))?.execute(MoveTo(0, 0))?;
        writeln!(out, "{}", view::render(self.widget.state(), self.viewport))?;
        if let Some(notice) = &self.notice {
            writeln!(out, "\n{}", notice)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::webhook::{WebhookClient, DEFAULT_ACTION};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn plain_text_is_a_send() {
        assert_eq!(parse("hello /there"), Command::Send("hello /there".into()));
        assert_eq!(parse("   "), Command::Send("   ".into()));
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse("/open"), Command::Open);
        assert_eq!(parse(" /close "), Command::Close);
        assert_eq!(parse("/faq"), Command::Faq);
        assert_eq!(parse("/faq 2"), Command::FaqItem(1));
        assert_eq!(parse("/faq close"), Command::FaqClose);
        assert_eq!(parse("/option 1"), Command::QuickOption(QuickOption::GetHelp));
        assert_eq!(parse("/dismiss privacy"), Command::DismissPrivacy);
        assert_eq!(parse("/dismiss prompt"), Command::DismissPrompt);
        assert_eq!(parse("/exit"), Command::Quit);
    }

    #[test]
    fn bad_arguments_are_unknown() {
        assert!(matches!(parse("/option 9"), Command::Unknown(_)));
        assert!(matches!(parse("/faq 0"), Command::Unknown(_)));
        assert!(matches!(parse("/dance"), Command::Unknown(_)));
    }

    fn terminal() -> Terminal {
        let webhook = Arc::new(
            WebhookClient::new("http://127.0.0.1:9/webhook/chat", DEFAULT_ACTION, None).unwrap(),
        );
        let bus = Arc::new(EventBus::new());
        let events = bus.subscribe();
        let (widget, replies) = Widget::new(webhook, bus, Duration::from_millis(1));
        Terminal::new(widget, replies, events, 20)
    }

    #[tokio::test]
    async fn sending_requires_open_panel() {
        let mut term = terminal();
        assert!(term.handle(Command::Send("hi".into())));
        assert_eq!(term.widget.state().messages.len(), 1);
        assert!(term.notice.is_some());

        term.handle(Command::Open);
        term.handle(Command::Send("hi".into()));
        assert_eq!(term.widget.state().messages.len(), 2);
    }

    #[tokio::test]
    async fn quick_options_vanish_after_use() {
        let mut term = terminal();
        term.handle(Command::Open);
        term.handle(Command::QuickOption(QuickOption::ExploreFeatures));
        assert_eq!(term.widget.state().messages.len(), 2);

        term.handle(Command::QuickOption(QuickOption::GetHelp));
        assert_eq!(term.widget.state().messages.len(), 2);
        assert!(term.notice.is_some());
    }

    #[test]
    fn decode_line_strips_carriage_return() {
        assert_eq!(decode_line(b"/open\r"), "/open");
        assert_eq!(parse(&decode_line(b"/open\r")), Command::Open);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let text = decode_line(b"caf\xe9 \xff\xfe ok");
        assert!(text.starts_with("caf"));
        assert!(text.ends_with(" ok"));
        assert!(text.contains(char::REPLACEMENT_CHARACTER));
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_still_sent() {
        let mut term = terminal();
        term.handle(Command::Open);

        assert!(term.handle(parse(&decode_line(b"my bike \xff won't start\n"))));

        let last = term.widget.state().messages.last().unwrap();
        assert!(last.text.starts_with("my bike"));
        assert!(last.text.contains(char::REPLACEMENT_CHARACTER));
    }

    #[tokio::test]
    async fn open_is_idempotent_and_quit_stops() {
        let mut term = terminal();
        term.handle(Command::Open);
        term.handle(Command::Open);
        assert!(term.widget.state().chat_open);
        assert!(!term.handle(Command::Quit));
    }
}
