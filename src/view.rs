use crate::chat::Message;
use crate::entity::Sender;
use crate::faq;
use crate::quick::QuickOption;
use crate::widget::WidgetState;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_width::UnicodeWidthStr;

pub const PANEL_WIDTH: usize = 56;
const BUBBLE_WIDTH: usize = 40;

pub const LOGO_ALT: &str = "Amigo Virtual Assistant";
pub const EMPTY_LIST: &str = "No messages yet. Start the conversation!";
pub const ONBOARDING_HINT: &str = "Ask me or select an option below.";
pub const PRIVACY_NOTICE: &str = "Amigo uses the information you provide to us to contact you about our relevant content, products, and services. You may unsubscribe from these communications at any time. For more information, check out our privacy policy.";
pub const COMPOSER_PLACEHOLDER: &str = "Write a message";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "☀ light"),
            Theme::Dark => write!(f, "☾ dark"),
        }
    }
}

/// Renders the whole page: panel or closed prompt, the floating button, and
/// the FAQ drawer when open. `viewport` bounds the message list height.
pub fn render(state: &WidgetState, viewport: usize) -> String {
    let mut lines = Vec::new();

    if state.chat_open {
        lines.extend(header(state.theme));
        lines.extend(message_list(&state.messages, viewport));
        if state.is_onboarding() {
            lines.extend(onboarding(state.show_quick_options));
        }
        if state.show_privacy_banner {
            lines.extend(privacy_banner());
        }
        lines.push(composer(&state.input));
    } else if state.show_closed_chat_prompt {
        lines.extend(closed_prompt());
    }

    lines.push(fab(state.chat_open));

    if state.faq_open {
        lines.extend(faq_drawer(state.faq.expanded()));
    }

    lines.join("\n")
}

/// Chat header. The logo is never loaded here, so its alt text stands in.
pub fn header(theme: Theme) -> Vec<String> {
    let title = format!(" {} ", LOGO_ALT);
    let controls = format!("[? FAQ] [{}] [x] ", theme);
    let gap = PANEL_WIDTH.saturating_sub(width(&title) + width(&controls));
    vec![
        rule('='),
        format!("{}{}{}", title, " ".repeat(gap), controls),
        rule('='),
    ]
}

/// Bubbles for every message, trimmed to the last `viewport` lines so the
/// latest message is always visible.
pub fn message_list(messages: &[Message], viewport: usize) -> Vec<String> {
    if messages.is_empty() {
        return vec![center(EMPTY_LIST)];
    }

    let mut lines: Vec<String> = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(bubble(message));
    }

    let skip = lines.len().saturating_sub(viewport.max(1));
    lines.split_off(skip)
}

pub fn bubble(message: &Message) -> Vec<String> {
    let mut lines = Vec::new();
    let stamp = message.timestamp.format("%H:%M").to_string();

    match message.sender {
        Sender::Bot => {
            lines.push(format!("◉ Amigo · {}", stamp));
            for line in wrap(&message.text, BUBBLE_WIDTH) {
                lines.push(format!("  {}", line));
            }
        }
        Sender::User => {
            let label = format!("You · {}", stamp);
            lines.push(right(&label));
            for line in wrap(&message.text, BUBBLE_WIDTH) {
                lines.push(right(&line));
            }
        }
    }
    lines
}

pub fn onboarding(show_quick_options: bool) -> Vec<String> {
    let mut lines = vec![String::new(), center(ONBOARDING_HINT)];
    if show_quick_options {
        for (i, option) in QuickOption::ALL.iter().enumerate() {
            lines.push(format!(
                "  [{}] {}  {}",
                i + 1,
                option.emoji(),
                option.label()
            ));
        }
    }
    lines
}

pub fn privacy_banner() -> Vec<String> {
    let mut lines = vec![rule('-')];
    let mut body = wrap(PRIVACY_NOTICE, PANEL_WIDTH - 6);
    if let Some(first) = body.first_mut() {
        let pad = (PANEL_WIDTH - 6).saturating_sub(width(first));
        first.push_str(&" ".repeat(pad));
        first.push_str(" [x]");
    }
    lines.extend(body.into_iter().map(|l| format!(" {}", l)));
    lines.push(rule('-'));
    lines
}

pub fn composer(input: &str) -> String {
    let send = if input.trim().is_empty() {
        "(send)"
    } else {
        "[send]"
    };
    let shown = if input.is_empty() {
        COMPOSER_PLACEHOLDER
    } else {
        input
    };
    format!("> {}  {}", shown, send)
}

pub fn closed_prompt() -> Vec<String> {
    let mut lines = vec![format!("◉{}[x]", " ".repeat(PANEL_WIDTH - 4))];
    lines.extend(
        wrap(crate::chat::GREETING, PANEL_WIDTH - 4)
            .into_iter()
            .map(|l| format!("  {}", l)),
    );
    lines
}

pub fn fab(chat_open: bool) -> String {
    let label = if chat_open {
        "( x ) Close chat"
    } else {
        "( 💬 ) Open chat"
    };
    right(label)
}

pub fn faq_drawer(expanded: Option<usize>) -> Vec<String> {
    let mut lines = vec![
        rule('#'),
        format!(" {}", faq::TITLE),
        format!(" {}", faq::DESCRIPTION),
        String::new(),
    ];
    for (i, entry) in faq::ENTRIES.iter().enumerate() {
        let open = expanded == Some(i);
        let marker = if open { "▾" } else { "▸" };
        lines.push(format!(" {} {}. {}", marker, i + 1, entry.question));
        if open {
            lines.extend(
                wrap(entry.answer, PANEL_WIDTH - 6)
                    .into_iter()
                    .map(|l| format!("     {}", l)),
            );
        }
    }
    lines.push(String::new());
    lines.push(" [Close FAQ]".to_string());
    lines.push(rule('#'));
    lines
}

/// Wraps on display columns, so wide characters count double.
pub fn wrap(text: &str, max: usize) -> Vec<String> {
    textwrap::wrap(text, max)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

fn width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn rule(c: char) -> String {
    c.to_string().repeat(PANEL_WIDTH)
}

fn right(s: &str) -> String {
    format!("{}{}", " ".repeat(PANEL_WIDTH.saturating_sub(width(s))), s)
}

fn center(s: &str) -> String {
    let pad = PANEL_WIDTH.saturating_sub(width(s)) / 2;
    format!("{}{}", " ".repeat(pad), s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WidgetState {
        WidgetState {
            messages: vec![Message::greeting()],
            input: String::new(),
            session_id: crate::chat::SessionId::generate(),
            chat_open: false,
            faq_open: false,
            faq: faq::Accordion::default(),
            theme: Theme::Light,
            show_quick_options: true,
            show_privacy_banner: true,
            show_closed_chat_prompt: true,
        }
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.width() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn wrap_splits_long_words() {
        let lines = wrap("abcdefghijkl", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn list_scrolls_to_latest() {
        let mut messages = vec![Message::greeting()];
        for i in 0..20 {
            messages.push(Message::user(format!("message number {}", i)));
        }
        let lines = message_list(&messages, 4);
        assert_eq!(lines.len(), 4);
        assert!(lines.last().unwrap().contains("message number 19"));
    }

    #[test]
    fn empty_list_shows_placeholder() {
        let lines = message_list(&[], 10);
        assert!(lines[0].contains(EMPTY_LIST));
    }

    #[test]
    fn user_bubbles_are_right_aligned() {
        let lines = bubble(&Message::user("hi"));
        assert!(lines[1].ends_with("hi"));
        assert_eq!(lines[1].width(), PANEL_WIDTH);
    }

    #[test]
    fn closed_widget_shows_prompt_and_open_button() {
        let out = render(&state(), 20);
        assert!(out.contains("Need some assistance?"));
        assert!(out.contains("Open chat"));
        assert!(!out.contains(LOGO_ALT));
    }

    #[test]
    fn open_widget_shows_onboarding() {
        let mut s = state();
        s.chat_open = true;
        s.show_closed_chat_prompt = false;
        let out = render(&s, 20);
        assert!(out.contains(LOGO_ALT));
        assert!(out.contains(ONBOARDING_HINT));
        assert!(out.contains("Get Help With My Amigo"));
        assert!(out.contains("unsubscribe"));
        assert!(out.contains(COMPOSER_PLACEHOLDER));
        assert!(out.contains("Close chat"));
    }

    #[test]
    fn onboarding_disappears_after_first_exchange() {
        let mut s = state();
        s.chat_open = true;
        s.messages.push(Message::user("hello"));
        let out = render(&s, 40);
        assert!(!out.contains(ONBOARDING_HINT));
    }

    #[test]
    fn hidden_quick_options_keep_the_hint() {
        let lines = onboarding(false);
        assert!(lines.iter().any(|l| l.contains(ONBOARDING_HINT)));
        assert!(!lines.iter().any(|l| l.contains("[1]")));
    }

    #[test]
    fn faq_drawer_expands_one_answer() {
        let mut s = state();
        s.faq_open = true;
        s.faq.toggle(1);
        let out = render(&s, 20);
        assert!(out.contains(faq::TITLE));
        assert!(out.contains("sticker"));
        assert!(!out.contains("AI-powered"));
    }

    #[test]
    fn composer_disables_send_for_blank_input() {
        assert!(composer("   ").ends_with("(send)"));
        assert!(composer("hi").ends_with("[send]"));
    }

    #[test]
    fn header_shows_theme() {
        assert!(header(Theme::Dark)[1].contains("dark"));
    }

    #[test]
    fn wide_characters_stay_inside_the_panel() {
        let mut s = state();
        s.chat_open = true;
        s.show_closed_chat_prompt = false;
        s.messages.push(Message::user("你好世界".repeat(5)));
        s.messages.push(Message::bot("这是一个很长的回答 🚲🚲🚲 with mixed 文字 and emoji 💬💬"));
        s.messages.push(Message::user("🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️🛠️"));

        let out = render(&s, 80);
        for line in out.lines() {
            assert!(
                line.width() <= PANEL_WIDTH,
                "{:?} is {} columns wide",
                line,
                line.width()
            );
        }
    }

    #[test]
    fn right_alignment_counts_columns() {
        let lines = bubble(&Message::user("你好世界".repeat(5)));
        assert!(lines[1..].iter().all(|l| l.width() == PANEL_WIDTH));
        assert_eq!(fab(false).width(), PANEL_WIDTH);
        assert_eq!(fab(true).width(), PANEL_WIDTH);
    }
}
