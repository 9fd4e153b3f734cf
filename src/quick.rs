/// Preset prompts offered while the conversation only holds the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickOption {
    GetHelp,
    ExploreFeatures,
    UserManuals,
}

pub const FALLBACK_REPLY: &str = "Please select an option or type your message.";

impl QuickOption {
    pub const ALL: [QuickOption; 3] = [
        QuickOption::GetHelp,
        QuickOption::ExploreFeatures,
        QuickOption::UserManuals,
    ];

    pub fn text(&self) -> &'static str {
        match self {
            QuickOption::GetHelp => "🛠️ Get Help With My Amigo",
            QuickOption::ExploreFeatures => "✨ Explore Product Features",
            QuickOption::UserManuals => "📖 Access User Manuals",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            QuickOption::GetHelp => "🛠️",
            QuickOption::ExploreFeatures => "✨",
            QuickOption::UserManuals => "📖",
        }
    }

    /// Label without the leading emoji.
    pub fn label(&self) -> &'static str {
        self.text()
            .strip_prefix(self.emoji())
            .unwrap_or(self.text())
            .trim()
    }

    /// 1-based position as shown to the visitor.
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }
}

/// Picks the canned reply for a quick-option text. First match wins.
pub fn canned_reply(text: &str) -> &'static str {
    if text.contains("Get Help") {
        "Sure! Please describe the issue you're having with your Amigo, and I'll do my best to assist."
    } else if text.contains("Explore Product Features") {
        "Great! Amigo offers a range of features including X, Y, and Z. Which one are you interested in?"
    } else if text.contains("Access User Manuals") {
        "You can find the user manuals at [link to manuals]. Is there a specific section you're looking for?"
    } else {
        FALLBACK_REPLY
    }
}
