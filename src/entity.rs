use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message. Fixed when the message is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn is_bot(&self) -> bool {
        matches!(self, Sender::Bot)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
        let parsed: Sender = serde_json::from_str("\"bot\"").unwrap();
        assert_eq!(parsed, Sender::Bot);
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(Sender::User.to_string(), "user");
        assert!(Sender::Bot.is_bot());
        assert!(!Sender::User.is_bot());
    }
}
