pub const TITLE: &str = "FREQUENTLY ASKED QUESTIONS";
pub const DESCRIPTION: &str = "Here are some common questions about Amigo.";

pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const ENTRIES: [FaqEntry; 4] = [
    FaqEntry {
        question: "What is Amigo Virtual Assistant?",
        answer: "Amigo is an AI-powered virtual assistant designed to help you with your unit and provide support.",
    },
    FaqEntry {
        question: "How do I find my unit's serial number?",
        answer: "The serial number is usually located on a sticker or plate on the frame of the unit, often near the battery or the seat post. It will typically start with \"AMI\".",
    },
    FaqEntry {
        question: "What if I can't find the serial number?",
        answer: "If you can't find the serial number, Amigo can try to help you with a few common troubleshooting spots or other identifying information.",
    },
    FaqEntry {
        question: "Is my conversation with Amigo private?",
        answer: "Yes, your conversation is processed securely. We prioritize your privacy. For more details, please refer to our privacy policy.",
    },
];

/// Single-open, collapsible accordion over [`ENTRIES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accordion {
    expanded: Option<usize>,
}

impl Accordion {
    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    /// Opens `index`, or collapses it if it is already open. Out-of-range
    /// indices are ignored and return `false`.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= ENTRIES.len() {
            return false;
        }
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        true
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_item_open_at_a_time() {
        let mut accordion = Accordion::default();
        assert!(accordion.toggle(0));
        assert!(accordion.toggle(2));
        assert_eq!(accordion.expanded(), Some(2));
    }

    #[test]
    fn toggling_open_item_collapses_it() {
        let mut accordion = Accordion::default();
        accordion.toggle(1);
        accordion.toggle(1);
        assert_eq!(accordion.expanded(), None);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut accordion = Accordion::default();
        accordion.toggle(1);
        assert!(!accordion.toggle(ENTRIES.len()));
        assert_eq!(accordion.expanded(), Some(1));
    }
}
