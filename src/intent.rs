use crate::formatter::{PSY_LYRICS, THANKS_REPLY, USAGE_REPLY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Keisei Main Line status, verbatim.
    TrainLine,
    /// Area summary for the configured lines.
    TrainArea,
    Weather,
    /// Fixed reply, no scraping.
    Canned(&'static str),
    /// Greeting plus area summary and forecast. Used for unmatched text.
    Greeting,
}

// Checked in order, case-sensitive, whole-text match.
const TRIGGERS: &[(&str, Intent)] = &[
    ("運行情報", Intent::TrainLine),
    ("路線情報", Intent::TrainArea),
    ("天気", Intent::Weather),
    ("PSY", Intent::Canned(PSY_LYRICS)),
    ("ありがとう", Intent::Canned(THANKS_REPLY)),
    ("使い方", Intent::Canned(USAGE_REPLY)),
];

impl Intent {
    pub fn from_text(text: &str) -> Self {
        TRIGGERS
            .iter()
            .find(|(trigger, _)| *trigger == text)
            .map(|(_, intent)| *intent)
            .unwrap_or(Intent::Greeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_triggers_map_to_intents() {
        assert_eq!(Intent::from_text("運行情報"), Intent::TrainLine);
        assert_eq!(Intent::from_text("路線情報"), Intent::TrainArea);
        assert_eq!(Intent::from_text("天気"), Intent::Weather);
        assert_eq!(Intent::from_text("PSY"), Intent::Canned(PSY_LYRICS));
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        assert_eq!(Intent::from_text("psy"), Intent::Greeting);
        assert_eq!(Intent::from_text("PSY "), Intent::Greeting);
        assert_eq!(Intent::from_text("今日の天気"), Intent::Greeting);
        assert_eq!(Intent::from_text(""), Intent::Greeting);
    }
}
