//! Intent classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user is asking for in one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    AskTime,
    AskDate,
    AskJoke,
    AskCapability,
    Farewell,
    /// Nothing in the keyword table matched
    Unknown,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::AskTime => "ask_time",
            Intent::AskDate => "ask_date",
            Intent::AskJoke => "ask_joke",
            Intent::AskCapability => "ask_capability",
            Intent::Farewell => "farewell",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table, evaluated top to bottom. The first intent with a matching
/// keyword wins, so this order is the tie-break between intents.
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::Farewell,
        &[
            "bye",
            "goodbye",
            "good bye",
            "bye bye",
            "see you",
            "see ya",
            "farewell",
            "quit",
            "exit",
            "hang up",
            "that's all",
        ],
    ),
    (
        Intent::AskTime,
        &[
            "what time",
            "the time",
            "time is it",
            "current time",
            "time now",
            "clock",
        ],
    ),
    (
        Intent::AskDate,
        &[
            "what date",
            "the date",
            "today's date",
            "date today",
            "what day",
            "which day",
            "day is it",
        ],
    ),
    (
        Intent::AskJoke,
        &[
            "joke",
            "jokes",
            "make me laugh",
            "something funny",
            "funny",
        ],
    ),
    (
        Intent::AskCapability,
        &[
            "what can you do",
            "what do you do",
            "help",
            "capabilities",
            "who are you",
            "what are you",
        ],
    ),
    (
        Intent::Greeting,
        &[
            "hi",
            "hello",
            "hey",
            "hiya",
            "howdy",
            "greetings",
            "good morning",
            "good afternoon",
            "good evening",
        ],
    ),
];

/// Lowercase, turn punctuation and control characters into spaces, trim and
/// collapse runs of whitespace into one space.
///
/// Apostrophes are kept so contractions like "what's" stay one word.
pub fn normalize(utterance: &str) -> String {
    let cleaned: String = utterance
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify an already-normalized utterance.
///
/// Keywords match on word boundaries: "hi" matches "hi there" but not "this".
pub fn classify(normalized: &str) -> Intent {
    if normalized.is_empty() {
        return Intent::Unknown;
    }

    let padded = format!(" {normalized} ");
    INTENT_RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| padded.contains(&format!(" {keyword} ")))
        })
        .map_or(Intent::Unknown, |(intent, _)| *intent)
}
