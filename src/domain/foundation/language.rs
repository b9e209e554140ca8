//! Supported conversation languages.

use serde::{Deserialize, Serialize};

/// Language a conversation is conducted in.
///
/// Once set on a session it persists across journeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Returns the ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
        }
    }

    /// Returns the language name as shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिंदी",
        }
    }

    /// Parses a language from an option id or typed reply.
    pub fn from_input(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "lang_en" | "en" | "english" | "1" => Some(Self::En),
            "lang_hi" | "hi" | "hindi" | "हिंदी" | "2" => Some(Self::Hi),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_option_ids_and_typed_names() {
        assert_eq!(Language::from_input("lang_en"), Some(Language::En));
        assert_eq!(Language::from_input("English"), Some(Language::En));
        assert_eq!(Language::from_input("1"), Some(Language::En));
        assert_eq!(Language::from_input("हिंदी"), Some(Language::Hi));
        assert_eq!(Language::from_input(" hindi "), Some(Language::Hi));
        assert_eq!(Language::from_input("french"), None);
    }

    #[test]
    fn serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&Language::Hi).unwrap(), "\"hi\"");
    }
}
