//! Top-level intent detection.
//!
//! A small fixed keyword/button-id table, not free-form NLP. Applied only
//! when no journey is active; unmatched input re-shows the top-level menu
//! without touching state.

use crate::domain::foundation::Language;
use crate::ports::InboundPayload;

/// Keywords that start a loan application.
const APPLY_KEYWORDS: &[&str] = &["apply", "loan", "finance", "start", "continue"];

/// Keywords that open the support desk.
const SUPPORT_KEYWORDS: &[&str] = &[
    "support", "help", "emi", "statement", "status", "issue", "problem", "agent",
];

/// A routed top-level intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevelIntent {
    /// A language was chosen from the top-level menu.
    Language(Language),
    /// The user asked to change languages ("language").
    ShowLanguageMenu,
    /// Start the onboarding journey.
    StartLoan,
    /// Open the support desk.
    OpenSupport,
    /// Open the post-loan menu (only offered once a loan is disbursed).
    OpenPostLoanMenu,
}

/// Detects a top-level intent from an inbound payload.
///
/// `has_active_loan` gates the post-loan options; it is read from the
/// session flags by the caller.
pub fn detect(payload: &InboundPayload, has_active_loan: bool) -> Option<TopLevelIntent> {
    match payload {
        InboundPayload::Selection(id) => detect_selection(id, has_active_loan),
        InboundPayload::Text(text) => detect_text(text, has_active_loan),
        InboundPayload::Media(_) => None,
    }
}

fn detect_selection(id: &str, has_active_loan: bool) -> Option<TopLevelIntent> {
    match id {
        "lang_en" => Some(TopLevelIntent::Language(Language::En)),
        "lang_hi" => Some(TopLevelIntent::Language(Language::Hi)),
        "intent_get_loan" => Some(TopLevelIntent::StartLoan),
        "intent_support" | "connect_agent" => Some(TopLevelIntent::OpenSupport),
        _ if id.starts_with("post_") && has_active_loan => Some(TopLevelIntent::OpenPostLoanMenu),
        _ => None,
    }
}

fn detect_text(text: &str, has_active_loan: bool) -> Option<TopLevelIntent> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if normalized == "language" {
        return Some(TopLevelIntent::ShowLanguageMenu);
    }
    if let Some(language) = Language::from_input(&normalized) {
        return Some(TopLevelIntent::Language(language));
    }
    if has_active_loan && normalized == "menu" {
        return Some(TopLevelIntent::OpenPostLoanMenu);
    }
    if SUPPORT_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        return Some(TopLevelIntent::OpenSupport);
    }
    if APPLY_KEYWORDS.iter().any(|k| normalized.contains(k)) {
        return Some(TopLevelIntent::StartLoan);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MediaKind;

    fn text(s: &str) -> InboundPayload {
        InboundPayload::Text(s.to_string())
    }

    fn selection(s: &str) -> InboundPayload {
        InboundPayload::Selection(s.to_string())
    }

    #[test]
    fn loan_keywords_start_onboarding() {
        assert_eq!(
            detect(&text("I want a loan"), false),
            Some(TopLevelIntent::StartLoan)
        );
        assert_eq!(detect(&text("APPLY"), false), Some(TopLevelIntent::StartLoan));
        assert_eq!(
            detect(&selection("intent_get_loan"), false),
            Some(TopLevelIntent::StartLoan)
        );
    }

    #[test]
    fn support_keywords_win_over_loan_keywords() {
        // "problem with my loan" mentions both; support is checked first.
        assert_eq!(
            detect(&text("problem with my loan"), false),
            Some(TopLevelIntent::OpenSupport)
        );
    }

    #[test]
    fn language_selection_is_detected() {
        assert_eq!(
            detect(&selection("lang_hi"), false),
            Some(TopLevelIntent::Language(Language::Hi))
        );
        assert_eq!(
            detect(&text("English"), false),
            Some(TopLevelIntent::Language(Language::En))
        );
        assert_eq!(
            detect(&text("language"), false),
            Some(TopLevelIntent::ShowLanguageMenu)
        );
    }

    #[test]
    fn post_loan_options_require_a_disbursed_loan() {
        assert_eq!(detect(&selection("post_view"), false), None);
        assert_eq!(
            detect(&selection("post_view"), true),
            Some(TopLevelIntent::OpenPostLoanMenu)
        );
        assert_eq!(
            detect(&text("menu"), true),
            Some(TopLevelIntent::OpenPostLoanMenu)
        );
    }

    #[test]
    fn unmatched_input_yields_none() {
        assert_eq!(detect(&text("good morning"), false), None);
        assert_eq!(detect(&text("   "), false), None);
        assert_eq!(detect(&InboundPayload::Media(MediaKind::Image), false), None);
    }
}
