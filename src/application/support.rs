//! Support knowledge base.
//!
//! First stage of the support pipeline: a deterministic keyword match
//! against a fixed set of answers, short-circuiting before the language
//! model port is consulted.

use crate::domain::foundation::Language;

struct KbEntry {
    keywords: &'static [&'static str],
    answer_en: &'static str,
    answer_hi: &'static str,
}

const KNOWLEDGE_BASE: &[KbEntry] = &[
    KbEntry {
        keywords: &["emi", "pay my", "repay", "payment"],
        answer_en: "You can pay via the Lendline app, netbanking or UPI. Reply PAY LINK for a payment link.",
        answer_hi: "आप Lendline ऐप, नेटबैंकिंग या UPI से भुगतान कर सकते हैं। भुगतान लिंक के लिए PAY LINK लिखें।",
    },
    KbEntry {
        keywords: &["loan status", "check my loan", "application status", "status"],
        answer_en: "Open the Lendline app > My Loans, or ask me to show your loan details.",
        answer_hi: "Lendline ऐप में My Loans खोलें, या मुझसे लोन विवरण दिखाने को कहें।",
    },
    KbEntry {
        keywords: &["interest", "apr", "rate"],
        answer_en: "Your interest rate is fixed at offer selection and shown in your loan details.",
        answer_hi: "आपकी ब्याज दर ऑफ़र चुनते समय तय होती है और लोन विवरण में दिखती है।",
    },
];

/// Returns the canned answer for a question, if any keyword matches.
pub fn knowledge_base_answer(question: &str, language: Language) -> Option<&'static str> {
    let normalized = question.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    KNOWLEDGE_BASE
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| normalized.contains(k)))
        .map(|entry| match language {
            Language::En => entry.answer_en,
            Language::Hi => entry.answer_hi,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_emi_questions() {
        let answer = knowledge_base_answer("How can I pay my EMI?", Language::En);
        assert!(answer.unwrap().contains("PAY LINK"));
    }

    #[test]
    fn first_matching_entry_wins() {
        // Mentions both payment and status; the EMI entry is listed first.
        let answer = knowledge_base_answer("payment status", Language::En).unwrap();
        assert!(answer.contains("PAY LINK"));
    }

    #[test]
    fn localizes_answers() {
        let answer = knowledge_base_answer("repay", Language::Hi).unwrap();
        assert!(answer.contains("UPI"));
        assert!(answer.contains("भुगतान"));
    }

    #[test]
    fn unknown_questions_miss() {
        assert_eq!(
            knowledge_base_answer("what is the meaning of life", Language::En),
            None
        );
        assert_eq!(knowledge_base_answer("   ", Language::En), None);
    }
}
