//! Field validation: pure functions turning raw user input into typed
//! values.
//!
//! Malformed input is an expected, recoverable case, not a fault: the
//! validator returns a discriminated result and never panics. Rules mirror
//! what the lending flow asks for at each step (name, date of birth,
//! income, consent, option selection).

mod value;

pub use value::FieldValue;

use chrono::NaiveDate;

/// Date-of-birth formats accepted from typed input.
pub const ACCEPTED_DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// Affirmative replies, case-insensitive, English and Hindi.
const AFFIRMATIVE: &[&str] = &[
    "yes", "y", "ok", "okay", "sure", "agree", "accept", "consent", "haan", "haanji", "ha", "ji",
    "हाँ", "हां", "जी", "consent_yes", "agree_yes",
];

/// Negative replies, case-insensitive, English and Hindi.
const NEGATIVE: &[&str] = &[
    "no", "n", "nah", "na", "nahi", "nahin", "stop", "reject", "decline", "नहीं", "consent_no",
    "agree_no",
];

/// The validation a pending step asks for.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind<'a> {
    /// Non-empty text after trimming.
    FreeText,
    /// A date of birth within the configured age window.
    Date { min_age: u32, max_age: u32 },
    /// A positive amount; currency symbols and separators are stripped.
    Numeric,
    /// An affirmative/negative reply in either supported language.
    Boolean,
    /// One of the currently valid (option id, label) pairs.
    Choice { options: &'a [(String, String)] },
}

/// Why an input was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    Empty,
    Unparseable,
    FutureDate,
    Underage { age: u32, minimum: u32 },
    Overage { age: u32, maximum: u32 },
    NotNumeric,
    NonPositive,
    Ambiguous,
    UnknownOption,
}

/// Validates raw input against a field kind.
///
/// `today` anchors age computation so callers stay deterministic in tests.
/// Returns the typed value or the reason the input was rejected; never
/// errors on malformed input.
pub fn validate(kind: FieldKind<'_>, raw: &str, today: NaiveDate) -> Result<FieldValue, InvalidInput> {
    match kind {
        FieldKind::FreeText => validate_free_text(raw),
        FieldKind::Date { min_age, max_age } => validate_date(raw, today, min_age, max_age),
        FieldKind::Numeric => validate_numeric(raw),
        FieldKind::Boolean => validate_boolean(raw),
        FieldKind::Choice { options } => validate_choice(raw, options),
    }
}

fn validate_free_text(raw: &str) -> Result<FieldValue, InvalidInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidInput::Empty);
    }
    Ok(FieldValue::Text(trimmed.to_string()))
}

fn validate_date(
    raw: &str,
    today: NaiveDate,
    min_age: u32,
    max_age: u32,
) -> Result<FieldValue, InvalidInput> {
    let trimmed = raw.trim();
    let date = ACCEPTED_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or(InvalidInput::Unparseable)?;

    if date > today {
        return Err(InvalidInput::FutureDate);
    }
    // Whole years between the date and today.
    let age = today.years_since(date).unwrap_or(0);
    if age < min_age {
        return Err(InvalidInput::Underage { age, minimum: min_age });
    }
    if age > max_age {
        return Err(InvalidInput::Overage { age, maximum: max_age });
    }
    Ok(FieldValue::Date(date))
}

fn validate_numeric(raw: &str) -> Result<FieldValue, InvalidInput> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("₹")
        .trim_start_matches("Rs.")
        .trim_start_matches("rs.")
        .chars()
        .filter(|c| !matches!(*c, ',' | ' ' | '₹'))
        .collect();
    if cleaned.is_empty() {
        return Err(InvalidInput::NotNumeric);
    }
    let amount: f64 = cleaned.parse().map_err(|_| InvalidInput::NotNumeric)?;
    if !amount.is_finite() {
        return Err(InvalidInput::NotNumeric);
    }
    if amount <= 0.0 {
        return Err(InvalidInput::NonPositive);
    }
    Ok(FieldValue::Number(amount))
}

fn validate_boolean(raw: &str) -> Result<FieldValue, InvalidInput> {
    let candidate = raw.trim().to_lowercase();
    if AFFIRMATIVE.contains(&candidate.as_str()) {
        return Ok(FieldValue::Bool(true));
    }
    if NEGATIVE.contains(&candidate.as_str()) {
        return Ok(FieldValue::Bool(false));
    }
    Err(InvalidInput::Ambiguous)
}

/// Matches the option id first, then falls back to a case-insensitive label
/// match so typed replies to button prompts are accepted.
fn validate_choice(raw: &str, options: &[(String, String)]) -> Result<FieldValue, InvalidInput> {
    let trimmed = raw.trim();
    if let Some((id, _)) = options.iter().find(|(id, _)| id == trimmed) {
        return Ok(FieldValue::Text(id.clone()));
    }
    let lowered = trimmed.to_lowercase();
    if let Some((id, _)) = options
        .iter()
        .find(|(_, label)| label.to_lowercase() == lowered)
    {
        return Ok(FieldValue::Text(id.clone()));
    }
    Err(InvalidInput::UnknownOption)
}
