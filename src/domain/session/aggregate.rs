//! Session aggregate entity.
//!
//! The mutable conversation state for one user identity. Mutated
//! exclusively by the dialog orchestrator after validation; the session
//! store is the sole durable owner between events.
//!
//! # Invariants
//!
//! - `current_step` is a valid step of `journey`, or `journey` is None and
//!   the step is unset
//! - `answers` only holds fields declared by the journeys advanced through;
//!   undeclared fields are rejected before insertion
//! - `offers` is written once per onboarding completion and immutable after
//!   presentation except for the chosen index

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::foundation::{Language, Timestamp, UserIdentity};
use crate::domain::journey::{self, FieldName, Journey, StepId};
use crate::domain::offer::Offer;
use crate::domain::validation::FieldValue;

/// Errors raised by session mutators when an invariant would break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("field {field:?} is not declared by journey {journey:?}")]
    UndeclaredField { field: FieldName, journey: Journey },

    #[error("step {step:?} does not belong to journey {journey:?}")]
    StepOutsideJourney { step: StepId, journey: Journey },

    #[error("journey {0:?} has no entry step")]
    JourneyWithoutSteps(Journey),

    #[error("offers are immutable once presented")]
    OffersAlreadyPresented,

    #[error("no offer at index {index}; {available} offer(s) available")]
    NoSuchOffer { index: usize, available: usize },
}

/// The conversation state for one user identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    identity: UserIdentity,
    journey: Journey,
    current_step: Option<StepId>,
    answers: BTreeMap<FieldName, FieldValue>,
    flags: BTreeMap<String, bool>,
    language: Option<Language>,
    last_activity_at: Timestamp,
    offers: Vec<Offer>,
    chosen_offer: Option<usize>,
    disbursement_reference: Option<String>,
}

impl Session {
    /// Creates a fresh session for a first-time user.
    pub fn new(identity: UserIdentity, now: Timestamp) -> Self {
        Self {
            identity,
            journey: Journey::None,
            current_step: None,
            answers: BTreeMap::new(),
            flags: BTreeMap::new(),
            language: None,
            last_activity_at: now,
            offers: Vec::new(),
            chosen_offer: None,
            disbursement_reference: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn journey(&self) -> Journey {
        self.journey
    }

    pub fn current_step(&self) -> Option<StepId> {
        self.current_step
    }

    pub fn answer(&self, field: FieldName) -> Option<&FieldValue> {
        self.answers.get(&field)
    }

    /// Returns a flag's value; unset flags read as false.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Returns the selected offer together with its index.
    pub fn chosen_offer(&self) -> Option<(usize, &Offer)> {
        self.chosen_offer
            .and_then(|idx| self.offers.get(idx).map(|o| (idx, o)))
    }

    /// Returns the backend reference of the disbursed loan, if any.
    pub fn disbursement_reference(&self) -> Option<&str> {
        self.disbursement_reference.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Records inbound activity.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity_at = now;
    }

    /// Enters a journey at its entry step.
    ///
    /// # Errors
    ///
    /// - `JourneyWithoutSteps` for journeys with no steps (i.e. `None`)
    pub fn enter(&mut self, target: Journey) -> Result<(), SessionError> {
        let entry = journey::entry_step(target).ok_or(SessionError::JourneyWithoutSteps(target))?;
        self.journey = target;
        self.current_step = Some(entry.id);
        Ok(())
    }

    /// Moves to another step of the active journey.
    ///
    /// # Errors
    ///
    /// - `StepOutsideJourney` if the step is not part of the journey
    pub fn advance_to(&mut self, step: StepId) -> Result<(), SessionError> {
        if journey::step(self.journey, step).is_none() {
            return Err(SessionError::StepOutsideJourney {
                step,
                journey: self.journey,
            });
        }
        self.current_step = Some(step);
        Ok(())
    }

    /// Leaves the active journey; the next inbound event is routed by
    /// top-level intent again.
    pub fn clear_journey(&mut self) {
        self.journey = Journey::None;
        self.current_step = None;
    }

    /// Writes a validated answer.
    ///
    /// Re-answering overwrites the previous value.
    ///
    /// # Errors
    ///
    /// - `UndeclaredField` if the active journey does not declare the field
    pub fn set_answer(&mut self, field: FieldName, value: FieldValue) -> Result<(), SessionError> {
        if !journey::declares_field(self.journey, field) {
            return Err(SessionError::UndeclaredField {
                field,
                journey: self.journey,
            });
        }
        self.answers.insert(field, value);
        Ok(())
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_string(), value);
    }

    /// Sets the conversation language. Persists across journeys and
    /// survives resets.
    pub fn set_language(&mut self, language: Language) {
        self.language = Some(language);
    }

    /// Clears the language so the selection prompt is shown again.
    pub fn clear_language(&mut self) {
        self.language = None;
    }

    /// Stores the generated offer list.
    ///
    /// # Errors
    ///
    /// - `OffersAlreadyPresented` if offers were already stored
    pub fn set_offers(&mut self, offers: Vec<Offer>) -> Result<(), SessionError> {
        if !self.offers.is_empty() {
            return Err(SessionError::OffersAlreadyPresented);
        }
        self.offers = offers;
        self.chosen_offer = None;
        Ok(())
    }

    /// Records the selected offer index.
    ///
    /// # Errors
    ///
    /// - `NoSuchOffer` if the index is out of range
    pub fn choose_offer(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.offers.len() {
            return Err(SessionError::NoSuchOffer {
                index,
                available: self.offers.len(),
            });
        }
        self.chosen_offer = Some(index);
        Ok(())
    }

    /// Records the backend reference once a loan is disbursed.
    pub fn set_disbursement_reference(&mut self, reference: impl Into<String>) {
        self.disbursement_reference = Some(reference.into());
    }

    /// Resets the conversation to the idle state.
    ///
    /// Language is kept; everything else is dropped. The previous data is
    /// not recoverable from the session (the audit trail lives elsewhere).
    pub fn reset(&mut self) {
        self.journey = Journey::None;
        self.current_step = None;
        self.answers.clear();
        self.flags.clear();
        self.offers.clear();
        self.chosen_offer = None;
        self.disbursement_reference = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> UserIdentity {
        UserIdentity::new("919876543210").unwrap()
    }

    fn session() -> Session {
        Session::new(identity(), Timestamp::now())
    }

    #[test]
    fn new_session_is_idle() {
        let s = session();
        assert_eq!(s.journey(), Journey::None);
        assert_eq!(s.current_step(), None);
        assert_eq!(s.language(), None);
    }

    #[test]
    fn enter_positions_at_entry_step() {
        let mut s = session();
        s.enter(Journey::Onboarding).unwrap();
        assert_eq!(s.journey(), Journey::Onboarding);
        assert_eq!(s.current_step(), Some(StepId::LanguageSelect));
    }

    #[test]
    fn enter_rejects_journey_without_steps() {
        let mut s = session();
        assert_eq!(
            s.enter(Journey::None),
            Err(SessionError::JourneyWithoutSteps(Journey::None))
        );
    }

    #[test]
    fn advance_rejects_foreign_steps() {
        let mut s = session();
        s.enter(Journey::Onboarding).unwrap();
        assert_eq!(
            s.advance_to(StepId::BankDetails),
            Err(SessionError::StepOutsideJourney {
                step: StepId::BankDetails,
                journey: Journey::Onboarding,
            })
        );
    }

    #[test]
    fn answers_are_limited_to_declared_fields() {
        let mut s = session();
        s.enter(Journey::Onboarding).unwrap();
        assert!(s
            .set_answer(FieldName::FullName, FieldValue::Text("Jane".into()))
            .is_ok());
        assert_eq!(
            s.set_answer(FieldName::BankDetails, FieldValue::Text("x".into())),
            Err(SessionError::UndeclaredField {
                field: FieldName::BankDetails,
                journey: Journey::Onboarding,
            })
        );
    }

    #[test]
    fn re_answer_overwrites() {
        let mut s = session();
        s.enter(Journey::Onboarding).unwrap();
        s.set_answer(FieldName::FullName, FieldValue::Text("Jane".into()))
            .unwrap();
        s.set_answer(FieldName::FullName, FieldValue::Text("Jane Doe".into()))
            .unwrap();
        assert_eq!(
            s.answer(FieldName::FullName).and_then(|v| v.as_text()),
            Some("Jane Doe")
        );
    }

    #[test]
    fn unset_flags_read_false() {
        let s = session();
        assert!(!s.flag("consent_given"));
    }

    #[test]
    fn offers_are_write_once() {
        let mut s = session();
        let offer = Offer {
            amount: 50_000,
            apr: 18.0,
            term_months: 6,
            monthly_emi: 8_800,
            processing_fee_pct: 3.0,
        };
        s.set_offers(vec![offer.clone()]).unwrap();
        assert_eq!(
            s.set_offers(vec![offer]),
            Err(SessionError::OffersAlreadyPresented)
        );
    }

    #[test]
    fn choose_offer_checks_bounds() {
        let mut s = session();
        s.set_offers(vec![Offer {
            amount: 50_000,
            apr: 18.0,
            term_months: 6,
            monthly_emi: 8_800,
            processing_fee_pct: 3.0,
        }])
        .unwrap();
        assert_eq!(
            s.choose_offer(3),
            Err(SessionError::NoSuchOffer {
                index: 3,
                available: 1
            })
        );
        s.choose_offer(0).unwrap();
        assert_eq!(s.chosen_offer().map(|(i, _)| i), Some(0));
    }

    #[test]
    fn reset_keeps_language_only() {
        let mut s = session();
        s.set_language(Language::Hi);
        s.enter(Journey::Onboarding).unwrap();
        s.set_answer(FieldName::FullName, FieldValue::Text("Jane".into()))
            .unwrap();
        s.set_flag("consent_given", true);

        s.reset();

        assert_eq!(s.journey(), Journey::None);
        assert_eq!(s.current_step(), None);
        assert_eq!(s.answer(FieldName::FullName), None);
        assert!(!s.flag("consent_given"));
        assert_eq!(s.language(), Some(Language::Hi));
    }

    #[test]
    fn roundtrips_through_json() {
        let mut s = session();
        s.set_language(Language::En);
        s.enter(Journey::Onboarding).unwrap();
        s.advance_to(StepId::MonthlyIncome).unwrap();
        s.set_answer(FieldName::FullName, FieldValue::Text("Jane Doe".into()))
            .unwrap();

        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
