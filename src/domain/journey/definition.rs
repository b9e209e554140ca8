//! The journey step tables.
//!
//! Pure, static lookups. `steps_of` returns a journey's ordered step list;
//! `successor` resolves the transition out of a step. No mutable state.

use super::step::{FieldBinding, FieldName, InputKind, JourneyStep, SideEffect, StepId, Successor};
use super::Journey;

/// Onboarding: language → intent → applicant details → consent → offers.
///
/// Offer selection hands off to the KYC journey rather than ending here;
/// the loan flow the user experiences is the concatenation of the two.
const ONBOARDING: &[JourneyStep] = &[
    JourneyStep {
        id: StepId::LanguageSelect,
        input: InputKind::Choice,
        binding: FieldBinding::None,
        successor: Successor::Step(StepId::IntentConfirm),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::IntentConfirm,
        input: InputKind::Choice,
        binding: FieldBinding::None,
        successor: Successor::Step(StepId::FullName),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::FullName,
        input: InputKind::FreeText,
        binding: FieldBinding::Answer(FieldName::FullName),
        successor: Successor::Step(StepId::DateOfBirth),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::DateOfBirth,
        input: InputKind::FreeText,
        binding: FieldBinding::Answer(FieldName::DateOfBirth),
        successor: Successor::Step(StepId::Employment),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::Employment,
        input: InputKind::Choice,
        binding: FieldBinding::Answer(FieldName::Employment),
        successor: Successor::Step(StepId::MonthlyIncome),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::MonthlyIncome,
        input: InputKind::FreeText,
        binding: FieldBinding::Answer(FieldName::MonthlyIncome),
        successor: Successor::Step(StepId::Purpose),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::Purpose,
        input: InputKind::Choice,
        binding: FieldBinding::Answer(FieldName::Purpose),
        successor: Successor::Step(StepId::Consent),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::Consent,
        input: InputKind::FreeText,
        binding: FieldBinding::Flag("consent_given"),
        successor: Successor::Step(StepId::OfferSelection),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::OfferSelection,
        input: InputKind::Choice,
        binding: FieldBinding::None,
        successor: Successor::Handoff(Journey::Kyc),
        side_effect: Some(SideEffect::GenerateOffers),
    },
];

/// KYC and disbursement: acknowledgements, bank details, NACH, agreement,
/// then the final decision.
const KYC: &[JourneyStep] = &[
    JourneyStep {
        id: StepId::KycAck,
        input: InputKind::Choice,
        binding: FieldBinding::Flag("kyc_completed"),
        successor: Successor::Step(StepId::SelfieAck),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::SelfieAck,
        input: InputKind::Document,
        binding: FieldBinding::Flag("selfie_received"),
        successor: Successor::Step(StepId::BankDetails),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::BankDetails,
        input: InputKind::FreeText,
        binding: FieldBinding::Answer(FieldName::BankDetails),
        successor: Successor::Step(StepId::NachAck),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::NachAck,
        input: InputKind::Choice,
        binding: FieldBinding::Flag("nach_completed"),
        successor: Successor::Step(StepId::AgreementAck),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::AgreementAck,
        input: InputKind::Choice,
        binding: FieldBinding::Flag("agreement_signed"),
        successor: Successor::Step(StepId::FinalDecision),
        side_effect: None,
    },
    JourneyStep {
        id: StepId::FinalDecision,
        input: InputKind::None,
        binding: FieldBinding::None,
        successor: Successor::Terminal,
        side_effect: Some(SideEffect::FinalDecision),
    },
];

/// Support: one re-entrant step, exited only by an intent switch.
const SUPPORT: &[JourneyStep] = &[JourneyStep {
    id: StepId::SupportDesk,
    input: InputKind::FreeText,
    binding: FieldBinding::None,
    successor: Successor::Step(StepId::SupportDesk),
    side_effect: None,
}];

/// Post-loan: one re-entrant menu step.
const POST_LOAN: &[JourneyStep] = &[JourneyStep {
    id: StepId::PostLoanMenu,
    input: InputKind::Choice,
    binding: FieldBinding::None,
    successor: Successor::Step(StepId::PostLoanMenu),
    side_effect: None,
}];

/// Returns the ordered step list of a journey.
pub fn steps_of(journey: Journey) -> &'static [JourneyStep] {
    match journey {
        Journey::None => &[],
        Journey::Onboarding => ONBOARDING,
        Journey::Support => SUPPORT,
        Journey::Kyc => KYC,
        Journey::PostLoan => POST_LOAN,
    }
}

/// Looks up a step definition within a journey.
///
/// Returns `None` when the step does not belong to the journey, which the
/// orchestrator treats as state corruption.
pub fn step(journey: Journey, id: StepId) -> Option<&'static JourneyStep> {
    steps_of(journey).iter().find(|s| s.id == id)
}

/// Returns the entry step of a journey, if it has any steps.
pub fn entry_step(journey: Journey) -> Option<&'static JourneyStep> {
    steps_of(journey).first()
}

/// Resolves the transition out of a step.
pub fn successor(journey: Journey, current: StepId) -> Option<Successor> {
    step(journey, current).map(|s| s.successor)
}

/// Returns true if the journey declares the given answer field on any of
/// its steps.
pub fn declares_field(journey: Journey, field: FieldName) -> bool {
    steps_of(journey)
        .iter()
        .any(|s| s.binding == FieldBinding::Answer(field))
}
