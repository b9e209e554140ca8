//! Static step definitions.

use serde::{Deserialize, Serialize};

use super::Journey;

/// One addressable position within a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    // Onboarding
    LanguageSelect,
    IntentConfirm,
    FullName,
    DateOfBirth,
    Employment,
    MonthlyIncome,
    Purpose,
    Consent,
    OfferSelection,

    // KYC / disbursement
    KycAck,
    SelfieAck,
    BankDetails,
    NachAck,
    AgreementAck,
    FinalDecision,

    // Re-entrant
    SupportDesk,
    PostLoanMenu,
}

impl StepId {
    /// Returns a short label for log output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LanguageSelect => "language_select",
            Self::IntentConfirm => "intent_confirm",
            Self::FullName => "full_name",
            Self::DateOfBirth => "date_of_birth",
            Self::Employment => "employment",
            Self::MonthlyIncome => "monthly_income",
            Self::Purpose => "purpose",
            Self::Consent => "consent",
            Self::OfferSelection => "offer_selection",
            Self::KycAck => "kyc_ack",
            Self::SelfieAck => "selfie_ack",
            Self::BankDetails => "bank_details",
            Self::NachAck => "nach_ack",
            Self::AgreementAck => "agreement_ack",
            Self::FinalDecision => "final_decision",
            Self::SupportDesk => "support_desk",
            Self::PostLoanMenu => "post_loan_menu",
        }
    }
}

/// The kind of inbound input a step expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Typed text, validated per the bound field.
    FreeText,
    /// A selection among the step's currently valid option ids.
    Choice,
    /// A media upload (selfie) or its acknowledgement button.
    Document,
    /// No input; the step runs its side effect on entry and advances.
    None,
}

/// Declared answer fields.
///
/// The answers map only accepts these; unknown fields are rejected before
/// insertion, which keeps the map bounded and validation exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    FullName,
    DateOfBirth,
    Employment,
    MonthlyIncome,
    Purpose,
    BankDetails,
}

/// Where a step's validated value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBinding {
    /// Written into the answers map under the given field.
    Answer(FieldName),
    /// Written into the flags map (boolean/administrative fields).
    Flag(&'static str),
    /// Not recorded (routing-only steps).
    None,
}

/// What follows a step once its input is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    /// The next step within the same journey.
    Step(StepId),
    /// Control passes to the entry step of another journey.
    Handoff(Journey),
    /// The journey is finished.
    Terminal,
}

/// External action triggered when a step is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Project the answers into a LoanApplication and fetch offers.
    GenerateOffers,
    /// Submit the application for the final approve/reject decision.
    FinalDecision,
}

/// Static, immutable definition of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyStep {
    pub id: StepId,
    pub input: InputKind,
    pub binding: FieldBinding,
    pub successor: Successor,
    pub side_effect: Option<SideEffect>,
}
