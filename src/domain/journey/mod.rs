//! Journey definitions: the static, declarative state tables that drive
//! the dialog.
//!
//! A journey is a named top-level conversation track. Each journey owns an
//! ordered list of steps; the orchestrator never branches on ad-hoc
//! conditions, it looks transitions up here.

mod definition;
mod step;

pub use definition::{declares_field, entry_step, step, steps_of, successor};
pub use step::{FieldBinding, FieldName, InputKind, JourneyStep, SideEffect, StepId, Successor};

use serde::{Deserialize, Serialize};

/// A named top-level conversation track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Journey {
    /// No journey active; inbound input is routed by top-level intent.
    #[default]
    None,

    /// Loan application: language, applicant details, consent, offers.
    Onboarding,

    /// Free-form help desk. Single re-entrant step.
    Support,

    /// Verification and disbursement: KYC, selfie, bank, NACH, agreement.
    Kyc,

    /// Menu for users with a disbursed loan. Single re-entrant step.
    PostLoan,
}

impl Journey {
    /// Returns true if this journey consists of one re-entrant step.
    ///
    /// Re-entrant journeys never reach Terminal on their own; they are
    /// exited only by an explicit intent switch.
    pub fn is_re_entrant(&self) -> bool {
        matches!(self, Self::Support | Self::PostLoan)
    }

    /// Returns a short label for log output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Onboarding => "onboarding",
            Self::Support => "support",
            Self::Kyc => "kyc",
            Self::PostLoan => "post_loan",
        }
    }
}
