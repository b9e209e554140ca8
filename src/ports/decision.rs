//! Decision gateway port: offer generation and the final verdict.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::offer::{LoanApplication, Offer};

/// Errors surfaced by remote gateways (decision backend, support model).
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    #[error("gateway call exceeded its deadline")]
    DeadlineExceeded,
}

/// Terms attached to an approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedTerms {
    /// Sanctioned principal in whole rupees.
    pub amount: i64,
    pub apr: f64,
    pub term_months: u32,
    /// Backend reference for the disbursement.
    pub reference: String,
}

/// The final verdict on an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved(ApprovedTerms),
    Rejected { reason: String },
}

/// Port to the credit decision backend.
///
/// Both calls are idempotent from the orchestrator's point of view: it
/// never re-invokes a gateway for a step already marked complete.
#[async_trait]
pub trait DecisionGateway: Send + Sync {
    /// Proposes offers for an application. An empty list means the
    /// applicant is not eligible.
    async fn propose_offers(
        &self,
        application: &LoanApplication,
    ) -> Result<Vec<Offer>, GatewayError>;

    /// Returns the final approve/reject decision.
    async fn final_decision(
        &self,
        application: &LoanApplication,
    ) -> Result<DecisionOutcome, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn DecisionGateway) {}
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(DecisionOutcome::Rejected {
            reason: "low score".to_string(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"], "low score");
    }
}
