//! Audit sink port.
//!
//! Fire-and-forget from the orchestrator's view: implementations must not
//! let a recording failure propagate into the conversation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserIdentity};

/// What kind of event is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    InboundMessage,
    PromptSent,
    SessionReset,
    OffersGenerated,
    OffersTruncated,
    OfferSelected,
    FinalDecision,
    LoanDisbursed,
    AgentHandoff,
    StateCorruption,
    SupportAnswer,
}

/// Append-only trail of everything that happened to a conversation.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records one event. Implementations swallow their own failures.
    async fn record(
        &self,
        identity: &UserIdentity,
        kind: AuditKind,
        payload: serde_json::Value,
        at: Timestamp,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_sink_is_object_safe() {
        fn _accepts_dyn(_sink: &dyn AuditSink) {}
    }

    #[test]
    fn kinds_serialize_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&AuditKind::OffersTruncated).unwrap(),
            "\"offers_truncated\""
        );
    }
}
