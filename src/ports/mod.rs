//! Ports: abstract interfaces to collaborators.
//!
//! Concrete wire formats (webhook payloads, database schemas, HTTP
//! contracts) belong to adapters outside the core.

mod audit;
mod decision;
mod messaging;
mod session_store;
mod support;

pub use audit::{AuditKind, AuditSink};
pub use decision::{ApprovedTerms, DecisionGateway, DecisionOutcome, GatewayError};
pub use messaging::{
    InboundEvent, InboundPayload, MediaKind, Messenger, MessagingError, PromptKind, PromptSpec,
};
pub use session_store::{SessionStore, StoreError};
pub use support::SupportResponder;
