//! Messaging port: channel-agnostic prompts out, normalized events in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{Timestamp, UserIdentity};

/// Errors surfaced by the messaging channel.
#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    #[error("message could not be delivered: {0}")]
    DeliveryFailed(String),
}

/// What a prompt asks the user to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Plain text, free-form reply expected (or none).
    Text,
    /// Text plus a set of selectable options.
    ChoiceSet,
    /// A document attachment (rendered by the channel adapter).
    Document,
}

/// A channel-agnostic outbound prompt.
///
/// The channel adapter decides how options become buttons, lists or
/// numbered menus; the core only states intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub kind: PromptKind,
    pub body: String,
    /// (option id, label) pairs; empty unless `kind` is `ChoiceSet`.
    pub options: Vec<(String, String)>,
}

impl PromptSpec {
    /// Creates a plain text prompt.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Text,
            body: body.into(),
            options: Vec::new(),
        }
    }

    /// Creates a prompt with selectable options.
    pub fn choices(body: impl Into<String>, options: Vec<(String, String)>) -> Self {
        Self {
            kind: PromptKind::ChoiceSet,
            body: body.into(),
            options,
        }
    }

    /// Creates a document prompt.
    pub fn document(body: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Document,
            body: body.into(),
            options: Vec::new(),
        }
    }
}

/// Media kinds a channel can deliver inbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Document,
}

/// The normalized content of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InboundPayload {
    /// Typed text.
    Text(String),
    /// A selected option id (button/list reply).
    Selection(String),
    /// An uploaded media item.
    Media(MediaKind),
}

impl InboundPayload {
    /// Returns the raw text the validator should see, if any.
    pub fn as_input(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Selection(id) => Some(id),
            Self::Media(_) => None,
        }
    }
}

/// One normalized inbound event, delivered to the orchestrator's entry
/// point by the transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub identity: UserIdentity,
    pub payload: InboundPayload,
    pub received_at: Timestamp,
}

/// Outbound port for sending prompts.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends one prompt to a user.
    async fn send_prompt(
        &self,
        identity: &UserIdentity,
        prompt: PromptSpec,
    ) -> Result<(), MessagingError>;
}
