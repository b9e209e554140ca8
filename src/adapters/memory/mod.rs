//! In-memory port implementations for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{Timestamp, UserIdentity};
use crate::domain::session::Session;
use crate::ports::{
    AuditKind, AuditSink, Messenger, MessagingError, PromptSpec, SessionStore, StoreError,
};

/// Session store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<UserIdentity, Session>>,
    /// When set, every call fails; used to exercise store-failure paths.
    fail: Mutex<bool>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }

    /// Returns a copy of the stored session, if any.
    pub fn snapshot(&self, identity: &UserIdentity) -> Option<Session> {
        self.sessions.lock().unwrap().get(identity).cloned()
    }

    /// Seeds a session directly, bypassing the orchestrator.
    pub fn seed(&self, session: Session) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.identity().clone(), session);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, identity: &UserIdentity) -> Result<Option<Session>, StoreError> {
        if *self.fail.lock().unwrap() {
            return Err(StoreError::Unavailable("in-memory store failing".into()));
        }
        Ok(self.sessions.lock().unwrap().get(identity).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if *self.fail.lock().unwrap() {
            return Err(StoreError::Unavailable("in-memory store failing".into()));
        }
        self.sessions
            .lock()
            .unwrap()
            .insert(session.identity().clone(), session.clone());
        Ok(())
    }
}

/// Messenger that records every prompt instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(UserIdentity, PromptSpec)>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all prompts sent so far.
    pub fn sent(&self) -> Vec<(UserIdentity, PromptSpec)> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the prompts sent to one identity.
    pub fn sent_to(&self, identity: &UserIdentity) -> Vec<PromptSpec> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == identity)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    /// Drops everything recorded so far.
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_prompt(
        &self,
        identity: &UserIdentity,
        prompt: PromptSpec,
    ) -> Result<(), MessagingError> {
        self.sent.lock().unwrap().push((identity.clone(), prompt));
        Ok(())
    }
}

/// One recorded audit event.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub identity: UserIdentity,
    pub kind: AuditKind,
    pub payload: serde_json::Value,
    pub at: Timestamp,
}

/// Audit sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Counts events of one kind.
    pub fn count_of(&self, kind: AuditKind) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(
        &self,
        identity: &UserIdentity,
        kind: AuditKind,
        payload: serde_json::Value,
        at: Timestamp,
    ) {
        self.events.lock().unwrap().push(AuditEvent {
            identity: identity.clone(),
            kind,
            payload,
            at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn identity() -> UserIdentity {
        UserIdentity::new("919876543210").unwrap()
    }

    #[tokio::test]
    async fn store_roundtrips_sessions() {
        let store = InMemorySessionStore::new();
        assert!(store.load(&identity()).await.unwrap().is_none());

        let session = Session::new(identity(), Timestamp::now());
        store.save(&session).await.unwrap();
        assert_eq!(store.load(&identity()).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn failing_store_errors_on_load_and_save() {
        let store = InMemorySessionStore::new();
        store.set_failing(true);
        assert!(store.load(&identity()).await.is_err());
        assert!(store
            .save(&Session::new(identity(), Timestamp::now()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn messenger_records_per_identity() {
        let messenger = RecordingMessenger::new();
        messenger
            .send_prompt(&identity(), PromptSpec::text("hello"))
            .await
            .unwrap();
        assert_eq!(messenger.sent_to(&identity()).len(), 1);
        assert_eq!(
            messenger.sent_to(&UserIdentity::new("other").unwrap()).len(),
            0
        );
    }

    #[tokio::test]
    async fn audit_sink_counts_by_kind() {
        let sink = InMemoryAuditSink::new();
        sink.record(
            &identity(),
            AuditKind::SessionReset,
            serde_json::json!({}),
            Timestamp::now(),
        )
        .await;
        assert_eq!(sink.count_of(AuditKind::SessionReset), 1);
        assert_eq!(sink.count_of(AuditKind::AgentHandoff), 0);
    }
}
