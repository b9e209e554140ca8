//! Session store port.
//!
//! The store is the sole durable owner of sessions between events. It must
//! guarantee that a `save` following a `load` for the same identity within
//! one orchestrator invocation is atomic with respect to other saves for
//! that identity; the orchestrator additionally serializes per identity, so
//! implementations do not need cross-identity coordination.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserIdentity;
use crate::domain::session::Session;

/// Errors surfaced by the session store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("session could not be serialized: {0}")]
    Serialization(String),
}

/// Load/save port for session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the session for an identity; `None` for first-time users.
    async fn load(&self, identity: &UserIdentity) -> Result<Option<Session>, StoreError>;

    /// Saves a session.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }
}
