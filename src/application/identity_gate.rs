//! Per-identity mutual exclusion.
//!
//! Tasks for different identities run fully concurrently; tasks for the
//! same identity are serialized so two near-simultaneous messages cannot
//! race on load-modify-save of one session. A sharded lock map keeps this
//! from becoming a global bottleneck.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::UserIdentity;

/// Hands out one async mutex per user identity.
///
/// Entries are created on first use and never removed; the identity space
/// is bounded by the customer base.
#[derive(Debug, Default)]
pub struct IdentityGate {
    locks: Mutex<HashMap<UserIdentity, Arc<Mutex<()>>>>,
}

impl IdentityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the permit for an identity, waiting if another event for
    /// the same identity is in flight.
    pub async fn acquire(&self, identity: &UserIdentity) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(identity.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
