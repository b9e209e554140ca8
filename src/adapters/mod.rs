//! Adapters: concrete implementations of the ports.
//!
//! Only in-memory adapters live in the core crate; durable storage and
//! real messaging channels are wired up by the hosting service.

pub mod memory;

pub use memory::{InMemoryAuditSink, InMemorySessionStore, RecordingMessenger};
