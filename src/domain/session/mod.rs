//! Per-user durable conversation state.

mod aggregate;
mod lifecycle;

pub use aggregate::{Session, SessionError};
pub use lifecycle::SessionLifecycle;
