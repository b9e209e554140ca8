//! Foundation value objects shared across the domain.

mod ids;
mod language;
mod timestamp;

pub use ids::{ApplicationId, IdentityError, UserIdentity};
pub use language::Language;
pub use timestamp::Timestamp;
