//! Support responder port (language-model backed answers).

use async_trait::async_trait;

use crate::domain::foundation::Language;

use super::GatewayError;

/// Port to a free-form question answering collaborator.
///
/// Optional: when not configured, the support pipeline falls through from
/// the knowledge base straight to escalation.
#[async_trait]
pub trait SupportResponder: Send + Sync {
    /// Answers a customer question in the given language.
    ///
    /// `Ok(None)` means the responder has no confident answer and the
    /// pipeline should escalate.
    async fn answer(&self, question: &str, language: Language)
        -> Result<Option<String>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_responder_is_object_safe() {
        fn _accepts_dyn(_responder: &dyn SupportResponder) {}
    }
}
