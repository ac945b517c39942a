//! # Request Forwarder
//!
//! Relays a prompt to a completion provider only when the payment behind
//! the caller's identifier has settled. Settlement is checked on every
//! call, never assumed from an earlier one.

use crate::error::{GateError, GateResult};
use crate::gate::PaymentGate;
use crate::provider::{BoxedCompletionProvider, ProviderSelector};
use std::sync::Arc;
use tracing::{info, instrument};

/// Text returned to callers whose payment has not settled
pub const REJECTION_MESSAGE: &str =
    "Error: please pay the LN transaction before submitting your API request.";

/// Result of a forward attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Provider answered
    Completed { provider: String, text: String },
    /// Payment not settled, nothing was sent
    Rejected,
}

impl ForwardOutcome {
    /// Text handed back to the client
    pub fn into_text(self) -> String {
        match self {
            ForwardOutcome::Completed { text, .. } => text,
            ForwardOutcome::Rejected => REJECTION_MESSAGE.to_string(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ForwardOutcome::Rejected)
    }
}

/// Gate-checked prompt forwarding
#[derive(Clone)]
pub struct Forwarder {
    gate: Arc<PaymentGate>,
    providers: ProviderSelector,
}

impl Forwarder {
    pub fn new(gate: Arc<PaymentGate>, providers: ProviderSelector) -> Self {
        Self { gate, providers }
    }

    /// The gate consulted before each forward
    pub fn gate(&self) -> &Arc<PaymentGate> {
        &self.gate
    }

    /// Registered providers
    pub fn providers(&self) -> &ProviderSelector {
        &self.providers
    }

    /// Forward through the default provider
    pub async fn forward(&self, id: &str, prompt: &str) -> GateResult<ForwardOutcome> {
        let provider = self.providers.default_provider().ok_or_else(|| {
            GateError::Configuration("No default completion provider registered".to_string())
        })?;
        self.forward_to(provider, id, prompt).await
    }

    /// Forward through the named provider
    pub async fn forward_via(
        &self,
        provider_name: &str,
        id: &str,
        prompt: &str,
    ) -> GateResult<ForwardOutcome> {
        let provider = self
            .providers
            .get(provider_name)
            .ok_or_else(|| GateError::UnknownProvider {
                name: provider_name.to_string(),
            })?;
        self.forward_to(provider, id, prompt).await
    }

    #[instrument(skip(self, provider, prompt), fields(provider = provider.provider_name()))]
    async fn forward_to(
        &self,
        provider: &BoxedCompletionProvider,
        id: &str,
        prompt: &str,
    ) -> GateResult<ForwardOutcome> {
        if !self.gate.is_settled(id).await? {
            info!("Rejected prompt for unsettled payment");
            return Ok(ForwardOutcome::Rejected);
        }

        let text = provider.complete(prompt).await?;

        Ok(ForwardOutcome::Completed {
            provider: provider.provider_name().to_string(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::Price;
    use crate::processor::ChargeStatus;
    use crate::testing::{MockProcessor, MockProvider};

    struct Fixture {
        processor: Arc<MockProcessor>,
        openai: Arc<MockProvider>,
        vllm: Arc<MockProvider>,
        forwarder: Forwarder,
    }

    fn fixture() -> Fixture {
        let processor = Arc::new(MockProcessor::new().with_ids(["abc123"]));
        let openai = Arc::new(MockProvider::new("openai", "Hello from openai"));
        let vllm = Arc::new(MockProvider::new("vllm", "Hello from vllm"));

        let gate = Arc::new(PaymentGate::new(processor.clone(), Price::default()));
        let providers = ProviderSelector::new("openai")
            .with_provider(openai.clone())
            .with_provider(vllm.clone());

        Fixture {
            processor,
            openai,
            vllm,
            forwarder: Forwarder::new(gate, providers),
        }
    }

    #[tokio::test]
    async fn test_rejects_before_settlement() {
        let fx = fixture();
        fx.forwarder.gate().issue_payment().await.unwrap();

        let outcome = fx.forwarder.forward("abc123", "hello").await.unwrap();

        assert!(outcome.is_rejected());
        assert_eq!(outcome.into_text(), REJECTION_MESSAGE);
        assert_eq!(fx.openai.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unknown_identifier() {
        let fx = fixture();

        let outcome = fx.forwarder.forward("unknown999", "hello").await.unwrap();

        assert!(outcome.is_rejected());
        assert_eq!(fx.processor.status_calls(), 0);
        assert_eq!(fx.openai.calls(), 0);
    }

    #[tokio::test]
    async fn test_forwards_after_settlement() {
        let fx = fixture();
        fx.forwarder.gate().issue_payment().await.unwrap();
        fx.processor.set_status("abc123", ChargeStatus::Paid);

        let outcome = fx.forwarder.forward("abc123", "hello").await.unwrap();

        assert_eq!(
            outcome,
            ForwardOutcome::Completed {
                provider: "openai".to_string(),
                text: "Hello from openai".to_string(),
            }
        );
        assert_eq!(fx.openai.last_prompt().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_forward_via_named_provider() {
        let fx = fixture();
        fx.forwarder.gate().issue_payment().await.unwrap();
        fx.processor.set_status("abc123", ChargeStatus::Paid);

        let text = fx
            .forwarder
            .forward_via("vllm", "abc123", "hello")
            .await
            .unwrap()
            .into_text();

        assert_eq!(text, "Hello from vllm");
        assert_eq!(fx.vllm.calls(), 1);
        assert_eq!(fx.openai.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let fx = fixture();

        let err = fx
            .forwarder
            .forward_via("anthropic", "abc123", "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, GateError::UnknownProvider { .. }));
    }

    #[tokio::test]
    async fn test_processor_outage_propagates() {
        let fx = fixture();
        fx.forwarder.gate().issue_payment().await.unwrap();
        fx.processor.set_unavailable(true);

        let err = fx.forwarder.forward("abc123", "hello").await.unwrap_err();

        assert!(err.is_upstream());
        assert_eq!(fx.openai.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_completion_is_an_error() {
        let processor = Arc::new(MockProcessor::new().with_ids(["abc123"]));
        let gate = Arc::new(PaymentGate::new(processor.clone(), Price::default()));
        let forwarder = Forwarder::new(
            gate.clone(),
            ProviderSelector::new("openai").with_provider(Arc::new(MockProvider::empty("openai"))),
        );
        gate.issue_payment().await.unwrap();
        gate.mark_settled("abc123");

        let err = forwarder.forward("abc123", "hello").await.unwrap_err();

        assert!(matches!(err, GateError::EmptyCompletion { .. }));
    }
}
