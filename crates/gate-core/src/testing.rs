//! In-memory test doubles for the processor and provider traits.
//!
//! Enabled for this crate's tests and for dependents through the
//! `test-util` feature.

use crate::error::{GateError, GateResult};
use crate::processor::{Charge, ChargeRequest, ChargeStatus, PaymentProcessor};
use crate::provider::CompletionProvider;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scriptable payment processor that counts its calls.
#[derive(Default)]
pub struct MockProcessor {
    scripted_ids: Mutex<VecDeque<String>>,
    statuses: Mutex<HashMap<String, ChargeStatus>>,
    unavailable: AtomicBool,
    create_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out these identifiers, in order, before falling back to generated ones
    pub fn with_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripted_ids
            .lock()
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Set what `charge_status` reports for a charge
    pub fn set_status(&self, charge_id: &str, status: ChargeStatus) {
        self.statuses.lock().insert(charge_id.to_string(), status);
    }

    /// Make every call fail as if the processor were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> GateResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GateError::unavailable("mock", "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_charge(&self, _request: &ChargeRequest) -> GateResult<Charge> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let id = self
            .scripted_ids
            .lock()
            .pop_front()
            .unwrap_or_else(|| format!("charge_{}", n + 1));

        Ok(Charge::new(id.clone())
            .with_checkout_url(format!("https://checkout.test/{}", id))
            .with_payment_request(format!("lnbc10n1{}", id)))
    }

    async fn charge_status(&self, charge_id: &str) -> GateResult<ChargeStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        Ok(self
            .statuses
            .lock()
            .get(charge_id)
            .cloned()
            .unwrap_or(ChargeStatus::Unpaid))
    }

    fn processor_name(&self) -> &'static str {
        "mock"
    }
}

/// Completion provider with a fixed reply. A `None` reply simulates an
/// empty provider response.
pub struct MockProvider {
    name: &'static str,
    reply: Mutex<Option<String>>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockProvider {
    pub fn new(name: &'static str, reply: impl Into<String>) -> Self {
        Self {
            name,
            reply: Mutex::new(Some(reply.into())),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// A provider whose responses never carry text
    pub fn empty(name: &'static str) -> Self {
        let provider = Self::new(name, "");
        *provider.reply.lock() = None;
        provider
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> GateResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());

        self.reply.lock().clone().ok_or_else(|| GateError::EmptyCompletion {
            provider: self.name.to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}
