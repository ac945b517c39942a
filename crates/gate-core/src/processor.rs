//! # Payment Processor Trait
//!
//! Seam between the payment gate and the Lightning payment processor.
//! The gate only needs two calls: create a charge and read its status.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │        PaymentProcessor (trait)            │
//! │  ├── create_charge()                       │
//! │  ├── charge_status()                       │
//! │  └── processor_name()                      │
//! └────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴───────┐       ┌───────┴───────┐
//!  │   OpenNode    │       │  test doubles │
//!  │   Processor   │       │               │
//!  └───────────────┘       └───────────────┘
//! ```

use crate::error::GateResult;
use crate::pricing::Price;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters for a new charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Invoice amount
    pub price: Price,
    /// Human-readable description shown on the invoice
    pub description: String,
}

impl ChargeRequest {
    pub fn new(price: Price, description: impl Into<String>) -> Self {
        Self {
            price,
            description: description.into(),
        }
    }
}

/// A charge created by the processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    /// Processor-assigned identifier
    pub id: String,

    /// Hosted checkout page for the invoice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,

    /// BOLT11 payment request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_request: Option<String>,

    /// When the processor created the charge
    pub created_at: DateTime<Utc>,
}

impl Charge {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            checkout_url: None,
            payment_request: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_checkout_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_url = Some(url.into());
        self
    }

    pub fn with_payment_request(mut self, payreq: impl Into<String>) -> Self {
        self.payment_request = Some(payreq.into());
        self
    }
}

/// Status of a charge as reported by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    /// Invoice issued, nothing received
    Unpaid,
    /// Payment seen but not final
    Processing,
    /// Paid in full
    Paid,
    /// Invoice expired
    Expired,
    /// Anything else the processor reports (passthrough)
    Other(String),
}

impl ChargeStatus {
    /// Map a processor status string
    pub fn from_processor(status: &str) -> Self {
        match status {
            "unpaid" => ChargeStatus::Unpaid,
            "processing" => ChargeStatus::Processing,
            "paid" => ChargeStatus::Paid,
            "expired" => ChargeStatus::Expired,
            other => ChargeStatus::Other(other.to_string()),
        }
    }

    /// Only `Paid` counts as settlement
    pub fn is_settled(&self) -> bool {
        matches!(self, ChargeStatus::Paid)
    }
}

/// Lightning payment processor used by the gate.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a charge for the given price.
    ///
    /// # Returns
    /// The processor's `Charge`, whose `id` becomes the payment identifier.
    async fn create_charge(&self, request: &ChargeRequest) -> GateResult<Charge>;

    /// Read the current status of a charge.
    async fn charge_status(&self, charge_id: &str) -> GateResult<ChargeStatus>;

    /// Get the processor name (for logging and errors).
    fn processor_name(&self) -> &'static str;
}

/// Type alias for a boxed payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ChargeStatus::from_processor("paid"), ChargeStatus::Paid);
        assert_eq!(ChargeStatus::from_processor("unpaid"), ChargeStatus::Unpaid);
        assert_eq!(
            ChargeStatus::from_processor("underpaid"),
            ChargeStatus::Other("underpaid".to_string())
        );
    }

    #[test]
    fn test_only_paid_is_settled() {
        assert!(ChargeStatus::Paid.is_settled());
        assert!(!ChargeStatus::Processing.is_settled());
        assert!(!ChargeStatus::Expired.is_settled());
        assert!(!ChargeStatus::Other("refunded".into()).is_settled());
    }
}
