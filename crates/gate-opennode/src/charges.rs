//! # OpenNode Charges
//!
//! Implementation of the OpenNode charges API: create a Lightning charge,
//! then poll its status until the invoice is paid.

use crate::config::OpenNodeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gate_core::{
    Charge, ChargeRequest, ChargeStatus, GateError, GateResult, PaymentProcessor,
};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const PROVIDER: &str = "opennode";

/// OpenNode charge processor
pub struct OpenNodeProcessor {
    config: OpenNodeConfig,
    client: Client,
}

impl OpenNodeProcessor {
    /// Create a new OpenNode processor
    pub fn new(config: OpenNodeConfig) -> GateResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| GateError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> GateResult<Self> {
        let config = OpenNodeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &OpenNodeConfig {
        &self.config
    }

    /// Read the body and turn non-2xx answers into provider errors
    async fn read_success_body(response: Response) -> GateResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GateError::unavailable(PROVIDER, e.to_string()))?;

        if !status.is_success() {
            error!("OpenNode API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<OpenNodeErrorResponse>(&body) {
                return Err(GateError::provider(
                    PROVIDER,
                    format!("HTTP {}: {}", status, error_response.message),
                ));
            }

            return Err(GateError::provider(PROVIDER, format!("HTTP {}: {}", status, body)));
        }

        Ok(body)
    }
}

#[async_trait]
impl PaymentProcessor for OpenNodeProcessor {
    #[instrument(skip(self, request), fields(amount = %request.price.display()))]
    async fn create_charge(&self, request: &ChargeRequest) -> GateResult<Charge> {
        let body = CreateChargeBody {
            amount: request.price.decimal_string(),
            currency: request.price.currency.as_str(),
            description: &request.description,
            order_id: Uuid::new_v4().to_string(),
            callback_url: self.config.callback_url.as_deref(),
        };

        debug!("Creating OpenNode charge: order_id={}", body.order_id);

        let url = format!("{}/v1/charges", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .header("Authorization", self.config.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| GateError::unavailable(PROVIDER, e.to_string()))?;

        let text = Self::read_success_body(response).await?;

        let envelope: OpenNodeEnvelope<CreatedCharge> = serde_json::from_str(&text)
            .map_err(|e| GateError::provider(PROVIDER, format!("Failed to parse charge: {}", e)))?;
        let data = envelope.data;

        info!("Created OpenNode charge: id={}, amount={}", data.id, data.amount.unwrap_or_default());

        let checkout_url = data
            .hosted_checkout_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.config.checkout_url(&data.id));

        Ok(Charge {
            checkout_url: Some(checkout_url),
            payment_request: data.lightning_invoice.and_then(|inv| inv.payreq),
            created_at: data
                .created_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .unwrap_or_else(Utc::now),
            id: data.id,
        })
    }

    #[instrument(skip(self))]
    async fn charge_status(&self, charge_id: &str) -> GateResult<ChargeStatus> {
        let url = format!("{}/v2/charge/{}", self.config.api_base_url, charge_id);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .header("Authorization", self.config.auth_header())
            .send()
            .await
            .map_err(|e| GateError::unavailable(PROVIDER, e.to_string()))?;

        let text = Self::read_success_body(response).await?;

        let envelope: OpenNodeEnvelope<ChargeDetails> = serde_json::from_str(&text)
            .map_err(|e| GateError::provider(PROVIDER, format!("Failed to parse charge: {}", e)))?;

        let status = envelope.data.settlement_status();
        debug!("OpenNode charge {} status: {:?}", charge_id, status);
        Ok(status)
    }

    fn processor_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// OpenNode API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateChargeBody<'a> {
    amount: String,
    currency: &'a str,
    description: &'a str,
    order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct OpenNodeEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CreatedCharge {
    id: String,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    hosted_checkout_url: Option<String>,
    #[serde(default)]
    lightning_invoice: Option<LightningInvoice>,
}

#[derive(Debug, Deserialize)]
struct LightningInvoice {
    #[serde(default)]
    payreq: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargeDetails {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    lightning: Option<LightningDetails>,
}

#[derive(Debug, Deserialize)]
struct LightningDetails {
    #[serde(default)]
    status: Option<String>,
}

impl ChargeDetails {
    /// The Lightning leg decides settlement; the charge-level status is
    /// only used when no Lightning leg is reported.
    fn settlement_status(&self) -> ChargeStatus {
        let status = match &self.lightning {
            Some(lightning) => lightning.status.as_deref(),
            None => self.status.as_deref(),
        };
        ChargeStatus::from_processor(status.unwrap_or("unknown"))
    }
}

#[derive(Debug, Deserialize)]
struct OpenNodeErrorResponse {
    message: String,
}
