//! # OpenNode Webhook Handling
//!
//! OpenNode POSTs a form-encoded callback to the charge's `callback_url`
//! whenever its status changes. Each callback carries `hashed_order`,
//! the hex HMAC-SHA256 of the charge id keyed with the API key.

use gate_core::{ChargeStatus, GateError, GateResult};
use serde::Deserialize;
use tracing::{debug, warn};

/// Charge status callback as posted by OpenNode
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeCallback {
    /// Charge id
    pub id: String,
    /// New charge status (`paid`, `processing`, `expired`, ...)
    pub status: String,
    /// hex(HMAC-SHA256(api_key, id))
    pub hashed_order: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub fee: Option<String>,
}

impl ChargeCallback {
    pub fn charge_status(&self) -> ChargeStatus {
        ChargeStatus::from_processor(&self.status)
    }
}

/// Verifies callbacks against the API key
#[derive(Clone)]
pub struct CallbackVerifier {
    api_key: String,
}

impl CallbackVerifier {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Check `hashed_order` and return the reported status.
    pub fn verify(&self, callback: &ChargeCallback) -> GateResult<ChargeStatus> {
        if callback.id.is_empty() {
            return Err(GateError::WebhookParseError("Missing charge id".to_string()));
        }

        let expected = compute_hmac_sha256(&self.api_key, &callback.id)?;
        if !constant_time_compare(&callback.hashed_order.to_lowercase(), &expected) {
            warn!("Rejected OpenNode callback for charge {}", callback.id);
            return Err(GateError::WebhookVerificationFailed(
                "hashed_order mismatch".to_string(),
            ));
        }

        debug!("Verified OpenNode callback: id={}, status={}", callback.id, callback.status);
        Ok(callback.charge_status())
    }
}

/// Hex HMAC-SHA256, the digest OpenNode places in `hashed_order`
pub fn compute_hmac_sha256(secret: &str, message: &str) -> GateResult<String> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GateError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(id: &str, status: &str, hashed_order: String) -> ChargeCallback {
        ChargeCallback {
            id: id.to_string(),
            status: status.to_string(),
            hashed_order,
            order_id: None,
            description: None,
            price: Some("17".to_string()),
            fee: Some("0".to_string()),
        }
    }

    #[test]
    fn test_hmac_sha256() {
        let sig = compute_hmac_sha256("key_test", "abc123").unwrap();
        assert_eq!(sig.len(), 64);
        assert_eq!(sig, compute_hmac_sha256("key_test", "abc123").unwrap());
        assert_ne!(sig, compute_hmac_sha256("key_other", "abc123").unwrap());
    }

    #[test]
    fn test_verify_paid_callback() {
        let verifier = CallbackVerifier::new("key_test");
        let hashed = compute_hmac_sha256("key_test", "abc123").unwrap();

        let status = verifier.verify(&callback("abc123", "paid", hashed)).unwrap();
        assert!(status.is_settled());
    }

    #[test]
    fn test_verify_accepts_uppercase_hex() {
        let verifier = CallbackVerifier::new("key_test");
        let hashed = compute_hmac_sha256("key_test", "abc123").unwrap().to_uppercase();

        assert!(verifier.verify(&callback("abc123", "processing", hashed)).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let verifier = CallbackVerifier::new("key_test");
        let forged = compute_hmac_sha256("key_attacker", "abc123").unwrap();

        let err = verifier.verify(&callback("abc123", "paid", forged)).unwrap_err();
        assert!(matches!(err, GateError::WebhookVerificationFailed(_)));
    }

    #[test]
    fn test_verify_rejects_hash_for_other_charge() {
        let verifier = CallbackVerifier::new("key_test");
        let other = compute_hmac_sha256("key_test", "other").unwrap();

        assert!(verifier.verify(&callback("abc123", "paid", other)).is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
