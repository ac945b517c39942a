//! # Payment Gate
//!
//! Tracks issued payment identifiers and their settlement state.
//!
//! Every identifier the gate hands out is recorded as known and unsettled.
//! Settlement is read from the processor on demand and cached once it is
//! positive, so a paid identifier never costs another processor round trip.
//! An identifier the gate never issued is always unpaid, whatever the
//! processor says about it.
//!
//! The record map sits behind a single lock. The lock is taken only around
//! map reads and writes and is always released before a processor call.

use crate::error::{GateError, GateResult};
use crate::pricing::Price;
use crate::processor::{BoxedPaymentProcessor, ChargeRequest};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

/// Description attached to every invoice
pub const DEFAULT_DESCRIPTION: &str = "LLM API access";

/// A payment identifier issued by the gate
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    /// Processor-assigned identifier
    pub id: String,

    /// Settlement flag. Flips false→true once and stays true.
    pub settled: bool,

    /// When the gate issued the identifier
    pub issued_at: DateTime<Utc>,

    /// When settlement was first observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,

    /// Hosted checkout page for the invoice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

impl PaymentRecord {
    fn new(id: String, checkout_url: Option<String>) -> Self {
        Self {
            id,
            settled: false,
            issued_at: Utc::now(),
            settled_at: None,
            checkout_url,
        }
    }

    /// Set the flag. Returns true if this call performed the transition.
    fn settle(&mut self) -> bool {
        if self.settled {
            return false;
        }
        self.settled = true;
        self.settled_at = Some(Utc::now());
        true
    }
}

/// What the client gets back from `issue_payment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTicket {
    pub id: String,
    pub checkout_url: Option<String>,
    /// BOLT11 invoice, for wallets that pay directly
    pub payment_request: Option<String>,
}

/// Gate counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateStats {
    /// Identifiers issued
    pub known: usize,
    /// Identifiers observed settled
    pub settled: usize,
    /// Settlement queries sent to the processor
    pub processor_lookups: u64,
}

/// Issues payment identifiers and answers settlement queries.
pub struct PaymentGate {
    processor: BoxedPaymentProcessor,
    price: Price,
    records: Mutex<HashMap<String, PaymentRecord>>,
    lookups: AtomicU64,
}

impl PaymentGate {
    /// Create a gate that charges `price` per identifier
    pub fn new(processor: BoxedPaymentProcessor, price: Price) -> Self {
        Self {
            processor,
            price,
            records: Mutex::new(HashMap::new()),
            lookups: AtomicU64::new(0),
        }
    }

    /// The configured invoice price
    pub fn price(&self) -> &Price {
        &self.price
    }

    /// Name of the backing processor
    pub fn processor_name(&self) -> &'static str {
        self.processor.processor_name()
    }

    /// Create a charge and register its identifier as known and unsettled.
    ///
    /// Fails if the processor call fails, or if the processor hands back an
    /// empty identifier or one the gate has already issued.
    #[instrument(skip(self))]
    pub async fn issue_payment(&self) -> GateResult<PaymentTicket> {
        let request = ChargeRequest::new(self.price.clone(), DEFAULT_DESCRIPTION);
        let charge = self.processor.create_charge(&request).await?;

        if charge.id.is_empty() {
            return Err(GateError::provider(
                self.processor.processor_name(),
                "charge created without an identifier",
            ));
        }

        {
            let mut records = self.records.lock();
            if records.contains_key(&charge.id) {
                warn!("Processor returned an already issued identifier: {}", charge.id);
                return Err(GateError::provider(
                    self.processor.processor_name(),
                    format!("duplicate charge identifier {}", charge.id),
                ));
            }
            records.insert(
                charge.id.clone(),
                PaymentRecord::new(charge.id.clone(), charge.checkout_url.clone()),
            );
        }

        info!("Issued payment identifier: {}", charge.id);

        Ok(PaymentTicket {
            id: charge.id,
            checkout_url: charge.checkout_url,
            payment_request: charge.payment_request,
        })
    }

    /// Membership check against the issued identifiers. No network call.
    pub fn is_known(&self, id: &str) -> bool {
        self.records.lock().contains_key(id)
    }

    /// Whether the payment behind `id` has settled.
    ///
    /// Unknown identifiers are `false` without contacting the processor.
    /// A cached settlement is returned without contacting the processor.
    /// Otherwise the processor is asked and a positive answer is cached.
    #[instrument(skip(self))]
    pub async fn is_settled(&self, id: &str) -> GateResult<bool> {
        match self.cached_settlement(id) {
            None => {
                debug!("Unknown payment identifier");
                return Ok(false);
            }
            Some(true) => return Ok(true),
            Some(false) => {}
        }

        self.lookups.fetch_add(1, Ordering::Relaxed);
        let status = self.processor.charge_status(id).await?;
        debug!("Processor reports status {:?}", status);

        if !status.is_settled() {
            // A callback may have settled the record while the lookup was in flight
            return Ok(self.cached_settlement(id).unwrap_or(false));
        }

        if self.settle(id) {
            info!("Payment settled: {}", id);
        }
        Ok(true)
    }

    /// Record settlement reported out of band (processor callback).
    ///
    /// Returns false for identifiers the gate never issued; those are
    /// never added.
    pub fn mark_settled(&self, id: &str) -> bool {
        let mut records = self.records.lock();
        match records.get_mut(id) {
            Some(record) => {
                if record.settle() {
                    info!("Payment settled via callback: {}", id);
                }
                true
            }
            None => false,
        }
    }

    /// Snapshot of a single record
    pub fn record(&self, id: &str) -> Option<PaymentRecord> {
        self.records.lock().get(id).cloned()
    }

    /// Current counters
    pub fn stats(&self) -> GateStats {
        let records = self.records.lock();
        GateStats {
            known: records.len(),
            settled: records.values().filter(|r| r.settled).count(),
            processor_lookups: self.lookups.load(Ordering::Relaxed),
        }
    }

    fn cached_settlement(&self, id: &str) -> Option<bool> {
        self.records.lock().get(id).map(|r| r.settled)
    }

    fn settle(&self, id: &str) -> bool {
        self.records
            .lock()
            .get_mut(id)
            .map(PaymentRecord::settle)
            .unwrap_or(false)
    }
}
