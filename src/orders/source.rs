//! Where pending orders come from.
//!
//! [`OrderSource`] abstracts the order hub.  [`HttpOrderSource`] polls the
//! real hub over HTTP; [`OrderSlot`] is an in-process single-slot queue with
//! the same take-once semantics, used for local feeding and tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::OrdersError;
use crate::config::OrdersConfig;

// ---------------------------------------------------------------------------
// OrderSource trait
// ---------------------------------------------------------------------------

/// Async access to the pending-order queue.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn OrderSource>`.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Take the pending payload, if any.  `Ok(None)` means the queue is empty.
    async fn fetch(&self) -> Result<Option<Value>, OrdersError>;

    /// Current backend mic-pulse flag.  `Ok(None)` when the source does not
    /// report one.
    async fn pulse(&self) -> Result<Option<bool>, OrdersError>;
}

// ---------------------------------------------------------------------------
// HttpOrderSource
// ---------------------------------------------------------------------------

/// Polls the order hub: `GET <orders_url>` answers `204` when empty, otherwise
/// a JSON body that is handed over once.
pub struct HttpOrderSource {
    client: reqwest::Client,
    orders_url: String,
    pulse_url: String,
    request_timeout: Duration,
    pulse_timeout: Duration,
}

impl HttpOrderSource {
    pub fn from_config(config: &OrdersConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            orders_url: config.url.clone(),
            pulse_url: config.pulse_url(),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            pulse_timeout: Duration::from_millis(config.pulse_timeout_ms),
        }
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn fetch(&self) -> Result<Option<Value>, OrdersError> {
        let response = self
            .client
            .get(&self.orders_url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.error_for_status()?.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| OrdersError::Parse(e.to_string()))
    }

    async fn pulse(&self) -> Result<Option<bool>, OrdersError> {
        let response = self
            .client
            .get(&self.pulse_url)
            .timeout(self.pulse_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        let json: Value = response
            .json()
            .await
            .map_err(|e| OrdersError::Parse(e.to_string()))?;
        Ok(json.get("mic_pulse_enabled").and_then(Value::as_bool))
    }
}

// ---------------------------------------------------------------------------
// OrderSlot
// ---------------------------------------------------------------------------

/// A single pending-order slot.
///
/// [`set`](Self::set) replaces whatever is waiting; [`OrderSource::fetch`]
/// takes it and leaves the slot empty.
#[derive(Debug, Default)]
pub struct OrderSlot {
    pending: Mutex<Option<Value>>,
    pulse: Mutex<Option<bool>>,
}

impl OrderSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload`, replacing any order not yet taken.
    pub fn set(&self, payload: Value) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if pending.replace(payload).is_some() {
            log::debug!("orders: pending order replaced before it was taken");
        }
    }

    pub fn take(&self) -> Option<Value> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    pub fn is_empty(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }

    pub fn set_pulse(&self, enabled: bool) {
        *self.pulse.lock().unwrap_or_else(|e| e.into_inner()) = Some(enabled);
    }
}

#[async_trait]
impl OrderSource for OrderSlot {
    async fn fetch(&self) -> Result<Option<Value>, OrdersError> {
        Ok(self.take())
    }

    async fn pulse(&self) -> Result<Option<bool>, OrdersError> {
        Ok(*self.pulse.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
