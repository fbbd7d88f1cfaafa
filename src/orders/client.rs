//! [`OrdersClient`]: the order polling loop.
//!
//! # Loop
//!
//! ```text
//! every poll interval, while running:
//!   fetch ──none──────────────────────────────▶ (pulse) ─▶ sleep
//!         ──payload─▶ extract items
//!                      ├─ {type:"stop"} ─▶ ServerStop
//!                      └─ items ─▶ hash == last? ─yes─▶ skip
//!                                   └─no─▶ ProcessingOrder(true)
//!                                          spawn_blocking(macro.perform)
//!                                          ProcessingOrder(false)
//!                                          clear hash
//! ```
//!
//! Batches never overlap: the loop awaits each one before polling again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;

use super::OrderSource;
use crate::controller::ControllerEvent;
use crate::order::{BatchResult, OrderMacro};

/// The macro engine shared between the polling loop and the blocking pool.
pub type SharedMacro = Arc<Mutex<OrderMacro>>;

// ---------------------------------------------------------------------------
// Payload extraction
// ---------------------------------------------------------------------------

/// What a fetched payload asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Items(Vec<Value>),
    Stop,
    Ignored,
}

impl Payload {
    /// Classify a hub payload.
    ///
    /// Accepted shapes: a bare array, `{"type":"final","items":[...]}`, or a
    /// single object carrying `name` or `menu`.  `{"type":"stop"}` is a stop
    /// request.  Everything else, including an empty item list, is ignored.
    pub fn classify(payload: &Value) -> Self {
        let items = match payload {
            Value::Array(items) => Some(items.clone()),
            Value::Object(obj) => {
                let kind = obj.get("type").and_then(Value::as_str);
                match (kind, obj.get("items")) {
                    (Some("final"), Some(Value::Array(items))) => Some(items.clone()),
                    _ if obj.contains_key("name") || obj.contains_key("menu") => {
                        Some(vec![payload.clone()])
                    }
                    _ if kind == Some("stop") => return Payload::Stop,
                    _ => None,
                }
            }
            _ => None,
        };
        match items {
            Some(items) if !items.is_empty() => Payload::Items(items),
            _ => Payload::Ignored,
        }
    }
}

/// Hex SHA-256 of the canonical JSON form of `items`.
///
/// Object keys serialize in sorted order, so key order in the payload does
/// not change the hash.
pub fn content_hash(items: &[Value]) -> String {
    let canonical = serde_json::to_string(items).unwrap_or_default();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

// ---------------------------------------------------------------------------
// DedupState
// ---------------------------------------------------------------------------

/// Remembers the content hash of the batch in flight.
#[derive(Debug, Default, Clone)]
pub struct DedupState {
    last_content_hash: Option<String>,
}

impl DedupState {
    /// `false` when `hash` equals the remembered one; otherwise remember it.
    pub fn admit(&mut self, hash: &str) -> bool {
        if self.last_content_hash.as_deref() == Some(hash) {
            return false;
        }
        self.last_content_hash = Some(hash.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.last_content_hash = None;
    }

    pub fn last(&self) -> Option<&str> {
        self.last_content_hash.as_deref()
    }
}

// ---------------------------------------------------------------------------
// OrdersHandle
// ---------------------------------------------------------------------------

/// Cheap handle for stopping a running [`OrdersClient`].
#[derive(Debug, Clone)]
pub struct OrdersHandle {
    running: Arc<AtomicBool>,
}

impl OrdersHandle {
    /// Stop after the current cycle.  A batch in flight is finished first.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            log::info!("orders: stopping");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// OrdersClient
// ---------------------------------------------------------------------------

pub struct OrdersClient {
    source: Arc<dyn OrderSource>,
    order_macro: SharedMacro,
    events: mpsc::Sender<ControllerEvent>,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
    dedup: DedupState,
}

impl OrdersClient {
    pub fn new(
        source: Arc<dyn OrderSource>,
        order_macro: SharedMacro,
        events: mpsc::Sender<ControllerEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            order_macro,
            events,
            poll_interval,
            running: Arc::new(AtomicBool::new(true)),
            dedup: DedupState::default(),
        }
    }

    pub fn handle(&self) -> OrdersHandle {
        OrdersHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn dedup(&self) -> &DedupState {
        &self.dedup
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Poll until [`OrdersHandle::stop`] is called.
    pub async fn run(mut self) {
        log::info!("orders: polling every {:?}", self.poll_interval);
        while self.running.load(Ordering::SeqCst) {
            self.poll_once().await;
            tokio::time::sleep(self.poll_interval).await;
        }
        log::info!("orders: stopped");
    }

    /// One polling cycle.  Returns the batch result when an order ran.
    pub async fn poll_once(&mut self) -> Option<BatchResult> {
        let batch = match self.source.fetch().await {
            Ok(Some(payload)) => self.handle_payload(&payload).await,
            Ok(None) => None,
            Err(e) => {
                log::warn!("orders: poll failed: {e}");
                None
            }
        };

        self.forward_pulse().await;
        batch
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn handle_payload(&mut self, payload: &Value) -> Option<BatchResult> {
        let items = match Payload::classify(payload) {
            Payload::Items(items) => items,
            Payload::Stop => {
                log::info!("orders: stop requested by the hub");
                self.emit(ControllerEvent::ServerStop).await;
                return None;
            }
            Payload::Ignored => {
                log::debug!("orders: ignoring payload {payload}");
                return None;
            }
        };

        let hash = content_hash(&items);
        if !self.dedup.admit(&hash) {
            log::debug!("orders: duplicate order {hash} skipped");
            return None;
        }

        log::info!("orders: new order with {} item(s)", items.len());
        self.emit(ControllerEvent::ProcessingOrder(true)).await;

        let order_macro = Arc::clone(&self.order_macro);
        let result = tokio::task::spawn_blocking(move || {
            order_macro
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .perform(&items)
        })
        .await;

        self.emit(ControllerEvent::ProcessingOrder(false)).await;
        self.dedup.clear();

        match result {
            Ok(batch) => Some(batch),
            Err(e) => {
                log::error!("orders: macro task failed: {e}");
                None
            }
        }
    }

    async fn forward_pulse(&self) {
        match self.source.pulse().await {
            Ok(Some(enabled)) => self.emit(ControllerEvent::MicPulse(enabled)).await,
            Ok(None) => {}
            Err(e) => log::trace!("orders: pulse check failed: {e}"),
        }
    }

    async fn emit(&self, event: ControllerEvent) {
        if self.events.send(event).await.is_err() {
            log::debug!("orders: controller gone, event dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
