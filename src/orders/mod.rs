//! Order ingestion: poll the order hub and feed batches to the macro.
//!
//! * [`OrderSource`]: async access to the pending-order queue
//!   ([`HttpOrderSource`] for the real hub, [`OrderSlot`] in-process).
//! * [`OrdersClient`]: the polling loop: classify, deduplicate, run the
//!   batch on the blocking pool, report progress to the controller.

pub mod client;
pub mod source;

pub use client::{content_hash, DedupState, OrdersClient, OrdersHandle, Payload, SharedMacro};
pub use source::{HttpOrderSource, OrderSlot, OrderSource};

use thiserror::Error;

// ---------------------------------------------------------------------------
// OrdersError
// ---------------------------------------------------------------------------

/// Errors while talking to the order hub.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// Transport failure or non-success HTTP status.
    #[error("order hub request failed: {0}")]
    Request(String),

    #[error("order hub request timed out")]
    Timeout,

    /// The body was not valid JSON.
    #[error("invalid order payload: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for OrdersError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OrdersError::Timeout
        } else {
            OrdersError::Request(e.to_string())
        }
    }
}
