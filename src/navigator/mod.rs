//! Kiosk navigation: category/page state machine and synthetic clicks.
//!
//! # Overview
//!
//! The kiosk shows one category at a time, split into pages that can only be
//! advanced with a "next" button.  [`Navigator`] remembers which category and
//! page it believes are on screen and issues the clicks needed to reach a
//! menu card:
//!
//! 1. **Category**: click the category tab; the kiosk always opens on page 1.
//! 2. **Page**: click "next" once per page to advance.
//! 3. **Item**: click the card center `count` times.
//!
//! Every physical action goes through [`Navigator::click`], which in turn goes
//! through the [`Pointer`] trait so tests can observe the exact sequence.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use kiosk_voice_macro::config::KioskConfig;
//! use kiosk_voice_macro::menu::MenuIndex;
//! use kiosk_voice_macro::navigator::{EnigoPointer, Navigator};
//! # fn main() -> anyhow::Result<()> {
//! let index = Arc::new(MenuIndex::load("ui.json".as_ref(), "cards.json".as_ref())?);
//! let mut nav = Navigator::new(index, Box::new(EnigoPointer::new()), KioskConfig::default());
//! nav.add_item("아메리카노", 2)?;
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod pointer;

pub use driver::{NavigationState, Navigator};
pub use pointer::{EnigoPointer, Pointer};

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`Pointer`] backend.
#[derive(Debug, Error)]
pub enum PointerError {
    /// The input backend could not be opened.
    #[error("cannot open input backend: {0}")]
    Backend(String),

    #[error("cannot move pointer: {0}")]
    Move(String),

    #[error("cannot read pointer position: {0}")]
    Position(String),

    #[error("cannot send button event: {0}")]
    Button(String),
}

/// Failures while navigating the kiosk.
#[derive(Debug, Error)]
pub enum NavError {
    /// The category is not part of the loaded layout.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// No menu entry matched the requested name.
    #[error("no menu matches '{0}'")]
    NotFound(String),

    /// Every item click failed.
    #[error("no click landed for '{0}'")]
    NothingClicked(String),

    #[error(transparent)]
    Pointer(#[from] PointerError),
}
