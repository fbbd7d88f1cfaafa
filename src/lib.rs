//! Voice-driven ordering macro for a fixed-layout kiosk.
//!
//! Spoken orders arrive as item lists from an order hub and are replayed as
//! pointer clicks against a coordinate-addressed menu, followed by payment.
//! A streaming audio link carries the microphone to a voice backend and
//! plays its TTS replies.

pub mod audio;
pub mod config;
pub mod controller;
pub mod hotkey;
pub mod menu;
pub mod navigator;
pub mod order;
pub mod orders;
pub mod voice;
