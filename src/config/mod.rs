//! Configuration module for the kiosk voice macro.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, TOML persistence via
//! `AppConfig::load` / `AppConfig::save`, and `KIOSK_*` environment overrides.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, CaptureConfig, HotkeyConfig, IndexConfig, KioskConfig, OrdersConfig, PulseConfig,
    UtteranceConfig, VoiceConfig,
};
