//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a partial `settings.toml` only
//! overrides the keys it names.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// IndexConfig
// ---------------------------------------------------------------------------

/// Location of the two JSON documents that make up the menu index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Layout description: categories and prev/next navigation buttons.
    pub ui_coords_path: PathBuf,
    /// Menu-card list: `[{name, category, page, center}]`.
    pub menu_cards_path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let paths = AppPaths::new();
        Self {
            ui_coords_path: paths.ui_coords_file,
            menu_cards_path: paths.menu_cards_file,
        }
    }
}

// ---------------------------------------------------------------------------
// KioskConfig
// ---------------------------------------------------------------------------

/// Pointer automation timing and fixed kiosk locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Log clicks instead of moving the real pointer.
    pub dry_run: bool,
    /// Settle delay after a category click, in milliseconds.
    pub category_delay_ms: u64,
    /// Settle delay after each "next page" click, in milliseconds.
    pub page_delay_ms: u64,
    /// Settle delay after each menu-item click (and after payment).
    pub item_delay_ms: u64,
    /// How long the button is held between press and release.
    pub hold_ms: u64,
    /// Pause after every release before the next action.
    pub post_click_ms: u64,
    /// Maximum distance in pixels between target and read-back position
    /// before the move is retried.
    pub move_tolerance_px: i32,
    /// Absolute location of the "pay" button.  Not part of the menu index.
    pub payment_point: (i32, i32),
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            category_delay_ms: 1_000,
            page_delay_ms: 1_000,
            item_delay_ms: 1_000,
            hold_ms: 50,
            post_click_ms: 100,
            move_tolerance_px: 2,
            payment_point: (989, 1880),
        }
    }
}

impl KioskConfig {
    pub fn category_delay(&self) -> Duration {
        Duration::from_millis(self.category_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    /// Zero every settle delay.  Used by dry runs in tests.
    pub fn without_delays(mut self) -> Self {
        self.category_delay_ms = 0;
        self.page_delay_ms = 0;
        self.item_delay_ms = 0;
        self.hold_ms = 0;
        self.post_click_ms = 0;
        self
    }
}

// ---------------------------------------------------------------------------
// OrdersConfig
// ---------------------------------------------------------------------------

/// Settings for the order-queue polling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Queue endpoint.  `GET` returns `204` or a JSON order payload.
    pub url: String,
    /// Pulse endpoint.  `None` derives it from `url` by swapping
    /// `/api/orders` for `/api/mic-pulse`.
    pub pulse_url: Option<String>,
    /// Fixed sleep between poll cycles.
    pub poll_interval_ms: u64,
    /// Timeout for the queue request.
    pub request_timeout_ms: u64,
    /// Timeout for the pulse request.
    pub pulse_timeout_ms: u64,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9999/api/orders".into(),
            pulse_url: None,
            poll_interval_ms: 100,
            request_timeout_ms: 2_000,
            pulse_timeout_ms: 1_000,
        }
    }
}

impl OrdersConfig {
    /// Resolved pulse endpoint.
    ///
    /// ```
    /// use kiosk_voice_macro::config::OrdersConfig;
    ///
    /// let cfg = OrdersConfig::default();
    /// assert_eq!(cfg.pulse_url(), "http://localhost:9999/api/mic-pulse");
    /// ```
    pub fn pulse_url(&self) -> String {
        match &self.pulse_url {
            Some(url) => url.clone(),
            None => self.url.replace("/api/orders", "/api/mic-pulse"),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Settings for the streaming audio channel to the voice backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// WebSocket endpoint of the voice backend (`ws://` or `wss://`).
    pub ws_url: String,
    /// Give up connecting after this many milliseconds.
    pub connect_timeout_ms: u64,
    /// Largest inbound message accepted, in bytes.
    pub max_message_size: usize,
    /// PCM sample rate announced in `audio.start` and used for capture.
    pub sample_rate: u32,
    /// Duration of one PCM frame in milliseconds.
    pub frame_ms: u32,
    /// Play buffered TTS audio if no completion signal arrives within this
    /// window after the last chunk.
    pub tts_fallback_ms: u64,
    /// Capacity of the frame queue between capture and the sender task.
    pub frame_queue_capacity: usize,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8080/api/chat".into(),
            connect_timeout_ms: 5_000,
            max_message_size: 1_048_576,
            sample_rate: 16_000,
            frame_ms: 20,
            tts_fallback_ms: 3_000,
            frame_queue_capacity: 50,
        }
    }
}

impl VoiceConfig {
    /// Number of samples in one mono frame.
    pub fn frame_samples(&self) -> usize {
        (self.sample_rate as usize * self.frame_ms as usize) / 1_000
    }

    pub fn tts_fallback(&self) -> Duration {
        Duration::from_millis(self.tts_fallback_ms)
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture and speech detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Minimum RMS of an i16 frame to count as speech.
    pub rms_min_speech: f32,
    /// Stop recording after this many seconds without speech.
    pub silence_timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            rms_min_speech: 35.0,
            silence_timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// UtteranceConfig
// ---------------------------------------------------------------------------

/// Silence-driven utterance split: `audio.end` then `audio.start` on the same
/// open stream, nudging the recognizer to finalize a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UtteranceConfig {
    pub enabled: bool,
    /// Silence that must elapse before a split is sent.
    pub silence_ms: u64,
    /// Delay between `audio.end` and the resuming `audio.start`.
    pub resume_delay_ms: u64,
    /// Minimum time between two splits.
    pub cooldown_ms: u64,
}

impl Default for UtteranceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            silence_ms: 800,
            resume_delay_ms: 300,
            cooldown_ms: 1_500,
        }
    }
}

// ---------------------------------------------------------------------------
// PulseConfig
// ---------------------------------------------------------------------------

/// Backend-driven mic pulse: while enabled, recording is paused briefly on a
/// fixed interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub interval_ms: u64,
    pub pause_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            pause_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key that toggles recording on and off (e.g. `"F9"`).
    pub record_toggle_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            record_toggle_key: "F9".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub index: IndexConfig,
    pub kiosk: KioskConfig,
    pub orders: OrdersConfig,
    pub voice: VoiceConfig,
    pub capture: CaptureConfig,
    pub utterance: UtteranceConfig,
    pub pulse: PulseConfig,
    pub hotkey: HotkeyConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `KIOSK_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `KIOSK_*` overrides from an arbitrary lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("KIOSK_UI_COORDS") {
            self.index.ui_coords_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("KIOSK_MENU_CARDS") {
            self.index.menu_cards_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("KIOSK_AUDIO_WS_URL") {
            self.voice.ws_url = v;
        }
        if let Some(v) = lookup("KIOSK_ORDERS_URL") {
            self.orders.url = v;
        }
        if let Some(v) = lookup("KIOSK_DRY_RUN") {
            self.kiosk.dry_run = v == "1" || v.eq_ignore_ascii_case("true");
        }

        override_secs(&lookup, "KIOSK_ORDERS_POLL_SEC", &mut self.orders.poll_interval_ms);
        override_secs(&lookup, "KIOSK_CAT_DELAY", &mut self.kiosk.category_delay_ms);
        override_secs(&lookup, "KIOSK_PAGE_DELAY", &mut self.kiosk.page_delay_ms);
        override_secs(&lookup, "KIOSK_ITEM_DELAY", &mut self.kiosk.item_delay_ms);
        override_secs(&lookup, "KIOSK_WS_TIMEOUT", &mut self.voice.connect_timeout_ms);
        override_secs(&lookup, "KIOSK_TTS_FALLBACK_SEC", &mut self.voice.tts_fallback_ms);

        override_parsed(&lookup, "KIOSK_SAMPLE_RATE", &mut self.voice.sample_rate);
        override_parsed(&lookup, "KIOSK_FRAME_MS", &mut self.voice.frame_ms);
        override_parsed(&lookup, "KIOSK_WS_MAX_SIZE", &mut self.voice.max_message_size);
        override_parsed(&lookup, "KIOSK_RMS_MIN_SPEECH", &mut self.capture.rms_min_speech);
        override_parsed(
            &lookup,
            "KIOSK_SILENCE_TIMEOUT_SEC",
            &mut self.capture.silence_timeout_secs,
        );
    }
}

/// Seconds (fractional allowed) from the environment into a millisecond field.
fn override_secs<F>(lookup: &F, key: &str, target_ms: &mut u64)
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else { return };
    match raw.trim().parse::<f64>() {
        Ok(secs) if secs >= 0.0 => *target_ms = (secs * 1_000.0).round() as u64,
        _ => log::warn!("config: ignoring {key}={raw:?} (expected seconds)"),
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else { return };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => log::warn!("config: ignoring {key}={raw:?}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.index.menu_cards_path, loaded.index.menu_cards_path);
        assert_eq!(original.kiosk.payment_point, loaded.kiosk.payment_point);
        assert_eq!(original.kiosk.dry_run, loaded.kiosk.dry_run);
        assert_eq!(original.orders.url, loaded.orders.url);
        assert_eq!(original.orders.pulse_url, loaded.orders.pulse_url);
        assert_eq!(original.voice.ws_url, loaded.voice.ws_url);
        assert_eq!(original.voice.tts_fallback_ms, loaded.voice.tts_fallback_ms);
        assert_eq!(original.utterance.silence_ms, loaded.utterance.silence_ms);
        assert_eq!(
            original.hotkey.record_toggle_key,
            loaded.hotkey.record_toggle_key
        );
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.orders.url, OrdersConfig::default().url);
        assert_eq!(config.voice.sample_rate, 16_000);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[kiosk]\ndry_run = true\npage_delay_ms = 250\n").unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert!(cfg.kiosk.dry_run);
        assert_eq!(cfg.kiosk.page_delay_ms, 250);
        assert_eq!(cfg.kiosk.category_delay_ms, 1_000);
        assert_eq!(cfg.orders.poll_interval_ms, 100);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.kiosk.payment_point, (989, 1880));
        assert_eq!(cfg.kiosk.move_tolerance_px, 2);
        assert_eq!(cfg.orders.url, "http://localhost:9999/api/orders");
        assert_eq!(cfg.voice.ws_url, "ws://localhost:8080/api/chat");
        assert_eq!(cfg.voice.frame_samples(), 320);
        assert_eq!(cfg.capture.silence_timeout_secs, 60);
        assert_eq!(cfg.utterance.cooldown_ms, 1_500);
        assert_eq!(cfg.pulse.interval_ms, 5_000);
        assert_eq!(cfg.hotkey.record_toggle_key, "F9");
    }

    #[test]
    fn explicit_pulse_url_wins() {
        let cfg = OrdersConfig {
            pulse_url: Some("http://hub/pulse".into()),
            ..OrdersConfig::default()
        };
        assert_eq!(cfg.pulse_url(), "http://hub/pulse");
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("KIOSK_DRY_RUN", "1"),
            ("KIOSK_ORDERS_URL", "http://10.0.0.5:9999/api/orders"),
            ("KIOSK_PAGE_DELAY", "0.25"),
            ("KIOSK_ORDERS_POLL_SEC", "0.5"),
            ("KIOSK_SAMPLE_RATE", "8000"),
            ("KIOSK_MENU_CARDS", "/tmp/cards.json"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert!(cfg.kiosk.dry_run);
        assert_eq!(cfg.orders.url, "http://10.0.0.5:9999/api/orders");
        assert_eq!(cfg.orders.pulse_url(), "http://10.0.0.5:9999/api/mic-pulse");
        assert_eq!(cfg.kiosk.page_delay_ms, 250);
        assert_eq!(cfg.orders.poll_interval_ms, 500);
        assert_eq!(cfg.voice.sample_rate, 8_000);
        assert_eq!(cfg.index.menu_cards_path, PathBuf::from("/tmp/cards.json"));
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| match k {
            "KIOSK_ITEM_DELAY" => Some("soon".into()),
            "KIOSK_FRAME_MS" => Some("-3".into()),
            _ => None,
        });
        assert_eq!(cfg.kiosk.item_delay_ms, 1_000);
        assert_eq!(cfg.voice.frame_ms, 20);
    }
}
