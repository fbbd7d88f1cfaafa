//! Global record-toggle hotkey, backed by `rdev`.
//!
//! `rdev::listen()` blocks for the life of the process, so it runs on a
//! dedicated OS thread ([`HotkeyListener::start`]).  Each physical press of
//! the configured key becomes one
//! [`ControllerEvent::ToggleRecording`](crate::controller::ControllerEvent)
//! on the controller's event queue; OS auto-repeat is folded away by
//! [`KeyLatch`].
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use kiosk_voice_macro::hotkey::{parse_key, HotkeyListener};
//!
//! let (tx, mut rx) = mpsc::channel(16);
//! let key = parse_key("F9").expect("unknown key");
//! let _listener = HotkeyListener::start(key, tx).expect("listener thread");
//! ```

pub mod listener;

pub use listener::{HotkeyListener, KeyLatch};

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a key name from the config into an [`rdev::Key`].
///
/// Accepts F1–F12, a handful of named keys and single ASCII letters, all
/// case-insensitively.
///
/// ```
/// use kiosk_voice_macro::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"), Some(rdev::Key::F9));
/// assert_eq!(parse_key("esc"), Some(rdev::Key::Escape));
/// assert_eq!(parse_key("r"), Some(rdev::Key::KeyR));
/// assert_eq!(parse_key("Ctrl+R"), None);
/// ```
pub fn parse_key(name: &str) -> Option<rdev::Key> {
    use rdev::Key::*;

    let upper = name.trim().to_ascii_uppercase();
    let key = match upper.as_str() {
        "F1" => F1,
        "F2" => F2,
        "F3" => F3,
        "F4" => F4,
        "F5" => F5,
        "F6" => F6,
        "F7" => F7,
        "F8" => F8,
        "F9" => F9,
        "F10" => F10,
        "F11" => F11,
        "F12" => F12,
        "ESCAPE" | "ESC" => Escape,
        "SPACE" => Space,
        "RETURN" | "ENTER" => Return,
        "TAB" => Tab,
        "HOME" => Home,
        "END" => End,
        "PAGEUP" => PageUp,
        "PAGEDOWN" => PageDown,
        "PAUSE" => Pause,
        "SCROLLLOCK" => ScrollLock,
        "PRINTSCREEN" => PrintScreen,
        other => return letter(other),
    };
    Some(key)
}

fn letter(s: &str) -> Option<rdev::Key> {
    use rdev::Key::*;

    const LETTERS: [rdev::Key; 26] = [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
        KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    ];
    match s.as_bytes() {
        [b @ b'A'..=b'Z'] => Some(LETTERS[(b - b'A') as usize]),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
