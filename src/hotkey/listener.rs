//! Dedicated OS-thread hotkey listener using `rdev::listen`.
//!
//! `rdev::listen` has no shutdown API.  Dropping [`HotkeyListener`] sets a
//! stop flag so the callback discards further events; the thread itself
//! stays parked in the OS event loop until the process exits.

use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use crate::controller::ControllerEvent;

// ---------------------------------------------------------------------------
// KeyLatch
// ---------------------------------------------------------------------------

/// Turns the raw press/release stream of one key into single toggles.
///
/// Holding a key makes the OS repeat `KeyPress`; only the first press after
/// a release counts.
#[derive(Debug, Clone)]
pub struct KeyLatch {
    key: rdev::Key,
    held: bool,
}

impl KeyLatch {
    pub fn new(key: rdev::Key) -> Self {
        Self { key, held: false }
    }

    /// `true` when `event` is a fresh press of the watched key.
    pub fn on_event(&mut self, event: &rdev::EventType) -> bool {
        match *event {
            rdev::EventType::KeyPress(k) if k == self.key => !std::mem::replace(&mut self.held, true),
            rdev::EventType::KeyRelease(k) if k == self.key => {
                self.held = false;
                false
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyListener
// ---------------------------------------------------------------------------

pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Spawn the listener thread; each fresh press of `key` sends
    /// [`ControllerEvent::ToggleRecording`] on `tx` via `blocking_send`.
    pub fn start(key: rdev::Key, tx: mpsc::Sender<ControllerEvent>) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut latch = KeyLatch::new(key);
                let result = rdev::listen(move |event| {
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    if latch.on_event(&event.event_type) {
                        log::debug!("hotkey: {key:?} pressed");
                        let _ = tx.blocking_send(ControllerEvent::ToggleRecording);
                    }
                });

                if let Err(e) = result {
                    log::error!("hotkey: rdev::listen exited: {e:?}");
                }
            })?;

        log::info!("hotkey: {key:?} toggles recording");
        Ok(Self {
            stop,
            _thread: thread,
        })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::EventType::{KeyPress, KeyRelease};
    use rdev::Key;

    #[test]
    fn press_toggles_once_per_hold() {
        let mut latch = KeyLatch::new(Key::F9);
        assert!(latch.on_event(&KeyPress(Key::F9)));
        assert!(!latch.on_event(&KeyPress(Key::F9)));
        assert!(!latch.on_event(&KeyPress(Key::F9)));
        assert!(!latch.on_event(&KeyRelease(Key::F9)));
        assert!(latch.on_event(&KeyPress(Key::F9)));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut latch = KeyLatch::new(Key::F9);
        assert!(!latch.on_event(&KeyPress(Key::F8)));
        assert!(!latch.on_event(&KeyRelease(Key::F8)));
        assert!(!latch.on_event(&rdev::EventType::MouseMove { x: 1.0, y: 2.0 }));
        assert!(latch.on_event(&KeyPress(Key::F9)));
    }
}
