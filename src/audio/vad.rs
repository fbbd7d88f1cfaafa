//! Energy-based speech detection on PCM frames.
//!
//! A frame counts as speech when its RMS, measured on the raw `i16` scale,
//! reaches the configured threshold (35 by default, i.e. barely above the
//! noise floor of a quiet room).  The detector only remembers *when* speech
//! was last heard; the controller uses that for the silence timeout and for
//! utterance splitting.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// RMS of `frame` on the `i16` scale.  `0.0` for an empty frame.
///
/// ```rust
/// use kiosk_voice_macro::audio::rms_i16;
///
/// assert_eq!(rms_i16(&[3, -3, 3, -3]), 3.0);
/// assert_eq!(rms_i16(&[]), 0.0);
/// ```
pub fn rms_i16(frame: &[i16]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / frame.len() as f64).sqrt() as f32
}

// ---------------------------------------------------------------------------
// SpeechDetector
// ---------------------------------------------------------------------------

/// Tracks the instant of the most recent speech frame.
///
/// Cheap to clone; clones share the timestamp, so the capture callback and
/// the controller can each hold one.
#[derive(Debug, Clone)]
pub struct SpeechDetector {
    threshold: f32,
    last_speech: Arc<Mutex<Instant>>,
}

impl SpeechDetector {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            last_speech: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Classify `frame`; on speech, move the timestamp to `now`.
    pub fn observe(&self, frame: &[i16], now: Instant) -> bool {
        let speech = rms_i16(frame) >= self.threshold;
        if speech {
            *self.lock() = now;
        }
        speech
    }

    /// Treat `now` as speech, e.g. when recording starts.
    pub fn touch(&self, now: Instant) {
        *self.lock() = now;
    }

    pub fn last_speech(&self) -> Instant {
        *self.lock()
    }

    /// `true` once no speech has been heard for longer than `timeout`.
    pub fn silence_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_speech()) > timeout
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Instant> {
        self.last_speech.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loud_frame_is_speech() {
        let det = SpeechDetector::new(35.0);
        let start = det.last_speech();
        let later = start + Duration::from_secs(1);
        assert!(det.observe(&[1_000; 320], later));
        assert_eq!(det.last_speech(), later);
    }

    #[test]
    fn quiet_frame_keeps_timestamp() {
        let det = SpeechDetector::new(35.0);
        let start = det.last_speech();
        assert!(!det.observe(&[10; 320], start + Duration::from_secs(1)));
        assert_eq!(det.last_speech(), start);
    }

    #[test]
    fn threshold_is_inclusive() {
        let det = SpeechDetector::new(35.0);
        assert!(det.observe(&[35, -35], Instant::now()));
    }

    #[test]
    fn silence_timeout() {
        let det = SpeechDetector::new(35.0);
        let t0 = Instant::now();
        det.touch(t0);
        let limit = Duration::from_secs(60);
        assert!(!det.silence_timed_out(t0 + Duration::from_secs(60), limit));
        assert!(det.silence_timed_out(t0 + Duration::from_secs(61), limit));
    }

    #[test]
    fn clones_share_state() {
        let det = SpeechDetector::new(35.0);
        let other = det.clone();
        let t = Instant::now() + Duration::from_secs(5);
        other.touch(t);
        assert_eq!(det.last_speech(), t);
    }
}
