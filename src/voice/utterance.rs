//! Utterance splitting.
//!
//! A short pause in speech is turned into an `audio.end` / `audio.start`
//! pair so the backend finalizes the transcript without the stream being
//! torn down.  [`UtteranceSplitter`] only decides *when*; the controller
//! performs the sends.

use std::time::{Duration, Instant};

use crate::config::UtteranceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceAction {
    /// Send `audio.end`.
    End,
    /// Send `audio.start` again.
    Resume,
}

#[derive(Debug, Clone)]
pub struct UtteranceSplitter {
    enabled: bool,
    silence: Duration,
    resume_delay: Duration,
    cooldown: Duration,
    last_split: Option<Instant>,
    resume_at: Option<Instant>,
}

impl UtteranceSplitter {
    pub fn new(config: &UtteranceConfig) -> Self {
        Self {
            enabled: config.enabled,
            silence: Duration::from_millis(config.silence_ms),
            resume_delay: Duration::from_millis(config.resume_delay_ms),
            cooldown: Duration::from_millis(config.cooldown_ms),
            last_split: None,
            resume_at: None,
        }
    }

    /// When a pending resume is due, if any.
    pub fn resume_deadline(&self) -> Option<Instant> {
        self.resume_at
    }

    /// Forget pending work, e.g. when recording stops.
    pub fn reset(&mut self) {
        self.resume_at = None;
        self.last_split = None;
    }

    /// Decide what to do at `now`.
    ///
    /// A due resume always wins.  A split happens when speech has been
    /// absent for the silence window, the cooldown since the previous split
    /// has passed, and no mic pulse is running.
    pub fn poll(
        &mut self,
        now: Instant,
        last_speech: Instant,
        pulse_active: bool,
    ) -> Option<UtteranceAction> {
        if let Some(at) = self.resume_at {
            if now >= at {
                self.resume_at = None;
                return Some(UtteranceAction::Resume);
            }
            return None;
        }

        if !self.enabled || pulse_active {
            return None;
        }

        let silent_for = now.saturating_duration_since(last_speech);
        let cooled = self
            .last_split
            .map_or(true, |t| now.saturating_duration_since(t) >= self.cooldown);
        if silent_for >= self.silence && cooled {
            log::debug!("voice: {:.2}s of silence, splitting utterance", silent_for.as_secs_f32());
            self.last_split = Some(now);
            self.resume_at = Some(now + self.resume_delay);
            return Some(UtteranceAction::End);
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
