//! Headless controller: record toggle, processing-order guard, silence
//! timeout, utterance split and backend-driven mic pulse.
//!
//! * [`ControllerEvent`]: the single event queue every producer feeds.
//! * [`Controller`]: the async loop that owns the voice link.
//! * [`VoiceLink`]: the seam to [`AudioChannel`](crate::voice::AudioChannel).

pub mod runner;
pub mod state;

pub use runner::{Controller, VoiceLink};
pub use state::{ControllerEvent, ControllerState, RecordingState};
