//! Microphone side of the voice channel.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → FramePump
//!   → downmix → Resampler → to_pcm16 → FrameBuffer (fixed frames)
//!   → SpeechDetector (last speech instant)
//!   → tokio mpsc frame queue → voice::AudioChannel sender task
//! ```

pub mod buffer;
pub mod capture;
pub mod resample;
pub mod vad;

pub use buffer::FrameBuffer;
pub use capture::{AudioCapture, CaptureError, FramePump, StreamHandle};
pub use resample::{downmix, to_pcm16, Resampler};
pub use vad::{rms_i16, SpeechDetector};
