//! Voice backend link: audio up, transcripts and TTS down.
//!
//! * [`AudioChannel`]: WebSocket session supervisor (sender + receiver
//!   tasks, TTS fallback timer).
//! * [`protocol`]: the JSON messages on the wire.
//! * [`tts`]: chunk buffering and `rodio` playback.
//! * [`UtteranceSplitter`]: when to cut an utterance on a short pause.

pub mod channel;
pub mod protocol;
pub mod tts;
pub mod utterance;

pub use channel::{AudioChannel, ChannelState, Frame, SharedFrames};
pub use protocol::{Inbound, Outbound, StreamConfig};
pub use tts::{RodioPlayer, TtsBuffer, TtsError, TtsPlayer};
pub use utterance::{UtteranceAction, UtteranceSplitter};

use std::time::Duration;

use thiserror::Error;

/// Errors on the backend stream.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("invalid backend URL: {0}")]
    Url(String),

    #[error("cannot connect to voice backend: {0}")]
    Connect(String),

    #[error("voice backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("cannot send to voice backend: {0}")]
    Send(String),

    /// A message that is not valid JSON or carries a bad payload.
    #[error("malformed backend message: {0}")]
    Protocol(String),
}
