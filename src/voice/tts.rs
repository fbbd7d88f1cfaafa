//! TTS buffering and playback.
//!
//! The backend streams synthesized speech as a series of `tts.chunk`
//! messages.  Chunks are collected in a [`TtsBuffer`] and played as one clip
//! once the backend signals completion (or the fallback timer fires).
//!
//! Playback drains the buffer before decoding, so the buffer is empty after
//! every attempt whether or not playback succeeds.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TtsError {
    /// No output device, or the device refused a sink.
    #[error("audio output unavailable: {0}")]
    Device(String),

    /// The concatenated chunks are not a decodable clip.
    #[error("cannot decode TTS audio: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// TtsBuffer
// ---------------------------------------------------------------------------

/// Ordered TTS chunks awaiting playback.  Cheap to clone (`Arc`).
#[derive(Debug, Clone, Default)]
pub struct TtsBuffer {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl TtsBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, chunk: Vec<u8>) -> usize {
        let mut chunks = self.chunks.lock().unwrap_or_else(|e| e.into_inner());
        chunks.push(chunk);
        chunks.len()
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate every chunk in arrival order and leave the buffer empty.
    pub fn drain(&self) -> Vec<u8> {
        let chunks = std::mem::take(&mut *self.chunks.lock().unwrap_or_else(|e| e.into_inner()));
        chunks.concat()
    }

    pub fn clear(&self) {
        self.chunks.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

// ---------------------------------------------------------------------------
// TtsPlayer trait
// ---------------------------------------------------------------------------

/// Blocking audio playback of one encoded clip (MP3 or WAV).
///
/// Called from tokio's blocking pool.
pub trait TtsPlayer: Send + Sync {
    fn play(&self, audio: &[u8]) -> Result<(), TtsError>;
}

/// Drain `buffer` and play its content through `player`.
///
/// Returns `false` when there was nothing to play.  Errors are logged.
pub fn play_buffered(buffer: &TtsBuffer, player: &dyn TtsPlayer) -> bool {
    let audio = buffer.drain();
    if audio.is_empty() {
        log::debug!("tts: nothing buffered");
        return false;
    }

    log::info!("tts: playing {} bytes", audio.len());
    match player.play(&audio) {
        Ok(()) => log::debug!("tts: playback finished"),
        Err(e) => log::warn!("tts: {e}"),
    }
    true
}

// ---------------------------------------------------------------------------
// RodioPlayer
// ---------------------------------------------------------------------------

/// Plays clips on the default output device through `rodio`.
///
/// The output stream is opened per clip because `OutputStream` is not `Send`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl TtsPlayer for RodioPlayer {
    fn play(&self, audio: &[u8]) -> Result<(), TtsError> {
        let (_stream, handle) =
            OutputStream::try_default().map_err(|e| TtsError::Device(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| TtsError::Device(e.to_string()))?;
        let source =
            Decoder::new(Cursor::new(audio.to_vec())).map_err(|e| TtsError::Decode(e.to_string()))?;
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingPlayer (tests)
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
