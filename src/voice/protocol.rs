//! Wire messages exchanged with the voice backend.
//!
//! Every message is a JSON text frame with a `type` discriminator.
//!
//! | Direction | `type`                                   | Payload            |
//! |-----------|------------------------------------------|--------------------|
//! | out       | `audio.start`                            | `config`           |
//! | out       | `audio.chunk`                            | `audioData` (b64)  |
//! | out       | `audio.end`                              | -                  |
//! | in        | `stop`                                   | -                  |
//! | in        | `error`                                  | `message`          |
//! | in        | `tts.chunk`                              | `audioData` (b64)  |
//! | in        | `tts.complete` / `tts.end` / `tts.done`  | -                  |
//! | in        | `bot.reply`                              | `message`          |
//! | in        | `transcript.partial` / `transcript.final`| `transcript`       |

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;

use super::VoiceError;

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Stream parameters announced in `audio.start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    pub sample_rate: u32,
    pub encoding: &'static str,
    pub channels: u16,
}

impl StreamConfig {
    /// Mono signed 16-bit little-endian PCM.
    pub fn pcm16_mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            encoding: "pcm_s16le",
            channels: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "audio.start")]
    AudioStart { config: StreamConfig },

    #[serde(rename = "audio.chunk")]
    AudioChunk {
        #[serde(rename = "audioData")]
        audio_data: String,
    },

    #[serde(rename = "audio.end")]
    AudioEnd,
}

impl Outbound {
    /// Wrap one PCM frame as an `audio.chunk`.
    pub fn chunk(frame: &[i16]) -> Self {
        let bytes: Vec<u8> = frame.iter().flat_map(|s| s.to_le_bytes()).collect();
        Outbound::AudioChunk {
            audio_data: STANDARD.encode(bytes),
        }
    }

    pub fn to_text(&self) -> String {
        // serializing these plain structs cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The backend asks the client to stop recording.
    Stop,
    Error(String),
    /// Base64 TTS audio.  `None` when the message carried no payload.
    TtsChunk(Option<String>),
    TtsComplete,
    BotReply(String),
    Transcript { text: String, is_final: bool },
    /// A well-formed message of a type this client does not handle.
    Unknown(String),
}

impl Inbound {
    /// Parse one text frame.
    pub fn parse(text: &str) -> Result<Self, VoiceError> {
        let data: Value =
            serde_json::from_str(text).map_err(|e| VoiceError::Protocol(e.to_string()))?;
        let field = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let kind = data.get("type").and_then(Value::as_str).unwrap_or_default();
        Ok(match kind {
            "stop" => Inbound::Stop,
            "error" => Inbound::Error(
                data.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            ),
            "tts.chunk" => Inbound::TtsChunk(
                data.get("audioData")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
            "tts.complete" | "tts.end" | "tts.done" => Inbound::TtsComplete,
            "bot.reply" => Inbound::BotReply(field("message")),
            "transcript.partial" => Inbound::Transcript {
                text: field("transcript"),
                is_final: false,
            },
            "transcript.final" => Inbound::Transcript {
                text: field("transcript"),
                is_final: true,
            },
            other => Inbound::Unknown(other.to_string()),
        })
    }
}

/// Decode a base64 audio payload.
pub fn decode_audio(b64: &str) -> Result<Vec<u8>, VoiceError> {
    STANDARD
        .decode(b64)
        .map_err(|e| VoiceError::Protocol(format!("bad audioData: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
