//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] wraps the cpal host/device/stream lifecycle.  The stream
//! runs for the lifetime of the returned [`StreamHandle`]; whether frames
//! actually reach the voice channel is decided per callback by the shared
//! `recording` flag inside [`FramePump`].
//!
//! ```text
//! cpal f32 (N ch, device rate)
//!   → downmix → Resampler → to_pcm16 → FrameBuffer
//!   → SpeechDetector::observe
//!   → frame queue (try_send, dropped when full)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::{downmix, to_pcm16, FrameBuffer, Resampler, SpeechDetector};
use crate::voice::Frame;

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Not `Send` on every platform; keep it on the thread that started it.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// FramePump
// ---------------------------------------------------------------------------

/// Per-callback processing, separated from cpal so it can be tested.
pub struct FramePump {
    frames: mpsc::Sender<Frame>,
    recording: Arc<AtomicBool>,
    speech: SpeechDetector,
    buffer: FrameBuffer,
    resampler: Option<Resampler>,
    target_rate: u32,
    dropped: u64,
}

impl FramePump {
    pub fn new(
        frames: mpsc::Sender<Frame>,
        recording: Arc<AtomicBool>,
        speech: SpeechDetector,
        target_rate: u32,
        frame_samples: usize,
    ) -> Self {
        Self {
            frames,
            recording,
            speech,
            buffer: FrameBuffer::new(frame_samples),
            resampler: None,
            target_rate,
            dropped: 0,
        }
    }

    /// Frames discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Convert one device buffer and forward its complete frames.
    ///
    /// Returns the number of frames queued.  Nothing is forwarded, and any
    /// partial frame is discarded, while the recording flag is off.
    pub fn process(&mut self, data: &[f32], channels: u16, device_rate: u32) -> usize {
        if !self.recording.load(Ordering::Relaxed) {
            self.buffer.clear();
            if let Some(rs) = self.resampler.as_mut() {
                rs.reset();
            }
            return 0;
        }

        if self
            .resampler
            .as_ref()
            .map_or(true, |rs| rs.from_rate() != device_rate)
        {
            self.resampler = Some(Resampler::new(device_rate, self.target_rate));
        }
        let target = self.target_rate;
        let resampler = self
            .resampler
            .get_or_insert_with(|| Resampler::new(device_rate, target));
        let mono = downmix(data, channels);
        let pcm = to_pcm16(&resampler.process(&mono));
        let now = Instant::now();

        let mut queued = 0;
        for frame in self.buffer.push(&pcm) {
            self.speech.observe(&frame, now);
            match self.frames.try_send(frame) {
                Ok(()) => queued += 1,
                Err(TrySendError::Full(_)) => {
                    self.dropped += 1;
                    if self.dropped % 50 == 1 {
                        log::debug!("capture: frame queue full ({} dropped)", self.dropped);
                    }
                }
                Err(TrySendError::Closed(_)) => break,
            }
        }
        queued
    }
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// Default input device and its native stream configuration.
///
/// ```rust,no_run
/// use std::sync::{atomic::AtomicBool, Arc};
/// use kiosk_voice_macro::audio::{AudioCapture, FramePump, SpeechDetector};
///
/// let (tx, _rx) = tokio::sync::mpsc::channel(50);
/// let recording = Arc::new(AtomicBool::new(true));
/// let pump = FramePump::new(tx, recording, SpeechDetector::new(35.0), 16_000, 320);
///
/// let capture = AudioCapture::new().unwrap();
/// let _handle = capture.start(pump).unwrap();
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        log::info!(
            "capture: {} @ {sample_rate} Hz, {channels} ch",
            device.name().unwrap_or_else(|_| "unknown device".into())
        );

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Start the input stream; every callback buffer goes through `pump`.
    pub fn start(&self, mut pump: FramePump) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                pump.process(data, channels, sample_rate);
            },
            |err: cpal::StreamError| {
                log::error!("capture: stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
