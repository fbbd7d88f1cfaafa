//! Sample conversion from the device format to the wire format.
//!
//! The backend expects **mono 16-bit PCM** at the configured rate (16 kHz by
//! default).  Microphones usually deliver interleaved `f32` at 44.1 or
//! 48 kHz, so each callback buffer goes through:
//!
//! 1. [`downmix`]: average interleaved channels into mono.
//! 2. [`Resampler`]: linear interpolation to the target rate, stateful
//!    across buffers.
//! 3. [`to_pcm16`]: clamp and scale to `i16`.

// ---------------------------------------------------------------------------
// downmix
// ---------------------------------------------------------------------------

/// Average interleaved `channels` into one.
///
/// ```rust
/// use kiosk_voice_macro::audio::downmix;
///
/// assert_eq!(downmix(&[0.5, -0.5, 0.25, 0.75], 2), vec![0.0, 0.5]);
/// ```
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Resampler
// ---------------------------------------------------------------------------

/// Streaming linear-interpolation resampler for mono audio.
///
/// Device callbacks arrive in arbitrary buffer sizes, so the read position
/// and the last input sample carry over between [`process`](Self::process)
/// calls.  Interpolation across a buffer seam uses the previous buffer's
/// final sample, and the output count over a long stream stays at
/// `input * to / from` with no per-buffer rounding.
///
/// ```rust
/// use kiosk_voice_macro::audio::Resampler;
///
/// let mut rs = Resampler::new(48_000, 16_000);
/// let total: usize = (0..30).map(|_| rs.process(&[0.5; 512]).len()).sum();
/// assert_eq!(total, 30 * 512 / 3);
/// ```
#[derive(Debug, Clone)]
pub struct Resampler {
    from: u32,
    to: u32,
    step: f64,
    /// Next output position, in input samples relative to the next buffer.
    /// `-1.0` addresses `last`.
    pos: f64,
    last: Option<f32>,
}

impl Resampler {
    pub fn new(from: u32, to: u32) -> Self {
        let step = if from == 0 || to == 0 {
            1.0
        } else {
            from as f64 / to as f64
        };
        Self {
            from,
            to,
            step,
            pos: 0.0,
            last: None,
        }
    }

    pub fn from_rate(&self) -> u32 {
        self.from
    }

    fn passthrough(&self) -> bool {
        self.from == self.to || self.from == 0 || self.to == 0
    }

    /// Forget the carried position, e.g. between recordings.
    pub fn reset(&mut self) {
        self.pos = 0.0;
        self.last = None;
    }

    /// Resample the next chunk of a continuous stream.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if self.passthrough() {
            return input.to_vec();
        }
        if input.is_empty() {
            return Vec::new();
        }

        let len = input.len() as isize;
        let sample = |i: isize| -> f32 {
            if i < 0 {
                self.last.unwrap_or(input[0])
            } else {
                input[i as usize]
            }
        };

        let mut out = Vec::with_capacity((input.len() as f64 / self.step) as usize + 1);
        loop {
            let idx = self.pos.floor() as isize;
            if idx + 1 >= len {
                break;
            }
            let frac = (self.pos - idx as f64) as f32;
            let (a, b) = (sample(idx), sample(idx + 1));
            out.push(a + (b - a) * frac);
            self.pos += self.step;
        }

        self.pos -= len as f64;
        self.last = input.last().copied();
        out
    }
}

// ---------------------------------------------------------------------------
// to_pcm16
// ---------------------------------------------------------------------------

/// Convert `[-1.0, 1.0]` floats to signed 16-bit samples, clamping overs.
pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
