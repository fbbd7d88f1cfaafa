//! Fixed-size framing of the converted PCM stream.
//!
//! cpal hands over buffers of whatever size the driver likes; the backend
//! wants frames of exactly `frame_samples` samples (320 = 20 ms at 16 kHz).
//! [`FrameBuffer`] carries the remainder of one callback over to the next.

/// Accumulates `i16` samples and cuts them into equal frames.
///
/// ```rust
/// use kiosk_voice_macro::audio::FrameBuffer;
///
/// let mut buf = FrameBuffer::new(4);
/// assert!(buf.push(&[1, 2, 3]).is_empty());
/// assert_eq!(buf.push(&[4, 5]), vec![vec![1, 2, 3, 4]]);
/// assert_eq!(buf.pending(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frame_samples: usize,
    pending: Vec<i16>,
}

impl FrameBuffer {
    /// `frame_samples` of zero is bumped to one.
    pub fn new(frame_samples: usize) -> Self {
        let frame_samples = frame_samples.max(1);
        Self {
            frame_samples,
            pending: Vec::with_capacity(frame_samples * 2),
        }
    }

    pub fn frame_samples(&self) -> usize {
        self.frame_samples
    }

    /// Samples waiting for the next frame to fill.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Append `samples`; return every frame that is now complete.
    pub fn push(&mut self, samples: &[i16]) -> Vec<Vec<i16>> {
        self.pending.extend_from_slice(samples);

        let full = self.pending.len() / self.frame_samples;
        if full == 0 {
            return Vec::new();
        }
        let take = full * self.frame_samples;
        let frames = self.pending[..take]
            .chunks_exact(self.frame_samples)
            .map(<[i16]>::to_vec)
            .collect();
        self.pending.drain(..take);
        frames
    }

    /// Drop the partial frame, e.g. when recording stops.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_push_yields_several_frames() {
        let mut buf = FrameBuffer::new(320);
        let samples: Vec<i16> = (0..1_000).map(|i| i as i16).collect();
        let frames = buf.push(&samples);

        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.len() == 320));
        assert_eq!(frames[1][0], 320);
        assert_eq!(buf.pending(), 40);
    }

    #[test]
    fn remainder_carries_over() {
        let mut buf = FrameBuffer::new(320);
        assert!(buf.push(&[7; 300]).is_empty());
        let frames = buf.push(&[9; 30]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0][299], 7);
        assert_eq!(frames[0][300], 9);
        assert_eq!(buf.pending(), 10);
    }

    #[test]
    fn clear_drops_partial_frame() {
        let mut buf = FrameBuffer::new(4);
        buf.push(&[1, 2]);
        buf.clear();
        assert_eq!(buf.push(&[3, 4, 5, 6]), vec![vec![3, 4, 5, 6]]);
    }

    #[test]
    fn zero_frame_size_is_clamped() {
        let buf = FrameBuffer::new(0);
        assert_eq!(buf.frame_samples(), 1);
    }
}
