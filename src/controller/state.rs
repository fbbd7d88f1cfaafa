//! Controller events and the state they drive.
//!
//! Every producer (hotkey thread, voice receiver task, orders loop) talks to
//! the controller through one `tokio::sync::mpsc` queue of
//! [`ControllerEvent`]s.
//!
//! ```text
//! Idle ──ToggleRecording──▶ Recording
//! Recording ──ToggleRecording / ServerStop / 60 s silence──▶ Idle
//!           (ignored while an order is processing)
//! Recording ──mic pulse──▶ paused 500 ms ──▶ Recording
//! ```

// ---------------------------------------------------------------------------
// ControllerEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The backend asked for the microphone to stop, or the stream closed.
    ServerStop,
    /// An order batch started (`true`) or finished (`false`).
    ProcessingOrder(bool),
    /// Backend-driven mic pulse switched on or off.
    MicPulse(bool),
    Transcript { text: String, is_final: bool },
    BotReply(String),
    /// The record hotkey was pressed.
    ToggleRecording,
}

// ---------------------------------------------------------------------------
// RecordingState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

impl RecordingState {
    /// ```
    /// use kiosk_voice_macro::controller::RecordingState;
    ///
    /// assert_eq!(RecordingState::Idle.label(), "idle");
    /// assert_eq!(RecordingState::Recording.label(), "rec");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "rec",
        }
    }
}

// ---------------------------------------------------------------------------
// ControllerState
// ---------------------------------------------------------------------------

/// What the controller currently believes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub recording: RecordingState,
    /// An order batch is running; stops are refused.
    pub processing_order: bool,
    /// The backend enabled the periodic mic pulse.
    pub mic_pulse: bool,
    /// Inside the short pause of a pulse cycle.
    pub pulse_paused: bool,
}

impl ControllerState {
    pub fn is_recording(&self) -> bool {
        self.recording == RecordingState::Recording
    }
}
