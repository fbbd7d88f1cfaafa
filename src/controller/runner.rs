//! The controller loop.
//!
//! [`Controller`] owns the record toggle and the voice link.  It reacts to
//! [`ControllerEvent`]s and to its own timers:
//!
//! ```text
//! select! {
//!   event queue     → toggle / server stop / processing flag / mic pulse
//!   500 ms tick     → 60 s silence timeout, utterance split
//!   next deadline   → utterance resume, pulse pause, pulse resume
//!   shutdown token  → stop recording, return
//! }
//! ```
//!
//! While an order is processing every stop request is refused, so a batch
//! of clicks is never interrupted by the microphone shutting down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::state::{ControllerEvent, ControllerState, RecordingState};
use crate::audio::SpeechDetector;
use crate::config::AppConfig;
use crate::voice::{AudioChannel, UtteranceAction, UtteranceSplitter, VoiceError};

const TICK: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// VoiceLink
// ---------------------------------------------------------------------------

/// The parts of the backend stream the controller drives.
#[async_trait]
pub trait VoiceLink: Send {
    async fn start(&mut self) -> Result<(), VoiceError>;
    async fn stop(&mut self);
    async fn send_audio_end(&mut self);
    async fn send_audio_start(&mut self);
}

#[async_trait]
impl VoiceLink for AudioChannel {
    async fn start(&mut self) -> Result<(), VoiceError> {
        AudioChannel::start(self).await
    }

    async fn stop(&mut self) {
        AudioChannel::stop(self).await
    }

    async fn send_audio_end(&mut self) {
        AudioChannel::send_audio_end(self).await
    }

    async fn send_audio_start(&mut self) {
        AudioChannel::send_audio_start(self).await
    }
}

// ---------------------------------------------------------------------------
// StopReason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    User,
    Server,
    Silence,
    Shutdown,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller {
    link: Box<dyn VoiceLink>,
    /// Shared with the capture pump; frames flow only while set.
    capture_on: Arc<AtomicBool>,
    speech: SpeechDetector,
    splitter: UtteranceSplitter,
    silence_timeout: Duration,
    pulse_interval: Duration,
    pulse_pause: Duration,
    pulse_next: Option<Instant>,
    pulse_resume: Option<Instant>,
    state: ControllerState,
}

impl Controller {
    pub fn new(
        link: Box<dyn VoiceLink>,
        capture_on: Arc<AtomicBool>,
        speech: SpeechDetector,
        config: &AppConfig,
    ) -> Self {
        Self {
            link,
            capture_on,
            speech,
            splitter: UtteranceSplitter::new(&config.utterance),
            silence_timeout: Duration::from_secs(config.capture.silence_timeout_secs),
            pulse_interval: Duration::from_millis(config.pulse.interval_ms),
            pulse_pause: Duration::from_millis(config.pulse.pause_ms),
            pulse_next: None,
            pulse_resume: None,
            state: ControllerState::default(),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `events` closes or `shutdown` is cancelled.  Recording is
    /// stopped on the way out.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ControllerEvent>,
        shutdown: CancellationToken,
    ) -> ControllerState {
        let mut tick = tokio::time::interval(TICK);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            let deadline = self.next_deadline();
            let wake = tokio::time::Instant::from_std(
                deadline.unwrap_or_else(|| Instant::now() + TICK),
            );

            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event, Instant::now()).await,
                    None => break,
                },
                _ = tick.tick() => self.on_tick(Instant::now()).await,
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    self.on_deadline(Instant::now()).await;
                }
            }
        }

        self.stop_recording(StopReason::Shutdown).await;
        log::info!("controller: shut down");
        self.state
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    async fn handle_event(&mut self, event: ControllerEvent, now: Instant) {
        match event {
            ControllerEvent::ToggleRecording => {
                if self.state.is_recording() {
                    self.stop_recording(StopReason::User).await;
                } else {
                    self.start_recording(now).await;
                }
            }
            ControllerEvent::ServerStop => {
                log::info!("controller: backend requested stop");
                self.stop_recording(StopReason::Server).await;
            }
            ControllerEvent::ProcessingOrder(on) => {
                self.state.processing_order = on;
                if on {
                    log::info!("controller: order processing, microphone stop locked");
                } else {
                    log::info!("controller: order done, microphone stop unlocked");
                }
            }
            ControllerEvent::MicPulse(enabled) => self.set_mic_pulse(enabled, now).await,
            ControllerEvent::Transcript { text, is_final } => {
                if is_final {
                    log::info!("controller: transcript {text:?}");
                } else {
                    log::debug!("controller: partial {text:?}");
                }
            }
            ControllerEvent::BotReply(text) => log::info!("controller: bot reply {text:?}"),
        }
    }

    async fn start_recording(&mut self, now: Instant) {
        if self.state.is_recording() {
            return;
        }
        self.speech.touch(now);
        self.splitter.reset();
        self.capture_on.store(true, Ordering::Relaxed);

        if let Err(e) = self.link.start().await {
            log::error!("controller: cannot start recording: {e}");
            self.capture_on.store(false, Ordering::Relaxed);
            return;
        }

        self.state.recording = RecordingState::Recording;
        if self.state.mic_pulse {
            self.pulse_next = Some(now + self.pulse_interval);
        }
        log::info!("controller: recording started");
    }

    async fn stop_recording(&mut self, reason: StopReason) {
        if !self.state.is_recording() {
            return;
        }
        if self.state.processing_order && reason != StopReason::Shutdown {
            log::info!("controller: {reason:?} stop ignored while an order is processing");
            return;
        }

        self.state.recording = RecordingState::Idle;
        self.state.pulse_paused = false;
        self.capture_on.store(false, Ordering::Relaxed);
        self.splitter.reset();
        self.pulse_next = None;
        self.pulse_resume = None;
        self.link.stop().await;
        log::info!("controller: recording stopped ({reason:?})");
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    fn next_deadline(&self) -> Option<Instant> {
        [self.splitter.resume_deadline(), self.pulse_next, self.pulse_resume]
            .into_iter()
            .flatten()
            .min()
    }

    async fn on_tick(&mut self, now: Instant) {
        if !self.state.is_recording() {
            return;
        }
        if !self.state.processing_order && self.speech.silence_timed_out(now, self.silence_timeout)
        {
            log::info!(
                "controller: no speech for {}s",
                self.silence_timeout.as_secs()
            );
            self.stop_recording(StopReason::Silence).await;
            return;
        }
        self.poll_utterance(now).await;
    }

    async fn on_deadline(&mut self, now: Instant) {
        if self.pulse_resume.is_some_and(|at| now >= at) {
            self.pulse_resume = None;
            self.resume_after_pulse().await;
        }
        if self.pulse_next.is_some_and(|at| now >= at) {
            self.pulse_cycle(now).await;
        }
        if self.splitter.resume_deadline().is_some_and(|at| now >= at) {
            self.poll_utterance(now).await;
        }
    }

    async fn poll_utterance(&mut self, now: Instant) {
        if !self.state.is_recording() || self.state.pulse_paused {
            return;
        }
        let last_speech = self.speech.last_speech();
        match self.splitter.poll(now, last_speech, self.state.mic_pulse) {
            Some(UtteranceAction::End) => self.link.send_audio_end().await,
            Some(UtteranceAction::Resume) => self.link.send_audio_start().await,
            None => {}
        }
    }

    // -----------------------------------------------------------------------
    // Mic pulse
    // -----------------------------------------------------------------------

    async fn set_mic_pulse(&mut self, enabled: bool, now: Instant) {
        if enabled == self.state.mic_pulse {
            return;
        }
        self.state.mic_pulse = enabled;

        if enabled {
            log::info!("controller: mic pulse on");
            if self.state.is_recording() {
                self.pulse_next = Some(now);
            }
        } else {
            log::info!("controller: mic pulse off");
            self.pulse_next = None;
            if self.pulse_resume.take().is_some() {
                self.resume_after_pulse().await;
            }
        }
    }

    /// Pause the stream for the pulse window and schedule the next cycle.
    async fn pulse_cycle(&mut self, now: Instant) {
        self.pulse_next = Some(now + self.pulse_interval);
        if !self.state.is_recording() || self.state.pulse_paused {
            return;
        }
        if self.state.processing_order {
            log::debug!("controller: pulse skipped while an order is processing");
            return;
        }

        log::debug!("controller: pulse pause");
        self.state.pulse_paused = true;
        self.capture_on.store(false, Ordering::Relaxed);
        self.link.stop().await;
        self.pulse_resume = Some(now + self.pulse_pause);
    }

    async fn resume_after_pulse(&mut self) {
        if !self.state.pulse_paused {
            return;
        }
        self.state.pulse_paused = false;
        if !self.state.is_recording() {
            return;
        }

        log::debug!("controller: pulse resume");
        self.capture_on.store(true, Ordering::Relaxed);
        if let Err(e) = self.link.start().await {
            log::error!("controller: cannot resume after pulse: {e}");
            self.capture_on.store(false, Ordering::Relaxed);
            self.state.recording = RecordingState::Idle;
            self.pulse_next = None;
            self.splitter.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum LinkOp {
        Start,
        Stop,
        End,
        Resume,
    }

    #[derive(Clone, Default)]
    struct RecordingLink {
        ops: Arc<Mutex<Vec<LinkOp>>>,
        refuse_start: bool,
    }

    impl RecordingLink {
        fn ops(&self) -> Vec<LinkOp> {
            self.ops.lock().unwrap().clone()
        }

        fn push(&self, op: LinkOp) {
            self.ops.lock().unwrap().push(op);
        }
    }

    #[async_trait]
    impl VoiceLink for RecordingLink {
        async fn start(&mut self) -> Result<(), VoiceError> {
            if self.refuse_start {
                return Err(VoiceError::Connect("refused".into()));
            }
            self.push(LinkOp::Start);
            Ok(())
        }

        async fn stop(&mut self) {
            self.push(LinkOp::Stop);
        }

        async fn send_audio_end(&mut self) {
            self.push(LinkOp::End);
        }

        async fn send_audio_start(&mut self) {
            self.push(LinkOp::Resume);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller(link: RecordingLink) -> (Controller, Arc<AtomicBool>, SpeechDetector) {
        let flag = Arc::new(AtomicBool::new(false));
        let speech = SpeechDetector::new(35.0);
        let ctl = Controller::new(
            Box::new(link),
            Arc::clone(&flag),
            speech.clone(),
            &AppConfig::default(),
        );
        (ctl, flag, speech)
    }

    #[tokio::test]
    async fn toggle_starts_and_stops() {
        let link = RecordingLink::default();
        let (mut ctl, flag, _) = controller(link.clone());
        let t0 = Instant::now();

        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        assert!(ctl.state().is_recording());
        assert!(flag.load(Ordering::Relaxed));

        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        assert!(!ctl.state().is_recording());
        assert!(!flag.load(Ordering::Relaxed));
        assert_eq!(link.ops(), vec![LinkOp::Start, LinkOp::Stop]);
    }

    #[tokio::test]
    async fn failed_connect_stays_idle() {
        let link = RecordingLink {
            refuse_start: true,
            ..RecordingLink::default()
        };
        let (mut ctl, flag, _) = controller(link.clone());

        ctl.handle_event(ControllerEvent::ToggleRecording, Instant::now()).await;
        assert!(!ctl.state().is_recording());
        assert!(!flag.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn server_stop_ignored_while_processing() {
        let link = RecordingLink::default();
        let (mut ctl, _, _) = controller(link.clone());
        let t0 = Instant::now();

        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        ctl.handle_event(ControllerEvent::ProcessingOrder(true), t0).await;
        ctl.handle_event(ControllerEvent::ServerStop, t0).await;
        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        assert!(ctl.state().is_recording());

        ctl.handle_event(ControllerEvent::ProcessingOrder(false), t0).await;
        ctl.handle_event(ControllerEvent::ServerStop, t0).await;
        assert!(!ctl.state().is_recording());
        assert_eq!(link.ops(), vec![LinkOp::Start, LinkOp::Stop]);
    }

    #[tokio::test]
    async fn silence_timeout_stops_unless_processing() {
        let link = RecordingLink::default();
        let (mut ctl, _, _) = controller(link.clone());
        let t0 = Instant::now();
        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;

        ctl.handle_event(ControllerEvent::ProcessingOrder(true), t0).await;
        ctl.on_tick(t0 + Duration::from_secs(61)).await;
        assert!(ctl.state().is_recording());

        ctl.handle_event(ControllerEvent::ProcessingOrder(false), t0).await;
        ctl.on_tick(t0 + Duration::from_secs(62)).await;
        assert!(!ctl.state().is_recording());
    }

    #[tokio::test]
    async fn short_pause_splits_utterance() {
        let link = RecordingLink::default();
        let (mut ctl, _, speech) = controller(link.clone());
        let t0 = Instant::now();
        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        speech.touch(t0);

        ctl.on_tick(t0 + ms(400)).await;
        ctl.on_tick(t0 + ms(900)).await;
        let resume_at = ctl.next_deadline().expect("resume scheduled");
        assert_eq!(resume_at, t0 + ms(1200));

        ctl.on_deadline(resume_at).await;
        assert_eq!(link.ops(), vec![LinkOp::Start, LinkOp::End, LinkOp::Resume]);
        assert!(ctl.state().is_recording());
    }

    #[tokio::test]
    async fn pulse_pauses_and_resumes_stream() {
        let link = RecordingLink::default();
        let (mut ctl, flag, speech) = controller(link.clone());
        let t0 = Instant::now();
        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        ctl.handle_event(ControllerEvent::MicPulse(true), t0).await;
        assert_eq!(ctl.next_deadline(), Some(t0));

        ctl.on_deadline(t0).await;
        assert!(ctl.state().pulse_paused);
        assert!(!flag.load(Ordering::Relaxed));
        assert_eq!(ctl.next_deadline(), Some(t0 + ms(500)));

        ctl.on_deadline(t0 + ms(500)).await;
        assert!(!ctl.state().pulse_paused);
        assert!(flag.load(Ordering::Relaxed));
        assert_eq!(ctl.next_deadline(), Some(t0 + ms(5_000)));

        // utterance split stays off while pulsing
        speech.touch(t0);
        ctl.on_tick(t0 + ms(2_000)).await;
        assert_eq!(
            link.ops(),
            vec![LinkOp::Start, LinkOp::Stop, LinkOp::Start]
        );
    }

    #[tokio::test]
    async fn disabling_pulse_mid_pause_resumes() {
        let link = RecordingLink::default();
        let (mut ctl, flag, _) = controller(link.clone());
        let t0 = Instant::now();
        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        ctl.handle_event(ControllerEvent::MicPulse(true), t0).await;
        ctl.on_deadline(t0).await;

        ctl.handle_event(ControllerEvent::MicPulse(false), t0 + ms(100)).await;
        assert!(!ctl.state().pulse_paused);
        assert!(flag.load(Ordering::Relaxed));
        assert_eq!(ctl.next_deadline(), None);
        assert_eq!(
            link.ops(),
            vec![LinkOp::Start, LinkOp::Stop, LinkOp::Start]
        );
    }

    #[tokio::test]
    async fn pulse_skipped_while_processing() {
        let link = RecordingLink::default();
        let (mut ctl, _, _) = controller(link.clone());
        let t0 = Instant::now();
        ctl.handle_event(ControllerEvent::ToggleRecording, t0).await;
        ctl.handle_event(ControllerEvent::ProcessingOrder(true), t0).await;
        ctl.handle_event(ControllerEvent::MicPulse(true), t0).await;

        ctl.on_deadline(t0).await;
        assert!(!ctl.state().pulse_paused);
        assert_eq!(link.ops(), vec![LinkOp::Start]);
    }

    #[tokio::test]
    async fn run_stops_recording_when_queue_closes() {
        let link = RecordingLink::default();
        let (ctl, _, _) = controller(link.clone());
        let (tx, rx) = mpsc::channel(8);

        tx.send(ControllerEvent::ToggleRecording).await.unwrap();
        drop(tx);

        let state = ctl.run(rx, CancellationToken::new()).await;
        assert!(!state.is_recording());
        assert_eq!(link.ops(), vec![LinkOp::Start, LinkOp::Stop]);
    }

    #[tokio::test]
    async fn shutdown_overrides_processing_guard() {
        let link = RecordingLink::default();
        let (ctl, _, _) = controller(link.clone());
        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(ctl.run(rx, shutdown.clone()));
        tx.send(ControllerEvent::ToggleRecording).await.unwrap();
        tx.send(ControllerEvent::ProcessingOrder(true)).await.unwrap();
        tokio::time::sleep(ms(50)).await;
        shutdown.cancel();

        let state = task.await.unwrap();
        assert!(!state.is_recording());
        assert_eq!(link.ops(), vec![LinkOp::Start, LinkOp::Stop]);
    }

    #[test]
    fn voice_link_is_object_safe() {
        let _: Option<Box<dyn VoiceLink>> = None;
    }
}
