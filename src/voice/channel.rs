//! [`AudioChannel`]: the WebSocket session with the voice backend.
//!
//! # Session layout
//!
//! ```text
//!                 ┌──────── sender task ────────┐
//! frame queue ───▶│ recv (100 ms bound) → b64   │──▶ audio.chunk
//!                 └─────────────────────────────┘
//!                 ┌─────── receiver task ───────┐
//! backend ───────▶│ stop / error / tts.* /      │──▶ ControllerEvent
//!                 │ bot.reply / transcript.*    │──▶ TtsBuffer ─▶ playback
//!                 └─────────────────────────────┘
//! ```
//!
//! Both tasks share one [`CancellationToken`]; tearing the session down
//! cancels it, so neither task outlives the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::protocol::{decode_audio, Inbound, Outbound, StreamConfig};
use super::tts::{play_buffered, TtsBuffer, TtsPlayer};
use super::VoiceError;
use crate::config::VoiceConfig;
use crate::controller::ControllerEvent;

/// Bounded wait for the next captured frame.
const FRAME_WAIT: Duration = Duration::from_millis(100);

/// Bound on control sends (`audio.end`, `audio.start`) and the close
/// handshake.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = Arc<AsyncMutex<SplitSink<WsStream, Message>>>;

/// One frame of mono 16-bit PCM.
pub type Frame = Vec<i16>;

/// Receiving end of the capture queue, handed from session to session.
pub type SharedFrames = Arc<AsyncMutex<mpsc::Receiver<Frame>>>;

// ---------------------------------------------------------------------------
// ChannelState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Streaming,
}

// ---------------------------------------------------------------------------
// TTS handling shared by the receiver task and its timers
// ---------------------------------------------------------------------------

struct TtsState {
    buffer: TtsBuffer,
    player: Arc<dyn TtsPlayer>,
    fallback: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    chunks_seen: AtomicU64,
    cancel: CancellationToken,
}

impl TtsState {
    fn on_chunk(self: &Arc<Self>, audio: Vec<u8>) {
        let n = self.buffer.push(audio);
        self.chunks_seen.fetch_add(1, Ordering::SeqCst);
        log::debug!("tts: chunk {n} buffered");

        let state = Arc::clone(self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(state.fallback).await;
            log::info!(
                "tts: no completion after {:?}, playing {} buffered chunk(s)",
                state.fallback,
                state.buffer.len()
            );
            state.play();
        });
        if let Some(previous) = self.lock_timer().replace(timer) {
            previous.abort();
        }
    }

    fn on_complete(self: &Arc<Self>) {
        self.cancel_fallback();
        log::info!("tts: complete, playing {} chunk(s)", self.buffer.len());
        self.play();
    }

    /// Warn when no TTS audio follows a bot reply within the fallback window.
    fn watch_reply(self: &Arc<Self>) {
        let seen = self.chunks_seen.load(Ordering::SeqCst);
        let state = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = state.cancel.cancelled() => {}
                _ = tokio::time::sleep(state.fallback) => {
                    if state.chunks_seen.load(Ordering::SeqCst) == seen {
                        log::warn!(
                            "tts: no audio within {:?} of the bot reply, check the backend TTS service",
                            state.fallback
                        );
                    }
                }
            }
        });
    }

    fn play(self: &Arc<Self>) {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            play_buffered(&state.buffer, state.player.as_ref());
        });
    }

    fn cancel_fallback(&self) {
        if let Some(timer) = self.lock_timer().take() {
            timer.abort();
        }
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct Session {
    cancel: CancellationToken,
    writer: WsWriter,
    sender: JoinHandle<()>,
    receiver: JoinHandle<()>,
    tts: Arc<TtsState>,
}

impl Session {
    fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

// ---------------------------------------------------------------------------
// AudioChannel
// ---------------------------------------------------------------------------

/// Supervisor for the backend stream.  Owned by the controller.
pub struct AudioChannel {
    config: VoiceConfig,
    frames: SharedFrames,
    events: mpsc::Sender<ControllerEvent>,
    player: Arc<dyn TtsPlayer>,
    state: ChannelState,
    session: Option<Session>,
}

impl AudioChannel {
    pub fn new(
        config: VoiceConfig,
        frames: SharedFrames,
        events: mpsc::Sender<ControllerEvent>,
        player: Arc<dyn TtsPlayer>,
    ) -> Self {
        Self {
            config,
            frames,
            events,
            player,
            state: ChannelState::Disconnected,
            session: None,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// `true` while a session is up and the server has not closed it.
    pub fn is_streaming(&self) -> bool {
        self.state == ChannelState::Streaming && self.session.as_ref().is_some_and(Session::is_alive)
    }

    /// TTS buffer of the current session.
    pub fn tts_buffer(&self) -> Option<TtsBuffer> {
        self.session.as_ref().map(|s| s.tts.buffer.clone())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Connect, announce the stream and start the sender/receiver tasks.
    ///
    /// A no-op while already streaming.  A session the server has closed is
    /// torn down and replaced.
    pub async fn start(&mut self) -> Result<(), VoiceError> {
        if self.is_streaming() {
            return Ok(());
        }
        if self.session.is_some() {
            self.stop().await;
        }

        let url = Url::parse(&self.config.ws_url).map_err(|e| VoiceError::Url(e.to_string()))?;
        self.state = ChannelState::Connecting;
        log::info!("voice: connecting to {url}");

        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = Some(self.config.max_message_size);
        let connect =
            tokio_tungstenite::connect_async_with_config(url.as_str(), Some(ws_config), false);
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);

        let ws = match tokio::time::timeout(timeout, connect).await {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                self.state = ChannelState::Disconnected;
                return Err(VoiceError::Connect(e.to_string()));
            }
            Err(_) => {
                self.state = ChannelState::Disconnected;
                return Err(VoiceError::Timeout(timeout));
            }
        };

        let (mut sink, stream) = ws.split();
        let announce = Outbound::AudioStart {
            config: StreamConfig::pcm16_mono(self.config.sample_rate),
        };
        if let Err(e) = sink.send(Message::Text(announce.to_text())).await {
            self.state = ChannelState::Disconnected;
            return Err(VoiceError::Send(e.to_string()));
        }

        let writer: WsWriter = Arc::new(AsyncMutex::new(sink));
        let cancel = CancellationToken::new();
        let tts = Arc::new(TtsState {
            buffer: TtsBuffer::new(),
            player: Arc::clone(&self.player),
            fallback: self.config.tts_fallback(),
            timer: Mutex::new(None),
            chunks_seen: AtomicU64::new(0),
            cancel: cancel.clone(),
        });

        let sender = tokio::spawn(run_sender(
            Arc::clone(&self.frames),
            Arc::clone(&writer),
            cancel.clone(),
        ));
        let receiver = tokio::spawn(run_receiver(
            stream,
            self.events.clone(),
            Arc::clone(&tts),
            cancel.clone(),
        ));

        self.session = Some(Session {
            cancel,
            writer,
            sender,
            receiver,
            tts,
        });
        self.state = ChannelState::Streaming;
        log::info!("voice: streaming");
        Ok(())
    }

    /// Tear the session down: notify the server, close, stop both tasks and
    /// drop buffered TTS audio and queued frames.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            self.state = ChannelState::Disconnected;
            return;
        };
        session.cancel.cancel();

        // The sender may be parked on a stalled write while holding the
        // writer, so it goes first.
        session.sender.abort();
        let _ = session.sender.await;

        match tokio::time::timeout(CONTROL_TIMEOUT, session.writer.lock()).await {
            Ok(mut writer) => {
                let end = Message::Text(Outbound::AudioEnd.to_text());
                match tokio::time::timeout(CONTROL_TIMEOUT, writer.send(end)).await {
                    Ok(Ok(())) => log::debug!("voice: audio.end sent"),
                    Ok(Err(e)) => log::debug!("voice: audio.end not sent: {e}"),
                    Err(_) => log::debug!("voice: audio.end timed out"),
                }
                let _ = tokio::time::timeout(CONTROL_TIMEOUT, writer.close()).await;
            }
            Err(_) => log::debug!("voice: writer busy, closing without audio.end"),
        }

        session.receiver.abort();
        let _ = session.receiver.await;

        session.tts.cancel_fallback();
        session.tts.buffer.clear();
        if let Ok(mut frames) = self.frames.try_lock() {
            while frames.try_recv().is_ok() {}
        }

        self.state = ChannelState::Disconnected;
        log::info!("voice: stream closed");
    }

    // -----------------------------------------------------------------------
    // Utterance control
    // -----------------------------------------------------------------------

    /// Ask the backend to finalize the current utterance.  The stream stays
    /// open.
    pub async fn send_audio_end(&mut self) {
        self.send_control(Outbound::AudioEnd).await;
    }

    /// Announce a new utterance on the open stream.
    pub async fn send_audio_start(&mut self) {
        let announce = Outbound::AudioStart {
            config: StreamConfig::pcm16_mono(self.config.sample_rate),
        };
        self.send_control(announce).await;
    }

    async fn send_control(&mut self, message: Outbound) {
        let Some(session) = self.session.as_ref().filter(|s| s.is_alive()) else {
            return;
        };
        let text = message.to_text();
        let sent = tokio::time::timeout(CONTROL_TIMEOUT, async {
            session.writer.lock().await.send(Message::Text(text)).await
        })
        .await;
        match sent {
            Ok(Ok(())) => log::debug!("voice: sent {message:?}"),
            Ok(Err(e)) => log::warn!("voice: control send failed: {e}"),
            Err(_) => log::warn!("voice: control send timed out"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

async fn run_sender(frames: SharedFrames, writer: WsWriter, cancel: CancellationToken) {
    let mut rx = tokio::select! {
        _ = cancel.cancelled() => return,
        rx = frames.lock() => rx,
    };

    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            next = tokio::time::timeout(FRAME_WAIT, rx.recv()) => match next {
                Err(_) => continue,
                Ok(None) => {
                    log::debug!("voice: frame source closed");
                    break;
                }
                Ok(Some(frame)) => frame,
            },
        };

        let text = Outbound::chunk(&frame).to_text();
        if let Err(e) = writer.lock().await.send(Message::Text(text)).await {
            log::warn!("voice: sending audio failed: {e}");
            break;
        }
    }
}

async fn run_receiver(
    mut stream: SplitStream<WsStream>,
    events: mpsc::Sender<ControllerEvent>,
    tts: Arc<TtsState>,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(Message::Text(text))) => handle_text(&text, &events, &tts).await,
            Some(Ok(Message::Binary(bytes))) => {
                log::debug!("voice: ignoring {} byte binary frame", bytes.len())
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                log::warn!("voice: receive failed: {e}");
                break;
            }
        }
    }

    if !cancel.is_cancelled() {
        log::info!("voice: server closed the stream");
        cancel.cancel();
        let _ = events.send(ControllerEvent::ServerStop).await;
    }
}

async fn handle_text(text: &str, events: &mpsc::Sender<ControllerEvent>, tts: &Arc<TtsState>) {
    let message = match Inbound::parse(text) {
        Ok(message) => message,
        Err(e) => {
            log::warn!("voice: {e}");
            return;
        }
    };

    let event = match message {
        Inbound::Stop => {
            log::info!("voice: stop requested by the backend");
            ControllerEvent::ServerStop
        }
        Inbound::Error(message) => {
            log::warn!("voice: backend error: {message}");
            return;
        }
        Inbound::TtsChunk(Some(b64)) => {
            match decode_audio(&b64) {
                Ok(audio) => tts.on_chunk(audio),
                Err(e) => log::warn!("voice: {e}"),
            }
            return;
        }
        Inbound::TtsChunk(None) => {
            log::warn!("voice: tts.chunk without audioData");
            return;
        }
        Inbound::TtsComplete => {
            tts.on_complete();
            return;
        }
        Inbound::BotReply(message) => {
            log::info!("voice: bot: {message}");
            tts.watch_reply();
            ControllerEvent::BotReply(message)
        }
        Inbound::Transcript { text, is_final } => {
            log::info!(
                "voice: transcript ({}): {text}",
                if is_final { "final" } else { "partial" }
            );
            ControllerEvent::Transcript { text, is_final }
        }
        Inbound::Unknown(kind) => {
            log::debug!("voice: unhandled message type '{kind}'");
            return;
        }
    };

    let _ = events.send(event).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

    use super::*;
    use crate::voice::tts::recording::RecordingPlayer;

    /// One-connection WebSocket server that records client text frames and
    /// sends whatever the test pushes.  Dropping `outbox` closes the stream.
    struct TestServer {
        url: String,
        inbox: UnboundedReceiver<String>,
        outbox: UnboundedSender<Message>,
    }

    impl TestServer {
        async fn spawn() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("ws://{}", listener.local_addr().unwrap());
            let (in_tx, inbox) = unbounded_channel();
            let (outbox, mut out_rx) = unbounded_channel::<Message>();

            tokio::spawn(async move {
                let (tcp, _) = listener.accept().await.unwrap();
                let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
                let (mut sink, mut stream) = ws.split();
                loop {
                    tokio::select! {
                        msg = stream.next() => match msg {
                            Some(Ok(Message::Text(t))) => { let _ = in_tx.send(t); }
                            Some(Ok(_)) => {}
                            _ => break,
                        },
                        out = out_rx.recv() => match out {
                            Some(m) => if sink.send(m).await.is_err() { break },
                            None => { let _ = sink.close().await; break; }
                        },
                    }
                }
            });

            Self { url, inbox, outbox }
        }

        async fn next_json(&mut self) -> Value {
            let text = tokio::time::timeout(Duration::from_secs(2), self.inbox.recv())
                .await
                .expect("client message in time")
                .expect("server alive");
            serde_json::from_str(&text).unwrap()
        }

        fn push(&self, value: Value) {
            self.outbox.send(Message::Text(value.to_string())).unwrap();
        }
    }

    struct Harness {
        channel: AudioChannel,
        frames: mpsc::Sender<Frame>,
        events: mpsc::Receiver<ControllerEvent>,
        player: RecordingPlayer,
    }

    fn harness(url: &str, tts_fallback_ms: u64) -> Harness {
        let config = VoiceConfig {
            ws_url: url.to_string(),
            connect_timeout_ms: 1_000,
            tts_fallback_ms,
            ..VoiceConfig::default()
        };
        let (frames_tx, frames_rx) = mpsc::channel(8);
        let (events_tx, events) = mpsc::channel(16);
        let player = RecordingPlayer::default();
        let channel = AudioChannel::new(
            config,
            Arc::new(AsyncMutex::new(frames_rx)),
            events_tx,
            Arc::new(player.clone()),
        );
        Harness {
            channel,
            frames: frames_tx,
            events,
            player,
        }
    }

    async fn next_event(rx: &mut mpsc::Receiver<ControllerEvent>) -> ControllerEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("event in time")
            .expect("channel open")
    }

    async fn wait_for_clip(player: &RecordingPlayer) -> Vec<Vec<u8>> {
        for _ in 0..100 {
            let clips = player.clips();
            if !clips.is_empty() {
                return clips;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        Vec::new()
    }

    #[tokio::test]
    async fn start_announces_stream_and_forwards_frames() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 3_000);

        h.channel.start().await.unwrap();
        assert_eq!(h.channel.state(), ChannelState::Streaming);
        assert_eq!(
            server.next_json().await,
            json!({
                "type": "audio.start",
                "config": {"sampleRate": 16000, "encoding": "pcm_s16le", "channels": 1}
            })
        );

        h.frames.send(vec![1, -1]).await.unwrap();
        assert_eq!(
            server.next_json().await,
            json!({"type": "audio.chunk", "audioData": "AQD//w=="})
        );

        h.channel.stop().await;
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
        assert_eq!(server.next_json().await, json!({"type": "audio.end"}));
    }

    #[tokio::test]
    async fn fallback_plays_three_chunks_concatenated() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 100);
        h.channel.start().await.unwrap();
        server.next_json().await;

        for b64 in ["AQ==", "Ag==", "Aw=="] {
            server.push(json!({"type": "tts.chunk", "audioData": b64}));
        }

        let clips = wait_for_clip(&h.player).await;
        assert_eq!(clips, vec![vec![1, 2, 3]]);
        assert!(h.channel.tts_buffer().unwrap().is_empty());
        h.channel.stop().await;
    }

    #[tokio::test]
    async fn completion_plays_without_waiting_for_fallback() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 60_000);
        h.channel.start().await.unwrap();
        server.next_json().await;

        server.push(json!({"type": "tts.chunk", "audioData": "AQ=="}));
        server.push(json!({"type": "tts.chunk", "audioData": "Ag=="}));
        server.push(json!({"type": "tts.done"}));

        let clips = wait_for_clip(&h.player).await;
        assert_eq!(clips, vec![vec![1, 2]]);
        h.channel.stop().await;
    }

    #[tokio::test]
    async fn bad_chunks_are_skipped() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 60_000);
        h.channel.start().await.unwrap();
        server.next_json().await;

        server.push(json!({"type": "tts.chunk"}));
        server.push(json!({"type": "tts.chunk", "audioData": "***"}));
        server.push(json!({"type": "tts.chunk", "audioData": "Bw=="}));
        server.push(json!({"type": "tts.complete"}));

        assert_eq!(wait_for_clip(&h.player).await, vec![vec![7]]);
        h.channel.stop().await;
    }

    #[tokio::test]
    async fn transcripts_and_replies_become_events() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 3_000);
        h.channel.start().await.unwrap();
        server.next_json().await;

        server.push(json!({"type": "transcript.partial", "transcript": "아메"}));
        server.push(json!({"type": "mystery"}));
        server.outbox.send(Message::Text("not json".into())).unwrap();
        server.push(json!({"type": "transcript.final", "transcript": "아메리카노"}));
        server.push(json!({"type": "bot.reply", "message": "주문 확인했습니다"}));

        assert_eq!(
            next_event(&mut h.events).await,
            ControllerEvent::Transcript {
                text: "아메".into(),
                is_final: false
            }
        );
        assert_eq!(
            next_event(&mut h.events).await,
            ControllerEvent::Transcript {
                text: "아메리카노".into(),
                is_final: true
            }
        );
        assert_eq!(
            next_event(&mut h.events).await,
            ControllerEvent::BotReply("주문 확인했습니다".into())
        );
        h.channel.stop().await;
    }

    #[tokio::test]
    async fn stop_message_and_close_emit_server_stop() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 3_000);
        h.channel.start().await.unwrap();
        server.next_json().await;

        server.push(json!({"type": "stop"}));
        assert_eq!(next_event(&mut h.events).await, ControllerEvent::ServerStop);
        assert!(h.channel.is_streaming());

        drop(server.outbox);
        assert_eq!(next_event(&mut h.events).await, ControllerEvent::ServerStop);
        assert!(!h.channel.is_streaming());
        h.channel.stop().await;
    }

    #[tokio::test]
    async fn utterance_controls_keep_stream_open() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 3_000);
        h.channel.start().await.unwrap();
        server.next_json().await;

        h.channel.send_audio_end().await;
        h.channel.send_audio_start().await;
        assert_eq!(server.next_json().await["type"], "audio.end");
        assert_eq!(server.next_json().await["type"], "audio.start");
        assert!(h.channel.is_streaming());
        h.channel.stop().await;
    }

    #[tokio::test]
    async fn stop_completes_while_writer_is_held() {
        let mut server = TestServer::spawn().await;
        let mut h = harness(&server.url, 3_000);
        h.channel.start().await.unwrap();
        server.next_json().await;

        let writer = Arc::clone(&h.channel.session.as_ref().unwrap().writer);
        let _held = writer.lock().await;

        h.channel.send_audio_end().await;
        let stopped = tokio::time::timeout(Duration::from_secs(5), h.channel.stop()).await;
        assert!(stopped.is_ok(), "stop hung on the writer");
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
    }

    #[tokio::test]
    async fn unreachable_backend_leaves_channel_disconnected() {
        let mut h = harness("ws://127.0.0.1:9/api/chat", 3_000);
        assert!(h.channel.start().await.is_err());
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
        // controls without a session are no-ops
        h.channel.send_audio_end().await;
        h.channel.stop().await;
    }

    #[tokio::test]
    async fn secure_urls_reach_the_network() {
        // the peer hangs up mid-handshake; without a TLS connector the
        // attempt would stop at "TLS support not compiled in" instead
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("wss://{}/api/chat", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let mut h = harness(&url, 3_000);
        let err = h.channel.start().await.unwrap_err();
        assert!(!err.to_string().contains("TLS support"), "{err}");
        assert_eq!(h.channel.state(), ChannelState::Disconnected);
    }

    #[tokio::test]
    async fn malformed_url_is_rejected() {
        let mut h = harness("not a url", 3_000);
        assert!(matches!(h.channel.start().await, Err(VoiceError::Url(_))));
    }
}
