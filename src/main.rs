//! Application entry point: kiosk voice macro.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse the command line.
//! 3. Load [`AppConfig`] from disk, then apply `KIOSK_*` overrides.
//! 4. Load the menu index (fatal when missing or invalid).
//! 5. Dispatch the subcommand:
//!    * `run`: hotkey + capture + voice stream + controller + order polling.
//!    * `orders`: order polling only.
//!    * `position-test`: click every menu card once.
//!    * `order <NAME>`: fuzzy-add one item, no payment.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;

use kiosk_voice_macro::{
    audio::{AudioCapture, FramePump, SpeechDetector, StreamHandle},
    config::AppConfig,
    controller::{Controller, ControllerEvent},
    hotkey::{parse_key, HotkeyListener},
    menu::MenuIndex,
    navigator::{EnigoPointer, Navigator},
    order::OrderMacro,
    orders::{HttpOrderSource, OrdersClient, SharedMacro},
    voice::{AudioChannel, Frame, RodioPlayer, SharedFrames},
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "kiosk-voice-macro", version, about = "Voice-driven kiosk ordering macro")]
struct Cli {
    #[arg(long, global = true, help = "Log clicks instead of moving the pointer")]
    dry_run: bool,

    #[arg(long, global = true, help = "Path to settings.toml")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Voice stream, hotkey and order polling (default).
    Run,
    /// Order polling only.
    Orders,
    /// Visit every menu card in file order and click it once.
    PositionTest,
    /// Add one item by (fuzzy) name without paying.
    Order {
        name: String,
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli);
    log::info!(
        "kiosk voice macro starting{}",
        if config.kiosk.dry_run { " (dry run)" } else { "" }
    );

    let index = MenuIndex::load(&config.index.ui_coords_path, &config.index.menu_cards_path)
        .context("cannot load the menu index")?;
    let mut nav = Navigator::new(
        Arc::new(index),
        Box::new(EnigoPointer::new()),
        config.kiosk.clone(),
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::PositionTest => {
            let clicked = nav.walk_menu();
            log::info!("position test: {clicked}/{} cards clicked", nav.index().len());
            Ok(())
        }
        Command::Order { name, count } => {
            let landed = nav
                .add_item(&name, count)
                .with_context(|| format!("cannot order {name:?}"))?;
            log::info!("order: {landed}x {name:?} added");
            Ok(())
        }
        Command::Orders => {
            let order_macro: SharedMacro = Arc::new(Mutex::new(OrderMacro::new(nav)));
            runtime()?.block_on(run_orders_only(config, order_macro));
            Ok(())
        }
        Command::Run => {
            let order_macro: SharedMacro = Arc::new(Mutex::new(OrderMacro::new(nav)));
            runtime()?.block_on(run_voice(config, order_macro))
        }
    }
}

fn load_config(cli: &Cli) -> AppConfig {
    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("config: failed to load ({e}); using defaults");
        AppConfig::default()
    });
    config.apply_env_overrides();
    if cli.dry_run {
        config.kiosk.dry_run = true;
    }
    config
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("cannot create tokio runtime")
}

fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("ctrl-c received, shutting down");
        }
        trigger.cancel();
    });
    token
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

async fn run_orders_only(config: AppConfig, order_macro: SharedMacro) {
    let (events_tx, mut events_rx) = mpsc::channel::<ControllerEvent>(64);
    let source = Arc::new(HttpOrderSource::from_config(&config.orders));
    let client = OrdersClient::new(source, order_macro, events_tx, config.orders.poll_interval());
    let handle = client.handle();
    let orders = tokio::spawn(client.run());
    let shutdown = shutdown_on_ctrl_c();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events_rx.recv() => match event {
                Some(ControllerEvent::MicPulse(on)) => log::debug!("event: mic pulse {on}"),
                Some(event) => log::info!("event: {event:?}"),
                None => break,
            },
        }
    }

    handle.stop();
    let _ = orders.await;
}

async fn run_voice(config: AppConfig, order_macro: SharedMacro) -> Result<()> {
    let (events_tx, events_rx) = mpsc::channel::<ControllerEvent>(64);
    let (frames_tx, frames_rx) = mpsc::channel::<Frame>(config.voice.frame_queue_capacity);
    let frames: SharedFrames = Arc::new(AsyncMutex::new(frames_rx));
    let capture_on = Arc::new(AtomicBool::new(false));
    let speech = SpeechDetector::new(config.capture.rms_min_speech);

    // Kept on this thread: cpal streams are not Send everywhere.
    let _stream = start_capture(&config, frames_tx, Arc::clone(&capture_on), speech.clone());

    let key = parse_key(&config.hotkey.record_toggle_key).unwrap_or_else(|| {
        log::warn!(
            "hotkey: unknown key {:?}, using F9",
            config.hotkey.record_toggle_key
        );
        rdev::Key::F9
    });
    let _hotkey = HotkeyListener::start(key, events_tx.clone())
        .context("cannot start the hotkey listener")?;

    let source = Arc::new(HttpOrderSource::from_config(&config.orders));
    let client = OrdersClient::new(
        source,
        order_macro,
        events_tx.clone(),
        config.orders.poll_interval(),
    );
    let orders_handle = client.handle();
    let orders = tokio::spawn(client.run());

    let channel = AudioChannel::new(
        config.voice.clone(),
        frames,
        events_tx,
        Arc::new(RodioPlayer::new()),
    );
    let controller = Controller::new(Box::new(channel), capture_on, speech, &config);

    let shutdown = shutdown_on_ctrl_c();
    controller.run(events_rx, shutdown).await;

    orders_handle.stop();
    let _ = orders.await;
    Ok(())
}

fn start_capture(
    config: &AppConfig,
    frames: mpsc::Sender<Frame>,
    capture_on: Arc<AtomicBool>,
    speech: SpeechDetector,
) -> Option<StreamHandle> {
    let capture = match AudioCapture::new() {
        Ok(capture) => capture,
        Err(e) => {
            log::warn!("capture: unavailable ({e}); recording will send no audio");
            return None;
        }
    };
    let pump = FramePump::new(
        frames,
        capture_on,
        speech,
        config.voice.sample_rate,
        config.voice.frame_samples(),
    );
    match capture.start(pump) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("capture: cannot start stream ({e})");
            None
        }
    }
}
