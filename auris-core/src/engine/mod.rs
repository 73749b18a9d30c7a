//! `AurisEngine` — top-level lifecycle controller.
//!
//! ## Lifecycle
//!
//! ```text
//! AurisEngine::new()
//!     └─► start(sinks)   → pipeline spawned, status = Listening
//!         └─► stop()     → running=false, sender dropped, status = Stopped
//! ```
//!
//! `start()`/`stop()` are idempotent: calling them in the wrong state
//! returns an error rather than panicking. A stopped engine can be
//! started again; the detector survives the restart, which is how
//! cooldown clocks persist across sessions under
//! `CooldownPolicy::PreserveAcrossSessions`.
//!
//! ## Threading
//!
//! The detector lives behind one `parking_lot::Mutex`. The pipeline
//! thread is the only steady-state writer; `start()` takes the same lock
//! to apply the session reset, so frame processing and resets are
//! serialized. The enabled-label set is a shared `RwLock` read at the
//! first gate of every frame — toggling membership is the only supported
//! live reconfiguration.

pub mod pipeline;

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;

use crossbeam_channel::TrySendError;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::info;

use crate::{
    detect::{DetectionConfig, DetectionEngine},
    dispatch::{DetectionSink, SinkFanout},
    error::{AurisError, Result},
    ingest::{create_window_channel, ClassifierWindow, WindowSender},
    ipc::events::{AlertEvent, EngineStatus, EngineStatusEvent, WindowActivityEvent},
    label::SoundLabel,
};

/// Broadcast channel capacity: 256 events buffered for slow consumers.
const BROADCAST_CAP: usize = 256;

/// Configuration for `AurisEngine`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Detection tuning (cooldowns, competition window, history depth).
    pub detection: DetectionConfig,
    /// Labels monitored at startup. Default: the whole taxonomy.
    pub enabled_labels: HashSet<SoundLabel>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            enabled_labels: SoundLabel::ALL.iter().copied().collect(),
        }
    }
}

/// The top-level engine handle.
///
/// `AurisEngine` is `Send + Sync` — all fields use interior mutability.
/// Wrap in `Arc<AurisEngine>` to share between the host's command layer
/// and event-forwarding tasks. One instance per listening session owner;
/// detection state is deliberately singular and never sharded.
pub struct AurisEngine {
    /// `true` while the pipeline is active.
    running: Arc<AtomicBool>,
    /// Canonical status (written atomically via Mutex, read from commands).
    status: Arc<Mutex<EngineStatus>>,
    /// Monitored labels, shared with the detector.
    enabled: Arc<RwLock<HashSet<SoundLabel>>>,
    /// The decision state machine; survives stop/start cycles.
    detector: Arc<Mutex<DetectionEngine>>,
    alert_tx: broadcast::Sender<AlertEvent>,
    status_tx: broadcast::Sender<EngineStatusEvent>,
    activity_tx: broadcast::Sender<WindowActivityEvent>,
    /// Monotonically increasing alert sequence counter.
    seq: Arc<AtomicU64>,
    /// Shared pipeline diagnostics counters.
    diagnostics: Arc<pipeline::PipelineDiagnostics>,
    /// Retained so `push_window` works without threading the sender
    /// through the host; dropped on `stop()` to disconnect the pipeline.
    window_tx: Mutex<Option<WindowSender>>,
}

impl AurisEngine {
    /// Create a new engine. Does not start listening — call `start()`.
    pub fn new(config: EngineConfig) -> Self {
        let (alert_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (activity_tx, _) = broadcast::channel(BROADCAST_CAP);

        let enabled = Arc::new(RwLock::new(config.enabled_labels.clone()));
        let detector = Arc::new(Mutex::new(DetectionEngine::new(
            config.detection.clone(),
            Arc::clone(&enabled),
        )));

        Self {
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(EngineStatus::Idle)),
            enabled,
            detector,
            alert_tx,
            status_tx,
            activity_tx,
            seq: Arc::new(AtomicU64::new(0)),
            diagnostics: Arc::new(pipeline::PipelineDiagnostics::default()),
            window_tx: Mutex::new(None),
        }
    }

    /// Start the pipeline with the given sinks.
    ///
    /// Returns the window sender the host's classifier callback pushes
    /// into; `push_window` on the engine uses a retained clone of it.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - `AurisError::AlreadyRunning` if already started.
    pub fn start(&self, sinks: Vec<Box<dyn DetectionSink>>) -> Result<WindowSender> {
        if self.running.load(Ordering::SeqCst) {
            return Err(AurisError::AlreadyRunning);
        }

        self.diagnostics.reset();
        self.detector.lock().reset();
        self.running.store(true, Ordering::SeqCst);
        self.set_status(EngineStatus::Listening, None);

        let (window_tx, window_rx) = create_window_channel();
        *self.window_tx.lock() = Some(window_tx.clone());

        let ctx = pipeline::PipelineContext {
            detector: Arc::clone(&self.detector),
            windows: window_rx,
            running: Arc::clone(&self.running),
            sinks: SinkFanout::new(sinks),
            alert_tx: self.alert_tx.clone(),
            activity_tx: self.activity_tx.clone(),
            seq: Arc::clone(&self.seq),
            session_start: Instant::now(),
            diagnostics: Arc::clone(&self.diagnostics),
        };

        tokio::task::spawn_blocking(move || pipeline::run(ctx));

        info!("engine started — listening");
        Ok(window_tx)
    }

    /// Stop the pipeline.
    ///
    /// The retained sender is dropped so a parked receive wakes
    /// immediately; the running flag covers senders the host kept.
    ///
    /// # Errors
    /// - `AurisError::NotRunning` if not currently running.
    pub fn stop(&self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(AurisError::NotRunning);
        }

        self.running.store(false, Ordering::SeqCst);
        *self.window_tx.lock() = None;
        self.set_status(EngineStatus::Stopped, None);
        info!("engine stop requested");
        Ok(())
    }

    /// Push one classifier window into the running pipeline.
    ///
    /// # Errors
    /// - `AurisError::NotRunning` if the engine is stopped.
    /// - `AurisError::IngestionBackpressure` if the queue is full.
    /// - `AurisError::IngestionClosed` if the pipeline is gone.
    pub fn push_window(&self, window: ClassifierWindow) -> Result<()> {
        let guard = self.window_tx.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(AurisError::NotRunning);
        };
        match tx.try_send(window) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(AurisError::IngestionBackpressure),
            Err(TrySendError::Disconnected(_)) => Err(AurisError::IngestionClosed),
        }
    }

    /// Add a label to the monitored set. Takes effect on the next frame.
    pub fn enable_label(&self, label: SoundLabel) {
        self.enabled.write().insert(label);
    }

    /// Remove a label from the monitored set. Takes effect on the next frame.
    pub fn disable_label(&self, label: SoundLabel) {
        self.enabled.write().remove(&label);
    }

    /// Replace the monitored set wholesale.
    pub fn set_enabled_labels(&self, labels: HashSet<SoundLabel>) {
        *self.enabled.write() = labels;
    }

    /// Snapshot of the monitored set.
    pub fn enabled_labels(&self) -> HashSet<SoundLabel> {
        self.enabled.read().clone()
    }

    /// Current engine status (snapshot).
    pub fn status(&self) -> EngineStatus {
        *self.status.lock()
    }

    /// Subscribe to confirmed-detection alerts.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<AlertEvent> {
        self.alert_tx.subscribe()
    }

    /// Subscribe to status change events.
    pub fn subscribe_status(&self) -> broadcast::Receiver<EngineStatusEvent> {
        self.status_tx.subscribe()
    }

    /// Subscribe to per-window activity events.
    pub fn subscribe_activity(&self) -> broadcast::Receiver<WindowActivityEvent> {
        self.activity_tx.subscribe()
    }

    /// Snapshot of pipeline counters for observability.
    pub fn pipeline_diagnostics_snapshot(&self) -> pipeline::DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn set_status(&self, new_status: EngineStatus, detail: Option<String>) {
        *self.status.lock() = new_status;
        let _ = self.status_tx.send(EngineStatusEvent {
            status: new_status,
            detail,
        });
    }
}
