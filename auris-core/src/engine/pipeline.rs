//! Blocking decision loop.
//!
//! ## Stages (per window)
//!
//! ```text
//! 1. Receive one ClassifierWindow from the bounded channel
//! 2. Adapter maps raw scores → (label, confidence) frames
//! 3. Every frame runs through DetectionEngine::process_frame under a
//!    single lock, so arbitration sees the whole window as one batch
//! 4. Confirmed events fan out to sinks, then broadcast as AlertEvents
//! 5. One WindowActivityEvent per window
//! ```
//!
//! The entire loop runs in `spawn_blocking`, keeping the async executor
//! free for the host's I/O. The receive uses a bounded timeout so the
//! running flag is observed even when the classifier goes quiet.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    detect::DetectionEngine,
    dispatch::SinkFanout,
    ingest::{adapter, WindowReceiver},
    ipc::events::{AlertEvent, WindowActivityEvent},
};

pub struct PipelineDiagnostics {
    pub windows_in: AtomicUsize,
    pub scores_in: AtomicUsize,
    pub scores_mapped: AtomicUsize,
    pub scores_dropped: AtomicUsize,
    pub frames_processed: AtomicUsize,
    pub alerts_emitted: AtomicUsize,
}

impl Default for PipelineDiagnostics {
    fn default() -> Self {
        Self {
            windows_in: AtomicUsize::new(0),
            scores_in: AtomicUsize::new(0),
            scores_mapped: AtomicUsize::new(0),
            scores_dropped: AtomicUsize::new(0),
            frames_processed: AtomicUsize::new(0),
            alerts_emitted: AtomicUsize::new(0),
        }
    }
}

impl PipelineDiagnostics {
    pub fn reset(&self) {
        self.windows_in.store(0, Ordering::Relaxed);
        self.scores_in.store(0, Ordering::Relaxed);
        self.scores_mapped.store(0, Ordering::Relaxed);
        self.scores_dropped.store(0, Ordering::Relaxed);
        self.frames_processed.store(0, Ordering::Relaxed);
        self.alerts_emitted.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            windows_in: self.windows_in.load(Ordering::Relaxed),
            scores_in: self.scores_in.load(Ordering::Relaxed),
            scores_mapped: self.scores_mapped.load(Ordering::Relaxed),
            scores_dropped: self.scores_dropped.load(Ordering::Relaxed),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            alerts_emitted: self.alerts_emitted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsSnapshot {
    pub windows_in: usize,
    pub scores_in: usize,
    pub scores_mapped: usize,
    pub scores_dropped: usize,
    pub frames_processed: usize,
    pub alerts_emitted: usize,
}

/// All context the pipeline needs, passed as one struct so the closure stays tidy.
pub struct PipelineContext {
    pub detector: Arc<Mutex<DetectionEngine>>,
    pub windows: WindowReceiver,
    pub running: Arc<AtomicBool>,
    pub sinks: SinkFanout,
    pub alert_tx: broadcast::Sender<AlertEvent>,
    pub activity_tx: broadcast::Sender<WindowActivityEvent>,
    pub seq: Arc<AtomicU64>,
    pub session_start: Instant,
    pub diagnostics: Arc<PipelineDiagnostics>,
}

/// Bounded wait per receive so the running flag stays observed.
const RECV_TIMEOUT: Duration = Duration::from_millis(20);

/// Run the blocking pipeline until `ctx.running` becomes false or the
/// window channel disconnects.
pub fn run(mut ctx: PipelineContext) {
    info!(sinks = ctx.sinks.len(), "pipeline started");

    let mut activity_seq = 0u64;

    loop {
        if !ctx.running.load(Ordering::Relaxed) {
            break;
        }

        let window = match ctx.windows.recv_timeout(RECV_TIMEOUT) {
            Ok(window) => window,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("window channel disconnected");
                break;
            }
        };

        ctx.diagnostics.windows_in.fetch_add(1, Ordering::Relaxed);
        ctx.diagnostics
            .scores_in
            .fetch_add(window.scores.len(), Ordering::Relaxed);

        let mapped = adapter::map_window(&window);
        ctx.diagnostics
            .scores_mapped
            .fetch_add(mapped.frames.len(), Ordering::Relaxed);
        ctx.diagnostics
            .scores_dropped
            .fetch_add(mapped.dropped, Ordering::Relaxed);

        let top = mapped
            .frames
            .iter()
            .copied()
            .reduce(|best, frame| if frame.1 > best.1 { frame } else { best });
        let activity = WindowActivityEvent {
            seq: activity_seq,
            total_scores: window.scores.len(),
            mapped_scores: mapped.frames.len(),
            top_label: top.map(|(label, _)| label),
            top_confidence: top.map(|(_, confidence)| confidence),
        };
        activity_seq = activity_seq.saturating_add(1);
        let _ = ctx.activity_tx.send(activity);

        // One lock for the whole window: the batch is presented
        // back-to-back, never interleaved with another window.
        let mut confirmed = Vec::new();
        {
            let mut detector = ctx.detector.lock();
            for &(label, confidence) in &mapped.frames {
                ctx.diagnostics
                    .frames_processed
                    .fetch_add(1, Ordering::Relaxed);
                if let Some(event) = detector.process_frame(label, confidence, window.observed_at) {
                    confirmed.push(event);
                }
            }
        }

        for event in confirmed {
            ctx.sinks.dispatch(&event);

            let seq = ctx.seq.fetch_add(1, Ordering::Relaxed);
            let alert = AlertEvent {
                seq,
                label: event.label,
                confidence: event.confidence,
                confirmed_at_ms: event
                    .confirmed_at
                    .duration_since(ctx.session_start)
                    .as_millis() as u64,
            };
            ctx.diagnostics.alerts_emitted.fetch_add(1, Ordering::Relaxed);
            let delivered = ctx.alert_tx.send(alert).is_ok();
            info!(
                label = %event.label,
                confidence = event.confidence,
                delivered,
                "alert emitted"
            );
        }
    }

    let snap = ctx.diagnostics.snapshot();
    info!(
        windows_in = snap.windows_in,
        scores_in = snap.scores_in,
        scores_mapped = snap.scores_mapped,
        scores_dropped = snap.scores_dropped,
        frames_processed = snap.frames_processed,
        alerts_emitted = snap.alerts_emitted,
        "pipeline stopped — diagnostics"
    );
}
