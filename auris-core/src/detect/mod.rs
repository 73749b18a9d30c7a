//! Sound-detection decision engine.
//!
//! Turns the continuous stream of per-frame classifier scores into a
//! sparse stream of confirmed detections. Every frame runs a linear gate
//! sequence:
//!
//! ```text
//! enabled? → above threshold? → global cooldown → per-label cooldown
//!          → history + candidate ledger → consecutive-frame requirement
//!          → competition arbitration → confirmation
//! ```
//!
//! A label's "state" is derived from its counters and clocks, not stored
//! as an explicit enum: it is accumulating while its consecutive count
//! grows, blocked while a cooldown clock is fresh, and confirmed the
//! instant every gate passes. Confirming any label clears all counters,
//! all confidence histories, and the candidate ledger — only one sound
//! class can be mid-confirmation at a time.
//!
//! `process_frame` never fails: out-of-range confidence is clamped, and
//! an unrecognized label cannot be constructed.

pub mod ledger;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::label::SoundLabel;
use ledger::CandidateLedger;

/// What happens to cooldown clocks when a session restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownPolicy {
    /// Cooldown clocks survive `reset()` — a sound confirmed just before
    /// a stop/start cycle cannot immediately re-fire in the new session.
    PreserveAcrossSessions,
    /// `reset()` also clears every cooldown clock.
    ClearOnReset,
}

/// Detection tuning shared by every label.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Minimum interval between two confirmations of the same label.
    /// Default: 10 s.
    pub per_label_cooldown: Duration,
    /// Interval after any confirmation during which *other* labels are
    /// blocked. Re-confirming the same label re-arms this clock.
    /// Default: 10 s.
    pub global_cooldown: Duration,
    /// Trailing window during which candidate observations compete.
    /// Default: 5 s.
    pub competition_window: Duration,
    /// Qualifying confidences retained per label for smoothing (FIFO).
    /// Default: 5.
    pub confidence_history_depth: usize,
    /// Session-restart behavior for cooldown clocks.
    pub cooldown_policy: CooldownPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            per_label_cooldown: Duration::from_secs(10),
            global_cooldown: Duration::from_secs(10),
            competition_window: Duration::from_secs(5),
            confidence_history_depth: 5,
            cooldown_policy: CooldownPolicy::PreserveAcrossSessions,
        }
    }
}

/// A confirmed detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionEvent {
    pub label: SoundLabel,
    /// Mean of the label's recent qualifying confidences, not the raw
    /// last-frame score.
    pub confidence: f32,
    pub confirmed_at: Instant,
}

/// Mutable per-label accumulation state.
#[derive(Debug, Default)]
struct LabelTrack {
    consecutive: u32,
    history: VecDeque<f32>,
    last_confirmed_at: Option<Instant>,
}

/// Single-writer decision state machine.
///
/// All calls for a session must be serialized (one thread, or one
/// exclusive lock); the gates read-modify-write shared per-label and
/// global state and must observe a consistent snapshot.
pub struct DetectionEngine {
    config: DetectionConfig,
    /// Live-reconfigurable monitored set, read at the first gate of
    /// every frame. Shared with the owning engine handle.
    enabled: Arc<RwLock<HashSet<SoundLabel>>>,
    tracks: HashMap<SoundLabel, LabelTrack>,
    ledger: CandidateLedger,
    last_global_confirmation: Option<(Instant, SoundLabel)>,
}

impl DetectionEngine {
    pub fn new(config: DetectionConfig, enabled: Arc<RwLock<HashSet<SoundLabel>>>) -> Self {
        let ledger = CandidateLedger::new(config.competition_window);
        Self {
            config,
            enabled,
            tracks: HashMap::new(),
            ledger,
            last_global_confirmation: None,
        }
    }

    /// Feed one classifier frame through the gate sequence.
    ///
    /// Returns `Some(DetectionEvent)` only when the frame completes a
    /// confirmation; at most one event per call, no hidden randomness.
    pub fn process_frame(
        &mut self,
        label: SoundLabel,
        confidence: f32,
        now: Instant,
    ) -> Option<DetectionEvent> {
        // Enablement gate — disabled labels mutate nothing.
        if !self.enabled.read().contains(&label) {
            return None;
        }

        let tuning = label.tuning();
        let confidence = confidence.clamp(0.0, 1.0);

        // Threshold gate. A sub-threshold frame decays the consecutive
        // count by one instead of resetting it, so a single dropped
        // frame inside an otherwise continuous sound does not restart
        // confirmation from scratch. The smoothing history does restart.
        if confidence < tuning.confidence_threshold {
            let track = self.tracks.entry(label).or_default();
            track.consecutive = track.consecutive.saturating_sub(1);
            track.history.clear();
            return None;
        }

        // Global cooldown gate. Re-confirmation of the most recent label
        // is exempt here — it answers only to its own per-label cooldown,
        // and each re-confirmation re-arms this clock for everyone else.
        if let Some((confirmed_at, confirmed_label)) = self.last_global_confirmation {
            if confirmed_label != label
                && now.duration_since(confirmed_at) < self.config.global_cooldown
            {
                debug!(label = %label, "blocked by global cooldown");
                let track = self.tracks.entry(label).or_default();
                track.consecutive = 0;
                track.history.clear();
                return None;
            }
        }

        // Per-label cooldown gate. The frame is not counted.
        if let Some(confirmed_at) = self
            .tracks
            .get(&label)
            .and_then(|track| track.last_confirmed_at)
        {
            if now.duration_since(confirmed_at) < self.config.per_label_cooldown {
                debug!(label = %label, "blocked by per-label cooldown");
                self.tracks.entry(label).or_default().consecutive = 0;
                return None;
            }
        }

        // Qualifying frame: extend the smoothing history (bounded FIFO)
        // and record the candidate. Every above-threshold frame competes,
        // including ones that never reach their frame requirement.
        let depth = self.config.confidence_history_depth;
        let track = self.tracks.entry(label).or_default();
        track.history.push_back(confidence);
        while track.history.len() > depth {
            track.history.pop_front();
        }
        self.ledger.record(label, now, confidence);
        self.ledger.prune(now);

        // Consecutive-frame requirement.
        let track = self.tracks.entry(label).or_default();
        track.consecutive += 1;
        let consecutive = track.consecutive;
        if consecutive < tuning.required_consecutive_frames {
            debug!(
                label = %label,
                consecutive,
                required = tuning.required_consecutive_frames,
                "accumulating"
            );
            return None;
        }

        // Competition arbitration against every rival with a live
        // candidate entry: declared dominance first, then strict mean
        // confidence. Suppression resets the count but keeps the ledger
        // entries, so the label keeps competing on later frames.
        for rival in self.ledger.rivals(label, now) {
            if label.dominates(rival) {
                continue;
            }
            if rival.dominates(label) {
                debug!(label = %label, rival = %rival, "suppressed by dominance");
                self.tracks.entry(label).or_default().consecutive = 0;
                return None;
            }
            let own_mean = self.ledger.mean_confidence(label, now).unwrap_or(0.0);
            let rival_mean = self.ledger.mean_confidence(rival, now).unwrap_or(0.0);
            if rival_mean > own_mean {
                debug!(
                    label = %label,
                    rival = %rival,
                    own_mean,
                    rival_mean,
                    "suppressed by stronger rival"
                );
                self.tracks.entry(label).or_default().consecutive = 0;
                return None;
            }
        }

        // Confirmation. Smoothed confidence is the mean of the retained
        // qualifying confidences; the history is non-empty because this
        // frame was just recorded.
        let smoothed = self
            .tracks
            .get(&label)
            .filter(|track| !track.history.is_empty())
            .map(|track| track.history.iter().sum::<f32>() / track.history.len() as f32)
            .unwrap_or(confidence);

        for track in self.tracks.values_mut() {
            track.consecutive = 0;
            track.history.clear();
        }
        self.tracks.entry(label).or_default().last_confirmed_at = Some(now);
        self.last_global_confirmation = Some((now, label));
        self.ledger.clear();

        info!(label = %label, confidence = smoothed, "detection confirmed");
        Some(DetectionEvent {
            label,
            confidence: smoothed,
            confirmed_at: now,
        })
    }

    /// Session restart: clears all accumulation state and the candidate
    /// ledger. Cooldown clocks are cleared only under
    /// [`CooldownPolicy::ClearOnReset`].
    pub fn reset(&mut self) {
        for track in self.tracks.values_mut() {
            track.consecutive = 0;
            track.history.clear();
        }
        self.ledger.clear();
        if self.config.cooldown_policy == CooldownPolicy::ClearOnReset {
            for track in self.tracks.values_mut() {
                track.last_confirmed_at = None;
            }
            self.last_global_confirmation = None;
        }
        debug!("detection state reset");
    }
}
