//! Candidate-competition bookkeeping.
//!
//! Every above-threshold, non-cooldown-blocked frame is recorded here,
//! whether or not the label ever reaches its consecutive-frame
//! requirement. Entries stay eligible for the trailing competition
//! window and are pruned lazily; arbitration reads mean confidence over
//! the live entries only.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::label::SoundLabel;

/// Per-label `(observed_at, confidence)` entries over a trailing window.
#[derive(Debug)]
pub struct CandidateLedger {
    window: Duration,
    entries: HashMap<SoundLabel, VecDeque<(Instant, f32)>>,
}

impl CandidateLedger {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: HashMap::new(),
        }
    }

    /// Record one candidate observation. `at` values for a given label
    /// must be non-decreasing (frames arrive in session order), which
    /// keeps front-eviction pruning valid.
    pub fn record(&mut self, label: SoundLabel, at: Instant, confidence: f32) {
        self.entries.entry(label).or_default().push_back((at, confidence));
    }

    /// Drop expired entries and labels left with none.
    pub fn prune(&mut self, now: Instant) {
        let window = self.window;
        for deque in self.entries.values_mut() {
            while deque
                .front()
                .map_or(false, |&(at, _)| now.duration_since(at) >= window)
            {
                deque.pop_front();
            }
        }
        self.entries.retain(|_, deque| !deque.is_empty());
    }

    /// Mean confidence of the label's live entries, `None` if it has none.
    pub fn mean_confidence(&self, label: SoundLabel, now: Instant) -> Option<f32> {
        let deque = self.entries.get(&label)?;
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for &(at, confidence) in deque {
            if now.duration_since(at) < self.window {
                sum += confidence;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f32)
    }

    /// Every other label with at least one live entry.
    pub fn rivals(&self, label: SoundLabel, now: Instant) -> Vec<SoundLabel> {
        self.entries
            .iter()
            .filter(|(&other, deque)| {
                other != label
                    && deque
                        .iter()
                        .any(|&(at, _)| now.duration_since(at) < self.window)
            })
            .map(|(&other, _)| other)
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
