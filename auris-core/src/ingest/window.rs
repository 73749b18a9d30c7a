//! Typed classifier emissions passed from the host application to the pipeline.

use std::time::Instant;

/// One raw score from the external classifier, not yet mapped onto the
/// label taxonomy.
#[derive(Debug, Clone)]
pub struct RawScore {
    /// Free-form identifier as the classifier reports it.
    pub identifier: String,
    /// Classifier confidence. Negative values are dropped by the adapter.
    pub confidence: f32,
}

impl RawScore {
    pub fn new(identifier: impl Into<String>, confidence: f32) -> Self {
        Self {
            identifier: identifier.into(),
            confidence,
        }
    }
}

/// Every score the classifier reported for one analysis window (~0.5 s,
/// overlapping). A window may be empty when nothing crossed the
/// classifier's own reporting floor.
#[derive(Debug, Clone)]
pub struct ClassifierWindow {
    /// Monotonic timestamp of the window; becomes `now` for every gate.
    pub observed_at: Instant,
    pub scores: Vec<RawScore>,
}

impl ClassifierWindow {
    pub fn new(observed_at: Instant, scores: Vec<RawScore>) -> Self {
        Self {
            observed_at,
            scores,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
