//! Maps raw classifier output onto the closed label taxonomy.
//!
//! The classifier reports free-form string identifiers. Each one is
//! normalized and looked up in the alias table; unmapped identifiers
//! and negative scores are dropped. The engine re-applies its own
//! per-label thresholds afterwards — the adapter only enforces the
//! non-negative reporting floor.

use tracing::debug;

use super::window::ClassifierWindow;
use crate::label::SoundLabel;

/// One window's scores after taxonomy mapping.
#[derive(Debug, Default)]
pub struct MappedWindow {
    /// `(label, confidence)` frames, in the classifier's reporting order.
    pub frames: Vec<(SoundLabel, f32)>,
    /// Scores dropped as unmapped or negative.
    pub dropped: usize,
}

pub fn map_window(window: &ClassifierWindow) -> MappedWindow {
    let mut mapped = MappedWindow::default();
    for score in &window.scores {
        if score.confidence < 0.0 {
            debug!(
                identifier = %score.identifier,
                confidence = score.confidence,
                "negative classifier score dropped"
            );
            mapped.dropped += 1;
            continue;
        }
        match SoundLabel::from_identifier(&score.identifier) {
            Some(label) => mapped.frames.push((label, score.confidence)),
            None => {
                debug!(identifier = %score.identifier, "unmapped classifier identifier dropped");
                mapped.dropped += 1;
            }
        }
    }
    mapped
}
