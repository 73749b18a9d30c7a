//! Downstream detection fan-out.
//!
//! `DetectionSink` is the capability seam for user-facing side effects
//! (haptics, notification delivery, lock-screen presentation). The
//! engine never branches on app-lifecycle state itself — it calls every
//! registered sink once per confirmed event and moves on. Sinks run on
//! the pipeline thread; anything slow must hand off internally.
//!
//! Display lifetime ("currently showing" timeouts) is presentation
//! state and stays on the sink side of this boundary.

use crate::detect::DetectionEvent;

/// Contract for detection consumers.
pub trait DetectionSink: Send + 'static {
    /// Called once for every confirmed detection, in confirmation order.
    fn on_detection(&mut self, event: &DetectionEvent);
}

/// Ordered fan-out over every registered sink.
pub struct SinkFanout {
    sinks: Vec<Box<dyn DetectionSink>>,
}

impl SinkFanout {
    pub fn new(sinks: Vec<Box<dyn DetectionSink>>) -> Self {
        Self { sinks }
    }

    pub fn dispatch(&mut self, event: &DetectionEvent) {
        for sink in &mut self.sinks {
            sink.on_detection(event);
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::SoundLabel;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Instant;

    struct RecordingSink {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, SoundLabel)>>>,
    }

    impl DetectionSink for RecordingSink {
        fn on_detection(&mut self, event: &DetectionEvent) {
            self.log.lock().push((self.name, event.label));
        }
    }

    #[test]
    fn every_sink_sees_every_event_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut fanout = SinkFanout::new(vec![
            Box::new(RecordingSink {
                name: "haptics",
                log: Arc::clone(&log),
            }),
            Box::new(RecordingSink {
                name: "notify",
                log: Arc::clone(&log),
            }),
        ]);
        assert_eq!(fanout.len(), 2);

        let event = DetectionEvent {
            label: SoundLabel::Doorbell,
            confidence: 0.8,
            confirmed_at: Instant::now(),
        };
        fanout.dispatch(&event);

        assert_eq!(
            &*log.lock(),
            &vec![
                ("haptics", SoundLabel::Doorbell),
                ("notify", SoundLabel::Doorbell)
            ]
        );
    }

    #[test]
    fn empty_fanout_is_a_no_op() {
        let mut fanout = SinkFanout::new(vec![]);
        assert!(fanout.is_empty());
        fanout.dispatch(&DetectionEvent {
            label: SoundLabel::Siren,
            confidence: 0.9,
            confirmed_at: Instant::now(),
        });
    }
}
