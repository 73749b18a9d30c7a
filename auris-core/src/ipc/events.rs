//! Event types broadcast by the engine.
//!
//! ## Channel names
//!
//! | Event | Channel |
//! |-------|---------|
//! | `AlertEvent` | `"auris://alert"` |
//! | `EngineStatusEvent` | `"auris://status"` |
//! | `WindowActivityEvent` | `"auris://activity"` |

use serde::{Deserialize, Serialize};

use crate::label::SoundLabel;

// ---------------------------------------------------------------------------
// Alert events
// ---------------------------------------------------------------------------

/// Emitted on channel `"auris://alert"` for every confirmed detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    /// Monotonically increasing event sequence number.
    pub seq: u64,
    pub label: SoundLabel,
    /// Smoothed confidence in [0.0, 1.0].
    pub confidence: f32,
    /// Milliseconds since the listening session started.
    pub confirmed_at_ms: u64,
}

// ---------------------------------------------------------------------------
// Window activity events
// ---------------------------------------------------------------------------

/// Emitted on channel `"auris://activity"` for each processed window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowActivityEvent {
    /// Monotonically increasing event sequence number.
    pub seq: u64,
    /// Raw scores the classifier reported for this window.
    pub total_scores: usize,
    /// Scores that mapped onto the label taxonomy.
    pub mapped_scores: usize,
    /// Highest-confidence mapped label, if any score mapped.
    pub top_label: Option<SoundLabel>,
    pub top_confidence: Option<f32>,
}

// ---------------------------------------------------------------------------
// Engine status events
// ---------------------------------------------------------------------------

/// Emitted on channel `"auris://status"` when the engine state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatusEvent {
    pub status: EngineStatus,
    /// Optional human-readable detail (e.g. error message).
    pub detail: Option<String>,
}

/// Current state of the Auris engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// Engine created but `start()` not yet called.
    Idle,
    /// Actively consuming classifier windows.
    Listening,
    /// Session stopped; engine may be restarted.
    Stopped,
    /// Unrecoverable error — restart required.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_event_serializes_with_camel_case_and_snake_case_label() {
        let event = AlertEvent {
            seq: 7,
            label: SoundLabel::SmokeAlarm,
            confidence: 0.82,
            confirmed_at_ms: 4_250,
        };

        let json = serde_json::to_value(&event).expect("serialize alert event");
        assert_eq!(json["seq"], 7);
        assert_eq!(json["label"], "smoke_alarm");
        assert_eq!(json["confirmedAtMs"], 4_250);
        let confidence = json["confidence"]
            .as_f64()
            .expect("confidence should serialize as number");
        assert!((confidence - 0.82).abs() < 1e-5);

        let round_trip: AlertEvent = serde_json::from_value(json).expect("deserialize alert event");
        assert_eq!(round_trip.seq, 7);
        assert_eq!(round_trip.label, SoundLabel::SmokeAlarm);
    }

    #[test]
    fn window_activity_event_serializes_optional_top_candidate() {
        let event = WindowActivityEvent {
            seq: 3,
            total_scores: 4,
            mapped_scores: 2,
            top_label: Some(SoundLabel::DogBark),
            top_confidence: Some(0.66),
        };

        let json = serde_json::to_value(&event).expect("serialize activity event");
        assert_eq!(json["seq"], 3);
        assert_eq!(json["totalScores"], 4);
        assert_eq!(json["mappedScores"], 2);
        assert_eq!(json["topLabel"], "dog_bark");

        let quiet = WindowActivityEvent {
            seq: 4,
            total_scores: 0,
            mapped_scores: 0,
            top_label: None,
            top_confidence: None,
        };
        let json = serde_json::to_value(&quiet).expect("serialize quiet window");
        assert!(json["topLabel"].is_null());
        assert!(json["topConfidence"].is_null());
    }

    #[test]
    fn engine_status_event_serializes_with_lowercase_status() {
        let event = EngineStatusEvent {
            status: EngineStatus::Listening,
            detail: None,
        };

        let json = serde_json::to_value(&event).expect("serialize status event");
        assert_eq!(json["status"], "listening");

        let round_trip: EngineStatusEvent =
            serde_json::from_value(json).expect("deserialize status event");
        assert_eq!(round_trip.status, EngineStatus::Listening);
    }

    #[test]
    fn engine_status_rejects_non_lowercase_values() {
        let invalid = r#""Listening""#;
        let err = serde_json::from_str::<EngineStatus>(invalid);
        assert!(err.is_err(), "expected invalid casing to fail");
    }
}
