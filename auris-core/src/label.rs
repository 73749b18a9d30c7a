//! Closed sound-label taxonomy with static per-label tuning.
//!
//! Each label carries the three knobs the detection gates read:
//! a per-frame confidence threshold, the number of consecutive qualifying
//! frames required to confirm, and the set of labels it suppresses when
//! both are candidates inside the competition window. The dominance sets
//! encode known classifier confusion pairs (running water scored as a car
//! horn, alarm tones scored as doorbells) and are asymmetric.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One recognizable sound class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundLabel {
    Doorbell,
    Knock,
    SmokeAlarm,
    Siren,
    CarHorn,
    DogBark,
    CatMeow,
    BabyCry,
    GlassBreaking,
    WaterRunning,
    ApplianceBeep,
    Speech,
}

/// Static tuning for one label, immutable for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct LabelTuning {
    /// Minimum per-frame confidence to count as a candidate, in [0, 1].
    pub confidence_threshold: f32,
    /// Consecutive qualifying frames needed before a confirmation.
    pub required_consecutive_frames: u32,
    /// Labels this label suppresses when both are live candidates.
    pub dominates_over: &'static [SoundLabel],
}

use SoundLabel::*;

impl SoundLabel {
    /// Every label in the taxonomy.
    pub const ALL: [SoundLabel; 12] = [
        Doorbell,
        Knock,
        SmokeAlarm,
        Siren,
        CarHorn,
        DogBark,
        CatMeow,
        BabyCry,
        GlassBreaking,
        WaterRunning,
        ApplianceBeep,
        Speech,
    ];

    /// Static tuning table.
    ///
    /// Short transient sounds (knock, breaking glass) get a higher
    /// threshold and a low frame requirement; sustained sounds (running
    /// water, speech) get a lower threshold but need more frames.
    pub const fn tuning(self) -> LabelTuning {
        match self {
            Doorbell => LabelTuning {
                confidence_threshold: 0.50,
                required_consecutive_frames: 2,
                dominates_over: &[],
            },
            Knock => LabelTuning {
                confidence_threshold: 0.55,
                required_consecutive_frames: 2,
                dominates_over: &[],
            },
            SmokeAlarm => LabelTuning {
                confidence_threshold: 0.55,
                required_consecutive_frames: 3,
                dominates_over: &[Doorbell, ApplianceBeep],
            },
            Siren => LabelTuning {
                confidence_threshold: 0.50,
                required_consecutive_frames: 3,
                dominates_over: &[CarHorn],
            },
            CarHorn => LabelTuning {
                confidence_threshold: 0.65,
                required_consecutive_frames: 2,
                dominates_over: &[],
            },
            DogBark => LabelTuning {
                confidence_threshold: 0.55,
                required_consecutive_frames: 2,
                dominates_over: &[],
            },
            CatMeow => LabelTuning {
                confidence_threshold: 0.55,
                required_consecutive_frames: 2,
                dominates_over: &[],
            },
            BabyCry => LabelTuning {
                confidence_threshold: 0.50,
                required_consecutive_frames: 3,
                dominates_over: &[CatMeow],
            },
            GlassBreaking => LabelTuning {
                confidence_threshold: 0.60,
                required_consecutive_frames: 1,
                dominates_over: &[],
            },
            WaterRunning => LabelTuning {
                confidence_threshold: 0.45,
                required_consecutive_frames: 4,
                dominates_over: &[CarHorn],
            },
            ApplianceBeep => LabelTuning {
                confidence_threshold: 0.60,
                required_consecutive_frames: 2,
                dominates_over: &[],
            },
            Speech => LabelTuning {
                confidence_threshold: 0.40,
                required_consecutive_frames: 4,
                dominates_over: &[],
            },
        }
    }

    /// Whether this label suppresses `other` during competition.
    pub fn dominates(self, other: SoundLabel) -> bool {
        self.tuning().dominates_over.contains(&other)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Doorbell => "doorbell",
            Knock => "knock",
            SmokeAlarm => "smoke_alarm",
            Siren => "siren",
            CarHorn => "car_horn",
            DogBark => "dog_bark",
            CatMeow => "cat_meow",
            BabyCry => "baby_cry",
            GlassBreaking => "glass_breaking",
            WaterRunning => "water_running",
            ApplianceBeep => "appliance_beep",
            Speech => "speech",
        }
    }

    /// Map a raw classifier identifier onto the taxonomy.
    ///
    /// Identifiers are normalized (lowercased, punctuation and whitespace
    /// folded to `_`) and looked up in a fixed alias table. Returns `None`
    /// for anything the taxonomy does not cover.
    pub fn from_identifier(raw: &str) -> Option<SoundLabel> {
        let normalized = normalize_identifier(raw);
        let label = match normalized.as_str() {
            "doorbell" | "door_bell" | "bell" => Doorbell,
            "knock" | "knocking" | "door_knock" => Knock,
            "smoke_alarm" | "smoke_detector" | "fire_alarm" | "alarm" => SmokeAlarm,
            "siren" | "emergency_vehicle" | "police_siren" | "ambulance_siren"
            | "civil_defense_siren" => Siren,
            "car_horn" | "vehicle_horn" | "honk" | "air_horn" => CarHorn,
            "dog_bark" | "dog" | "bark" => DogBark,
            "cat_meow" | "cat" | "meow" => CatMeow,
            "baby_cry" | "infant_cry" | "baby_crying" | "crying_baby" => BabyCry,
            "glass_breaking" | "breaking_glass" | "glass_shatter" | "shatter" => GlassBreaking,
            "water_running" | "running_water" | "water" | "faucet"
            | "sink_filling_or_washing" => WaterRunning,
            "appliance_beep" | "beep" | "microwave_oven" | "oven_timer" | "appliance_buzzer" => {
                ApplianceBeep
            }
            "speech" | "conversation" | "talking" => Speech,
            _ => return None,
        };
        Some(label)
    }
}

impl fmt::Display for SoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase ASCII alphanumerics, every other run of characters folded
/// into a single `_`, leading/trailing separators trimmed.
fn normalize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = true;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
