//! # auris-core
//!
//! Reusable sound-alert detection engine SDK.
//!
//! ## Architecture
//!
//! ```text
//! Classifier → ClassifierWindow → bounded channel → Pipeline(spawn_blocking)
//!                                                        │
//!                                                  label mapping
//!                                                        │
//!                                              DetectionEngine gates
//!                                                        │
//!                                  sinks + broadcast::Sender<AlertEvent>
//! ```
//!
//! The host application owns audio capture and the ML classifier; this
//! crate owns the decision of which classifier frames become confirmed
//! detections. All frame processing is serialized on the pipeline thread.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod detect;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod ipc;
pub mod label;

// Convenience re-exports for downstream crates
pub use detect::{CooldownPolicy, DetectionConfig, DetectionEngine, DetectionEvent};
pub use dispatch::DetectionSink;
pub use engine::{AurisEngine, EngineConfig};
pub use error::AurisError;
pub use ingest::{ClassifierWindow, RawScore, WindowSender};
pub use ipc::events::{AlertEvent, EngineStatus, EngineStatusEvent, WindowActivityEvent};
pub use label::SoundLabel;
