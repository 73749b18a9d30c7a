//! Bounded channel carrying classifier windows into the pipeline.
//!
//! The host application owns audio capture and the ML classifier; once
//! per analysis window it pushes the classifier's raw scores through
//! this channel. The pipeline thread drains it and feeds the detection
//! engine, so all frame processing is serialized regardless of which
//! thread the classifier callbacks fire on.

pub mod adapter;
pub mod window;

pub use window::{ClassifierWindow, RawScore};

use crossbeam_channel::{bounded, Receiver, Sender};

/// Sender half — held by the host's classifier callback.
pub type WindowSender = Sender<ClassifierWindow>;

/// Receiver half — held by the pipeline thread.
pub type WindowReceiver = Receiver<ClassifierWindow>;

/// Queue capacity: 64 windows ≈ 30 s of classifier output at a 0.5 s
/// analysis stride. A pipeline that far behind should fail pushes fast
/// rather than buffer stale sound.
pub const WINDOW_QUEUE_CAPACITY: usize = 64;

/// Create a matched sender/receiver pair for one listening session.
pub fn create_window_channel() -> (WindowSender, WindowReceiver) {
    bounded(WINDOW_QUEUE_CAPACITY)
}
