use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use auris_core::{
    AlertEvent, AurisEngine, ClassifierWindow, DetectionEvent, DetectionSink, EngineConfig,
    RawScore, SoundLabel,
};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

struct RecordingSink {
    events: Arc<Mutex<Vec<DetectionEvent>>>,
}

impl DetectionSink for RecordingSink {
    fn on_detection(&mut self, event: &DetectionEvent) {
        self.events.lock().push(*event);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("auris_core=debug")
        .try_init();
}

fn recv_alert(rx: &mut broadcast::Receiver<AlertEvent>, timeout: Duration) -> AlertEvent {
    let start = Instant::now();
    loop {
        match rx.try_recv() {
            Ok(event) => return event,
            Err(TryRecvError::Empty) => {
                if start.elapsed() >= timeout {
                    panic!("timed out waiting for alert event");
                }
                thread::sleep(Duration::from_millis(5));
            }
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Closed) => panic!("alert channel closed unexpectedly"),
        }
    }
}

fn assert_no_alert_for(rx: &mut broadcast::Receiver<AlertEvent>, timeout: Duration) {
    let start = Instant::now();
    loop {
        match rx.try_recv() {
            Ok(event) => panic!("expected no alert, got {:?}", event.label),
            Err(TryRecvError::Empty) => {
                if start.elapsed() >= timeout {
                    return;
                }
                thread::sleep(Duration::from_millis(5));
            }
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Closed) => return,
        }
    }
}

fn window(base: Instant, secs: f32, identifier: &str, confidence: f32) -> ClassifierWindow {
    ClassifierWindow::new(
        base + Duration::from_secs_f32(secs),
        vec![RawScore::new(identifier, confidence)],
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn doorbell_confirms_end_to_end() {
    init_tracing();
    let base = Instant::now();
    let engine = AurisEngine::new(EngineConfig::default());
    let sink_events = Arc::new(Mutex::new(Vec::new()));
    let mut alert_rx = engine.subscribe_alerts();

    engine
        .start(vec![Box::new(RecordingSink {
            events: Arc::clone(&sink_events),
        })])
        .expect("start succeeds");

    engine
        .push_window(window(base, 0.0, "doorbell", 0.6))
        .expect("push window");
    engine
        .push_window(window(base, 0.3, "doorbell", 0.7))
        .expect("push window");

    let alert = recv_alert(&mut alert_rx, Duration::from_secs(2));
    assert_eq!(alert.label, SoundLabel::Doorbell);
    assert!((alert.confidence - 0.65).abs() < 1e-5);

    engine.stop().expect("stop succeeds");

    let events = sink_events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].label, SoundLabel::Doorbell);

    let snap = engine.pipeline_diagnostics_snapshot();
    assert_eq!(snap.alerts_emitted, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn dominance_pair_never_alerts_the_confused_label() {
    init_tracing();
    let base = Instant::now();
    let engine = AurisEngine::new(EngineConfig::default());
    let mut alert_rx = engine.subscribe_alerts();

    engine.start(vec![]).expect("start succeeds");

    // Running water is live on the ledger when the car horn reaches its
    // frame requirement — the horn must stay silent.
    engine
        .push_window(window(base, 0.0, "running water", 0.55))
        .expect("push window");
    engine
        .push_window(window(base, 0.5, "car_horn", 0.9))
        .expect("push window");
    engine
        .push_window(window(base, 1.0, "car_horn", 0.9))
        .expect("push window");

    assert_no_alert_for(&mut alert_rx, Duration::from_millis(300));
    engine.stop().expect("stop succeeds");
}

#[tokio::test(flavor = "multi_thread")]
async fn cooldowns_persist_across_session_restart() {
    init_tracing();
    let base = Instant::now();
    let engine = AurisEngine::new(EngineConfig::default());
    let mut alert_rx = engine.subscribe_alerts();

    engine.start(vec![]).expect("start succeeds");
    engine
        .push_window(window(base, 0.0, "doorbell", 0.6))
        .expect("push window");
    engine
        .push_window(window(base, 0.3, "doorbell", 0.7))
        .expect("push window");
    let alert = recv_alert(&mut alert_rx, Duration::from_secs(2));
    assert_eq!(alert.label, SoundLabel::Doorbell);

    engine.stop().expect("stop succeeds");
    engine.start(vec![]).expect("restart succeeds");

    // Well inside the 10 s per-label cooldown of the first confirmation:
    // the restart must not let the doorbell re-fire.
    engine
        .push_window(window(base, 5.0, "doorbell", 0.9))
        .expect("push window");
    engine
        .push_window(window(base, 5.3, "doorbell", 0.9))
        .expect("push window");
    assert_no_alert_for(&mut alert_rx, Duration::from_millis(300));

    // Past both cooldowns the label confirms again.
    engine
        .push_window(window(base, 10.4, "doorbell", 0.6))
        .expect("push window");
    engine
        .push_window(window(base, 10.7, "doorbell", 0.6))
        .expect("push window");
    let alert = recv_alert(&mut alert_rx, Duration::from_secs(2));
    assert_eq!(alert.label, SoundLabel::Doorbell);

    engine.stop().expect("stop succeeds");
}

#[tokio::test(flavor = "multi_thread")]
async fn disabling_a_label_mid_session_silences_it() {
    init_tracing();
    let base = Instant::now();
    let engine = AurisEngine::new(EngineConfig::default());
    let mut alert_rx = engine.subscribe_alerts();

    engine.start(vec![]).expect("start succeeds");
    engine.disable_label(SoundLabel::DogBark);

    engine
        .push_window(window(base, 0.0, "dog_bark", 0.95))
        .expect("push window");
    engine
        .push_window(window(base, 0.3, "dog_bark", 0.95))
        .expect("push window");
    assert_no_alert_for(&mut alert_rx, Duration::from_millis(300));

    engine.stop().expect("stop succeeds");
}

#[tokio::test(flavor = "multi_thread")]
async fn push_after_stop_is_rejected() {
    let engine = AurisEngine::new(EngineConfig::default());
    engine.start(vec![]).expect("start succeeds");
    engine.stop().expect("stop succeeds");

    let result = engine.push_window(ClassifierWindow::new(Instant::now(), vec![]));
    assert!(result.is_err());
}
