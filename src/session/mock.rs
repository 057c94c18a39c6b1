//! Synthetic sessions for tests
use super::{Micros, SessionClock, TimelineSnapshot};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Snapshot that reports fixed values regardless of the queried time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimeline {
    pub playing: bool,
    pub phase: f64,
    pub beats: f64,
}

impl FixedTimeline {
    pub fn new(playing: bool, beats: f64, phase: f64) -> Self {
        Self {
            playing,
            phase,
            beats,
        }
    }
}

impl TimelineSnapshot for FixedTimeline {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn phase_at_time(&self, _time: Micros, _quantum: f64) -> f64 {
        self.phase
    }

    fn beat_at_time(&self, _time: Micros, _quantum: f64) -> f64 {
        self.beats
    }
}

/// Lifecycle calls observed by a [`RecordingSession`], in order.
///
/// Per-tick captures are only counted, see [`RecordingSession::captures`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Enable(bool),
    StartStopSync(bool),
}

/// Session that serves a scripted timeline and records lifecycle calls.
///
/// Clones share the timeline and the event log, so a test can keep one
/// clone while the bridge owns another.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    now: Arc<Mutex<Micros>>,
    timeline: Arc<Mutex<FixedTimeline>>,
    events: Arc<Mutex<Vec<SessionEvent>>>,
    captures: Arc<AtomicUsize>,
    enabled: Arc<Mutex<bool>>,
}

impl RecordingSession {
    pub fn new(timeline: FixedTimeline) -> Self {
        Self {
            now: Arc::new(Mutex::new(0)),
            timeline: Arc::new(Mutex::new(timeline)),
            events: Arc::new(Mutex::new(Vec::new())),
            captures: Arc::new(AtomicUsize::new(0)),
            enabled: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_timeline(&self, timeline: FixedTimeline) {
        *self.timeline.lock().unwrap() = timeline;
    }

    pub fn set_time(&self, time: Micros) {
        *self.now.lock().unwrap() = time;
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Snapshots taken so far
    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    fn record(&self, event: SessionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl SessionClock for RecordingSession {
    type Snapshot = FixedTimeline;

    fn current_time_micros(&self) -> Micros {
        *self.now.lock().unwrap()
    }

    fn capture_session_state(&self) -> FixedTimeline {
        self.captures.fetch_add(1, Ordering::SeqCst);
        *self.timeline.lock().unwrap()
    }

    fn enable(&mut self, enabled: bool) {
        self.record(SessionEvent::Enable(enabled));
        *self.enabled.lock().unwrap() = enabled;
    }

    fn is_enabled(&self) -> bool {
        *self.enabled.lock().unwrap()
    }

    fn enable_start_stop_sync(&mut self, enabled: bool) {
        self.record(SessionEvent::StartStopSync(enabled));
    }
}
