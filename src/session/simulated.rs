use super::{Micros, SessionClock, TimelineSnapshot};
use log::{debug, info};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Tempo range accepted by the session, matching what peers will negotiate
pub const MIN_TEMPO: f64 = 20.0;
pub const MAX_TEMPO: f64 = 999.0;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Monotonic microsecond clock backing a session
pub trait TimeSource: Send + Sync {
    fn now_micros(&self) -> Micros;
}

/// Wall-clock time source measured from its creation
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_micros(&self) -> Micros {
        self.origin.elapsed().as_micros() as Micros
    }
}

/// Settable clock for deterministic runs. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Micros) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn set(&self, time: Micros) {
        self.now.store(time, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Micros) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_micros(&self) -> Micros {
        self.now.load(Ordering::SeqCst)
    }
}

/// Captured state of a simulated timeline.
///
/// Beat zero falls at `beat_origin`; beats advance linearly at `tempo`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionState {
    tempo: f64,
    beat_origin: Micros,
    is_playing: bool,
}

impl SessionState {
    pub fn new(tempo: f64, beat_origin: Micros, is_playing: bool) -> Self {
        Self {
            tempo: clamp_tempo(tempo),
            beat_origin,
            is_playing,
        }
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn beat_origin(&self) -> Micros {
        self.beat_origin
    }

    fn beats(&self, time: Micros) -> f64 {
        (time - self.beat_origin) as f64 * self.tempo / MICROS_PER_MINUTE
    }

    fn micros_per_beat(&self) -> f64 {
        MICROS_PER_MINUTE / self.tempo
    }
}

impl TimelineSnapshot for SessionState {
    fn is_playing(&self) -> bool {
        self.is_playing
    }

    fn phase_at_time(&self, time: Micros, quantum: f64) -> f64 {
        if quantum <= 0.0 {
            return 0.0;
        }
        let phase = self.beats(time).rem_euclid(quantum);
        // rem_euclid can round up to the modulus for tiny negative inputs
        if phase >= quantum {
            0.0
        } else {
            phase
        }
    }

    fn beat_at_time(&self, time: Micros, _quantum: f64) -> f64 {
        self.beats(time)
    }
}

fn clamp_tempo(bpm: f64) -> f64 {
    if bpm.is_finite() {
        bpm.clamp(MIN_TEMPO, MAX_TEMPO)
    } else {
        MIN_TEMPO
    }
}

fn lock_timeline(timeline: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    timeline.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Single-peer session with a local tempo timeline
pub struct SimulatedSession<T: TimeSource = SystemClock> {
    time: Arc<T>,
    timeline: Arc<Mutex<SessionState>>,
    enabled: bool,
    start_stop_sync: bool,
}

impl SimulatedSession<SystemClock> {
    pub fn new(bpm: f64) -> Self {
        Self::with_time_source(bpm, SystemClock::new())
    }
}

impl<T: TimeSource> SimulatedSession<T> {
    pub fn with_time_source(bpm: f64, source: T) -> Self {
        let now = source.now_micros();
        let state = SessionState::new(bpm, now, false);
        info!("Creating simulated session at {} BPM", state.tempo);
        Self {
            time: Arc::new(source),
            timeline: Arc::new(Mutex::new(state)),
            enabled: false,
            start_stop_sync: false,
        }
    }

    /// Returns a handle for controlling the transport from another thread
    pub fn handle(&self) -> SessionHandle<T> {
        SessionHandle {
            time: Arc::clone(&self.time),
            timeline: Arc::clone(&self.timeline),
        }
    }

    pub fn start_stop_sync_enabled(&self) -> bool {
        self.start_stop_sync
    }
}

impl<T: TimeSource> SessionClock for SimulatedSession<T> {
    type Snapshot = SessionState;

    fn current_time_micros(&self) -> Micros {
        self.time.now_micros()
    }

    fn capture_session_state(&self) -> SessionState {
        *lock_timeline(&self.timeline)
    }

    fn enable(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!(
                "Simulated session {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn enable_start_stop_sync(&mut self, enabled: bool) {
        debug!("Start/stop sync set to {}", enabled);
        self.start_stop_sync = enabled;
    }
}

/// Transport control for a [`SimulatedSession`]
pub struct SessionHandle<T: TimeSource = SystemClock> {
    time: Arc<T>,
    timeline: Arc<Mutex<SessionState>>,
}

impl<T: TimeSource> Clone for SessionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            time: Arc::clone(&self.time),
            timeline: Arc::clone(&self.timeline),
        }
    }
}

impl<T: TimeSource> SessionHandle<T> {
    /// Changes tempo without moving the current beat position
    pub fn set_tempo(&self, bpm: f64) {
        let now = self.time.now_micros();
        let mut state = lock_timeline(&self.timeline);
        let beat = state.beats(now);
        state.tempo = clamp_tempo(bpm);
        state.beat_origin = now - (beat * state.micros_per_beat()).round() as Micros;
        info!("Session tempo set to {} BPM", state.tempo);
    }

    pub fn tempo(&self) -> f64 {
        lock_timeline(&self.timeline).tempo
    }

    /// Starts the transport with beat zero `count_in_beats` from now
    pub fn start_playing(&self, count_in_beats: f64) {
        let now = self.time.now_micros();
        let count_in = count_in_beats.max(0.0);
        let mut state = lock_timeline(&self.timeline);
        state.beat_origin = now + (count_in * state.micros_per_beat()).round() as Micros;
        state.is_playing = true;
        info!("Transport started with {} beat count-in", count_in);
    }

    pub fn stop_playing(&self) {
        lock_timeline(&self.timeline).is_playing = false;
        info!("Transport stopped");
    }

    pub fn is_playing(&self) -> bool {
        lock_timeline(&self.timeline).is_playing
    }

    pub fn capture(&self) -> SessionState {
        *lock_timeline(&self.timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Micros = 1_000_000;

    fn session_at(bpm: f64) -> (SimulatedSession<ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        (SimulatedSession::with_time_source(bpm, clock.clone()), clock)
    }

    #[test]
    fn test_beats_advance_with_tempo() {
        let (session, clock) = session_at(120.0);
        session.handle().start_playing(0.0);

        clock.advance(SECOND);
        let now = session.current_time_micros();
        let state = session.capture_session_state();
        assert!((state.beat_at_time(now, 4.0) - 2.0).abs() < 1e-9);
        assert!((state.phase_at_time(now, 4.0) - 2.0).abs() < 1e-9);

        clock.advance(2 * SECOND);
        let now = session.current_time_micros();
        assert!((state.beat_at_time(now, 4.0) - 6.0).abs() < 1e-9);
        assert!((state.phase_at_time(now, 4.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_count_in_gives_negative_beats() {
        let (session, clock) = session_at(120.0);
        session.handle().start_playing(2.0);

        let state = session.capture_session_state();
        let now = session.current_time_micros();
        assert!((state.beat_at_time(now, 4.0) + 2.0).abs() < 1e-9);
        // Phase still wraps into [0, quantum) before beat zero
        assert!((state.phase_at_time(now, 4.0) - 2.0).abs() < 1e-9);

        clock.advance(SECOND);
        let now = session.current_time_micros();
        assert!(state.beat_at_time(now, 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_change_keeps_beat_continuous() {
        let (session, clock) = session_at(120.0);
        let handle = session.handle();
        handle.start_playing(0.0);
        clock.advance(1_500_000);

        let before = handle.capture().beat_at_time(clock.now_micros(), 4.0);
        handle.set_tempo(90.0);
        let after = handle.capture().beat_at_time(clock.now_micros(), 4.0);
        assert!((before - after).abs() < 1e-4);
        assert_eq!(handle.tempo(), 90.0);

        clock.advance(SECOND);
        let later = handle.capture().beat_at_time(clock.now_micros(), 4.0);
        assert!((later - after - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_tempo_is_clamped() {
        let (session, _clock) = session_at(5000.0);
        assert_eq!(session.handle().tempo(), MAX_TEMPO);
        session.handle().set_tempo(1.0);
        assert_eq!(session.handle().tempo(), MIN_TEMPO);
        session.handle().set_tempo(f64::NAN);
        assert_eq!(session.handle().tempo(), MIN_TEMPO);
    }

    #[test]
    fn test_phase_stays_within_quantum() {
        let state = SessionState::new(137.0, 0, true);
        for step in -2000..2000 {
            let time = step * 7_919;
            let phase = state.phase_at_time(time, 4.0);
            assert!((0.0..4.0).contains(&phase), "phase {} out of range", phase);
        }
        assert_eq!(state.phase_at_time(SECOND, 0.0), 0.0);
    }

    #[test]
    fn test_start_and_stop() {
        let (session, _clock) = session_at(120.0);
        let handle = session.handle();
        assert!(!session.capture_session_state().is_playing());
        handle.start_playing(0.0);
        assert!(session.capture_session_state().is_playing());
        handle.stop_playing();
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_changes() {
        let (session, _clock) = session_at(120.0);
        let handle = session.handle();
        let snapshot = session.capture_session_state();
        handle.start_playing(0.0);
        handle.set_tempo(150.0);
        assert!(!snapshot.is_playing());
        assert_eq!(snapshot.tempo(), 120.0);
    }

    #[test]
    fn test_lifecycle_flags() {
        let (mut session, _clock) = session_at(120.0);
        assert!(!session.is_enabled());
        session.enable(true);
        session.enable_start_stop_sync(true);
        assert!(session.is_enabled());
        assert!(session.start_stop_sync_enabled());
        session.enable(false);
        assert!(!session.is_enabled());
    }
}
