//! Tempo-sync session access
//!
//! The shared timeline lives in an external tempo-sync library. This module
//! describes what the bridge needs from it:
//! - [`SessionClock`] for the time reference, snapshot capture and lifecycle
//! - [`TimelineSnapshot`] for the read-only queries on a captured state
//!
//! [`SimulatedSession`] is a single-peer, in-process implementation used by
//! the binary and by tests that want a running timeline.
//!
mod simulated;

#[cfg(any(test, feature = "test-mock"))]
pub mod mock;

pub use simulated::{
    ManualClock, SessionHandle, SessionState, SimulatedSession, SystemClock, TimeSource,
    MAX_TEMPO, MIN_TEMPO,
};

/// Microseconds on the session's monotonic clock
pub type Micros = i64;

/// Immutable capture of the shared transport at one instant
pub trait TimelineSnapshot {
    fn is_playing(&self) -> bool;

    /// Position within one quantum cycle, in `[0, quantum)`
    fn phase_at_time(&self, time: Micros, quantum: f64) -> f64;

    /// Absolute beat count; negative before the transport's beat zero
    fn beat_at_time(&self, time: Micros, quantum: f64) -> f64;
}

/// Capability exposed by a tempo-sync session
pub trait SessionClock {
    type Snapshot: TimelineSnapshot;

    fn current_time_micros(&self) -> Micros;
    fn capture_session_state(&self) -> Self::Snapshot;

    fn enable(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
    fn enable_start_stop_sync(&mut self, enabled: bool);
}
