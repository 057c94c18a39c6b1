//! Signal derivation from a timeline snapshot
//!
//! Each tick the bridge turns the shared phase and beat position into a
//! transport gate, a sixteenth-note clock, a reset pulse and a beat light.
//! Nothing is remembered between calls: every value comes from the snapshot
//! and the time it was queried at.

use crate::output::OutputFrame;
use crate::session::{Micros, TimelineSnapshot};

/// Beats per bar used for phase queries unless configured otherwise
pub const DEFAULT_QUANTUM: f64 = 4.0;

/// Fraction of a subdivision during which a pulse stays high
pub const PULSE_WIDTH: f64 = 0.1;

/// Clock subdivision in beats (one pulse per sixteenth note)
pub const CLOCK_DIVISION: f64 = 0.25;

/// Clock pulses between reset pulses
pub const CLOCKS_PER_RESET: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    /// Beats per bar passed to the phase and beat queries
    pub quantum: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
        }
    }
}

impl SignalConfig {
    pub fn with_quantum(quantum: f64) -> Self {
        Self { quantum }
    }
}

/// Pulse windows at one phase, before play-state gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PulseEdges {
    pub beat: bool,
    pub clock: bool,
    pub reset: bool,
}

pub fn edges_at_phase(phase: f64) -> PulseEdges {
    // The reset modulus is 32 clock divisions (8 beats), not the quantum
    let reset_period = CLOCK_DIVISION * CLOCKS_PER_RESET as f64;
    PulseEdges {
        beat: phase % 1.0 < PULSE_WIDTH,
        clock: phase % CLOCK_DIVISION < PULSE_WIDTH,
        reset: phase % reset_period < PULSE_WIDTH,
    }
}

/// Where the timeline stands at the queried instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BeatPosition {
    /// Position within the bar, in `[0, quantum)`
    pub phase: f64,
    pub beats: f64,
}

impl BeatPosition {
    pub fn at<T>(config: &SignalConfig, time: Micros, timeline: &T) -> Self
    where
        T: TimelineSnapshot + ?Sized,
    {
        BeatPosition {
            phase: timeline.phase_at_time(time, config.quantum),
            beats: timeline.beat_at_time(time, config.quantum),
        }
    }

    /// One-based beat within the bar
    pub fn beat_in_bar(&self) -> u64 {
        self.phase.max(0.0).floor() as u64 + 1
    }
}

/// Derives the output frame for `time` from a snapshot captured at `time`.
///
/// Clock and beat light are gated on playing with a non-negative beat count.
/// Reset is gated on playing only, so it can fire during a count-in.
pub fn derive<T>(config: &SignalConfig, time: Micros, timeline: &T) -> OutputFrame
where
    T: TimelineSnapshot + ?Sized,
{
    let position = BeatPosition::at(config, time, timeline);
    frame_at(&position, timeline.is_playing())
}

/// Applies pulse windows and play-state gating to an already queried position
pub fn frame_at(position: &BeatPosition, playing: bool) -> OutputFrame {
    let edges = edges_at_phase(position.phase);
    let counting = playing && position.beats >= 0.0;

    OutputFrame {
        start: playing,
        reset: playing && edges.reset,
        clock: counting && edges.clock,
        beat_light: if counting && edges.beat { 1.0 } else { 0.0 },
    }
}
