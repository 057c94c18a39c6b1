// host.rs

use crate::bridge::LinkBridge;
use crate::output::{OutputFrame, OutputSlots};
use crate::session::SessionClock;
use crate::signals::BeatPosition;
use crossbeam::channel::{select, Receiver};
use log::{debug, error, info};
use std::time::Instant;

/// Receives every frame after it has been written to the slots, together
/// with the timeline position it was derived from
pub trait FrameObserver {
    fn observe(&mut self, frame: &OutputFrame, position: &BeatPosition, slots: &OutputSlots);
}

impl FrameObserver for () {
    fn observe(
        &mut self,
        _frame: &OutputFrame,
        _position: &BeatPosition,
        _slots: &OutputSlots,
    ) {
    }
}

/// Counters collected by the host while it drives the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostStats {
    pub ticks: u64,
    pub clock_pulses: u64,
    pub reset_pulses: u64,
    pub beat_flashes: u64,
    pub starts: u64,
}

impl HostStats {
    fn record(&mut self, previous: &OutputFrame, frame: &OutputFrame) {
        self.ticks += 1;
        if frame.clock && !previous.clock {
            self.clock_pulses += 1;
        }
        if frame.reset && !previous.reset {
            self.reset_pulses += 1;
        }
        if frame.beat_light > 0.0 && previous.beat_light == 0.0 {
            self.beat_flashes += 1;
        }
        if frame.start && !previous.start {
            self.starts += 1;
        }
    }
}

/// Plays the role of the plugin host: owns the output slots and calls the
/// bridge once per tick.
pub struct HostLoop<S: SessionClock> {
    bridge: LinkBridge<S>,
    slots: OutputSlots,
    previous: OutputFrame,
    stats: HostStats,
}

impl<S: SessionClock> HostLoop<S> {
    pub fn new(bridge: LinkBridge<S>) -> Self {
        HostLoop {
            bridge,
            slots: OutputSlots::new(),
            previous: OutputFrame::default(),
            stats: HostStats::default(),
        }
    }

    pub fn tick<O: FrameObserver + ?Sized>(&mut self, observer: &mut O) -> OutputFrame {
        let (frame, position) = self.bridge.process_with_position(&mut self.slots);
        self.stats.record(&self.previous, &frame);
        if frame.reset && !self.previous.reset {
            debug!("Reset pulse at tick {}", self.stats.ticks);
        }
        self.previous = frame;
        observer.observe(&frame, &position, &self.slots);
        frame
    }

    /// Processes a tick per `ticker` message until `shutdown` fires or the
    /// ticker disconnects.
    pub fn run<O: FrameObserver + ?Sized>(
        &mut self,
        ticker: &Receiver<Instant>,
        shutdown: &Receiver<Instant>,
        observer: &mut O,
    ) -> HostStats {
        info!("Host loop running");
        loop {
            select! {
                recv(ticker) -> msg => match msg {
                    Ok(_) => {
                        self.tick(observer);
                    }
                    Err(e) => {
                        error!("Tick channel error: {}", e);
                        break;
                    }
                },
                recv(shutdown) -> _ => {
                    info!("Shutdown requested after {} ticks", self.stats.ticks);
                    break;
                }
            }
        }
        self.stats
    }

    pub fn stats(&self) -> HostStats {
        self.stats
    }

    pub fn slots(&self) -> &OutputSlots {
        &self.slots
    }

    pub fn bridge(&self) -> &LinkBridge<S> {
        &self.bridge
    }
}
