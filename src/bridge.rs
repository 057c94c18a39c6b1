use crate::output::{OutputFrame, OutputSink};
use crate::session::{SessionClock, TimelineSnapshot};
use crate::signals::{frame_at, BeatPosition, SignalConfig};
use log::{info, trace};

/// Owns a tempo-sync session and turns it into output values once per tick.
///
/// The session is enabled (with start/stop sync) for exactly as long as the
/// bridge exists: construction enables it, dropping the bridge disables it.
pub struct LinkBridge<S: SessionClock> {
    session: S,
    config: SignalConfig,
}

impl<S: SessionClock> LinkBridge<S> {
    pub fn new(mut session: S, config: SignalConfig) -> Self {
        session.enable(true);
        session.enable_start_stop_sync(true);
        info!("Link bridge active with quantum {}", config.quantum);
        Self { session, config }
    }

    /// Runs one processing tick and writes the result into `sink`
    pub fn process<O: OutputSink + ?Sized>(&self, sink: &mut O) -> OutputFrame {
        self.process_with_position(sink).0
    }

    /// Like [`process`](Self::process), also returning the queried position
    pub fn process_with_position<O: OutputSink + ?Sized>(
        &self,
        sink: &mut O,
    ) -> (OutputFrame, BeatPosition) {
        let time = self.session.current_time_micros();
        let timeline = self.session.capture_session_state();
        let position = BeatPosition::at(&self.config, time, &timeline);
        let frame = frame_at(&position, timeline.is_playing());
        frame.write_to(sink);
        trace!("Tick at {} µs ({:?}): {:?}", time, position, frame);
        (frame, position)
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }
}

impl<S: SessionClock> Drop for LinkBridge<S> {
    fn drop(&mut self) {
        self.session.enable(false);
        info!("Link bridge released session");
    }
}
