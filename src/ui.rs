// ui.rs

use crate::host::FrameObserver;
use crate::output::{LightId, OutputFrame, OutputId, OutputSlots};
use crate::signals::BeatPosition;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

pub fn create_beat_progress(multi_progress: &MultiProgress, quantum: f64) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new(quantum.ceil().max(1.0) as u64));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("⣀⣤⣦⣶⣷⣿ "),
    );
    pb.set_prefix("Beat");
    pb
}

pub fn create_output_spinner(multi_progress: &MultiProgress) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix("Outputs");
    pb
}

/// One-line summary of the output slots, e.g. `START 10.0V  RESET 0.0V ...`
pub fn format_outputs(slots: &OutputSlots) -> String {
    let mut line = OutputId::ALL
        .iter()
        .map(|&id| format!("{} {:4.1}V", id.label(), slots.voltage(id)))
        .collect::<Vec<_>>()
        .join("  ");
    let light = if slots.brightness(LightId::Beat) > 0.0 {
        "●"
    } else {
        "○"
    };
    line.push_str(&format!("  BEAT {}", light));
    line
}

/// Terminal renderer for the bridge outputs
pub struct StatusDisplay {
    #[allow(dead_code)]
    multi_progress: MultiProgress,
    beat_pb: ProgressBar,
    output_pb: ProgressBar,
    beats_per_bar: u64,
    redraw_every: u64,
    ticks: u64,
}

impl StatusDisplay {
    pub fn new(quantum: f64, redraw_every: u64) -> Self {
        Self::with_draw_target(quantum, redraw_every, ProgressDrawTarget::stderr())
    }

    pub fn hidden(quantum: f64) -> Self {
        Self::with_draw_target(quantum, 1, ProgressDrawTarget::hidden())
    }

    fn with_draw_target(quantum: f64, redraw_every: u64, target: ProgressDrawTarget) -> Self {
        let multi_progress = MultiProgress::with_draw_target(target);
        let beat_pb = create_beat_progress(&multi_progress, quantum);
        let output_pb = create_output_spinner(&multi_progress);
        let beats_per_bar = beat_pb.length().unwrap_or(1);

        StatusDisplay {
            multi_progress,
            beat_pb,
            output_pb,
            beats_per_bar,
            redraw_every: redraw_every.max(1),
            ticks: 0,
        }
    }

    pub fn beat_position(&self) -> u64 {
        self.beat_pb.position()
    }

    pub fn output_message(&self) -> String {
        self.output_pb.message()
    }

    pub fn finish(&self) {
        self.beat_pb.finish_and_clear();
        self.output_pb.finish_and_clear();
    }
}

impl FrameObserver for StatusDisplay {
    fn observe(&mut self, frame: &OutputFrame, position: &BeatPosition, slots: &OutputSlots) {
        self.ticks += 1;

        if self.ticks % self.redraw_every == 0 || self.ticks == 1 {
            // Stopped transport shows an empty bar
            let in_bar = if frame.start {
                position.beat_in_bar().min(self.beats_per_bar)
            } else {
                0
            };
            self.beat_pb.set_position(in_bar);
            self.output_pb.set_message(format_outputs(slots));
            self.output_pb.tick();
        }
    }
}
