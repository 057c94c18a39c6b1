//! Host-owned output slots
//!
//! The bridge never talks to framework port objects directly. Each tick it
//! produces an [`OutputFrame`] and writes it through the [`OutputSink`] trait,
//! which a host (or [`OutputSlots`] in tests and the CLI) implements.

/// Voltage emitted for a high signal
pub const HIGH_VOLTAGE: f32 = 10.0;

pub const OUTPUTS_LEN: usize = 3;
pub const LIGHTS_LEN: usize = 1;

/// Voltage outputs, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputId {
    Start,
    Reset,
    Clock,
}

impl OutputId {
    pub const ALL: [OutputId; OUTPUTS_LEN] = [OutputId::Start, OutputId::Reset, OutputId::Clock];

    pub fn index(self) -> usize {
        match self {
            OutputId::Start => 0,
            OutputId::Reset => 1,
            OutputId::Clock => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputId::Start => "START",
            OutputId::Reset => "RESET",
            OutputId::Clock => "CLOCK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightId {
    Beat,
}

impl LightId {
    pub fn index(self) -> usize {
        match self {
            LightId::Beat => 0,
        }
    }
}

/// Destination for the values computed on every tick
pub trait OutputSink {
    fn set_voltage(&mut self, output: OutputId, volts: f32);
    fn set_brightness(&mut self, light: LightId, brightness: f32);
}

/// The four values derived for one tick.
///
/// Built and consumed within a single tick; nothing here is carried over.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputFrame {
    pub start: bool,
    pub reset: bool,
    pub clock: bool,
    /// Beat indicator brightness, 0.0 or 1.0
    pub beat_light: f32,
}

impl OutputFrame {
    pub fn is_high(&self, output: OutputId) -> bool {
        match output {
            OutputId::Start => self.start,
            OutputId::Reset => self.reset,
            OutputId::Clock => self.clock,
        }
    }

    pub fn voltage(&self, output: OutputId) -> f32 {
        if self.is_high(output) {
            HIGH_VOLTAGE
        } else {
            0.0
        }
    }

    /// Writes every slot, including the ones that are gated off.
    pub fn write_to<S: OutputSink + ?Sized>(&self, sink: &mut S) {
        for output in OutputId::ALL {
            sink.set_voltage(output, self.voltage(output));
        }
        sink.set_brightness(LightId::Beat, self.beat_light);
    }
}

/// Fixed-size slot record standing in for a host's port arrays
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputSlots {
    voltages: [f32; OUTPUTS_LEN],
    lights: [f32; LIGHTS_LEN],
}

impl OutputSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voltage(&self, output: OutputId) -> f32 {
        self.voltages[output.index()]
    }

    pub fn brightness(&self, light: LightId) -> f32 {
        self.lights[light.index()]
    }
}

impl OutputSink for OutputSlots {
    fn set_voltage(&mut self, output: OutputId, volts: f32) {
        self.voltages[output.index()] = volts;
    }

    fn set_brightness(&mut self, light: LightId, brightness: f32) {
        self.lights[light.index()] = brightness;
    }
}
