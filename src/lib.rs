pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod output;
pub mod session;
pub mod signals;
pub mod ui;

pub use bridge::LinkBridge;
pub use cli::Args;
pub use error::{BridgeError, Result};
pub use host::{FrameObserver, HostLoop, HostStats};
pub use output::{LightId, OutputFrame, OutputId, OutputSink, OutputSlots, HIGH_VOLTAGE};
pub use session::{Micros, SessionClock, SessionHandle, SimulatedSession, TimelineSnapshot};
pub use signals::{derive, SignalConfig};
