use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Session tempo in beats per minute
    #[arg(short, long, value_name = "BPM")]
    pub bpm: Option<f64>,

    /// Beats per bar used for phase
    #[arg(short, long, value_name = "BEATS")]
    pub quantum: Option<f64>,

    /// Host processing ticks per second
    #[arg(short, long, value_name = "HZ")]
    pub rate: Option<u32>,

    /// Beats of count-in before beat zero
    #[arg(long, value_name = "BEATS")]
    pub count_in: Option<f64>,

    /// Stop after this many seconds (0 runs until interrupted)
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<f64>,

    /// Leave the transport stopped
    #[arg(long)]
    pub stopped: bool,

    /// Log to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}
