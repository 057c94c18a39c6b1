// config.rs

use crate::cli::Args;
use crate::error::{BridgeError, Result};
use crate::session::{MAX_TEMPO, MIN_TEMPO};
use crate::signals::{SignalConfig, DEFAULT_QUANTUM};
use ::config::{Config, Environment, File};
use log::{debug, LevelFilter};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_RATE: u32 = 1000;
pub const MAX_RATE: u32 = 48_000;
pub const ENV_PREFIX: &str = "PHASORLINK";
const DEFAULT_FILE: &str = "phasorlink";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bpm: f64,
    pub quantum: f64,
    /// Host ticks per second
    pub rate: u32,
    pub count_in: f64,
    /// Run time; `None` runs until interrupted
    pub duration: Option<Duration>,
    pub autostart: bool,
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bpm: DEFAULT_BPM,
            quantum: DEFAULT_QUANTUM,
            rate: DEFAULT_RATE,
            count_in: 0.0,
            duration: None,
            autostart: true,
            log_level: LevelFilter::Info,
        }
    }
}

impl Settings {
    /// Layers defaults, settings file, `PHASORLINK_*` variables and CLI flags
    pub fn load(args: &Args) -> Result<Self> {
        Self::load_with_env(args, ENV_PREFIX)
    }

    pub fn load_with_env(args: &Args, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("bpm", DEFAULT_BPM)?
            .set_default("quantum", DEFAULT_QUANTUM)?
            .set_default("rate", i64::from(DEFAULT_RATE))?
            .set_default("count_in", 0.0)?
            .set_default("duration", 0.0)?
            .set_default("autostart", true)?
            .set_default("log_level", "info")?;

        builder = match &args.config {
            Some(path) => {
                debug!("Reading settings from {:?}", path);
                builder.add_source(File::from(path.as_path()))
            }
            None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
        };

        let merged = builder
            .add_source(Environment::with_prefix(env_prefix))
            .set_override_option("bpm", args.bpm)?
            .set_override_option("quantum", args.quantum)?
            .set_override_option("rate", args.rate.map(i64::from))?
            .set_override_option("count_in", args.count_in)?
            .set_override_option("duration", args.duration)?
            .set_override_option("autostart", args.stopped.then_some(false))?
            .set_override_option("log_level", args.log_level.clone())?
            .build()?;

        let settings = Self::from_config(&merged)?;
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    fn from_config(merged: &Config) -> Result<Self> {
        let bpm = merged.get_float("bpm")?;
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&bpm) {
            return Err(BridgeError::Config(format!(
                "bpm must be between {} and {}, got {}",
                MIN_TEMPO, MAX_TEMPO, bpm
            )));
        }

        let quantum = merged.get_float("quantum")?;
        if !(quantum.is_finite() && quantum > 0.0) {
            return Err(BridgeError::Config(format!(
                "quantum must be positive, got {}",
                quantum
            )));
        }

        let rate = merged.get_int("rate")?;
        if rate <= 0 || rate > i64::from(MAX_RATE) {
            return Err(BridgeError::Config(format!(
                "rate must be between 1 and {} Hz, got {}",
                MAX_RATE, rate
            )));
        }

        let count_in = merged.get_float("count_in")?;
        if !(count_in.is_finite() && count_in >= 0.0) {
            return Err(BridgeError::Config(format!(
                "count_in must not be negative, got {}",
                count_in
            )));
        }

        let duration_secs = merged.get_float("duration")?;
        if !(duration_secs.is_finite() && duration_secs >= 0.0) {
            return Err(BridgeError::Config(format!(
                "duration must not be negative, got {}",
                duration_secs
            )));
        }
        let duration = if duration_secs > 0.0 {
            let duration = Duration::try_from_secs_f64(duration_secs)
                .map_err(|e| BridgeError::Config(format!("duration out of range: {}", e)))?;
            Some(duration)
        } else {
            None
        };

        let level = merged.get_string("log_level")?;
        let log_level = LevelFilter::from_str(&level)
            .map_err(|_| BridgeError::Config(format!("unknown log level '{}'", level)))?;

        Ok(Settings {
            bpm,
            quantum,
            rate: rate as u32,
            count_in,
            duration,
            autostart: merged.get_bool("autostart")?,
            log_level,
        })
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig::with_quantum(self.quantum)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    // Unique prefix so the process environment never leaks into these tests
    const TEST_PREFIX: &str = "PHASORLINK_CONFIG_UNIT_TEST";

    fn load(args: &Args) -> Result<Settings> {
        Settings::load_with_env(args, TEST_PREFIX)
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = load(&Args::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.signal_config().quantum, 4.0);
        assert_eq!(settings.tick_interval().as_micros(), 1000);
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let args = Args {
            bpm: Some(140.0),
            quantum: Some(3.0),
            rate: Some(500),
            count_in: Some(4.0),
            duration: Some(2.5),
            stopped: true,
            log_level: Some("debug".to_string()),
            ..Args::default()
        };
        let settings = load(&args).unwrap();
        assert_eq!(settings.bpm, 140.0);
        assert_eq!(settings.quantum, 3.0);
        assert_eq!(settings.rate, 500);
        assert_eq!(settings.count_in, 4.0);
        assert_eq!(settings.duration, Some(Duration::from_millis(2500)));
        assert!(!settings.autostart);
        assert_eq!(settings.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_file_then_cli_precedence() {
        let path = write_temp(
            "phasorlink-precedence.toml",
            "bpm = 98.5\nquantum = 7\nrate = 250\n",
        );
        let args = Args {
            config: Some(path.clone()),
            rate: Some(100),
            ..Args::default()
        };
        let settings = load(&args).unwrap();
        fs::remove_file(path).unwrap();

        assert_eq!(settings.bpm, 98.5);
        assert_eq!(settings.quantum, 7.0);
        assert_eq!(settings.rate, 100);
    }

    #[test]
    fn test_environment_sits_between_file_and_cli() {
        // Own prefix: no other test reads these variables
        const ENV_TEST_PREFIX: &str = "PHASORLINK_CONFIG_ENV_TEST";
        std::env::set_var("PHASORLINK_CONFIG_ENV_TEST_BPM", "133");
        std::env::set_var("PHASORLINK_CONFIG_ENV_TEST_QUANTUM", "5");

        let path = write_temp("phasorlink-env.toml", "bpm = 90\nquantum = 6\n");
        let args = Args {
            config: Some(path.clone()),
            quantum: Some(3.0),
            ..Args::default()
        };
        let settings = Settings::load_with_env(&args, ENV_TEST_PREFIX);

        std::env::remove_var("PHASORLINK_CONFIG_ENV_TEST_BPM");
        std::env::remove_var("PHASORLINK_CONFIG_ENV_TEST_QUANTUM");
        fs::remove_file(path).unwrap();

        let settings = settings.unwrap();
        assert_eq!(settings.bpm, 133.0);
        assert_eq!(settings.quantum, 3.0);
    }

    #[test]
    fn test_huge_duration_is_rejected_not_panicking() {
        let args = Args {
            duration: Some(1e20),
            ..Args::default()
        };
        match load(&args) {
            Err(BridgeError::Config(msg)) => assert!(msg.contains("duration out of range")),
            other => panic!("expected duration error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/phasorlink.toml")),
            ..Args::default()
        };
        assert!(matches!(load(&args), Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let bad = [
            Args {
                bpm: Some(10.0),
                ..Args::default()
            },
            Args {
                bpm: Some(1200.0),
                ..Args::default()
            },
            Args {
                quantum: Some(0.0),
                ..Args::default()
            },
            Args {
                rate: Some(0),
                ..Args::default()
            },
            Args {
                rate: Some(96_000),
                ..Args::default()
            },
            Args {
                count_in: Some(-1.0),
                ..Args::default()
            },
            Args {
                duration: Some(-3.0),
                ..Args::default()
            },
            Args {
                duration: Some(1e20),
                ..Args::default()
            },
            Args {
                log_level: Some("loud".to_string()),
                ..Args::default()
            },
        ];
        for args in bad.iter() {
            assert!(
                matches!(load(args), Err(BridgeError::Config(_))),
                "expected rejection for {:?}",
                args
            );
        }
    }
}
