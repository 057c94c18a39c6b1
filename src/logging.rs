use crate::error::{BridgeError, Result};
use log::LevelFilter;
use simplelog::{CombinedLogger, Config, WriteLogger};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Directory holding `app.log`: `$HOME/.local/share/phasorlink/logs`
pub fn log_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| BridgeError::Logging("HOME environment variable not set".to_string()))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("phasorlink")
        .join("logs"))
}

/// Installs the file logger. Later calls are no-ops reporting the first outcome.
pub fn init_logger(level: LevelFilter) -> Result<()> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))?;

    INIT.call_once(|| {
        if CombinedLogger::init(vec![WriteLogger::new(level, Config::default(), log_file)]).is_ok()
        {
            LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(BridgeError::Logging(
            "Logger initialization failed".to_string(),
        ))
    }
}

/// Installs an `env_logger` on stderr; `RUST_LOG` still overrides `level`
pub fn init_stderr_logger(level: LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .map_err(|e| BridgeError::Logging(e.to_string()))
}
