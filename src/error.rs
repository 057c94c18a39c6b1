use std::error::Error;
use std::fmt;

/// Error type for the ambient layers around the signal bridge
#[derive(Debug)]
pub enum BridgeError {
    /// Invalid or unreadable configuration
    Config(String),
    /// Logger could not be installed
    Logging(String),
    /// Filesystem error (log directory, config file)
    Io(std::io::Error),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BridgeError::Logging(msg) => write!(f, "Logging error: {}", msg),
            BridgeError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BridgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err)
    }
}

impl From<::config::ConfigError> for BridgeError {
    fn from(err: ::config::ConfigError) -> Self {
        BridgeError::Config(err.to_string())
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = BridgeError::Config("bpm out of range".to_string());
        assert_eq!(err.to_string(), "Configuration error: bpm out of range");

        let err = BridgeError::Logging("already set".to_string());
        assert_eq!(err.to_string(), "Logging error: already set");
    }

    #[test]
    fn test_io_error_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BridgeError = io.into();
        assert!(matches!(err, BridgeError::Io(_)));
        assert!(err.source().is_some());
    }
}
