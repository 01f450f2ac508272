use thiserror::Error;

/// Exit status for malformed arguments or a missing device.
pub const EXIT_BAD_ARGUMENTS: u8 = 2;
/// Exit status for a serial setting outside the allowed set.
pub const EXIT_INVALID_SETTING: u8 = 3;

/// Configuration failures detected before any device I/O. Each carries its exit status.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("device '{0}' does not exist")]
    MissingDevice(String),

    #[error("invalid {role} regex '{pattern}': {source}")]
    InvalidPattern {
        role: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid baud rate '{value}', must be one of {allowed:?}")]
    InvalidBaudRate {
        value: String,
        allowed: &'static [u32],
    },

    #[error("invalid width '{0}', must be between 5 and 8")]
    InvalidWidth(String),

    #[error("invalid parity '{value}', must be one of {allowed:?}")]
    InvalidParity {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("invalid stopbits '{value}', must be one of {allowed:?}")]
    InvalidStopBits {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("invalid endtime '{0}', must be a non-negative number of seconds")]
    InvalidEndTime(String),

    #[error("{0} is not supported on this platform")]
    UnsupportedSetting(String),
}

impl ConfigError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ConfigError::MissingDevice(_) | ConfigError::InvalidPattern { .. } => {
                EXIT_BAD_ARGUMENTS
            }
            ConfigError::InvalidBaudRate { .. }
            | ConfigError::InvalidWidth(_)
            | ConfigError::InvalidParity { .. }
            | ConfigError::InvalidStopBits { .. }
            | ConfigError::InvalidEndTime(_)
            | ConfigError::UnsupportedSetting(_) => EXIT_INVALID_SETTING,
        }
    }
}
