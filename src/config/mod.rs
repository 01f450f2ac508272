//! Command-line parsing and validation helpers.

mod defaults;
mod error;
mod validation;

use clap::Parser;
use std::time::Duration;

use crate::timer::PatternSet;
use defaults::{DEFAULT_BAUD_RATE, DEFAULT_PARITY, DEFAULT_STOP_BITS, DEFAULT_WIDTH};
pub use defaults::{BAUD_RATES, DEFAULT_DEVICE, READ_TIMEOUT};
pub use error::{ConfigError, EXIT_BAD_ARGUMENTS, EXIT_INVALID_SETTING};

/// CLI options for serialwatch. Serial values stay as raw text until `validate` checks them
/// against the allowed sets.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Echo a serial device to stdout with per-line timestamps and pattern triggers",
    author,
    version
)]
pub struct AppConfig {
    /// Serial device to read from
    #[arg(short = 'd', long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Baud rate
    #[arg(short = 'b', long = "baudrate", default_value = DEFAULT_BAUD_RATE)]
    pub baudrate: String,

    /// Data bits per byte (5-8)
    #[arg(short = 'w', long, default_value = DEFAULT_WIDTH)]
    pub width: String,

    /// Parity: N, E, O, M or S
    #[arg(short = 'p', long, default_value = DEFAULT_PARITY)]
    pub parity: String,

    /// Stop bits: 1, 1.5 or 2
    #[arg(short = 's', long = "stopbits", default_value = DEFAULT_STOP_BITS)]
    pub stopbits: String,

    /// Enable software (XON/XOFF) flow control
    #[arg(short = 'x', long, default_value_t = false)]
    pub xonxoff: bool,

    /// Enable hardware (RTS/CTS) flow control
    #[arg(short = 'r', long, default_value_t = false)]
    pub rtscts: bool,

    /// Toggle the baud rate after opening so the driver re-applies every setting
    #[arg(short = 'f', long = "force-reset", default_value_t = false)]
    pub force_reset: bool,

    /// Stop after this many seconds
    #[arg(short = 'e', long, value_name = "SECONDS")]
    pub endtime: Option<String>,

    /// Command to send to the device before reading (a newline is appended)
    #[arg(short = 'c', long, value_name = "TEXT")]
    pub command: Option<String>,

    /// Prefix each line with elapsed and delta seconds
    #[arg(short = 't', long, default_value_t = false)]
    pub time: bool,

    /// Regex that resets the time origin when it matches the start of a line
    #[arg(short = 'm', long, value_name = "REGEX")]
    pub basepat: Option<String>,

    /// Regex whose first match time is reported on exit
    #[arg(short = 'i', long, value_name = "REGEX")]
    pub instantpat: Option<String>,

    /// Regex that stops reading as soon as it matches
    #[arg(short = 'q', long, value_name = "REGEX")]
    pub quitpat: Option<String>,

    /// Start the clock at program launch instead of at the first received byte
    #[arg(short = 'l', long, default_value_t = false)]
    pub launchtime: bool,

    /// Print port settings and a session summary on stderr
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Open the device without checking that it exists
    #[arg(short = 'S', long = "skip-device-check", default_value_t = false)]
    pub skip_device_check: bool,

    /// Print detected serial devices and exit
    #[arg(long = "list-devices", default_value_t = false)]
    pub list_devices: bool,

    /// Write a JSON debug trace to the temp dir
    #[arg(long = "logs", env = "SERIALWATCH_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable the debug trace file (overrides --logs and SERIALWATCH_LOGS)
    #[arg(long = "no-logs", env = "SERIALWATCH_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

/// Parity as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityMode {
    None,
    Even,
    Odd,
    Mark,
    Space,
}

impl ParityMode {
    pub fn label(self) -> &'static str {
        match self {
            ParityMode::None => "N",
            ParityMode::Even => "E",
            ParityMode::Odd => "O",
            ParityMode::Mark => "M",
            ParityMode::Space => "S",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBitsMode {
    One,
    OnePointFive,
    Two,
}

impl StopBitsMode {
    pub fn label(self) -> &'static str {
        match self {
            StopBitsMode::One => "1",
            StopBitsMode::OnePointFive => "1.5",
            StopBitsMode::Two => "2",
        }
    }
}

/// Everything needed to open and configure the device.
#[derive(Debug, Clone)]
pub struct PortSettings {
    pub device: String,
    pub baud_rate: u32,
    pub width: u8,
    pub parity: ParityMode,
    pub stop_bits: StopBitsMode,
    pub xonxoff: bool,
    pub rtscts: bool,
    pub force_reset: bool,
    pub timeout: Duration,
}

impl PortSettings {
    /// Short `115200 8N1` style description for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} {}{}{}",
            self.baud_rate,
            self.width,
            self.parity.label(),
            self.stop_bits.label()
        )
    }
}

/// Settings consumed by the line timer and the read loop.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub show_time: bool,
    pub patterns: PatternSet,
    pub launch_time: bool,
    pub run_for: Option<Duration>,
    pub command: Option<String>,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub port: PortSettings,
    pub watch: WatchSettings,
}
