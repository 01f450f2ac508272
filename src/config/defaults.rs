use std::time::Duration;

#[cfg(windows)]
pub const DEFAULT_DEVICE: &str = "COM1";
#[cfg(not(windows))]
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

pub const DEFAULT_BAUD_RATE: &str = "115200";
pub const DEFAULT_WIDTH: &str = "8";
pub const DEFAULT_PARITY: &str = "N";
pub const DEFAULT_STOP_BITS: &str = "1";

/// How long a single read may block before the loop re-checks its stop conditions.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

pub(super) const MIN_WIDTH: u8 = 5;
pub(super) const MAX_WIDTH: u8 = 8;
pub(super) const PARITY_FLAGS: &[&str] = &["N", "E", "O", "M", "S"];
pub(super) const STOP_BITS_FLAGS: &[&str] = &["1", "1.5", "2"];

// Rates the termios backend knows about. Windows drivers accept a smaller set.
#[cfg(not(windows))]
pub const BAUD_RATES: &[u32] = &[
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19_200, 38_400, 57_600,
    115_200, 230_400, 460_800, 500_000, 576_000, 921_600, 1_000_000, 1_152_000, 1_500_000,
    2_000_000, 2_500_000, 3_000_000, 3_500_000, 4_000_000,
];
#[cfg(windows)]
pub const BAUD_RATES: &[u32] = &[
    110, 300, 600, 1200, 2400, 4800, 9600, 14_400, 19_200, 38_400, 57_600, 115_200, 128_000,
    256_000,
];
