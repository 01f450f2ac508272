use super::defaults::{MAX_WIDTH, MIN_WIDTH, PARITY_FLAGS, STOP_BITS_FLAGS};
use super::{
    AppConfig, ConfigError, ParityMode, PortSettings, RunPlan, StopBitsMode, WatchSettings,
    BAUD_RATES, READ_TIMEOUT,
};
use crate::serial::device_exists;
use crate::timer::PatternSet;
use anyhow::{bail, Result};
use std::time::Duration;

impl AppConfig {
    /// Check CLI values and turn them into typed settings. Value checks run before the device
    /// check so a bad baud rate is reported even when the device is also missing.
    pub fn validate(&self) -> Result<RunPlan> {
        let baud_rate = parse_baud_rate(&self.baudrate)?;
        let width = parse_width(&self.width)?;
        let parity = parse_parity(&self.parity)?;
        let stop_bits = parse_stop_bits(&self.stopbits)?;
        let run_for = self.endtime.as_deref().map(parse_endtime).transpose()?;
        let patterns = PatternSet::compile(
            self.basepat.as_deref(),
            self.instantpat.as_deref(),
            self.quitpat.as_deref(),
        )?;

        let device = self.device.trim();
        if device.is_empty() {
            bail!(ConfigError::MissingDevice(self.device.clone()));
        }
        if !self.skip_device_check && !device_exists(device) {
            bail!(ConfigError::MissingDevice(device.to_string()));
        }

        Ok(RunPlan {
            port: PortSettings {
                device: device.to_string(),
                baud_rate,
                width,
                parity,
                stop_bits,
                xonxoff: self.xonxoff,
                rtscts: self.rtscts,
                force_reset: self.force_reset,
                timeout: READ_TIMEOUT,
            },
            watch: WatchSettings {
                show_time: self.time,
                patterns,
                launch_time: self.launchtime,
                run_for,
                command: self.command.clone(),
            },
        })
    }
}

pub(super) fn parse_baud_rate(raw: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidBaudRate {
        value: raw.to_string(),
        allowed: BAUD_RATES,
    };
    let baud: u32 = raw.trim().parse().map_err(|_| invalid())?;
    if !BAUD_RATES.contains(&baud) {
        return Err(invalid());
    }
    Ok(baud)
}

pub(super) fn parse_width(raw: &str) -> Result<u8, ConfigError> {
    match raw.trim().parse::<u8>() {
        Ok(width) if (MIN_WIDTH..=MAX_WIDTH).contains(&width) => Ok(width),
        _ => Err(ConfigError::InvalidWidth(raw.to_string())),
    }
}

pub(super) fn parse_parity(raw: &str) -> Result<ParityMode, ConfigError> {
    let parity = match raw.trim().to_ascii_uppercase().as_str() {
        "N" => ParityMode::None,
        "E" => ParityMode::Even,
        "O" => ParityMode::Odd,
        "M" => ParityMode::Mark,
        "S" => ParityMode::Space,
        _ => {
            return Err(ConfigError::InvalidParity {
                value: raw.to_string(),
                allowed: PARITY_FLAGS,
            })
        }
    };
    // Mark/space parity needs CMSPAR, which only Linux termios exposes.
    if matches!(parity, ParityMode::Mark | ParityMode::Space) && !cfg!(target_os = "linux") {
        return Err(ConfigError::UnsupportedSetting(format!(
            "parity '{}'",
            parity.label()
        )));
    }
    Ok(parity)
}

pub(super) fn parse_stop_bits(raw: &str) -> Result<StopBitsMode, ConfigError> {
    match raw.trim() {
        "1" => Ok(StopBitsMode::One),
        "1.5" => Ok(StopBitsMode::OnePointFive),
        "2" => Ok(StopBitsMode::Two),
        _ => Err(ConfigError::InvalidStopBits {
            value: raw.to_string(),
            allowed: STOP_BITS_FLAGS,
        }),
    }
}

pub(super) fn parse_endtime(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidEndTime(raw.to_string());
    let seconds: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}
