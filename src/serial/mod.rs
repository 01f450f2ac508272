//! Serial device access over the `serialport` crate.
//!
//! The read loop only sees [`ByteSource`]: one byte per bounded wait, plus a way to send the
//! startup command. Everything about baud rates, parity and drivers stays in here.

#[cfg(unix)]
mod termios;

use anyhow::{Context, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, ErrorKind, Read, Write};

use crate::config::{ParityMode, PortSettings, StopBitsMode};

/// Byte stream the session loop reads from.
pub trait ByteSource {
    /// Wait up to the read timeout for one byte. `Ok(None)` means nothing arrived.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Send bytes to the device before reading starts.
    fn write_command(&mut self, command: &[u8]) -> io::Result<()>;
}

/// Read errors that only mean "no data yet".
pub(crate) fn is_idle_read_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

/// An open serial port.
pub struct SerialDevice {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialDevice {
    /// Open and configure the device, applying the force-reset toggle when requested.
    pub fn open(settings: &PortSettings) -> Result<Self> {
        let builder = serialport::new(settings.device.as_str(), settings.baud_rate)
            .data_bits(data_bits(settings.width))
            .parity(builder_parity(settings.parity))
            .stop_bits(builder_stop_bits(settings.stop_bits))
            .flow_control(flow_control(settings))
            .timeout(settings.timeout);

        #[cfg(unix)]
        let port: Box<dyn SerialPort> = {
            use std::os::unix::io::AsRawFd;
            let native = builder
                .open_native()
                .with_context(|| format!("failed to open serial device '{}'", settings.device))?;
            termios::apply_extended_settings(native.as_raw_fd(), settings).with_context(|| {
                format!("failed to configure serial device '{}'", settings.device)
            })?;
            Box::new(native)
        };
        #[cfg(not(unix))]
        let port = builder
            .open()
            .with_context(|| format!("failed to open serial device '{}'", settings.device))?;

        tracing::debug!(
            device = %settings.device,
            settings = %settings.summary(),
            "serial port opened"
        );
        let mut device = Self::from_port(port, &settings.device);
        if settings.force_reset {
            device.force_reset(settings.baud_rate)?;
        }
        Ok(device)
    }

    /// Wrap an already-open port.
    pub fn from_port(port: Box<dyn SerialPort>, name: &str) -> Self {
        Self {
            port,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Some drivers skip reconfiguration when the requested settings equal the current ones.
    /// Switching to another rate and back makes them apply everything.
    pub fn force_reset(&mut self, baud_rate: u32) -> Result<()> {
        let alternate = if baud_rate == 9600 { 115_200 } else { 9600 };
        self.port
            .set_baud_rate(alternate)
            .with_context(|| format!("force reset of '{}' failed", self.name))?;
        self.port
            .set_baud_rate(baud_rate)
            .with_context(|| format!("force reset of '{}' failed", self.name))?;
        tracing::debug!(device = %self.name, alternate, "force reset applied");
        Ok(())
    }
}

impl ByteSource for SerialDevice {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(err) if is_idle_read_error(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write_command(&mut self, command: &[u8]) -> io::Result<()> {
        self.port.write_all(command)?;
        self.port.flush()
    }
}

/// Whether `device` names something we could open.
pub fn device_exists(device: &str) -> bool {
    if std::path::Path::new(device).exists() {
        return true;
    }
    // COM ports are not filesystem paths.
    #[cfg(not(unix))]
    if let Ok(names) = list_ports() {
        return names.iter().any(|name| name.eq_ignore_ascii_case(device));
    }
    false
}

/// Names of the serial ports the platform reports.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().context("failed to enumerate serial ports")?;
    Ok(ports.into_iter().map(|port| port.port_name).collect())
}

fn data_bits(width: u8) -> DataBits {
    match width {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    }
}

// Mark and space are layered on afterwards through termios.
fn builder_parity(parity: ParityMode) -> Parity {
    match parity {
        ParityMode::Even => Parity::Even,
        ParityMode::Odd => Parity::Odd,
        ParityMode::None | ParityMode::Mark | ParityMode::Space => Parity::None,
    }
}

// Drivers treat the two-stop-bit flag as 1.5 for 5-bit words.
fn builder_stop_bits(stop_bits: StopBitsMode) -> StopBits {
    match stop_bits {
        StopBitsMode::One => StopBits::One,
        StopBitsMode::OnePointFive | StopBitsMode::Two => StopBits::Two,
    }
}

fn flow_control(settings: &PortSettings) -> FlowControl {
    if settings.rtscts {
        FlowControl::Hardware
    } else if settings.xonxoff {
        FlowControl::Software
    } else {
        FlowControl::None
    }
}

#[cfg(test)]
mod mapping_tests {
    use super::*;
    use crate::config::READ_TIMEOUT;

    fn settings(xonxoff: bool, rtscts: bool) -> PortSettings {
        PortSettings {
            device: "/dev/null".to_string(),
            baud_rate: 115_200,
            width: 8,
            parity: ParityMode::None,
            stop_bits: StopBitsMode::One,
            xonxoff,
            rtscts,
            force_reset: false,
            timeout: READ_TIMEOUT,
        }
    }

    #[test]
    fn idle_errors_are_not_failures() {
        assert!(is_idle_read_error(&io::Error::from(ErrorKind::TimedOut)));
        assert!(is_idle_read_error(&io::Error::from(ErrorKind::Interrupted)));
        assert!(!is_idle_read_error(&io::Error::from(ErrorKind::BrokenPipe)));
        assert!(!is_idle_read_error(&io::Error::other("device gone")));
    }

    #[test]
    fn flow_control_prefers_hardware() {
        assert_eq!(flow_control(&settings(false, false)), FlowControl::None);
        assert_eq!(flow_control(&settings(true, false)), FlowControl::Software);
        assert_eq!(flow_control(&settings(false, true)), FlowControl::Hardware);
        assert_eq!(flow_control(&settings(true, true)), FlowControl::Hardware);
    }

    #[test]
    fn parity_and_stop_bits_map_to_builder_values() {
        assert_eq!(builder_parity(ParityMode::Even), Parity::Even);
        assert_eq!(builder_parity(ParityMode::Mark), Parity::None);
        assert_eq!(builder_stop_bits(StopBitsMode::OnePointFive), StopBits::Two);
        assert_eq!(data_bits(5), DataBits::Five);
        assert_eq!(data_bits(8), DataBits::Eight);
    }

    #[test]
    fn existing_paths_count_as_devices() {
        assert!(device_exists(env!("CARGO_MANIFEST_DIR")));
        assert!(!device_exists("/definitely/not/a/serial/device"));
    }
}
