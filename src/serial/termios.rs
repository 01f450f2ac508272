use std::io;
use std::mem;
use std::os::unix::io::RawFd;

use crate::config::{ParityMode, PortSettings};

/// Whether the port needs flags the `serialport` builder cannot set.
pub(super) fn needs_extended_settings(settings: &PortSettings) -> bool {
    matches!(settings.parity, ParityMode::Mark | ParityMode::Space)
        || (settings.xonxoff && settings.rtscts)
}

/// Apply mark/space parity and combined software + hardware flow control on top of what the
/// builder already configured.
pub(super) fn apply_extended_settings(fd: RawFd, settings: &PortSettings) -> io::Result<()> {
    if !needs_extended_settings(settings) {
        return Ok(());
    }

    // SAFETY: termios is plain data; tcgetattr fully initializes it before we read any field.
    let mut tio: libc::termios = unsafe { mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut tio) } != 0 {
        return Err(io::Error::last_os_error());
    }

    match settings.parity {
        #[cfg(target_os = "linux")]
        ParityMode::Mark => tio.c_cflag |= libc::PARENB | libc::CMSPAR | libc::PARODD,
        #[cfg(target_os = "linux")]
        ParityMode::Space => {
            tio.c_cflag |= libc::PARENB | libc::CMSPAR;
            tio.c_cflag &= !libc::PARODD;
        }
        #[cfg(not(target_os = "linux"))]
        ParityMode::Mark | ParityMode::Space => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "mark/space parity requires CMSPAR",
            ));
        }
        ParityMode::None | ParityMode::Even | ParityMode::Odd => {}
    }

    // The builder already enabled RTS/CTS; add XON/XOFF beside it.
    if settings.xonxoff && settings.rtscts {
        tio.c_iflag |= libc::IXON | libc::IXOFF;
    }

    // SAFETY: fd is an open tty owned by the caller and tio came from tcgetattr.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
