//! Cooperative cancellation on SIGINT/SIGTERM.

use std::sync::atomic::{AtomicBool, Ordering};

/// Flag set by the signal handler; the read loop polls it between reads.
static INTERRUPT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Only touches an atomic flag, which is async-signal-safe.
#[cfg(unix)]
extern "C" fn handle_interrupt(_: libc::c_int) {
    INTERRUPT_RECEIVED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
pub fn install_interrupt_handler() -> anyhow::Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: handle_interrupt is an extern "C" handler that only stores to an atomic.
        let handler = handle_interrupt as *const () as libc::sighandler_t;
        if unsafe { libc::signal(signal, handler) } == libc::SIG_ERR {
            anyhow::bail!("failed to install handler for signal {signal}");
        }
    }
    Ok(())
}

// Without a handler Ctrl-C terminates the process directly.
#[cfg(not(unix))]
pub fn install_interrupt_handler() -> anyhow::Result<()> {
    Ok(())
}

pub fn interrupt_requested() -> bool {
    INTERRUPT_RECEIVED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn sigterm_sets_the_flag() {
        install_interrupt_handler().expect("install handler");
        assert!(!interrupt_requested());
        // SAFETY: raise delivers SIGTERM to this thread, which runs our handler.
        unsafe {
            libc::raise(libc::SIGTERM);
        }
        assert!(interrupt_requested());
        INTERRUPT_RECEIVED.store(false, Ordering::SeqCst);
    }
}
