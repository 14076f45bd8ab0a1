//! Shutdown signalling and renderer process termination.
//!
//! Signal handlers here do exactly one thing: raise `SHUTDOWN_REQUESTED`.
//! Everything else (killing the child, removing the workspace) runs on the
//! main thread once a supervision loop observes the flag.

use anyhow::{Context, Result};
use log::debug;
use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// Shutdown Flag
// ============================================================================

/// Set by the SIGINT/SIGTERM handler; polled by the supervision loops.
pub static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Check whether a shutdown signal has arrived.
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

// ============================================================================
// Safe Signal Wrapper
// ============================================================================

/// Safe wrappers around the libc signal operations the preview needs.
/// All unsafe code lives here, each call with its SAFETY note.
#[cfg(unix)]
pub mod signal {
    use std::io;
    use std::sync::atomic::Ordering;

    /// Handler for SIGINT and SIGTERM. Only async-signal-safe operations are
    /// allowed here, so it performs a single atomic store and returns.
    extern "C" fn raise_shutdown_flag(_signum: libc::c_int) {
        super::SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    }

    /// Install the Ctrl+C / SIGTERM handler.
    pub fn install_shutdown_handlers() -> io::Result<()> {
        for signum in [libc::SIGINT, libc::SIGTERM] {
            // SAFETY: raise_shutdown_flag performs only an atomic store,
            // which is async-signal-safe, and the handler outlives the
            // process.
            let previous =
                unsafe { libc::signal(signum, raise_shutdown_flag as libc::sighandler_t) };
            if previous == libc::SIG_ERR {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    /// Probe a pid with signal 0, the POSIX liveness check.
    /// Returns true if the process exists, false otherwise.
    pub fn process_exists(pid: u32) -> bool {
        // SAFETY: kill(pid, 0) only checks existence, no signal sent.
        unsafe { libc::kill(pid as i32, 0) == 0 }
    }

    /// Ask a process to terminate gracefully.
    /// Returns Ok(()) if the signal was sent, Err with the OS error otherwise.
    pub fn send_sigterm(pid: u32) -> io::Result<()> {
        // SAFETY: SIGTERM requests termination; the process may catch it
        // and clean up.
        let result = unsafe { libc::kill(pid as i32, libc::SIGTERM) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// No-op stand-ins off unix: Ctrl+C simply terminates the process there,
/// and termination falls straight through to `Child::kill`.
#[cfg(not(unix))]
pub mod signal {
    use std::io;

    pub fn install_shutdown_handlers() -> io::Result<()> {
        Ok(())
    }

    pub fn process_exists(_pid: u32) -> bool {
        false
    }

    pub fn send_sigterm(_pid: u32) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Child Termination
// ============================================================================

/// Stop the renderer child: SIGTERM first, a grace period to let it exit,
/// then a hard kill. The child is reaped in every branch.
pub fn graceful_terminate(child: &mut Child) -> Result<()> {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!("renderer already exited with {}", status);
            return Ok(());
        }
        Ok(None) => {}
        Err(err) => return Err(err).context("failed to poll renderer status"),
    }

    #[cfg(unix)]
    {
        use crate::constants::{millis_to_duration, GRACEFUL_SHUTDOWN_TIMEOUT, SHUTDOWN_POLL_MS};
        use log::warn;
        use std::time::Instant;

        let pid = child.id();
        debug!("sending SIGTERM to renderer pid {}", pid);
        if let Err(err) = signal::send_sigterm(pid) {
            warn!("failed to signal renderer pid {}: {}", pid, err);
        }

        let start = Instant::now();
        while start.elapsed() < GRACEFUL_SHUTDOWN_TIMEOUT {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("renderer exited with {} after SIGTERM", status);
                    return Ok(());
                }
                Ok(None) => {}
                Err(err) => return Err(err).context("failed to poll renderer status"),
            }
            std::thread::sleep(millis_to_duration(SHUTDOWN_POLL_MS));
        }
        debug!("renderer pid {} ignored SIGTERM, killing", pid);
    }

    child.kill().context("failed to kill renderer process")?;
    child.wait().context("failed to reap renderer process")?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
