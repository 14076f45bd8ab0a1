//! TCP port discovery and server readiness polling.

use anyhow::Result;
use log::debug;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::constants::{PORT_CONNECT_TIMEOUT, PORT_POLL_INTERVAL};
use crate::error::PreviewError;

/// Find a free TCP port in `[start, end]`, scanning upward.
///
/// Probes with a wildcard bind so a server listening on any interface
/// counts as occupying the port. The listener is dropped immediately; the
/// port is free at the instant of return, not reserved.
pub fn find_free_port(start: u16, end: u16) -> Result<u16> {
    for port in start..=end {
        match TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))) {
            Ok(listener) => {
                drop(listener);
                debug!("selected free port {}", port);
                return Ok(port);
            }
            Err(_) => continue,
        }
    }
    Err(PreviewError::NoFreePort { start, end }.into())
}

/// Poll until `127.0.0.1:port` accepts a connection.
///
/// Returns false when `timeout` lapses or when the shutdown flag goes up,
/// so a Ctrl+C while the server is still warming up never sits out the
/// full deadline. A false return only skips the browser launch.
pub fn wait_for_port(port: u16, timeout: Duration, shutdown: &AtomicBool) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if shutdown.load(Ordering::SeqCst) {
            debug!("shutdown requested while waiting for port {}", port);
            return false;
        }
        if TcpStream::connect_timeout(&addr, PORT_CONNECT_TIMEOUT).is_ok() {
            return true;
        }
        std::thread::sleep(PORT_POLL_INTERVAL);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreviewError;

    #[test]
    fn test_find_free_port_stays_in_range_and_is_bindable() {
        let port = find_free_port(49152, 65535).unwrap();
        assert!((49152..=65535).contains(&port));
        // Free at the instant of return.
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
        assert!(listener.is_ok(), "returned port should be bindable");
    }

    #[test]
    fn test_find_free_port_skips_busy_port() {
        let busy = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).unwrap();
        let taken = busy.local_addr().unwrap().port();
        let end = taken.saturating_add(20);
        let port = find_free_port(taken, end).unwrap();
        assert_ne!(port, taken);
        assert!((taken..=end).contains(&port));
    }

    #[test]
    fn test_find_free_port_exhaustion_reports_range() {
        let busy = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).unwrap();
        let taken = busy.local_addr().unwrap().port();
        let err = find_free_port(taken, taken).unwrap_err();
        match err.downcast_ref::<PreviewError>() {
            Some(PreviewError::NoFreePort { start, end }) => {
                assert_eq!(*start, taken);
                assert_eq!(*end, taken);
            }
            other => panic!("expected NoFreePort, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            format!("no free port found in range {}-{}", taken, taken)
        );
    }

    #[test]
    fn test_wait_for_port_sees_listening_socket() {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let port = listener.local_addr().unwrap().port();
        let shutdown = AtomicBool::new(false);
        assert!(wait_for_port(port, Duration::from_secs(5), &shutdown));
    }

    #[test]
    fn test_wait_for_port_times_out_when_nothing_listens() {
        // Bind and drop to get a port nobody is serving on.
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let shutdown = AtomicBool::new(false);
        assert!(!wait_for_port(port, Duration::from_millis(600), &shutdown));
    }

    #[test]
    fn test_wait_for_port_aborts_on_shutdown_flag() {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let shutdown = AtomicBool::new(true);
        let start = Instant::now();
        assert!(!wait_for_port(port, Duration::from_secs(30), &shutdown));
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "shutdown flag should end the wait well before the deadline"
        );
    }
}
