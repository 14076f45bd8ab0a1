//! Centralized constants for myst-preview staging, ports, and timing.
//!
//! This module contains the staging, port-scan, and timing constants used
//! throughout the tool to avoid magic numbers scattered across the codebase.

use std::time::Duration;

// ============================================================================
// Source & Staging Constants
// ============================================================================

/// File extensions the preview accepts (compared case-sensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".md", ".ipynb", ".rst", ".tex"];

/// Prefix for the throwaway staging directory under the system temp dir.
pub const WORKSPACE_PREFIX: &str = "myst-preview-";

// ============================================================================
// CLI Defaults
// ============================================================================

/// Default port requested for the preview server.
pub const DEFAULT_PORT: u16 = 3000;

/// Default MyST site template.
pub const DEFAULT_THEME: &str = "book-theme";

// ============================================================================
// Port Scan & Readiness Constants
// ============================================================================

/// How far above the requested port the free-port scan may wander.
pub const PORT_SCAN_SPAN: u16 = 50;

/// Per-attempt connect timeout while polling for the server to come up.
pub const PORT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Sleep between readiness poll attempts.
pub const PORT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Total time to wait for the server before giving up on the browser launch.
pub const SERVER_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Supervision & Shutdown Constants
// ============================================================================

/// Main supervision loop polling interval in milliseconds
pub const MAIN_LOOP_POLL_MS: u64 = 50;

/// Shutdown polling interval in milliseconds
pub const SHUTDOWN_POLL_MS: u64 = 100;

/// Time a terminated renderer gets to exit before a hard kill
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert milliseconds to Duration (const fn for compile-time evaluation)
pub const fn millis_to_duration(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
