//! Typed errors for conditions that must fail the process.
//!
//! Everything here maps to exit code 1; other failures propagate as plain
//! `anyhow` errors and are reported without overriding the exit code.

use thiserror::Error;

/// Usage and environment errors with user-facing messages.
///
/// `main` downcasts the error chain to this type to pick the exit code, so
/// these must never be wrapped in extra context on their way up.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("{path} does not exist")]
    SourceMissing { path: String },

    #[error("unsupported file type '{suffix}'. Supported: {supported}")]
    UnsupportedType { suffix: String, supported: String },

    #[error("'myst' not found. Install with: npm install -g mystmd")]
    RendererNotFound,

    #[error("no free port found in range {start}-{end}")]
    NoFreePort { start: u16, end: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_missing_message() {
        let err = PreviewError::SourceMissing {
            path: "notes.md".to_string(),
        };
        assert_eq!(err.to_string(), "notes.md does not exist");
    }

    #[test]
    fn test_unsupported_type_message() {
        let err = PreviewError::UnsupportedType {
            suffix: ".txt".to_string(),
            supported: ".ipynb, .md, .rst, .tex".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported file type '.txt'. Supported: .ipynb, .md, .rst, .tex"
        );
    }

    #[test]
    fn test_renderer_not_found_names_the_install_command() {
        let err = PreviewError::RendererNotFound;
        assert_eq!(
            err.to_string(),
            "'myst' not found. Install with: npm install -g mystmd"
        );
    }

    #[test]
    fn test_no_free_port_reports_the_range() {
        let err = PreviewError::NoFreePort {
            start: 3000,
            end: 3050,
        };
        assert_eq!(err.to_string(), "no free port found in range 3000-3050");
    }
}
