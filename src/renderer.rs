//! MyST toolchain discovery and command construction.

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::PreviewError;

/// A resolved way of invoking the MyST toolchain.
///
/// Either a `myst` binary found on PATH, or `npx -y mystmd` when only the
/// Node package runner is available. Mode-specific arguments are appended
/// by `serve_command` and `build_command`.
#[derive(Debug, Clone)]
pub struct RendererCommand {
    program: PathBuf,
    base_args: Vec<String>,
}

impl RendererCommand {
    /// Locate the MyST toolchain on PATH.
    pub fn resolve() -> Result<Self> {
        if let Ok(myst) = which::which("myst") {
            debug!("using myst at {}", myst.display());
            return Ok(Self {
                program: myst,
                base_args: Vec::new(),
            });
        }
        if let Ok(npx) = which::which("npx") {
            debug!("myst not on PATH, falling back to npx -y mystmd");
            return Ok(Self {
                program: npx,
                base_args: vec!["-y".to_string(), "mystmd".to_string()],
            });
        }
        Err(PreviewError::RendererNotFound.into())
    }

    /// `myst start` invocation for the live preview server.
    pub fn serve_command(&self, workspace: &Path, port: u16, execute: bool) -> Command {
        let mut command = self.base_command(workspace);
        command
            .arg("start")
            .arg("--port")
            .arg(port.to_string())
            .arg("--keep-host");
        if execute {
            command.arg("--execute");
        }
        // Bind to all interfaces so the preview is reachable over the network.
        command.env("HOST", "0.0.0.0");
        command
    }

    /// `myst build --html` invocation for a static render.
    pub fn build_command(&self, workspace: &Path, execute: bool) -> Command {
        let mut command = self.base_command(workspace);
        command.arg("build").arg("--html");
        if execute {
            command.arg("--execute");
        }
        command
    }

    fn base_command(&self, workspace: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.base_args).current_dir(workspace);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn direct() -> RendererCommand {
        RendererCommand {
            program: PathBuf::from("/usr/bin/myst"),
            base_args: Vec::new(),
        }
    }

    fn args_of(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_serve_command_line() {
        let workspace = Path::new("/tmp/ws");
        let command = direct().serve_command(workspace, 3001, false);
        assert_eq!(command.get_program(), OsStr::new("/usr/bin/myst"));
        assert_eq!(args_of(&command), ["start", "--port", "3001", "--keep-host"]);
        assert_eq!(command.get_current_dir(), Some(workspace));
    }

    #[test]
    fn test_serve_command_sets_host_for_all_interfaces() {
        let command = direct().serve_command(Path::new("/tmp/ws"), 3000, false);
        let host = command
            .get_envs()
            .find(|(key, _)| *key == OsStr::new("HOST"))
            .and_then(|(_, value)| value);
        assert_eq!(host, Some(OsStr::new("0.0.0.0")));
    }

    #[test]
    fn test_serve_command_appends_execute() {
        let command = direct().serve_command(Path::new("/tmp/ws"), 3000, true);
        assert_eq!(
            args_of(&command),
            ["start", "--port", "3000", "--keep-host", "--execute"]
        );
    }

    #[test]
    fn test_build_command_line() {
        let workspace = Path::new("/tmp/ws");
        let command = direct().build_command(workspace, false);
        assert_eq!(args_of(&command), ["build", "--html"]);
        assert_eq!(command.get_current_dir(), Some(workspace));
        // Build mode leaves the environment alone.
        assert_eq!(command.get_envs().count(), 0);
    }

    #[test]
    fn test_build_command_appends_execute() {
        let command = direct().build_command(Path::new("/tmp/ws"), true);
        assert_eq!(args_of(&command), ["build", "--html", "--execute"]);
    }

    #[test]
    fn test_npx_fallback_prefixes_package_runner_args() {
        let fallback = RendererCommand {
            program: PathBuf::from("/usr/bin/npx"),
            base_args: vec!["-y".to_string(), "mystmd".to_string()],
        };
        let command = fallback.build_command(Path::new("/tmp/ws"), false);
        assert_eq!(args_of(&command), ["-y", "mystmd", "build", "--html"]);
    }
}
