//! Preview orchestration: staging, renderer lifecycle, and teardown.
//!
//! `run` drives the whole preview: validate the source, stage a workspace,
//! resolve the renderer, then serve with a live server or build static HTML.
//! A single [`Teardown`] value owns the child handle and the workspace, so
//! normal exits, error returns, and signal-triggered returns all pass through
//! the same two steps in the same order: stop the child, delete the workspace.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::constants::{millis_to_duration, MAIN_LOOP_POLL_MS, PORT_SCAN_SPAN, SERVER_WAIT_TIMEOUT};
use crate::ports::{find_free_port, wait_for_port};
use crate::process::{self, graceful_terminate};
use crate::renderer::RendererCommand;
use crate::source::SourceFile;
use crate::workspace::Workspace;
use crate::Args;

// ============================================================================
// Teardown
// ============================================================================

/// Owns everything that must be undone on the way out.
///
/// Dropping it stops the renderer (if one was adopted) and deletes the
/// workspace, in that order. Both slots are `take`n, so an explicit `run`
/// followed by the drop is a no-op on the second pass.
pub struct Teardown {
    child: Option<Child>,
    workspace: Option<Workspace>,
}

impl Teardown {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            child: None,
            workspace: Some(workspace),
        }
    }

    /// Adopt the spawned renderer so every exit path reaps it.
    pub fn adopt_child(&mut self, child: Child) -> &mut Child {
        self.child.insert(child)
    }

    /// Stop the child, then delete the workspace. Idempotent.
    pub fn run(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(err) = graceful_terminate(&mut child) {
                warn!("renderer teardown failed: {:#}", err);
            }
        }
        if let Some(workspace) = self.workspace.take() {
            workspace.remove_best_effort();
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.run();
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Run the preview described by `args` through to completion.
/// Returns the process exit code.
pub fn run(args: &Args) -> Result<i32> {
    let source = SourceFile::resolve(&args.file)?;

    process::signal::install_shutdown_handlers()
        .context("failed to install signal handlers")?;

    let workspace = Workspace::create()?;
    workspace.link_source_dir(&source.dir)?;
    workspace.write_descriptor(&args.theme, &source.slug)?;

    let root = workspace.root().to_path_buf();
    let mut teardown = Teardown::new(workspace);

    let renderer = RendererCommand::resolve()?;

    // A Ctrl+C during staging should not launch the renderer at all.
    if process::shutdown_requested() {
        return Ok(0);
    }

    let code = if args.build {
        run_build(args, &source, &renderer, &root, &mut teardown)?
    } else {
        run_serve(args, &source, &renderer, &root, &mut teardown)?
    };

    teardown.run();
    Ok(code)
}

// ============================================================================
// Serve Mode
// ============================================================================

fn run_serve(
    args: &Args,
    source: &SourceFile,
    renderer: &RendererCommand,
    root: &Path,
    teardown: &mut Teardown,
) -> Result<i32> {
    let end = args.port.saturating_add(PORT_SCAN_SPAN);
    let port = find_free_port(args.port, end)?;
    if port != args.port {
        println!("Port {} is in use, using {} instead.", args.port, port);
    }

    println!("Starting MyST preview of {}", source.file_name);
    println!("Press Ctrl+C to stop.\n");

    let mut command = renderer.serve_command(root, port, args.execute);
    let child = command.spawn().context("failed to start the MyST renderer")?;
    debug!("renderer started (pid={}, port={})", child.id(), port);
    let child = teardown.adopt_child(child);

    if !args.no_open && wait_for_port(port, SERVER_WAIT_TIMEOUT, &process::SHUTDOWN_REQUESTED) {
        let url = format!("http://localhost:{}", port);
        debug!("opening {}", url);
        if let Err(err) = open::that(&url) {
            warn!("failed to open browser: {}", err);
        }
    }

    if let Some(status) = supervise(child, &process::SHUTDOWN_REQUESTED)? {
        info!("renderer exited with {}", status);
    }
    // The serve flow always reports success; the renderer's own exit only
    // matters in build mode.
    Ok(0)
}

// ============================================================================
// Build Mode
// ============================================================================

fn run_build(
    args: &Args,
    source: &SourceFile,
    renderer: &RendererCommand,
    root: &Path,
    teardown: &mut Teardown,
) -> Result<i32> {
    println!("Building {} to static HTML...", source.file_name);

    let mut command = renderer.build_command(root, args.execute);
    let child = command.spawn().context("failed to start the MyST renderer")?;
    debug!("renderer build started (pid={})", child.id());
    let child = teardown.adopt_child(child);

    let Some(status) = supervise(child, &process::SHUTDOWN_REQUESTED)? else {
        // Interrupted mid-build: teardown stops the renderer, nothing to export.
        return Ok(0);
    };

    if status.success() {
        let output = match &args.output {
            Some(dir) => dir.clone(),
            None => default_output_dir()?,
        };
        export_build_output(&root.join("_build").join("html"), &output)?;
        println!("Output written to {}", output.display());
    }

    // A signal-killed renderer has no code; report plain failure for it.
    Ok(status.code().unwrap_or(1))
}

fn default_output_dir() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join("_build").join("html"))
}

/// Copy the rendered site out of the workspace, replacing a previous export.
fn export_build_output(build_dir: &Path, output: &Path) -> Result<()> {
    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("failed to replace {}", output.display()))?;
    }
    copy_dir_all(build_dir, output)
}

/// Recursive copy, following symlinks so staged assets export as real bytes.
fn copy_dir_all(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("failed to create {}", to.display()))?;
    for entry in
        fs::read_dir(from).with_context(|| format!("failed to read {}", from.display()))?
    {
        let entry = entry.with_context(|| format!("failed to read {}", from.display()))?;
        let target = to.join(entry.file_name());
        let metadata = fs::metadata(entry.path())
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;
        if metadata.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

// ============================================================================
// Supervision
// ============================================================================

/// Poll the child until it exits or a shutdown is requested.
///
/// Returns the exit status when the child finished on its own, or `None`
/// when the shutdown flag ended the watch and the child may still be
/// running. The wait itself has no deadline; a preview server runs until
/// the child exits or a signal arrives.
pub fn supervise(child: &mut Child, shutdown: &AtomicBool) -> Result<Option<ExitStatus>> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(err) => return Err(err).context("failed to poll renderer status"),
        }
        if shutdown.load(Ordering::SeqCst) {
            info!("shutdown requested, stopping renderer");
            return Ok(None);
        }
        thread::sleep(millis_to_duration(MAIN_LOOP_POLL_MS));
    }
}

// ============================================================================
// Tests
// ============================================================================
