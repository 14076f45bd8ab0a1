//! myst-preview: preview a single document rendered with MyST MD.
//!
//! This crate provides the myst-preview binary that stages one Markdown,
//! notebook, reStructuredText, or LaTeX file into a throwaway workspace and
//! keeps the external MyST renderer on a leash until exit.
//!
//! # Architecture
//!
//! ```text
//! myst-preview <file>
//!        |
//!        +-> workspace: tmp dir with symlinked sources + generated myst.yml
//!        |
//!        +-> renderer: myst start / myst build --html (cwd = workspace)
//!        |
//!        +-> teardown: stop renderer, delete workspace (also on Ctrl+C)
//! ```
//!
//! # Modules
//!
//! - [`constants`]: Staging, port, and timing constants
//! - [`error`]: Typed errors that map to exit code 1
//! - [`ports`]: Free-port scan and server readiness polling
//! - [`process`]: Shutdown flag, signal handling, child termination
//! - [`renderer`]: MyST toolchain discovery and command construction
//! - [`source`]: Input path validation and name derivation
//! - [`supervisor`]: Serve/build orchestration and teardown
//! - [`workspace`]: Staging directory management

use clap::Parser;
use std::path::PathBuf;

pub mod constants;
pub mod error;
pub mod ports;
pub mod process;
pub mod renderer;
pub mod source;
pub mod supervisor;
pub mod workspace;

// ============================================================================
// CLI Types (shared between main.rs and modules)
// ============================================================================

/// myst-preview arguments.
///
/// This struct is shared between main.rs and the library modules that need
/// access to CLI arguments (e.g., supervisor::run).
#[derive(Parser, Debug)]
#[command(
    name = "myst-preview",
    version,
    about = "Preview a single Markdown or Jupyter notebook file rendered with MyST MD."
)]
pub struct Args {
    /// File to preview (.md, .ipynb, .rst, .tex)
    pub file: PathBuf,

    /// Port for the preview server
    #[arg(long, default_value_t = constants::DEFAULT_PORT)]
    pub port: u16,

    /// MyST site template
    #[arg(long, default_value = constants::DEFAULT_THEME)]
    pub theme: String,

    /// Execute notebook/code cells
    #[arg(long)]
    pub execute: bool,

    /// Build static HTML instead of starting a live server
    #[arg(long)]
    pub build: bool,

    /// Output directory for --build (default: ./_build/html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't open the preview in a browser
    #[arg(long)]
    pub no_open: bool,
}

// Re-exports for the public API
pub use error::PreviewError;
pub use ports::{find_free_port, wait_for_port};
pub use renderer::RendererCommand;
pub use source::SourceFile;
pub use supervisor::{run, supervise, Teardown};
