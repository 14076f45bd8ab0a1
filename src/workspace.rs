//! Staging workspace management.
//!
//! The renderer never runs against the user's directory. A throwaway
//! directory gets a symlink to every visible sibling of the source file,
//! so relative includes and images keep working, plus a generated
//! `myst.yml` pinning the site template and the single toc entry.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::constants::WORKSPACE_PREFIX;

/// A staged preview directory under the system temp dir.
///
/// Removal is explicit (`remove_best_effort`, called by teardown); if the
/// value is dropped without it, the underlying temp dir still cleans itself
/// up silently.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create an empty staging directory.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .context("failed to create staging directory")?;
        debug!("created workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Symlink every visible entry of `source_dir` into the workspace.
    ///
    /// Entries whose name starts with `.` are skipped, and a name that is
    /// already present in the workspace is left alone (checked with
    /// `symlink_metadata`, so even a dangling link counts as present).
    pub fn link_source_dir(&self, source_dir: &Path) -> Result<()> {
        let entries = fs::read_dir(source_dir)
            .with_context(|| format!("failed to read {}", source_dir.display()))?;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read {}", source_dir.display()))?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let link = self.dir.path().join(&name);
            if fs::symlink_metadata(&link).is_ok() {
                continue;
            }
            link_entry(&entry.path(), &link)?;
        }
        Ok(())
    }

    /// Write the generated descriptor, replacing anything staged under that
    /// name. The staged entry is a symlink into the source directory, and it
    /// must be unlinked first so the write cannot travel through it.
    pub fn write_descriptor(&self, theme: &str, slug: &str) -> Result<()> {
        let path = self.dir.path().join("myst.yml");
        if path.is_symlink() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to unlink staged {}", path.display()))?;
        }
        fs::write(&path, render_descriptor(theme, slug))
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!("wrote descriptor at {}", path.display());
        Ok(())
    }

    /// Delete the workspace, logging instead of failing.
    pub fn remove_best_effort(self) {
        let root = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!("failed to remove workspace {}: {}", root.display(), err);
        } else {
            debug!("removed workspace {}", root.display());
        }
    }
}

/// Render the `myst.yml` descriptor for a single-document site.
pub fn render_descriptor(theme: &str, slug: &str) -> String {
    format!("version: 1\nsite:\n  template: {theme}\nproject:\n  toc:\n    - file: {slug}\n")
}

#[cfg(unix)]
fn link_entry(original: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(original, link)
        .with_context(|| format!("failed to link {}", original.display()))
}

#[cfg(windows)]
fn link_entry(original: &Path, link: &Path) -> Result<()> {
    let result = if original.is_dir() {
        std::os::windows::fs::symlink_dir(original, link)
    } else {
        std::os::windows::fs::symlink_file(original, link)
    };
    result.with_context(|| format!("failed to link {}", original.display()))
}

#[cfg(not(any(unix, windows)))]
fn link_entry(original: &Path, _link: &Path) -> Result<()> {
    anyhow::bail!(
        "cannot stage {}: no symlink support on this platform",
        original.display()
    )
}
