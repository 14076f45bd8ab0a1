//! Input file validation and name derivation.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use crate::constants::SUPPORTED_EXTENSIONS;
use crate::error::PreviewError;

/// A validated preview source.
///
/// Holds the canonical path plus the names the stager and the descriptor
/// need: the directory whose entries get linked, the file name shown in
/// progress messages, and the extension-less slug used as the toc entry.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub file_name: String,
    pub slug: String,
}

impl SourceFile {
    /// Resolve and validate a user-supplied path.
    ///
    /// The missing-file message echoes the path as the user typed it, not
    /// the canonical form.
    pub fn resolve(raw: &Path) -> Result<Self> {
        if !raw.exists() {
            return Err(PreviewError::SourceMissing {
                path: raw.display().to_string(),
            }
            .into());
        }

        let path = raw
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", raw.display()))?;

        let suffix = match path.extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy()),
            None => String::new(),
        };
        if !SUPPORTED_EXTENSIONS.contains(&suffix.as_str()) {
            return Err(PreviewError::UnsupportedType {
                suffix,
                supported: supported_extensions_list(),
            }
            .into());
        }

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
        let slug = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("{} has no file stem", path.display()))?;

        Ok(Self {
            path,
            dir,
            file_name,
            slug,
        })
    }
}

/// The accepted extensions, alphabetized for error messages.
pub fn supported_extensions_list() -> String {
    let mut extensions = SUPPORTED_EXTENSIONS.to_vec();
    extensions.sort_unstable();
    extensions.join(", ")
}
