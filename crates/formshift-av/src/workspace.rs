//! Staging workspace for conversion outputs.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Staging area for one conversion.
///
/// The temporary directory is created next to the destination so the final
/// move is a same-filesystem rename. Intermediate files (grayscale copies,
/// rendered pages, rotated frames) also live here and disappear when the
/// workspace is dropped.
///
/// # Example
///
/// ```no_run
/// use formshift_av::Workspace;
///
/// let workspace = Workspace::new("/music/a_converted.wav")?;
/// // Write the result to workspace.staged(), then:
/// workspace.finalize()?;
/// # Ok::<(), formshift_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    destination: PathBuf,
    staged: PathBuf,
}

impl Workspace {
    /// Create a new workspace for producing `destination`.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();

        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::InvalidInput("Invalid output path".to_string()))?
            .to_os_string();

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp_dir = tempfile::Builder::new()
            .prefix(".formshift-")
            .tempdir_in(&parent)
            .map_err(|e| Error::Workspace(e.to_string()))?;

        let staged = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            destination,
            staged,
        })
    }

    /// Final location of the output.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Where the converter should write its output (file or directory).
    pub fn staged(&self) -> &Path {
        &self.staged
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Move the staged output to its destination, replacing any previous one.
    ///
    /// The previous output is parked inside the workspace first and restored
    /// if the move fails.
    pub fn finalize(self) -> Result<PathBuf> {
        if !self.staged.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                self.staged
            )));
        }

        let dest = &self.destination;

        if dest.exists() {
            let backup = self.temp_dir.path().join(".previous");
            std::fs::rename(dest, &backup).map_err(|e| {
                Error::Workspace(format!("Failed to move aside previous output: {}", e))
            })?;

            if let Err(e) = std::fs::rename(&self.staged, dest) {
                let _ = std::fs::rename(&backup, dest);
                return Err(Error::Workspace(format!(
                    "Failed to move output to destination: {}",
                    e
                )));
            }
        } else {
            std::fs::rename(&self.staged, dest).map_err(|e| {
                Error::Workspace(format!("Failed to move output to destination: {}", e))
            })?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Finalized output {:?}", dest);

        Ok(dest.clone())
    }

    /// Clean up without finalizing (discard output).
    pub fn cleanup(self) {
        if let Err(_e) = self.temp_dir.close() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Failed to remove workspace: {}", _e);
        }
    }
}
