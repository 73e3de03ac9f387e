use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, ViewCostError};

/// A deterministic identifier for one persisted artifact.
///
/// Distinct parameter tuples must map to distinct paths; that is the only
/// protection against overwriting an output computed for other parameters.
pub trait ArtifactKey {
    /// Path of the artifact relative to the store root.
    fn relative_path(&self) -> PathBuf;
}

/// Whether `get_or_compute` did any work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The artifact already existed; nothing was computed or written.
    Cached,
    /// The artifact was computed and published.
    Computed,
}

/// Idempotent file-backed store: presence of a file marks completion.
///
/// Writes go to a temporary file in the destination directory and are renamed
/// into place, so readers never observe a partial artifact and concurrent
/// producers of the same key race harmlessly.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for<K: ArtifactKey + ?Sized>(&self, key: &K) -> PathBuf {
        self.root.join(key.relative_path())
    }

    pub fn contains<K: ArtifactKey + ?Sized>(&self, key: &K) -> bool {
        self.path_for(key).is_file()
    }

    /// Return immediately if `key` is present, otherwise run `compute` against
    /// a buffered writer and publish the result atomically.
    ///
    /// If `compute` fails, the temporary file is discarded and nothing is
    /// published.
    pub fn get_or_compute<K, F>(&self, key: &K, compute: F) -> Result<Outcome>
    where
        K: ArtifactKey + ?Sized,
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let path = self.path_for(key);
        if path.is_file() {
            debug!(path = %path.display(), "Artifact already present, skipping");
            return Ok(Outcome::Cached);
        }

        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            compute(&mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .map_err(|e| ViewCostError::Io(e.error))?;

        debug!(path = %path.display(), "Artifact published");
        Ok(Outcome::Computed)
    }

    /// Delete one artifact if present. Returns whether a file was removed.
    pub fn remove<K: ArtifactKey + ?Sized>(&self, key: &K) -> Result<bool> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
