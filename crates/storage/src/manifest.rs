//! Append-only registry of scanned directories and their index files.

use crate::{Result, StorageError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Field separator on every manifest line.
pub const SEPARATOR: &str = " <BREAK> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub directory: PathBuf,
    pub index_id: String,
}

#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse the manifest at `path`; a missing file reads as empty.
    ///
    /// Directories listed but no longer present on disk only produce a
    /// warning.
    pub fn read(path: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
            for (lineno, line) in text.lines().enumerate() {
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                match line.split_once(SEPARATOR) {
                    Some((directory, index_id)) => entries.push(ManifestEntry {
                        directory: PathBuf::from(directory),
                        index_id: index_id.trim().to_string(),
                    }),
                    None => {
                        warn!(manifest = %path.display(), line = lineno + 1, "malformed manifest line")
                    }
                }
            }
        }

        for entry in &entries {
            if !entry.directory.exists() {
                warn!(directory = %entry.directory.display(), "in manifest, but not on system");
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Whether `index_id` is already registered. The id is derived from the
    /// directory's raw path bytes, so it identifies the directory even when
    /// the directory field was written lossily.
    pub fn contains(&self, index_id: &str) -> bool {
        self.entries.iter().any(|e| e.index_id == index_id)
    }

    /// Append `directory <BREAK> index_id` unless `index_id` is already
    /// listed. Returns whether a line was written.
    pub fn record_if_absent(&mut self, directory: &Path, index_id: &str) -> Result<bool> {
        if self.contains(index_id) {
            debug!(directory = %directory.display(), index_id, "already in manifest");
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;
        writeln!(file, "{}{}{}", directory.display(), SEPARATOR, index_id)
            .map_err(|e| StorageError::io(&self.path, e))?;

        self.entries.push(ManifestEntry {
            directory: directory.to_path_buf(),
            index_id: index_id.to_string(),
        });
        Ok(true)
    }
}
