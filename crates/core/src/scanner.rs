//! Enumerates the regular files below a scan root.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum RootError {
    #[error("directory not found: {path}")]
    NotFound { path: PathBuf },
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },
    #[error("cannot resolve {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check that `root` is an existing directory and return its absolute form.
pub fn resolve_root(root: &Path) -> Result<PathBuf, RootError> {
    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RootError::NotFound {
            path: root.to_path_buf(),
        },
        _ => RootError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(RootError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::canonicalize(root).map_err(|source| RootError::Io {
        path: root.to_path_buf(),
        source,
    })
}

/// Regular files under `root`. Symbolic links are neither followed nor
/// returned; paths matching `excludes` are skipped, directories included.
pub fn walk(root: &Path, excludes: &[String]) -> anyhow::Result<impl Iterator<Item = PathBuf>> {
    let exclude_set = build_globset(excludes)?;
    let iter = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| !is_excluded(e.path(), &exclude_set))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path);
    Ok(iter)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    excludes.is_match(path)
}
