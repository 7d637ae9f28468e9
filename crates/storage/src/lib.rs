//! Storage layer: the persisted classification index and the manifest of
//! scanned directories.
//!
//! Holds content hashing helpers shared by both.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod index;
pub mod manifest;
pub mod models;

pub use index::Index;
pub use manifest::Manifest;
pub use models::{Category, FileRecord, StatSignature};

/// Extension given to every persisted index file.
pub const INDEX_EXTENSION: &str = "index";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode index {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: rmp_serde::encode::Error,
    },
    #[error("failed to decode index {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rmp_serde::decode::Error,
    },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Full-file blake3 digest, hex encoded.
pub fn content_hash(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 65536];
    loop {
        let n = file.read(&mut buf).map_err(|e| StorageError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Name of the index file for a scanned directory: the digest of its raw
/// path bytes plus [`INDEX_EXTENSION`].
pub fn index_file_id(directory: &Path) -> String {
    let digest = blake3::hash(&path_bytes(directory));
    format!("{}.{}", digest.to_hex(), INDEX_EXTENSION)
}

/// Raw bytes of a path. Lossless on unix, where paths need not be UTF-8.
#[cfg(unix)]
pub fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
pub fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

/// Inverse of [`path_bytes`].
#[cfg(unix)]
pub fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic_and_byte_sensitive() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.jpg");
        fs::write(&file, b"abcdef").unwrap();
        let first = content_hash(&file).unwrap();
        let second = content_hash(&file).unwrap();
        assert_eq!(first, second);

        fs::write(&file, b"abcdeg").unwrap();
        assert_ne!(first, content_hash(&file).unwrap());
    }

    #[test]
    fn content_hash_of_missing_file_is_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = content_hash(&temp.path().join("gone.jpg")).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn index_file_id_depends_on_directory_string() {
        let a = index_file_id(Path::new("/photos/2019"));
        let b = index_file_id(Path::new("/photos/2020"));
        assert_ne!(a, b);
        assert_eq!(a, index_file_id(Path::new("/photos/2019")));
        assert!(a.ends_with(".index"));
        assert_eq!(a.len(), 64 + ".index".len());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_keep_distinct_ids_and_round_trip() {
        use std::os::unix::ffi::OsStrExt;
        let latin1 = Path::new(std::ffi::OsStr::from_bytes(b"/ph\xf6tos"));
        let other = Path::new(std::ffi::OsStr::from_bytes(b"/ph\xfftos"));
        assert_ne!(index_file_id(latin1), index_file_id(other));
        assert_eq!(path_from_bytes(&path_bytes(latin1)), latin1);
    }
}
