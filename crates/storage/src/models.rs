use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome bucket for one classified file.
///
/// Declaration order is the order in which [`crate::Index::lookup`] scans
/// the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ignored,
    NoAttributes,
    Unrecognized,
    UnrecognizedEntry,
    BigDiff,
    NoDates,
    Ok,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Ignored,
        Category::NoAttributes,
        Category::Unrecognized,
        Category::UnrecognizedEntry,
        Category::BigDiff,
        Category::NoDates,
        Category::Ok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ignored => "ignored",
            Category::NoAttributes => "no_attributes",
            Category::Unrecognized => "unrecognized",
            Category::UnrecognizedEntry => "unrecognized_entry",
            Category::BigDiff => "big_diff",
            Category::NoDates => "no_dates",
            Category::Ok => "ok",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Cheap "unchanged since last run" fingerprint: modification time and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSignature {
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub size: u64,
}

impl StatSignature {
    pub fn new(mtime_secs: i64, mtime_nanos: u32, size: u64) -> Self {
        Self {
            mtime_secs,
            mtime_nanos,
            size,
        }
    }

    pub fn from_metadata(meta: &Metadata) -> Self {
        let (mtime_secs, mtime_nanos) = meta.modified().map_or((0, 0), mtime_parts);
        Self::new(mtime_secs, mtime_nanos, meta.len())
    }
}

/// Seconds since the epoch, floored, and the non-negative nanosecond
/// remainder.
fn mtime_parts(t: SystemTime) -> (i64, u32) {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            match d.subsec_nanos() {
                0 => (-(d.as_secs() as i64), 0),
                n => (-(d.as_secs() as i64) - 1, 1_000_000_000 - n),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(with = "path_as_bytes")]
    pub path: PathBuf,
    pub stat: StatSignature,
    pub content_hash: String,
    pub category: Category,
    /// Representative date, or a diagnostic message.
    pub detail: String,
    /// Date found in the file name, if any.
    #[serde(default)]
    pub name_date: Option<String>,
}

/// Paths go to disk as raw bytes so names that are not UTF-8 survive.
mod path_as_bytes {
    use crate::{path_bytes, path_from_bytes};
    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;
    use std::path::{Path, PathBuf};

    pub fn serialize<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&path_bytes(path))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
        deserializer.deserialize_byte_buf(PathVisitor)
    }

    struct PathVisitor;

    impl<'de> Visitor<'de> for PathVisitor {
        type Value = PathBuf;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("path bytes")
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<PathBuf, E> {
            Ok(path_from_bytes(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<PathBuf, E> {
            Ok(PathBuf::from(v))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<PathBuf, A::Error> {
            let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(b) = seq.next_element::<u8>()? {
                bytes.push(b);
            }
            Ok(path_from_bytes(&bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn mtimes_around_the_epoch_stay_distinct() {
        let half = Duration::from_millis(500);
        assert_eq!(mtime_parts(UNIX_EPOCH + half), (0, 500_000_000));
        assert_eq!(mtime_parts(UNIX_EPOCH - half), (-1, 500_000_000));
        assert_eq!(mtime_parts(UNIX_EPOCH - Duration::from_secs(2)), (-2, 0));
        assert_eq!(
            mtime_parts(UNIX_EPOCH - Duration::new(1, 250_000_000)),
            (-2, 750_000_000)
        );
    }

    #[test]
    fn category_display_honours_width() {
        assert_eq!(format!("{:<8}|", Category::Ok), "ok      |");
        assert_eq!(format!("{:>9}", Category::BigDiff), " big_diff");
    }
}
