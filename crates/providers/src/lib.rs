//! Metadata sources: the embedded EXIF reader, the external `exiftool`
//! adapter, and the fallback policy that chains them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod embedded;
pub mod exiftool;
pub mod fallback;
pub mod noop;

pub use embedded::ExifReader;
pub use exiftool::ExiftoolProvider;
pub use fallback::FallbackSource;
pub use noop::NoopProvider;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{path}: image of {width}x{height} pixels exceeds the limit of {limit}")]
    DecompressionBomb {
        path: PathBuf,
        width: u32,
        height: u32,
        limit: u64,
    },
    #[error("no metadata available: {reason}")]
    Unavailable { reason: String },
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MetadataError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Raw values of the tag vocabulary the classifier cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMap {
    pub mime_type: Option<String>,
    pub date_time: Option<String>,
    pub date_time_original: Option<String>,
    pub date_time_digitized: Option<String>,
    pub media_create_date: Option<String>,
}

impl TagMap {
    pub const MIME_TYPE: &'static str = "MIMEType";
    pub const DATE_TIME: &'static str = "DateTime";
    pub const DATE_TIME_ORIGINAL: &'static str = "DateTimeOriginal";
    pub const DATE_TIME_DIGITIZED: &'static str = "DateTimeDigitized";
    pub const MEDIA_CREATE_DATE: &'static str = "MediaCreateDate";

    /// Store `value` under the tag `name`; names outside the vocabulary are
    /// ignored.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let slot = match name {
            Self::MIME_TYPE => &mut self.mime_type,
            Self::DATE_TIME => &mut self.date_time,
            Self::DATE_TIME_ORIGINAL => &mut self.date_time_original,
            Self::DATE_TIME_DIGITIZED => &mut self.date_time_digitized,
            Self::MEDIA_CREATE_DATE => &mut self.media_create_date,
            _ => return,
        };
        *slot = Some(value.into());
    }

    pub fn has_dates(&self) -> bool {
        self.date_time.is_some()
            || self.date_time_original.is_some()
            || self.date_time_digitized.is_some()
            || self.media_create_date.is_some()
    }
}

/// What a metadata source could tell about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// No type signature found.
    NotMedia,
    /// Opens as an image but carries no metadata.
    NoAttributes,
    Tags(TagMap),
}

pub trait MetadataSource {
    fn probe(&self, path: &Path) -> Result<Probe, MetadataError>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for Box<T> {
    fn probe(&self, path: &Path) -> Result<Probe, MetadataError> {
        (**self).probe(path)
    }
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn probe(&self, path: &Path) -> Result<Probe, MetadataError> {
        (**self).probe(path)
    }
}
