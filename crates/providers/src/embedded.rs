//! In-process EXIF reader.

use crate::{MetadataError, MetadataSource, Probe, TagMap};
use exif::{In, Tag, Value};
use image::ImageFormat;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Pixel count above which an image is treated as a decompression bomb.
pub const DEFAULT_MAX_IMAGE_PIXELS: u64 = 89_478_485;

const DATE_TAGS: [(Tag, &str); 3] = [
    (Tag::DateTime, TagMap::DATE_TIME),
    (Tag::DateTimeOriginal, TagMap::DATE_TIME_ORIGINAL),
    (Tag::DateTimeDigitized, TagMap::DATE_TIME_DIGITIZED),
];

#[derive(Debug, Clone)]
pub struct ExifReader {
    max_pixels: u64,
}

impl Default for ExifReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_PIXELS)
    }
}

impl ExifReader {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    /// Guess the image format from magic bytes and reject oversized images.
    fn open_image(&self, path: &Path) -> Result<Option<ImageFormat>, MetadataError> {
        let reader = match image::io::Reader::open(path).and_then(|r| r.with_guessed_format()) {
            Ok(reader) => reader,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot open as image");
                return Ok(None);
            }
        };
        let Some(format) = reader.format() else {
            return Ok(None);
        };

        match reader.into_dimensions() {
            Ok((width, height)) if u64::from(width) * u64::from(height) > self.max_pixels => {
                Err(MetadataError::DecompressionBomb {
                    path: path.to_path_buf(),
                    width,
                    height,
                    limit: self.max_pixels,
                })
            }
            Ok(_) => Ok(Some(format)),
            Err(e) => {
                // Format known by signature but no decoder compiled in.
                debug!(path = %path.display(), error = %e, "image dimensions unavailable");
                Ok(Some(format))
            }
        }
    }

    fn read_exif(&self, path: &Path) -> Result<Option<exif::Exif>, MetadataError> {
        let file = File::open(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Ok(Some(exif)),
            Err(exif::Error::Io(source)) => Err(MetadataError::Io {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no exif");
                Ok(None)
            }
        }
    }
}

impl MetadataSource for ExifReader {
    fn probe(&self, path: &Path) -> Result<Probe, MetadataError> {
        let Some(format) = self.open_image(path)? else {
            return Ok(Probe::NotMedia);
        };
        let Some(exif) = self.read_exif(path)? else {
            return Ok(Probe::NoAttributes);
        };

        let mut tags = TagMap {
            mime_type: Some(mime_type(format).to_string()),
            ..TagMap::default()
        };
        for (tag, name) in DATE_TAGS {
            if let Some(value) = exif
                .get_field(tag, In::PRIMARY)
                .and_then(|field| ascii(&field.value))
            {
                tags.set(name, value);
            }
        }
        Ok(Probe::Tags(tags))
    }
}

fn ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_end_matches(['\0', ' '])
                .to_string()
        }),
        _ => None,
    }
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => "application/octet-stream",
    }
}
