use chrono::NaiveDateTime;
use providers::TagMap;
use storage::Category;

/// Format of dates inside EXIF and exiftool output.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
/// Format of dates written to the index.
pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Classification of one file together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Ignored,
    Unrecognized,
    /// Metadata reading failed for this file only.
    Rejected {
        reason: String,
    },
    NoAttributes,
    /// A date tag could not be parsed; holds the raw values.
    UnrecognizedEntry {
        raw: TagMap,
    },
    BigDiff {
        original: NaiveDateTime,
        digitized: NaiveDateTime,
    },
    NoDates,
    Ok {
        date: NaiveDateTime,
    },
}

impl Verdict {
    pub fn category(&self) -> Category {
        match self {
            Verdict::Ignored => Category::Ignored,
            Verdict::Unrecognized | Verdict::Rejected { .. } => Category::Unrecognized,
            Verdict::NoAttributes => Category::NoAttributes,
            Verdict::UnrecognizedEntry { .. } => Category::UnrecognizedEntry,
            Verdict::BigDiff { .. } => Category::BigDiff,
            Verdict::NoDates => Category::NoDates,
            Verdict::Ok { .. } => Category::Ok,
        }
    }

    /// Representative date, or the diagnostic stored alongside the record.
    pub fn detail(&self) -> String {
        match self {
            Verdict::Ignored => "Ignored".to_string(),
            Verdict::Unrecognized => "Unrecognized".to_string(),
            Verdict::Rejected { reason } => format!("Rejected: {reason}"),
            Verdict::NoAttributes => "No attributes".to_string(),
            Verdict::UnrecognizedEntry { raw } => format!(
                "Unrecognized value DateTime: {} DateTimeDigitized: {} DateTimeOriginal: {} MediaCreateDate: {}",
                or_none(&raw.date_time),
                or_none(&raw.date_time_digitized),
                or_none(&raw.date_time_original),
                or_none(&raw.media_create_date),
            ),
            Verdict::BigDiff {
                original,
                digitized,
            } => format!(
                "Diff DateTimeOriginal {} DateTimeDigitized {}",
                display_date(original),
                display_date(digitized)
            ),
            Verdict::NoDates => "None".to_string(),
            Verdict::Ok { date } => display_date(date),
        }
    }
}

pub fn display_date(date: &NaiveDateTime) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}
