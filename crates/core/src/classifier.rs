//! Date reconciliation: turns a file name and its metadata into a [`Verdict`].

use crate::models::{Verdict, EXIF_DATE_FORMAT};
use crate::rules::NameFilter;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use providers::{Probe, TagMap};
use regex::Regex;

/// Gap between original and digitized dates beyond which they disagree.
const HALF_DAY_SECS: i64 = 43_200;
const DAY_SECS: i64 = 86_400;

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    filter: NameFilter,
}

impl Classifier {
    pub fn new(filter: NameFilter) -> Self {
        Self { filter }
    }

    /// Name-only verdict; `Some` means metadata must not be read at all.
    pub fn screen(&self, basename: &str) -> Option<Verdict> {
        self.filter.is_ignored(basename).then_some(Verdict::Ignored)
    }

    pub fn classify(&self, basename: &str, probe: &Probe) -> Verdict {
        if let Some(verdict) = self.screen(basename) {
            return verdict;
        }
        match probe {
            Probe::NotMedia => Verdict::Unrecognized,
            Probe::NoAttributes => Verdict::NoAttributes,
            Probe::Tags(tags) => reconcile(tags),
        }
    }
}

/// The four candidate capture dates of one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureDates {
    pub date_time: Option<NaiveDateTime>,
    pub digitized: Option<NaiveDateTime>,
    pub original: Option<NaiveDateTime>,
    pub media_create: Option<NaiveDateTime>,
}

impl CaptureDates {
    /// Fails as a unit when any present value does not parse.
    pub fn parse(tags: &TagMap) -> Result<Self, chrono::ParseError> {
        let parse = |raw: &Option<String>| {
            raw.as_deref()
                .map(|s| NaiveDateTime::parse_from_str(s.trim(), EXIF_DATE_FORMAT))
                .transpose()
        };
        Ok(Self {
            date_time: parse(&tags.date_time)?,
            digitized: parse(&tags.date_time_digitized)?,
            original: parse(&tags.date_time_original)?,
            media_create: parse(&tags.media_create_date)?,
        })
    }
}

/// Difference split into whole days (floored) and a non-negative remainder
/// of seconds, so one hour before reads as `-1 day + 82800 s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayDelta {
    pub days: i64,
    pub seconds: i64,
}

impl DayDelta {
    pub fn between(later: NaiveDateTime, earlier: NaiveDateTime) -> Self {
        let total = (later - earlier).num_seconds();
        Self {
            days: total.div_euclid(DAY_SECS),
            seconds: total.rem_euclid(DAY_SECS),
        }
    }
}

pub fn reconcile(tags: &TagMap) -> Verdict {
    match CaptureDates::parse(tags) {
        Ok(dates) => reconcile_dates(&dates),
        Err(_) => Verdict::UnrecognizedEntry { raw: tags.clone() },
    }
}

/// Priority: all absent, all agree, original, digitized, plain date time,
/// media create date.
pub fn reconcile_dates(dates: &CaptureDates) -> Verdict {
    let CaptureDates {
        date_time: dt,
        digitized: dtd,
        original: dto,
        media_create: mcd,
    } = *dates;

    if dt.is_none() && dtd.is_none() && dto.is_none() && mcd.is_none() {
        return Verdict::NoDates;
    }
    if let Some(date) = dt.filter(|d| Some(*d) == dtd && Some(*d) == dto) {
        return Verdict::Ok { date };
    }

    if let Some(original) = dto {
        if let Some(digitized) = dtd {
            let delta = DayDelta::between(original, digitized);
            if delta.days.abs() > 1 || delta.seconds > HALF_DAY_SECS {
                return Verdict::BigDiff {
                    original,
                    digitized,
                };
            }
            return Verdict::Ok { date: original };
        }
        if let Some(date_time) = dt {
            // The gap only picks which date is reported.
            let date = if DayDelta::between(original, date_time).days > 1 {
                date_time
            } else {
                original
            };
            return Verdict::Ok { date };
        }
        return Verdict::Ok { date: original };
    }

    if let Some(digitized) = dtd {
        let date = match dt {
            Some(date_time) if DayDelta::between(digitized, date_time).days > 1 => digitized,
            Some(date_time) => date_time,
            None => digitized,
        };
        return Verdict::Ok { date };
    }

    match dt.or(mcd) {
        Some(date) => Verdict::Ok { date },
        None => Verdict::NoDates,
    }
}

static NAME_DATE_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(19|20|21)[0-9]{2}[0-1][0-9][0-3][0-9]").expect("valid pattern"),
        Regex::new(r"(19|20|21)[0-9]{2}\W[0-1][0-9]\W[0-3][0-9]").expect("valid pattern"),
    ]
});

/// First date-looking run of digits in a file name, e.g. `20190412` in
/// `IMG_20190412_101500.jpg` or `2019-04-12` in `2019-04-12 party.png`.
pub fn date_from_filename(basename: &str) -> Option<String> {
    NAME_DATE_PATTERNS
        .iter()
        .find_map(|re| re.find(basename))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn day_delta_floors_like_calendar_arithmetic() {
        let base = at(2021, 5, 1, 12, 0, 0);
        assert_eq!(
            DayDelta::between(at(2021, 5, 1, 13, 0, 0), base),
            DayDelta { days: 0, seconds: 3600 }
        );
        assert_eq!(
            DayDelta::between(at(2021, 5, 1, 11, 0, 0), base),
            DayDelta { days: -1, seconds: 82_800 }
        );
        assert_eq!(
            DayDelta::between(at(2021, 5, 3, 12, 0, 0), base),
            DayDelta { days: 2, seconds: 0 }
        );
    }

    #[test]
    fn filename_dates() {
        assert_eq!(
            date_from_filename("IMG_20190412_101500.jpg").as_deref(),
            Some("20190412")
        );
        assert_eq!(
            date_from_filename("2019-04-12 party.png").as_deref(),
            Some("2019-04-12")
        );
        assert_eq!(date_from_filename("DSC_0001.JPG"), None);
        assert_eq!(date_from_filename("18990101.jpg"), None);
    }

    #[test]
    fn parse_fails_as_a_unit() {
        let tags = TagMap {
            date_time: Some("2021:05:01 12:00:00".into()),
            media_create_date: Some("0000:00:00 00:00:00".into()),
            ..TagMap::default()
        };
        assert!(CaptureDates::parse(&tags).is_err());
    }
}
