use providers::{Probe, TagMap};
use rummage_core::classifier::{reconcile, Classifier};
use rummage_core::models::Verdict;
use storage::Category;

fn tags(dt: Option<&str>, dtd: Option<&str>, dto: Option<&str>, mcd: Option<&str>) -> TagMap {
    TagMap {
        mime_type: Some("image/jpeg".into()),
        date_time: dt.map(String::from),
        date_time_digitized: dtd.map(String::from),
        date_time_original: dto.map(String::from),
        media_create_date: mcd.map(String::from),
    }
}

fn outcome(dt: Option<&str>, dtd: Option<&str>, dto: Option<&str>, mcd: Option<&str>) -> (Category, String) {
    let verdict = reconcile(&tags(dt, dtd, dto, mcd));
    (verdict.category(), verdict.detail())
}

const NOON: &str = "2021:05:01 12:00:00";

#[test]
fn all_three_equal_is_ok() {
    assert_eq!(
        outcome(Some(NOON), Some(NOON), Some(NOON), None),
        (Category::Ok, "2021-05-01T12:00:00".to_string())
    );
}

#[test]
fn nothing_present_is_no_dates() {
    assert_eq!(outcome(None, None, None, None), (Category::NoDates, "None".to_string()));
}

#[test]
fn original_two_days_after_digitized_is_big_diff() {
    let (category, detail) = outcome(None, Some(NOON), Some("2021:05:03 12:00:00"), None);
    assert_eq!(category, Category::BigDiff);
    assert_eq!(
        detail,
        "Diff DateTimeOriginal 2021-05-03T12:00:00 DateTimeDigitized 2021-05-01T12:00:00"
    );
}

#[test]
fn original_close_to_digitized_reports_original() {
    assert_eq!(
        outcome(Some("2000:01:01 00:00:00"), Some(NOON), Some("2021:05:01 15:30:00"), None),
        (Category::Ok, "2021-05-01T15:30:00".to_string())
    );
}

#[test]
fn original_after_digitized_by_more_than_half_a_day_is_big_diff() {
    let (category, _) = outcome(None, Some(NOON), Some("2021:05:02 01:00:01"), None);
    assert_eq!(category, Category::BigDiff);
}

#[test]
fn original_slightly_before_digitized_counts_as_big_diff() {
    // one hour earlier: -1 day plus 23 hours
    let (category, _) = outcome(None, Some(NOON), Some("2021:05:01 11:00:00"), None);
    assert_eq!(category, Category::BigDiff);
}

#[test]
fn original_versus_date_time_never_escapes_ok() {
    // far apart: date time is reported
    assert_eq!(
        outcome(Some(NOON), None, Some("2021:06:01 12:00:00"), None),
        (Category::Ok, "2021-05-01T12:00:00".to_string())
    );
    // close together: original is reported
    assert_eq!(
        outcome(Some(NOON), None, Some("2021:05:02 12:00:00"), None),
        (Category::Ok, "2021-05-02T12:00:00".to_string())
    );
    // original long before date time: original is reported
    assert_eq!(
        outcome(Some(NOON), None, Some("2001:05:01 12:00:00"), None),
        (Category::Ok, "2001-05-01T12:00:00".to_string())
    );
}

#[test]
fn original_alone_is_ok() {
    assert_eq!(
        outcome(None, None, Some(NOON), Some("1999:01:01 00:00:00")),
        (Category::Ok, "2021-05-01T12:00:00".to_string())
    );
}

#[test]
fn digitized_versus_date_time() {
    assert_eq!(
        outcome(Some(NOON), Some("2021:05:10 12:00:00"), None, None),
        (Category::Ok, "2021-05-10T12:00:00".to_string())
    );
    assert_eq!(
        outcome(Some(NOON), Some("2021:05:02 12:00:00"), None, None),
        (Category::Ok, "2021-05-01T12:00:00".to_string())
    );
    assert_eq!(
        outcome(None, Some(NOON), None, None),
        (Category::Ok, "2021-05-01T12:00:00".to_string())
    );
}

#[test]
fn date_time_alone_and_media_create_date_alone() {
    assert_eq!(
        outcome(Some(NOON), None, None, Some("1999:01:01 00:00:00")),
        (Category::Ok, "2021-05-01T12:00:00".to_string())
    );
    assert_eq!(
        outcome(None, None, None, Some("2019:04:12 10:00:00")),
        (Category::Ok, "2019-04-12T10:00:00".to_string())
    );
}

#[test]
fn zero_date_is_unrecognized_entry_with_all_raw_values() {
    let (category, detail) = outcome(Some(NOON), None, None, Some("0000:00:00 00:00:00"));
    assert_eq!(category, Category::UnrecognizedEntry);
    assert_eq!(
        detail,
        "Unrecognized value DateTime: 2021:05:01 12:00:00 DateTimeDigitized: None \
         DateTimeOriginal: None MediaCreateDate: 0000:00:00 00:00:00"
    );
}

#[test]
fn ignored_names_win_over_any_metadata() {
    let classifier = Classifier::default();
    let probe = Probe::Tags(tags(Some(NOON), Some(NOON), Some(NOON), None));
    assert_eq!(classifier.classify("notes.txt", &probe), Verdict::Ignored);
    assert_eq!(classifier.screen("notes.txt"), Some(Verdict::Ignored));
    assert_eq!(Verdict::Ignored.detail(), "Ignored");
    assert_eq!(classifier.screen("IMG_0001.jpg"), None);
}

#[test]
fn probe_triage() {
    let classifier = Classifier::default();
    assert_eq!(classifier.classify("a.bin", &Probe::NotMedia), Verdict::Unrecognized);
    assert_eq!(
        classifier.classify("a.png", &Probe::NoAttributes),
        Verdict::NoAttributes
    );
    assert_eq!(Verdict::NoAttributes.detail(), "No attributes");
    assert_eq!(Verdict::Unrecognized.category(), Category::Unrecognized);
}
