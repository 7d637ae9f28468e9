use std::fs;
use storage::manifest::SEPARATOR;
use storage::Manifest;

#[test]
fn missing_manifest_reads_empty() {
    let temp = tempfile::tempdir().unwrap();
    let manifest = Manifest::read(&temp.path().join("rummage_manifest")).unwrap();
    assert!(manifest.entries().is_empty());
}

#[test]
fn record_if_absent_appends_once_per_pair() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("rummage_manifest");
    let photos = temp.path().join("photos");
    fs::create_dir(&photos).unwrap();

    let mut manifest = Manifest::read(&path).unwrap();
    assert!(manifest.record_if_absent(&photos, "abc.index").unwrap());
    assert!(!manifest.record_if_absent(&photos, "abc.index").unwrap());

    let mut reread = Manifest::read(&path).unwrap();
    assert_eq!(reread.entries().len(), 1);
    assert!(!reread.record_if_absent(&photos, "abc.index").unwrap());

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, format!("{}{}abc.index\n", photos.display(), SEPARATOR));
}

#[test]
fn existing_lines_are_preserved_and_malformed_ones_skipped() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("rummage_manifest");
    let original = "/gone/dir <BREAK> 111.index\nnot a manifest line\n";
    fs::write(&path, original).unwrap();

    let mut manifest = Manifest::read(&path).unwrap();
    assert_eq!(manifest.entries().len(), 1);
    assert_eq!(manifest.entries()[0].index_id, "111.index");

    let photos = temp.path().join("photos");
    manifest.record_if_absent(&photos, "222.index").unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(original));
    assert!(text.ends_with("222.index\n"));
}

#[cfg(unix)]
#[test]
fn non_utf8_directory_is_recorded_once() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    use storage::index_file_id;

    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("rummage_manifest");
    let photos = temp.path().join(OsStr::from_bytes(b"ph\xf6tos"));
    let id = index_file_id(&photos);

    for _ in 0..2 {
        let mut manifest = Manifest::read(&path).unwrap();
        manifest.record_if_absent(&photos, &id).unwrap();
    }

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.ends_with(&format!("{SEPARATOR}{id}\n")));
}
