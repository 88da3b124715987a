//! Metadata and space queries, sentinel values, encryption probe.

use std::fs;

use safe_persist::locator::{CARD_ROOT, DEVICE_MEMORY_ROOT};
use safe_persist::{ErrorCode, FixedSpace, Locator, SIZE_UNKNOWN, Storage};
use tempfile::tempdir;

#[test]
fn presence_and_kind() {
    let td = tempdir().unwrap();
    fs::create_dir(td.path().join("dir")).unwrap();
    fs::write(td.path().join("f.txt.rem"), "abc").unwrap();
    let storage = Storage::new().with_root("SDCard", td.path(), true);

    assert!(storage.is_present(&Locator::from("file:///SDCard/f.txt")).unwrap());
    assert!(!storage.is_directory(&Locator::from("file:///SDCard/f.txt")).unwrap());
    assert!(storage.is_directory(&Locator::from("file:///SDCard/dir/")).unwrap());
    assert!(!storage.is_present(&Locator::from("file:///SDCard/nope")).unwrap());

    let err = storage.is_present(&Locator::from("SDCard/f.txt")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidLocator);
}

#[test]
fn sizes() {
    let td = tempdir().unwrap();
    fs::create_dir_all(td.path().join("d/sub")).unwrap();
    fs::write(td.path().join("d/a"), vec![0u8; 10]).unwrap();
    fs::write(td.path().join("d/sub/b"), vec![0u8; 5]).unwrap();
    let storage = Storage::new().with_root("SDCard", td.path(), false);
    let dir = Locator::from("file:///SDCard/d/");

    assert_eq!(storage.file_size(&Locator::from("file:///SDCard/d/a")), 10);
    assert_eq!(storage.directory_size(&dir, false), 10);
    assert_eq!(storage.directory_size(&dir, true), 15);
    assert_eq!(storage.file_size(&dir), SIZE_UNKNOWN);
    assert_eq!(storage.file_size(&Locator::from("file:///SDCard/missing")), SIZE_UNKNOWN);
}

#[test]
fn space_queries_and_unavailable_sentinel() {
    let td = tempdir().unwrap();
    let storage = Storage::new()
        .with_root("SDCard", td.path(), false)
        .with_root("store", td.path().join("absent"), false)
        .with_space_probe(FixedSpace::new(250, 1000));
    let card = Locator::from(CARD_ROOT);
    let store = Locator::from(DEVICE_MEMORY_ROOT);

    assert_eq!(storage.available_space(&card), 250);
    assert_eq!(storage.total_space(&card), 1000);
    assert_eq!(storage.used_space(&card), 750);
    assert_eq!(storage.available_space(&store), SIZE_UNKNOWN);
    assert_eq!(storage.total_space(&store), SIZE_UNKNOWN);
    assert_eq!(storage.used_space(&store), SIZE_UNKNOWN);
}

#[test]
fn accessibility_degrades_to_false() {
    let td = tempdir().unwrap();
    let storage = Storage::new()
        .with_root("SDCard", td.path().join("unplugged"), false)
        .with_root("store", td.path(), false);
    assert!(!storage.is_card_accessible());
    assert!(storage.is_device_memory_accessible());
    assert!(!Storage::new().is_device_memory_accessible());
}

#[test]
fn encryption_probe_replaces_stale_probe() {
    let td = tempdir().unwrap();
    fs::write(td.path().join(".safe_persist_probe"), "stale").unwrap();
    let storage = Storage::new().with_root("SDCard", td.path(), true);
    assert!(storage.is_card_encrypted().unwrap());
    assert_eq!(fs::read_dir(td.path()).unwrap().count(), 0);
}

#[test]
fn encryption_probe_on_missing_root_fails() {
    let td = tempdir().unwrap();
    let storage = Storage::new().with_root("SDCard", td.path().join("gone"), false);
    let err = storage.is_card_encrypted().unwrap_err();
    assert_eq!(err.code(), ErrorCode::FilesystemUnavailable);
}

#[test]
fn listing_keeps_stored_names() {
    let td = tempdir().unwrap();
    fs::create_dir(td.path().join("z")).unwrap();
    fs::write(td.path().join("a.rem"), "").unwrap();
    let storage = Storage::new().with_root("SDCard", td.path(), true);
    assert_eq!(
        storage.list(&Locator::from("file:///SDCard")).unwrap(),
        vec!["a.rem".to_string(), "z/".to_string()]
    );
}
