use assert_fs::TempDir;
use assert_fs::prelude::*;
use safe_persist::{Config, RootConfig, Storage};

#[test]
fn default_roots_validate_once_created() {
    let td = TempDir::new().unwrap();
    let card = td.child("SDCard");
    let store = td.child("store");
    card.create_dir_all().unwrap();
    store.create_dir_all().unwrap();
    let cfg = Config::with_roots(vec![
        RootConfig::new("SDCard", card.path(), true),
        RootConfig::new("store", store.path(), false),
    ]);
    cfg.validate().expect("two distinct roots are valid");

    let storage = Storage::from_config(&cfg);
    assert!(storage.is_card_accessible());
    assert!(storage.is_device_memory_accessible());
    assert!(storage.is_card_encrypted().unwrap());
}

#[test]
fn file_as_root_is_refused() {
    let td = TempDir::new().unwrap();
    let f = td.child("not_a_dir");
    f.write_str("x").unwrap();
    let cfg = Config::with_roots(vec![RootConfig::new("SDCard", f.path(), false)]);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err}").contains("not a directory"));
}

#[cfg(unix)]
#[test]
fn symlinked_alias_of_another_root_is_refused() {
    let td = TempDir::new().unwrap();
    let real = td.child("real");
    real.create_dir_all().unwrap();
    let link = td.child("link");
    link.symlink_to_dir(real.path()).unwrap();
    let cfg = Config::with_roots(vec![
        RootConfig::new("SDCard", real.path(), false),
        RootConfig::new("store", link.path(), false),
    ]);
    let err = cfg.validate().unwrap_err();
    assert!(format!("{err}").contains("resolve to the same directory"));
}

#[test]
fn zero_chunk_size_is_refused() {
    let td = TempDir::new().unwrap();
    let mut cfg = Config::with_roots(vec![RootConfig::new("store", td.path(), false)]);
    cfg.chunk_size = 0;
    assert!(cfg.validate().is_err());
}
