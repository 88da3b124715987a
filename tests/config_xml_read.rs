//! XML config is parsed and turned into a working Storage without touching user state.

use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use safe_persist::config::{create_template_config, load_config_from_xml_path};
use safe_persist::{LogLevel, Locator, RootConfig, Storage};

#[test]
fn reads_config_xml_and_applies_values() {
    let td = tempdir().expect("create tempdir");
    let card = td.path().join("card");
    let store = td.path().join("store");
    fs::create_dir_all(&card).unwrap();
    fs::create_dir_all(&store).unwrap();
    let log_file = td.path().join("safe_persist.log");
    let cfg_path = td.path().join("config.xml");

    let xml = format!(
        r#"
<config>
  <root name="SDCard" encrypted="true">{}</root>
  <root name="store">{}</root>
  <chunk_size>512</chunk_size>
  <log_level>info</log_level>
  <log_file>{}</log_file>
</config>
"#,
        card.display(),
        store.display(),
        log_file.display()
    );
    fs::write(&cfg_path, xml).expect("write config.xml");

    let cfg = load_config_from_xml_path(&cfg_path).expect("load_config_from_xml_path");
    assert_eq!(
        cfg.roots,
        vec![
            RootConfig::new("SDCard", &card, true),
            RootConfig::new("store", &store, false),
        ]
    );
    assert_eq!(cfg.chunk_size, 512);
    assert_eq!(cfg.log_level, LogLevel::Info);
    assert_eq!(cfg.log_file.as_deref(), Some(log_file.as_path()));
    cfg.validate().unwrap();

    let storage = Storage::from_config(&cfg);
    assert_eq!(storage.chunk_size(), 512);
    storage
        .write_bytes(&Locator::from("file:///SDCard/a.txt"), b"hello")
        .unwrap();
    assert!(card.join("a.txt.rem").is_file());
}

#[test]
fn empty_log_file_and_missing_fields_fall_back() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config>\n  <log_file>   </log_file>\n  <chunk_size>abc</chunk_size>\n</config>\n").unwrap();
    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.chunk_size, safe_persist::fs_ops::DEFAULT_CHUNK_SIZE);
    assert_eq!(cfg.log_level, LogLevel::Normal);
    assert_ne!(cfg.log_file, Some(PathBuf::from("")));
}

#[test]
fn malformed_xml_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><root name=\"SDCard\">/x</config>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());
}

#[cfg(unix)]
#[test]
fn template_refuses_symlinked_ancestor() {
    let td = tempdir().unwrap();
    let real = td.path().join("real");
    fs::create_dir(&real).unwrap();
    let link = td.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();
    assert!(create_template_config(&link.join("config.xml")).is_err());
    assert!(!real.join("config.xml").exists());
}
