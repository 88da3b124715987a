//! Structured log output: event log lines and storage operations as JSON.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use safe_persist::{Locator, Storage, event_log};
use tempfile::tempdir;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

/// Appends written bytes into a shared Vec<u8>.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_json(f: impl FnOnce()) -> Vec<serde_json::Value> {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .event_format(tsfmt::format().json())
        .with_writer(make_writer);
    let subscriber = registry().with(EnvFilter::new("info")).with(layer);
    let dispatch = tracing::Dispatch::new(subscriber);
    tracing::dispatcher::with_default(&dispatch, f);

    let raw = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    raw.lines()
        .map(|l| serde_json::from_str(l).expect("each line is a JSON object"))
        .collect()
}

#[test]
fn event_log_lines_carry_guid_and_logger() {
    assert!(event_log::setup("persist-test", 0x42));
    let lines = capture_json(|| {
        event_log::log_event("card inserted").unwrap();
    });
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line["target"], "event_log");
    assert_eq!(line["fields"]["message"], "card inserted");
    assert_eq!(line["fields"]["logger"], "persist-test");
    assert_eq!(line["fields"]["guid"], "0x0000000000000042");
}

#[test]
fn replace_is_logged_with_locator() {
    let td = tempdir().unwrap();
    std::fs::write(td.path().join("f"), "old").unwrap();
    let storage = Storage::new().with_root("SDCard", td.path(), false);
    let lines = capture_json(|| {
        storage.write_bytes(&Locator::from("file:///SDCard/f"), b"new").unwrap();
    });
    assert!(
        lines
            .iter()
            .any(|l| l["fields"]["message"] == "replaced file" && l["fields"]["locator"] == "file:///SDCard/f"),
        "lines: {lines:?}"
    );
}

#[cfg(unix)]
#[test]
fn log_file_is_capped_on_open() {
    use safe_persist::platform::open_log_file_secure_append;
    let td = tempdir().unwrap();
    let path = td.path().join("big.log");
    std::fs::write(&path, vec![b'x'; 100]).unwrap();
    let f = open_log_file_secure_append(&path, 50).unwrap();
    drop(f);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
}
