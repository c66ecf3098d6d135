use ormlette::LogMode;
use tests::models::*;
use tests::*;

use std::io;
use std::sync::{Arc, Mutex};
use tracing::Level;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn output(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber capturing events up to `level`.
fn captured(level: Level, f: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    capture.output()
}

#[test]
fn statements_are_logged_at_debug() {
    let (db, _log) = setup_all();

    let output = captured(Level::DEBUG, || {
        db.create(&mut User::named("jinzhu", 1)).result().unwrap();
    });
    assert!(output.contains("DEBUG"), "{output}");
    assert!(output.contains("ormlette::sql"), "{output}");
    assert!(output.contains("INSERT INTO"), "{output}");
    assert!(output.contains("jinzhu"), "{output}");

    let output = captured(Level::INFO, || {
        db.create(&mut User::named("quiet", 1)).result().unwrap();
    });
    assert!(!output.contains("INSERT INTO"), "{output}");
}

#[test]
fn debug_handles_log_at_info() {
    let (db, _log) = setup_all();

    let output = captured(Level::INFO, || {
        let mut users: Vec<User> = vec![];
        db.debug().find(&mut users).result().unwrap();
    });
    assert!(output.contains("INFO"), "{output}");
    assert!(output.contains("SELECT * FROM"), "{output}");

    // other handles keep the default level
    let output = captured(Level::INFO, || {
        let mut users: Vec<User> = vec![];
        db.find(&mut users).result().unwrap();
    });
    assert!(output.is_empty(), "{output}");
}

#[test]
fn errors_are_logged() {
    let (db, _log) = setup_all();

    let output = captured(Level::ERROR, || {
        let mut users: Vec<User> = vec![];
        let _ = db.filter(("age = ? AND name = ?", 1)).find(&mut users);
    });
    assert!(output.contains("ERROR"), "{output}");
    assert!(output.contains("operation failed"), "{output}");
}

#[test]
fn missing_records_are_not_errors() {
    let (db, _log) = setup_all();

    let output = captured(Level::WARN, || {
        let mut user = User::default();
        assert!(db.first(&mut user).record_not_found());
    });
    assert!(!output.contains("ERROR"), "{output}");

    let output = captured(Level::DEBUG, || {
        let mut user = User::default();
        let _ = db.first(&mut user);
    });
    assert!(output.contains("record not found"), "{output}");
}

#[test]
fn connect_reports_the_url_as_source() {
    let db = ormlette::Db::builder().connect("sqlite::memory:").unwrap();
    assert_eq!(db.source(), "sqlite::memory:");

    let db = ormlette::Db::builder()
        .source("primary")
        .connect("sqlite::memory:")
        .unwrap();
    assert_eq!(db.source(), "primary");

    let db = ormlette::Db::open("sqlite", ormlette_driver_sqlite::Connection::in_memory().unwrap())
        .unwrap();
    assert_eq!(db.source(), "sqlite");
}

#[test]
fn silent_handles_log_nothing() {
    let (db, _log) = setup_all();
    let silent = db.log_mode(LogMode::Silent);

    let output = captured(Level::TRACE, || {
        silent.create(&mut User::named("jinzhu", 1)).result().unwrap();

        let mut users: Vec<User> = vec![];
        let _ = silent.filter(("age = ? AND name = ?", 1)).find(&mut users);
    });
    assert!(!output.contains("ormlette::sql"), "{output}");
    assert!(!output.contains("operation failed"), "{output}");
}
