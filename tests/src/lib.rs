pub use exec_log::ExecLog;

mod logging_connection;
pub use logging_connection::{LoggedStatement, LoggingConnection};

pub mod models;

use ormlette::{Db, Record, StructCache};
use ormlette_driver_sqlite::Connection;

use std::sync::{Arc, Once};

/// Seconds reported by the clock of every test handle.
pub const NOW: i64 = 1_700_000_000;

fn now() -> i64 {
    NOW
}

/// Installs a `tracing` subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A handle on a fresh in-memory SQLite database, with its own structure
/// cache and a fixed clock.
pub fn setup() -> Db {
    setup_logged().0
}

/// Like [`setup`], also returning the log of executed statements.
pub fn setup_logged() -> (Db, ExecLog) {
    init_tracing();

    let conn = LoggingConnection::new(Connection::in_memory().unwrap());
    let log = conn.exec_log();
    let db = Db::builder()
        .dialect("sqlite")
        .cache(Arc::new(StructCache::new()))
        .now(now)
        .build(conn)
        .unwrap();
    (db, log)
}

/// Creates the table of each record type.
#[macro_export]
macro_rules! migrate {
    ($db:expr, $( $model:ty ),+ $(,)?) => {{
        $( $crate::auto_migrate::<$model>(&$db); )+
    }};
}

pub fn auto_migrate<T: Record>(db: &Db) {
    db.auto_migrate::<T>().result().unwrap();
}

/// Setup with every shared record type migrated.
pub fn setup_all() -> (Db, ExecLog) {
    use models::*;

    let (db, log) = setup_logged();
    migrate!(db, User, Company, Post, Comment, Profile, Language, Note, Account);
    log.clear();
    (db, log)
}
