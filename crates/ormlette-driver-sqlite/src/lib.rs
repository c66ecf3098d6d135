mod value;
use value::Param;

use ormlette_core::driver::{self, ExecResult};
use ormlette_core::stmt::{Row, Value};
use ormlette_core::{Error, Result};

use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Parses a `sqlite:` connection URL: `sqlite::memory:` or `sqlite:/path/to/db`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(ormlette_core::err!(
                "connection URL does not have a `sqlite` scheme; url={}",
                url_str
            ));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn connect(&self) -> Result<Connection> {
        match self {
            Sqlite::File(path) => Connection::open(path),
            Sqlite::InMemory => Connection::in_memory(),
        }
    }
}

/// Where the connections of one database are opened from.
#[derive(Debug)]
enum Location {
    File(PathBuf),

    /// A named shared-cache in-memory database. It lives as long as one
    /// connection to it is open.
    Memory(String),
}

impl Location {
    fn open(&self) -> Result<RusqliteConnection> {
        let connection = match self {
            Location::File(path) => RusqliteConnection::open(path),
            Location::Memory(uri) => RusqliteConnection::open_with_flags(uri, OpenFlags::default()),
        }
        .map_err(Error::driver_operation_failed)?;

        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(Error::driver_operation_failed)?;
        Ok(connection)
    }
}

/// How long a statement waits for a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A SQLite connection.
///
/// Every statement locks the underlying connection, so clones of a handle
/// may share it across threads. `begin` opens a dedicated connection to the
/// same database, so statements issued outside the transaction never run
/// inside it.
#[derive(Debug, Clone)]
pub struct Connection {
    location: Arc<Location>,
    connection: Arc<Mutex<RusqliteConnection>>,

    /// Set for connections returned by `begin`; cleared once the transaction
    /// is committed or rolled back.
    live: Option<Arc<AtomicBool>>,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        static NEXT: AtomicUsize = AtomicUsize::new(0);

        let uri = format!(
            "file:ormlette-{}-{}?mode=memory&cache=shared",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        );
        Self::from_location(Location::Memory(uri))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_location(Location::File(path.as_ref().to_path_buf()))
    }

    fn from_location(location: Location) -> Result<Self> {
        let connection = location.open()?;
        Ok(Self {
            location: Arc::new(location),
            connection: Arc::new(Mutex::new(connection)),
            live: None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, RusqliteConnection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::trace!(sql, "sqlite transaction control");
        self.lock()
            .execute_batch(sql)
            .map_err(Error::driver_operation_failed)
    }

    /// The live flag of an open transaction.
    fn live_transaction(&self) -> Result<&AtomicBool> {
        match &self.live {
            Some(live) if live.load(Ordering::Acquire) => Ok(live),
            _ => Err(Error::no_valid_transaction()),
        }
    }
}

impl driver::Connection for Connection {
    fn exec(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        let connection = self.lock();
        let mut stmt = connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;

        let count = stmt
            .execute(rusqlite::params_from_iter(params.iter().map(Param)))
            .map_err(Error::driver_operation_failed)?;

        Ok(ExecResult {
            rows_affected: count as u64,
            last_insert_id: Some(connection.last_insert_rowid()),
        })
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let connection = self.lock();
        let mut stmt = connection
            .prepare_cached(sql)
            .map_err(Error::driver_operation_failed)?;

        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter().map(Param)))
            .map_err(Error::driver_operation_failed)?;

        let mut ret = vec![];

        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut items = Vec::with_capacity(width);
                    for index in 0..width {
                        let value = row.get_ref(index).map_err(Error::driver_operation_failed)?;
                        items.push(value::from_sql(value));
                    }
                    ret.push(Row::new(columns.clone(), items));
                }
                Ok(None) => break,
                Err(err) => return Err(Error::driver_operation_failed(err)),
            }
        }

        Ok(ret)
    }

    fn begin(&self) -> Result<Arc<dyn driver::Connection>> {
        // transactions do not nest, even after they finished
        if self.live.is_some() {
            return Err(Error::cant_start_transaction());
        }

        let tx = Connection {
            location: self.location.clone(),
            connection: Arc::new(Mutex::new(self.location.open()?)),
            live: Some(Arc::new(AtomicBool::new(true))),
        };
        tx.execute_batch("BEGIN")
            .map_err(|err| err.context(Error::cant_start_transaction()))?;
        Ok(Arc::new(tx))
    }

    fn commit(&self) -> Result<()> {
        let live = self.live_transaction()?;
        self.execute_batch("COMMIT")?;
        live.store(false, Ordering::Release);
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let live = self.live_transaction()?;
        live.store(false, Ordering::Release);
        self.execute_batch("ROLLBACK")
    }

    fn is_transaction(&self) -> bool {
        self.live_transaction().is_ok()
    }
}
