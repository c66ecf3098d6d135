use super::{Db, Shared};
use crate::callback::Callbacks;
use crate::criteria::Criteria;
use crate::settings::Settings;
use crate::LogMode;

use ormlette_core::driver::Connection;
use ormlette_core::schema::StructCache;
use ormlette_core::Result;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

pub struct Builder {
    dialect: String,
    source: Option<String>,
    log_mode: LogMode,
    singular_table: Option<bool>,
    now: fn() -> i64,
    cache: Option<Arc<StructCache>>,
}

impl Default for Builder {
    fn default() -> Builder {
        Builder {
            dialect: "sqlite".to_string(),
            source: None,
            log_mode: LogMode::default(),
            singular_table: None,
            now: unix_now,
            cache: None,
        }
    }
}

impl Builder {
    /// Dialect name: `sqlite`, `postgres` or `mysql`.
    pub fn dialect(&mut self, name: &str) -> &mut Self {
        self.dialect = name.to_string();
        self
    }

    /// Name reported on every operation span. Defaults to the connection
    /// URL for `connect` and to the dialect name otherwise.
    pub fn source(&mut self, source: &str) -> &mut Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn log_mode(&mut self, mode: LogMode) -> &mut Self {
        self.log_mode = mode;
        self
    }

    /// Uses singular table names. This switches the structure cache, so it
    /// affects every handle sharing it.
    pub fn singular_table(&mut self, enable: bool) -> &mut Self {
        self.singular_table = Some(enable);
        self
    }

    /// Clock for timestamps and soft delete, in seconds.
    pub fn now(&mut self, now: fn() -> i64) -> &mut Self {
        self.now = now;
        self
    }

    /// Structure cache to resolve record types with, instead of the
    /// process-wide one.
    pub fn cache(&mut self, cache: Arc<StructCache>) -> &mut Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(&mut self, conn: impl Connection) -> Result<Db> {
        self.build_with(Arc::new(conn))
    }

    pub fn build_with(&mut self, conn: Arc<dyn Connection>) -> Result<Db> {
        self.build_sourced(conn, None)
    }

    fn build_sourced(&mut self, conn: Arc<dyn Connection>, fallback: Option<&str>) -> Result<Db> {
        let dialect = ormlette_sql::dialect(&self.dialect)?;
        let cache = self.cache.clone().unwrap_or_else(StructCache::global);
        if let Some(enable) = self.singular_table {
            cache.set_singular_table(enable);
        }

        let source = self
            .source
            .as_deref()
            .or(fallback)
            .unwrap_or(dialect.name())
            .to_string();
        tracing::debug!(dialect = dialect.name(), %source, "opened database handle");

        Ok(Db {
            shared: Arc::new(Shared {
                dialect,
                cache,
                source,
                now: self.now,
                join_tables: RwLock::new(HashMap::new()),
            }),
            conn,
            callbacks: Arc::new(Callbacks::default_chains()),
            criteria: Criteria::default(),
            values: Settings::new(),
            value: None,
            error: None,
            rows_affected: 0,
            log_mode: self.log_mode,
        })
    }

    /// Opens a SQLite database from a `sqlite:` URL, e.g.
    /// `sqlite::memory:` or `sqlite:/tmp/app.db`. The source defaults to
    /// the URL.
    #[cfg(feature = "sqlite")]
    pub fn connect(&mut self, url: &str) -> Result<Db> {
        let conn = ormlette_driver_sqlite::Sqlite::new(url)?.connect()?;
        self.dialect("sqlite").build_sourced(Arc::new(conn), Some(url))
    }
}
