use crate::ExecLog;

use ormlette_core::driver::{Connection, ExecResult};
use ormlette_core::stmt::{Row, Value};
use ormlette_core::Result;

use std::sync::{Arc, Mutex};

/// A statement passed to the wrapped connection.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A connection wrapper that records every statement for assertions.
#[derive(Debug)]
pub struct LoggingConnection {
    /// The connection that actually runs the statements
    inner: Arc<dyn Connection>,

    /// Shared with every transaction started from this connection
    log: Arc<Mutex<Vec<LoggedStatement>>>,
}

impl LoggingConnection {
    pub fn new(inner: impl Connection) -> Self {
        Self {
            inner: Arc::new(inner),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn exec_log(&self) -> ExecLog {
        ExecLog::new(self.log.clone())
    }

    fn record(&self, sql: &str, params: &[Value]) {
        self.log
            .lock()
            .expect("Failed to acquire statement log lock")
            .push(LoggedStatement {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
    }
}

impl Connection for LoggingConnection {
    fn exec(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        self.record(sql, params);
        self.inner.exec(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.record(sql, params);
        self.inner.query(sql, params)
    }

    fn begin(&self) -> Result<Arc<dyn Connection>> {
        let inner = self.inner.begin()?;
        Ok(Arc::new(LoggingConnection {
            inner,
            log: self.log.clone(),
        }))
    }

    fn commit(&self) -> Result<()> {
        self.inner.commit()
    }

    fn rollback(&self) -> Result<()> {
        self.inner.rollback()
    }

    fn is_transaction(&self) -> bool {
        self.inner.is_transaction()
    }
}
