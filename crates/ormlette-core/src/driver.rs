use crate::stmt::{Row, Value};
use crate::{Error, Result};

use std::{fmt::Debug, sync::Arc};

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,

    /// Key generated by the last insert, when the database reports one.
    pub last_insert_id: Option<i64>,
}

/// A connection resource the engine executes statements against.
///
/// Placeholders in `sql` are already in the dialect's syntax and `params` are
/// in placeholder order.
pub trait Connection: Debug + Send + Sync + 'static {
    fn exec(&self, sql: &str, params: &[Value]) -> Result<ExecResult>;

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Starts a transaction, returning a connection scoped to it.
    fn begin(&self) -> Result<Arc<dyn Connection>> {
        Err(Error::cant_start_transaction())
    }

    fn commit(&self) -> Result<()> {
        Err(Error::no_valid_transaction())
    }

    fn rollback(&self) -> Result<()> {
        Err(Error::no_valid_transaction())
    }

    /// Returns `true` for a connection returned by [`Connection::begin`].
    fn is_transaction(&self) -> bool {
        false
    }
}
