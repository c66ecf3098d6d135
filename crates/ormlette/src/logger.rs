use ormlette_core::{stmt::Value, Error};

use std::fmt;
use std::time::Duration;

/// How much a handle lineage logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogMode {
    /// Nothing is logged.
    Silent,

    /// Statements at `debug` level, errors at `error` level except
    /// `RecordNotFound`, which is logged at `debug`.
    #[default]
    Default,

    /// Statements at `info` level. Set by `Db::debug`.
    Verbose,
}

struct Vars<'a>(&'a [Value]);

impl fmt::Display for Vars<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

pub(crate) fn statement(mode: LogMode, sql: &str, vars: &[Value], rows: u64, elapsed: Duration) {
    match mode {
        LogMode::Silent => {}
        LogMode::Default => tracing::debug!(
            target: "ormlette::sql",
            sql,
            vars = %Vars(vars),
            rows,
            elapsed = ?elapsed,
            "statement"
        ),
        LogMode::Verbose => tracing::info!(
            target: "ormlette::sql",
            sql,
            vars = %Vars(vars),
            rows,
            elapsed = ?elapsed,
            "statement"
        ),
    }
}

/// A missing record is an ordinary outcome of a lookup, so it is logged at
/// `debug`; every other error at `error`.
pub(crate) fn error(mode: LogMode, err: &Error) {
    match mode {
        LogMode::Silent => {}
        _ if err.is_record_not_found() => {
            tracing::debug!(target: "ormlette", error = %err, "record not found")
        }
        _ => tracing::error!(target: "ormlette", error = %err, "operation failed"),
    }
}
