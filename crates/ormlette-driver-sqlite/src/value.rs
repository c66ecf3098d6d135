use ormlette_core::stmt::Value as CoreValue;
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};

/// Borrowed core value bound as a statement parameter.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a CoreValue);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            CoreValue::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            CoreValue::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            CoreValue::I32(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(i64::from(*v)))),
            CoreValue::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            CoreValue::U64(v) => i64::try_from(*v)
                .map(|v| ToSqlOutput::Owned(SqlValue::Integer(v)))
                .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err))),
            CoreValue::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            CoreValue::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            CoreValue::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            CoreValue::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            CoreValue::List(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "a list must be expanded before it is bound".into(),
            )),
            CoreValue::Expr(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "an expression must be rendered before it is bound".into(),
            )),
        }
    }
}

/// Converts a column of a result row.
///
/// SQLite columns are dynamically typed, so the storage class decides the
/// variant; record fields convert from it on load.
pub(crate) fn from_sql(value: ValueRef<'_>) -> CoreValue {
    match value {
        ValueRef::Null => CoreValue::Null,
        ValueRef::Integer(v) => CoreValue::I64(v),
        ValueRef::Real(v) => CoreValue::F64(v),
        ValueRef::Text(v) => CoreValue::String(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => CoreValue::Bytes(v.to_vec()),
    }
}
