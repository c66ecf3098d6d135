use crate::driver::Connection;
use crate::schema::StructField;
use crate::stmt::{Type, Value};
use crate::{Error, Result};

use std::fmt::Debug;

/// Everything that differs between SQL databases.
pub trait Dialect: Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Quotes a single identifier.
    fn quote(&self, ident: &str) -> String;

    /// Placeholder for the argument at 1-based `index`.
    fn bind_var(&self, index: usize) -> String;

    /// Column type for a value of `ty`.
    fn type_name(&self, ty: Type, size: Option<u32>) -> String;

    /// Column type for `field`, including auto-increment keywords.
    ///
    /// An explicit `TYPE` setting wins over the mapped type.
    fn sql_type(&self, field: &StructField) -> Result<String> {
        if let Some(ty) = field.settings.get("TYPE") {
            return Ok(ty.to_string());
        }

        let Some(ty) = field.ty else {
            return Err(Error::from_args(format_args!(
                "field `{}` is a relation and has no column type",
                field.name
            )));
        };

        if field.auto_increment {
            return Ok(self.auto_increment_type(ty));
        }

        Ok(self.type_name(ty, field.size()))
    }

    /// Column type of an auto-increment key.
    fn auto_increment_type(&self, ty: Type) -> String;

    fn limit_and_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut sql = String::new();
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql
    }

    /// Statement prefix used by `create_ignore`.
    fn insert_ignore_prefix(&self) -> &'static str {
        "INSERT INTO"
    }

    /// Statement suffix used by `create_ignore`.
    fn insert_ignore_suffix(&self) -> &'static str {
        ""
    }

    /// `FROM` clause needed by a `SELECT` without a table.
    fn select_from_dummy_table(&self) -> &'static str {
        ""
    }

    /// Body of an INSERT that sets no columns.
    fn default_values(&self) -> &'static str {
        "DEFAULT VALUES"
    }

    /// Clause that makes an INSERT return the generated key, for databases
    /// that do not report a last insert id.
    fn returning_primary_key(&self, _column: &str) -> Option<String> {
        None
    }

    fn has_table(&self, conn: &dyn Connection, table: &str) -> Result<bool>;

    fn has_column(&self, conn: &dyn Connection, table: &str, column: &str) -> Result<bool>;

    fn has_index(&self, conn: &dyn Connection, table: &str, index: &str) -> Result<bool>;

    fn remove_index_sql(&self, _table: &str, index: &str) -> String {
        format!("DROP INDEX {}", self.quote(index))
    }

    fn modify_column_sql(&self, table: &str, column: &str, ty: &str) -> Result<String>;

    fn add_foreign_key_sql(
        &self,
        table: &str,
        name: &str,
        column: &str,
        destination: &str,
        on_delete: &str,
        on_update: &str,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ON DELETE {} ON UPDATE {}",
            self.quote(table),
            self.quote(name),
            self.quote(column),
            destination,
            on_delete,
            on_update
        ))
    }

    fn unsupported(&self, operation: &str) -> Error {
        Error::dialect_unsupported(self.name(), operation)
    }
}

/// Runs a `SELECT count(*)` introspection query and reports whether it found
/// anything.
pub fn exists(conn: &dyn Connection, sql: &str, params: &[Value]) -> Result<bool> {
    let rows = conn.query(sql, params)?;
    let count = rows
        .first()
        .and_then(|row| row.values().first())
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Ok(count > 0)
}
