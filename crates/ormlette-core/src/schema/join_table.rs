use crate::stmt::{Statement, Type, Value};
use crate::Dialect;

use std::fmt::Debug;

/// Owns the link table of a many-to-many relationship.
///
/// The engine never writes link rows itself; it asks the handler for the
/// statements and executes them on the current connection.
pub trait JoinTableHandler: Debug + Send + Sync + 'static {
    fn table_name(&self) -> &str;

    /// Links `source` to `destination`, ignoring an existing link.
    fn link(&self, dialect: &dyn Dialect, source: &Value, destination: &Value) -> Statement;

    /// Unlinks `destinations` from `source`. An empty list unlinks everything.
    fn unlink(&self, dialect: &dyn Dialect, source: &Value, destinations: &[Value]) -> Statement;

    /// Join and filter selecting the destination rows linked to any of
    /// `sources`.
    fn join_by_sources(&self, dialect: &dyn Dialect, sources: &[Value]) -> JoinSelection;

    /// Creates the link table when it does not exist yet.
    fn ensure_schema(&self, dialect: &dyn Dialect) -> Statement;
}

/// SQL pieces returned by [`JoinTableHandler::join_by_sources`].
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSelection {
    /// `INNER JOIN ...` clause.
    pub join: String,

    /// Predicate restricting the link rows to the requested sources, with
    /// `?` placeholders.
    pub condition: String,

    /// Arguments of `condition`.
    pub args: Vec<Value>,

    /// Select expression exposing the source key as [`JoinSelection::SOURCE_ALIAS`].
    pub source_key: String,
}

impl JoinSelection {
    pub const SOURCE_ALIAS: &'static str = "ormlette_join_source";
}

/// One end of a link table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTableSide {
    /// Table of the record type on this end.
    pub table: String,

    /// Key column in that table.
    pub key_column: String,

    /// Column in the link table referencing the key.
    pub join_column: String,

    pub key_type: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultJoinTableHandler {
    table: String,
    source: JoinTableSide,
    destination: JoinTableSide,
}

impl DefaultJoinTableHandler {
    pub fn new(
        table: impl Into<String>,
        source: JoinTableSide,
        destination: JoinTableSide,
    ) -> DefaultJoinTableHandler {
        DefaultJoinTableHandler {
            table: table.into(),
            source,
            destination,
        }
    }

    pub fn source(&self) -> &JoinTableSide {
        &self.source
    }

    pub fn destination(&self) -> &JoinTableSide {
        &self.destination
    }
}

impl JoinTableHandler for DefaultJoinTableHandler {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn link(&self, dialect: &dyn Dialect, source: &Value, destination: &Value) -> Statement {
        let table = dialect.quote(&self.table);
        let source_column = dialect.quote(&self.source.join_column);
        let destination_column = dialect.quote(&self.destination.join_column);

        let mut stmt = Statement::default();
        let values = [
            stmt.bind(dialect, source.clone()),
            stmt.bind(dialect, destination.clone()),
        ];
        let filter = [
            stmt.bind(dialect, source.clone()),
            stmt.bind(dialect, destination.clone()),
        ];

        stmt.sql = format!(
            "INSERT INTO {table} ({source_column}, {destination_column}) SELECT {}, {}{} \
             WHERE NOT EXISTS (SELECT * FROM {table} WHERE {source_column} = {} AND {destination_column} = {})",
            values[0],
            values[1],
            dialect.select_from_dummy_table(),
            filter[0],
            filter[1],
        );
        stmt
    }

    fn unlink(&self, dialect: &dyn Dialect, source: &Value, destinations: &[Value]) -> Statement {
        let mut stmt = Statement::default();
        let source_bind = stmt.bind(dialect, source.clone());

        stmt.sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            dialect.quote(&self.table),
            dialect.quote(&self.source.join_column),
            source_bind
        );

        if !destinations.is_empty() {
            let binds = stmt.bind(dialect, Value::List(destinations.to_vec()));
            stmt.sql.push_str(&format!(
                " AND {} IN ({binds})",
                dialect.quote(&self.destination.join_column)
            ));
        }

        stmt
    }

    fn join_by_sources(&self, dialect: &dyn Dialect, sources: &[Value]) -> JoinSelection {
        let table = dialect.quote(&self.table);
        let source_column = format!("{table}.{}", dialect.quote(&self.source.join_column));

        let join = format!(
            "INNER JOIN {table} ON {table}.{} = {}.{}",
            dialect.quote(&self.destination.join_column),
            dialect.quote(&self.destination.table),
            dialect.quote(&self.destination.key_column),
        );

        JoinSelection {
            join,
            condition: format!("{source_column} IN (?)"),
            args: vec![Value::List(sources.to_vec())],
            source_key: format!(
                "{source_column} AS {}",
                dialect.quote(JoinSelection::SOURCE_ALIAS)
            ),
        }
    }

    fn ensure_schema(&self, dialect: &dyn Dialect) -> Statement {
        let source_column = dialect.quote(&self.source.join_column);
        let destination_column = dialect.quote(&self.destination.join_column);

        Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {} ({source_column} {}, {destination_column} {}, PRIMARY KEY ({source_column}, {destination_column}))",
            dialect.quote(&self.table),
            dialect.type_name(self.source.key_type, None),
            dialect.type_name(self.destination.key_type, None),
        ))
    }
}
