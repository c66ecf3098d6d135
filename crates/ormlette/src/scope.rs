//! Execution context of one terminal operation.
//!
//! A [`Scope`] pairs a snapshot of the calling handle (criteria, named
//! values, error slot) with the value being read or written. Callback steps
//! receive the scope, assemble a statement into it and execute it. The first
//! error recorded on the scope wins; once it is set every later step is
//! skipped and the error travels back on the returned [`Db`].

mod migrate;
mod scan;
pub(crate) use scan::scan_row;

mod sql;

use crate::criteria::{Combinator, Condition, Criteria};
use crate::settings::Settings;
use crate::{logger, Db};

use ormlette_core::driver::ExecResult;
use ormlette_core::schema::{JoinTableHandler, ModelStruct, StructField};
use ormlette_core::stmt::{Row, Statement, Value};
use ormlette_core::{Dialect, Error, Reflect, Result, Target};

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

pub struct Scope<'a> {
    pub(crate) db: Db,
    value: Option<&'a mut dyn Target>,

    /// Structure of the table the statement runs against.
    model: Option<Arc<ModelStruct>>,

    /// Structure of the value results are scanned into.
    value_model: Option<Arc<ModelStruct>>,

    instance: Settings,
    stmt: Statement,
    skip_left: bool,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(db: Db, value: Option<&'a mut dyn Target>) -> Scope<'a> {
        let cache = &db.shared.cache;
        let value_model = value
            .as_ref()
            .map(|value| cache.resolve(value.model_type()));
        let model = match &db.value {
            Some(model) => Some(cache.resolve(model.model_type())),
            None => value_model.clone(),
        };

        Scope {
            db,
            value,
            model,
            value_model,
            instance: Settings::new(),
            stmt: Statement::default(),
            skip_left: false,
        }
    }

    pub(crate) fn into_db(self) -> Db {
        self.db
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// A handle on the same connection with no criteria, for nested
    /// operations.
    pub fn new_db(&self) -> Db {
        self.db.new_session()
    }

    pub fn dialect(&self) -> &dyn Dialect {
        &*self.db.shared.dialect
    }

    pub fn criteria(&self) -> &Criteria {
        &self.db.criteria
    }

    /// Structure of the table the statement runs against.
    pub fn model(&self) -> Option<&ModelStruct> {
        self.model.as_deref()
    }

    /// Structure of the value results are scanned into.
    pub fn value_model(&self) -> Option<&ModelStruct> {
        self.value_model.as_deref()
    }

    pub(crate) fn model_arc(&self) -> Option<Arc<ModelStruct>> {
        self.model.clone()
    }

    pub(crate) fn value_model_arc(&self) -> Option<Arc<ModelStruct>> {
        self.value_model.clone()
    }

    pub fn value(&self) -> Option<&(dyn Target + 'a)> {
        self.value.as_deref()
    }

    pub fn value_mut(&mut self) -> Option<&mut (dyn Target + 'a)> {
        self.value.as_deref_mut()
    }

    /// The record of a single-record value.
    pub fn record(&self) -> Option<&dyn Reflect> {
        let value = self.value()?;
        if value.is_many() {
            return None;
        }
        value.get(0)
    }

    pub fn record_mut(&mut self) -> Option<&mut dyn Reflect> {
        let value = self.value_mut()?;
        if value.is_many() {
            return None;
        }
        value.get_mut(0)
    }

    /// Runs `f` on every record of the value, stopping at the first error.
    pub fn each_record_mut(
        &mut self,
        mut f: impl FnMut(&mut dyn Reflect) -> Result<()>,
    ) -> Result<()> {
        let Some(value) = self.value_mut() else {
            return Ok(());
        };
        for index in 0..value.len() {
            if let Some(record) = value.get_mut(index) {
                f(record)?;
            }
        }
        Ok(())
    }

    pub fn table_name(&self) -> String {
        if let Some(table) = &self.db.criteria.table {
            return table.clone();
        }
        self.model
            .as_ref()
            .map(|model| model.table_name.clone())
            .unwrap_or_default()
    }

    pub fn quoted_table_name(&self) -> String {
        self.quote_qualified(&self.table_name())
    }

    pub fn quote(&self, ident: &str) -> String {
        self.dialect().quote(ident)
    }

    /// Quotes each `.`-separated part of a name.
    pub(crate) fn quote_qualified(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn primary_field(&self) -> Option<&StructField> {
        self.model.as_ref()?.primary_field()
    }

    /// Primary key of a single-record value.
    pub fn primary_key_value(&self) -> Option<Value> {
        let field = self.value_model.as_ref()?.primary_field()?;
        self.record()?.field(field.name)
    }

    /// Returns `true` when the value is not a persisted single record.
    pub fn primary_key_zero(&self) -> bool {
        self.primary_key_value().map_or(true, |key| key.is_zero())
    }

    /// Whether the table and value describe the same record type.
    pub(crate) fn value_is_model(&self) -> bool {
        match (&self.model, &self.value_model) {
            (Some(model), Some(value_model)) => model.model_type == value_model.model_type,
            _ => false,
        }
    }

    /// Adds conditions passed directly to a terminal.
    pub fn inline_condition(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        for condition in conditions {
            self.db.criteria.push(Combinator::And, condition);
        }
    }

    /// Writes a named value for the rest of this operation and every nested
    /// operation started from it.
    pub fn set<V: Any + Send + Sync>(&mut self, name: &str, value: V) {
        self.db.values.set(name, value);
    }

    pub fn get<V: Any + Clone>(&self, name: &str) -> Option<V> {
        self.db.values.get(name)
    }

    /// Writes a named value visible to this scope only.
    pub fn instance_set<V: Any + Send + Sync>(&mut self, name: &str, value: V) {
        self.instance.set(name, value);
    }

    pub fn instance_get<V: Any + Clone>(&self, name: &str) -> Option<V> {
        self.instance.get(name)
    }

    /// Records `err` unless an error was recorded already.
    pub fn err(&mut self, err: Error) {
        if self.db.error.is_none() {
            logger::error(self.db.log_mode, &err);
            self.db.error = Some(err);
        }
    }

    pub fn has_error(&self) -> bool {
        self.db.error.is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        self.db.error.as_ref()
    }

    /// Skips the remaining steps of the chain without recording an error.
    pub fn skip_left(&mut self) {
        self.skip_left = true;
    }

    pub(crate) fn is_skipped(&self) -> bool {
        self.skip_left
    }

    pub fn sql(&self) -> &str {
        &self.stmt.sql
    }

    pub fn vars(&self) -> &[Value] {
        &self.stmt.vars
    }

    /// Replaces the statement text, keeping bound arguments.
    pub fn set_sql(&mut self, sql: impl Into<String>) {
        self.stmt.sql = sql.into();
    }

    /// Discards the current statement and its arguments.
    pub fn reset_statement(&mut self) {
        self.stmt = Statement::default();
    }

    /// Executes a statement built outside the scope, such as one returned by
    /// a join-table handler.
    pub(crate) fn run_statement(&mut self, stmt: Statement) -> Option<ExecResult> {
        self.reset_statement();
        self.set_sql(stmt.sql);
        for value in stmt.vars {
            self.add_to_vars(value);
        }
        self.exec()
    }

    /// Binds `value` and returns its placeholder.
    pub fn add_to_vars(&mut self, value: Value) -> String {
        let dialect = self.db.shared.dialect.clone();
        self.stmt.bind(&*dialect, value)
    }

    pub fn now(&self) -> i64 {
        (self.db.shared.now)()
    }

    /// Executes the current statement. Returns `None` once an error is set.
    pub fn exec(&mut self) -> Option<ExecResult> {
        if self.has_error() {
            return None;
        }

        let start = Instant::now();
        let result = self.db.conn.exec(&self.stmt.sql, &self.stmt.vars);
        let rows = result.as_ref().map_or(0, |res| res.rows_affected);
        logger::statement(
            self.db.log_mode,
            &self.stmt.sql,
            &self.stmt.vars,
            rows,
            start.elapsed(),
        );

        match result {
            Ok(res) => {
                self.db.rows_affected = res.rows_affected;
                Some(res)
            }
            Err(err) => {
                self.err(err);
                None
            }
        }
    }

    /// Runs the current statement as a query.
    pub fn query_rows(&mut self) -> Option<Vec<Row>> {
        if self.has_error() {
            return None;
        }

        let start = Instant::now();
        let result = self.db.conn.query(&self.stmt.sql, &self.stmt.vars);
        let rows = result.as_ref().map_or(0, |rows| rows.len() as u64);
        logger::statement(
            self.db.log_mode,
            &self.stmt.sql,
            &self.stmt.vars,
            rows,
            start.elapsed(),
        );

        match result {
            Ok(rows) => Some(rows),
            Err(err) => {
                self.err(err);
                None
            }
        }
    }

    /// Link-table handler for a many-to-many field of the value's type,
    /// preferring one installed with `Db::set_join_table_handler`.
    pub fn join_table_handler(&self, field: &StructField) -> Option<Arc<dyn JoinTableHandler>> {
        let model = self.value_model.as_ref()?;
        self.db.join_table_handler(model.model_type, field)
    }

    /// Whether create and update may write `field`, given select and omit.
    ///
    /// A select list wins over an omit list.
    pub fn changeable_field(&self, field: &StructField) -> bool {
        let select = self.db.criteria.select_attrs();
        if !select.is_empty() {
            return select.iter().any(|attr| field.matches(attr));
        }
        !self
            .db
            .criteria
            .omit
            .iter()
            .any(|attr| field.matches(attr))
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("table", &self.table_name())
            .field("sql", &self.stmt.sql)
            .field("vars", &self.stmt.vars)
            .field("error", &self.db.error)
            .finish()
    }
}
