mod builder;
pub use builder::Builder;

mod migrate;
mod mutate;
mod query;
mod transaction;

use crate::callback::{Callbacks, Operation};
use crate::criteria::{Attrs, Combinator, Condition, Criteria, Fragment};
use crate::settings::Settings;
use crate::{Association, LogMode, Scope};

use ormlette_core::driver::Connection;
use ormlette_core::schema::{JoinTableHandler, RelationKind, StructCache, StructField};
use ormlette_core::{Dialect, Error, ModelType, Record, Result, Target};

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// State shared by every handle built from the same [`Builder`].
pub(crate) struct Shared {
    pub(crate) dialect: Arc<dyn Dialect>,
    pub(crate) cache: Arc<StructCache>,

    /// Name reported on every operation span.
    pub(crate) source: String,

    /// Clock for timestamps and soft delete, in seconds.
    pub(crate) now: fn() -> i64,

    join_tables: RwLock<HashMap<(TypeId, String), Arc<dyn JoinTableHandler>>>,
}

/// A handle on a database.
///
/// Builder methods return a new handle with the option added; the receiver
/// is never modified, so a configured handle can be reused as a base for
/// several queries. Terminal methods (`first`, `create`, ...) run a callback
/// chain and return the resulting handle, which carries the error (if any)
/// and the number of affected rows.
#[derive(Clone)]
pub struct Db {
    pub(crate) shared: Arc<Shared>,
    pub(crate) conn: Arc<dyn Connection>,
    pub(crate) callbacks: Arc<Callbacks>,
    pub(crate) criteria: Criteria,
    pub(crate) values: Settings,

    /// Value set with [`Db::model`].
    pub(crate) value: Option<Arc<dyn Target>>,

    pub(crate) error: Option<Error>,
    pub(crate) rows_affected: u64,
    pub(crate) log_mode: LogMode,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Builds a handle with default settings for the named dialect.
    pub fn open(dialect: &str, conn: impl Connection) -> Result<Db> {
        Db::builder().dialect(dialect).build(conn)
    }

    fn with_criteria(&self, f: impl FnOnce(&mut Criteria)) -> Db {
        let mut db = self.clone();
        f(&mut db.criteria);
        db
    }

    pub fn filter(&self, condition: impl Into<Condition>) -> Db {
        self.with_criteria(|criteria| criteria.push(Combinator::And, condition.into()))
    }

    pub fn or(&self, condition: impl Into<Condition>) -> Db {
        self.with_criteria(|criteria| criteria.push(Combinator::Or, condition.into()))
    }

    pub fn not(&self, condition: impl Into<Condition>) -> Db {
        self.with_criteria(|criteria| criteria.push(Combinator::Not, condition.into()))
    }

    pub fn limit(&self, limit: u64) -> Db {
        self.with_criteria(|criteria| criteria.limit = Some(limit))
    }

    pub fn offset(&self, offset: u64) -> Db {
        self.with_criteria(|criteria| criteria.offset = Some(offset))
    }

    pub fn order(&self, order: impl Into<Fragment>) -> Db {
        self.with_criteria(|criteria| criteria.order(order.into(), false))
    }

    /// Replaces every previous order, including the implicit primary-key
    /// order of `first` and `last`.
    pub fn reorder(&self, order: impl Into<Fragment>) -> Db {
        self.with_criteria(|criteria| criteria.order(order.into(), true))
    }

    pub fn select(&self, select: impl Into<Fragment>) -> Db {
        self.with_criteria(|criteria| criteria.select = Some(select.into()))
    }

    /// Leaves columns out of queries, creates and updates. A `select` wins.
    pub fn omit<I, S>(&self, columns: I) -> Db
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        self.with_criteria(|criteria| criteria.omit.extend(columns))
    }

    pub fn group(&self, group: impl Into<String>) -> Db {
        self.with_criteria(|criteria| criteria.group = Some(group.into()))
    }

    pub fn having(&self, having: impl Into<Fragment>) -> Db {
        self.with_criteria(|criteria| criteria.having.push(having.into()))
    }

    pub fn joins(&self, join: impl Into<Fragment>) -> Db {
        self.with_criteria(|criteria| criteria.joins.push(join.into()))
    }

    /// Loads an association after the main query. Nested associations are
    /// written with dots, e.g. `"orders.items"`.
    pub fn preload(&self, name: &str) -> Db {
        self.with_criteria(|criteria| criteria.preload(name, vec![]))
    }

    /// Like [`Db::preload`], restricting the loaded records.
    pub fn preload_with(&self, name: &str, conditions: impl IntoIterator<Item = Condition>) -> Db {
        let conditions = conditions.into_iter().collect();
        self.with_criteria(|criteria| criteria.preload(name, conditions))
    }

    /// Drops the soft-delete predicate; deletes become hard deletes.
    pub fn unscoped(&self) -> Db {
        self.with_criteria(|criteria| criteria.unscoped = true)
    }

    /// Attributes for the record `first_or_init` / `first_or_create` build
    /// when nothing matches.
    pub fn attrs(&self, attrs: impl Into<Attrs>) -> Db {
        let attrs = attrs.into();
        self.with_criteria(|criteria| criteria.init_attrs.push(Condition::Attrs(attrs)))
    }

    /// Attributes `first_or_init` / `first_or_create` assign whether or not
    /// a record matched.
    pub fn assign(&self, attrs: impl Into<Attrs>) -> Db {
        let attrs = attrs.into();
        self.with_criteria(|criteria| criteria.assign_attrs.push(Condition::Attrs(attrs)))
    }

    /// Applies reusable criteria functions in order.
    pub fn scopes(&self, scopes: &[&dyn Fn(Db) -> Db]) -> Db {
        scopes.iter().fold(self.clone(), |db, scope| scope(db))
    }

    /// Sets the record type (and record) later operations work on.
    pub fn model(&self, value: &dyn Target) -> Db {
        let mut db = self.clone();
        db.value = Some(Arc::from(value.clone_target()));
        db
    }

    /// Runs against `table` instead of the table of the record type.
    pub fn table(&self, table: impl Into<String>) -> Db {
        let mut db = self.with_criteria(|criteria| criteria.table = Some(table.into()));
        db.value = None;
        db
    }

    /// Uses `sql` as the whole query statement.
    pub fn raw(&self, sql: impl Into<Fragment>) -> Db {
        let sql = sql.into();
        self.with_criteria(|criteria| {
            criteria.raw = true;
            criteria.push(Combinator::And, Condition::Sql(sql));
        })
    }

    /// Logs every statement of this lineage at `info` level.
    pub fn debug(&self) -> Db {
        self.log_mode(LogMode::Verbose)
    }

    pub fn log_mode(&self, mode: LogMode) -> Db {
        let mut db = self.clone();
        db.log_mode = mode;
        db
    }

    /// A handle on the same connection with no criteria and no model.
    pub fn new_session(&self) -> Db {
        let mut db = self.clone();
        db.criteria = Criteria::default();
        db.value = None;
        db
    }

    /// Returns a handle with a named value set.
    pub fn set<V: Any + Send + Sync>(&self, name: &str, value: V) -> Db {
        let mut db = self.clone();
        db.values.set(name, value);
        db
    }

    /// Sets a named value on this handle.
    pub fn instant_set<V: Any + Send + Sync>(&mut self, name: &str, value: V) -> &mut Db {
        self.values.set(name, value);
        self
    }

    pub fn get<V: Any + Clone>(&self, name: &str) -> Option<V> {
        self.values.get(name)
    }

    /// The callback pipeline of this handle, copied on first change so other
    /// handles keep theirs.
    pub fn callback_mut(&mut self) -> &mut Callbacks {
        Arc::make_mut(&mut self.callbacks)
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Switches the structure cache between singular and plural table
    /// names.
    pub fn singular_table(&self, enable: bool) {
        self.shared.cache.set_singular_table(enable);
    }

    /// Installs the join-table handler used for the many-to-many field
    /// `field` of `T`, and creates its table.
    pub fn set_join_table_handler<T: Record>(
        &self,
        field: &str,
        handler: impl JoinTableHandler,
    ) -> Result<()> {
        let model = self.shared.cache.resolve(ModelType::of::<T>());
        let is_many_to_many = model.field(field).is_some_and(|field| {
            field
                .relationship
                .as_ref()
                .is_some_and(|relationship| relationship.kind == RelationKind::ManyToMany)
        });
        if !is_many_to_many {
            return Err(Error::invalid_association(format!(
                "`{}` has no many-to-many field `{field}`",
                model.name
            )));
        }

        let stmt = handler.ensure_schema(self.dialect());
        self.conn.exec(&stmt.sql, &stmt.vars)?;

        let handler: Arc<dyn JoinTableHandler> = Arc::new(handler);
        self.shared
            .join_tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((TypeId::of::<T>(), field.to_string()), handler);
        Ok(())
    }

    pub(crate) fn join_table_handler(
        &self,
        owner: ModelType,
        field: &StructField,
    ) -> Option<Arc<dyn JoinTableHandler>> {
        let installed = self
            .shared
            .join_tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(owner.type_id(), field.name.to_string()))
            .cloned();
        installed.or_else(|| field.relationship.as_ref()?.join_table.clone())
    }

    /// Association `name` of the record set with [`Db::model`].
    pub fn association(&self, name: &str) -> Association {
        Association::new(self, name)
    }

    pub fn dialect(&self) -> &dyn Dialect {
        &*self.shared.dialect
    }

    /// Name reported on every operation span.
    pub fn source(&self) -> &str {
        &self.shared.source
    }

    pub fn cache(&self) -> &Arc<StructCache> {
        &self.shared.cache
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// The record set with [`Db::model`].
    pub fn value(&self) -> Option<&(dyn Target + 'static)> {
        self.value.as_deref()
    }

    /// The first error recorded on this lineage.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The outcome of the last operation as a `Result`.
    pub fn result(&self) -> Result<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    pub fn record_not_found(&self) -> bool {
        self.error.as_ref().is_some_and(Error::is_record_not_found)
    }

    /// Records `err` unless an error was recorded already.
    pub(crate) fn push_error(&mut self, err: Error) {
        if self.error.is_none() {
            crate::logger::error(self.log_mode, &err);
            self.error = Some(err);
        }
    }

    /// A copy of this handle carrying `err`.
    pub(crate) fn fail(&self, err: Error) -> Db {
        let mut db = self.clone();
        db.push_error(err);
        db
    }

    /// Returns `true` when `value` has not been saved yet.
    pub fn new_record(&self, value: &dyn Target) -> bool {
        let model = self.shared.cache.resolve(value.model_type());
        let Some(primary) = model.primary_field() else {
            return true;
        };
        value
            .get(0)
            .and_then(|record| record.field(primary.name))
            .map_or(true, |key| key.is_zero())
    }

    /// Runs the chain for `operation` over `value`.
    ///
    /// `prepare` runs on the new scope before the chain, to pass inline
    /// conditions and per-operation values.
    pub(crate) fn run(
        &self,
        operation: Operation,
        value: Option<&mut dyn Target>,
        prepare: impl FnOnce(&mut Scope<'_>),
    ) -> Db {
        let span = tracing::debug_span!(
            "ormlette",
            source = %self.shared.source,
            op = operation.name()
        );
        let _enter = span.enter();

        let mut db = self.clone();
        db.rows_affected = 0;

        let mut scope = Scope::new(db, value);
        prepare(&mut scope);
        self.callbacks.chain(operation).run(&mut scope);
        scope.into_db()
    }

    /// Builds a scope without running a chain, for operations that issue
    /// their own statements.
    pub(crate) fn with_scope<R>(
        &self,
        op: &'static str,
        value: Option<&mut dyn Target>,
        f: impl FnOnce(&mut Scope<'_>) -> R,
    ) -> (Db, R) {
        let span = tracing::debug_span!("ormlette", source = %self.shared.source, op);
        let _enter = span.enter();

        let mut db = self.clone();
        db.rows_affected = 0;

        let mut scope = Scope::new(db, value);
        let ret = f(&mut scope);
        (scope.into_db(), ret)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("dialect", &self.shared.dialect.name())
            .field("source", &self.shared.source)
            .field("criteria", &self.criteria)
            .field("values", &self.values)
            .field("error", &self.error)
            .field("rows_affected", &self.rows_affected)
            .finish_non_exhaustive()
    }
}
