use super::Db;
use crate::callback::Operation;
use crate::criteria::{Attrs, Condition, Fragment};
use crate::settings::{
    COLLECTION_KEYS, IGNORE_PROTECTED_ATTRS, INSERT_IGNORE, SAVE_ASSOCIATIONS, UPDATE_COLUMN,
    UPDATE_INTERFACE,
};
use crate::Scope;

use ormlette_core::stmt::{Statement, Value};
use ormlette_core::Target;

/// Restricts update and delete of a collection to the records it holds.
fn restrict_to_collection(scope: &mut Scope<'_>) {
    if scope.value().is_some_and(|value| value.is_many()) {
        let keys = scope.record_keys();
        scope.instance_set(COLLECTION_KEYS, keys);
    }
}

impl Db {
    /// Inserts `value`. A collection is inserted one record at a time.
    pub fn create(&self, value: &mut dyn Target) -> Db {
        self.each_record(value, |db, value| db.run(Operation::Create, Some(value), |_| {}))
    }

    /// Inserts `value`, leaving rows that conflict with an existing key in
    /// place.
    pub fn create_ignore(&self, value: &mut dyn Target) -> Db {
        self.set(INSERT_IGNORE, true).create(value)
    }

    /// Inserts `value` when its primary key is zero, updates every column
    /// otherwise.
    pub fn save(&self, value: &mut dyn Target) -> Db {
        self.each_record(value, |db, value| {
            let operation = match db.new_record(value) {
                true => Operation::Create,
                false => Operation::Update,
            };
            db.run(operation, Some(value), |_| {})
        })
    }

    /// Runs `op` on a single value, or on each record of a collection,
    /// summing the affected rows and stopping at the first error.
    fn each_record(&self, value: &mut dyn Target, op: impl Fn(&Db, &mut dyn Target) -> Db) -> Db {
        if !value.is_many() {
            return op(self, value);
        }

        let mut db = self.clone();
        db.rows_affected = 0;
        let mut rows_affected = 0;
        for index in 0..value.len() {
            let Some(record) = value.get_mut(index) else {
                continue;
            };
            db = op(self, record.as_target_mut());
            rows_affected += db.rows_affected;
            if db.error.is_some() {
                break;
            }
        }
        db.rows_affected = rows_affected;
        db
    }

    /// Sets one column of `value`, running hooks and refreshing
    /// `updated_at`. The primary key may be assigned.
    pub fn update(&self, value: &mut dyn Target, column: &str, v: impl Into<Value>) -> Db {
        let attrs = Attrs::from_iter([(column, v.into())]);
        self.update_with(Some(value), attrs, true)
    }

    /// Sets the given columns of `value`. Attributes equal to the record's
    /// current values are skipped.
    pub fn updates(&self, value: &mut dyn Target, attrs: impl Into<Attrs>) -> Db {
        self.update_with(Some(value), attrs.into(), false)
    }

    /// Updates every row matching the criteria of the model or table.
    pub fn update_all(&self, attrs: impl Into<Attrs>) -> Db {
        self.update_with(None, attrs.into(), false)
    }

    fn update_with(&self, value: Option<&mut dyn Target>, attrs: Attrs, ignore_protected: bool) -> Db {
        self.run(Operation::Update, value, |scope| {
            scope.instance_set(UPDATE_INTERFACE, attrs);
            scope.instance_set(IGNORE_PROTECTED_ATTRS, ignore_protected);
            restrict_to_collection(scope);
        })
    }

    /// Sets one column without hooks, timestamps or association saves.
    pub fn update_column(&self, value: &mut dyn Target, column: &str, v: impl Into<Value>) -> Db {
        self.update_columns(value, Attrs::from_iter([(column, v.into())]))
    }

    pub fn update_columns(&self, value: &mut dyn Target, attrs: impl Into<Attrs>) -> Db {
        let attrs = attrs.into();
        self.set(UPDATE_COLUMN, true)
            .set(SAVE_ASSOCIATIONS, false)
            .run(Operation::Update, Some(value), |scope| {
                scope.instance_set(UPDATE_INTERFACE, attrs);
                restrict_to_collection(scope);
            })
    }

    /// Deletes `value`, or every matching row when its key is zero. Types
    /// with a `deleted_at` column are soft deleted unless `unscoped`.
    pub fn delete(&self, value: &mut dyn Target) -> Db {
        self.run(Operation::Delete, Some(value), restrict_to_collection)
    }

    pub fn delete_where(&self, value: &mut dyn Target, condition: impl Into<Condition>) -> Db {
        let condition = condition.into();
        self.run(Operation::Delete, Some(value), |scope| {
            scope.inline_condition([condition]);
            restrict_to_collection(scope);
        })
    }

    /// Executes a statement, binding its `?` placeholders.
    pub fn exec(&self, sql: impl Into<Fragment>) -> Db {
        let fragment = sql.into();
        let (db, _) = self.with_scope("exec", None, |scope| match scope.bind_fragment(&fragment) {
            Ok(sql) => {
                scope.set_sql(sql);
                scope.exec();
            }
            Err(err) => scope.err(err),
        });
        db
    }

    /// Executes a statement whose placeholders are already in the dialect's
    /// syntax.
    pub(crate) fn exec_statement(&self, stmt: Statement) -> Db {
        self.with_scope("exec", None, |scope| scope.run_statement(stmt)).0
    }
}
