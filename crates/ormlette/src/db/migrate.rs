use super::Db;
use crate::Scope;

use ormlette_core::Record;

impl Db {
    /// Runs a migration against the table of `T`.
    fn migrate<T: Record, R>(&self, op: &'static str, f: impl FnOnce(&mut Scope<'_>) -> R) -> (Db, R) {
        let mut db = self.clone();
        db.value = None;

        let mut value = T::default();
        db.with_scope(op, Some(&mut value), f)
    }

    /// Runs a migration against the model or table of this handle.
    fn alter(&self, op: &'static str, f: impl FnOnce(&mut Scope<'_>)) -> Db {
        self.with_scope(op, None, f).0
    }

    /// Creates the table of `T`, its join tables and declared indexes.
    pub fn create_table<T: Record>(&self) -> Db {
        self.migrate::<T, _>("create_table", |scope| scope.create_table()).0
    }

    pub fn drop_table<T: Record>(&self) -> Db {
        self.migrate::<T, _>("drop_table", |scope| scope.drop_table()).0
    }

    pub fn drop_table_if_exists<T: Record>(&self) -> Db {
        self.migrate::<T, _>("drop_table_if_exists", |scope| scope.drop_table_if_exists())
            .0
    }

    /// Returns `false` when the table is missing or the lookup fails.
    pub fn has_table<T: Record>(&self) -> bool {
        self.migrate::<T, _>("has_table", |scope| scope.has_table()).1
    }

    /// Creates the table of `T` when missing, otherwise adds its missing
    /// columns. Existing columns are never changed or dropped.
    pub fn auto_migrate<T: Record>(&self) -> Db {
        self.migrate::<T, _>("auto_migrate", |scope| scope.auto_migrate()).0
    }

    /// Changes the type of a column of the model's table.
    pub fn modify_column(&self, column: &str, ty: &str) -> Db {
        self.alter("modify_column", |scope| scope.modify_column(column, ty))
    }

    pub fn drop_column(&self, column: &str) -> Db {
        self.alter("drop_column", |scope| scope.drop_column(column))
    }

    pub fn add_index(&self, name: &str, columns: &[&str]) -> Db {
        self.alter("add_index", |scope| scope.add_index(false, name, columns))
    }

    pub fn add_unique_index(&self, name: &str, columns: &[&str]) -> Db {
        self.alter("add_unique_index", |scope| scope.add_index(true, name, columns))
    }

    pub fn remove_index(&self, name: &str) -> Db {
        self.alter("remove_index", |scope| scope.remove_index(name))
    }

    /// Adds a foreign key from `column` to `destination`, e.g.
    /// `"users(id)"`.
    pub fn add_foreign_key(&self, column: &str, destination: &str, on_delete: &str, on_update: &str) -> Db {
        self.alter("add_foreign_key", |scope| {
            scope.add_foreign_key(column, destination, on_delete, on_update)
        })
    }
}
