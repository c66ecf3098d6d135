use super::Scope;
use crate::settings::TABLE_OPTIONS;

use ormlette_core::schema::{ModelStruct, RelationKind, StructField};
use ormlette_core::Result;

use indexmap::IndexMap;
use std::sync::Arc;

impl Scope<'_> {
    fn run_ddl(&mut self, sql: String) {
        self.reset_statement();
        self.set_sql(sql);
        self.exec();
    }

    fn try_or_err<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.err(err);
                None
            }
        }
    }

    fn migration_model(&mut self) -> Option<Arc<ModelStruct>> {
        let model = self.model_arc();
        if model.is_none() {
            self.err(ormlette_core::err!("migrations need a model or a table"));
        }
        model
    }

    fn migration_table(&mut self) -> Option<String> {
        let table = self.table_name();
        if table.is_empty() {
            self.err(ormlette_core::err!("migrations need a model or a table"));
            return None;
        }
        Some(table)
    }

    fn column_definition(&self, field: &StructField) -> Result<String> {
        let mut sql = format!(
            "{} {}",
            self.quote(&field.db_name),
            self.dialect().sql_type(field)?
        );
        if field.settings.contains("NOT NULL") {
            sql.push_str(" NOT NULL");
        }
        if field.settings.contains("UNIQUE") {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = field.settings.get("DEFAULT") {
            sql.push_str(&format!(" DEFAULT {default}"));
        }
        Ok(sql)
    }

    pub fn has_table(&mut self) -> bool {
        let table = self.table_name();
        let conn = self.db.conn.clone();
        let result = self.dialect().has_table(&*conn, &table);
        self.try_or_err(result).unwrap_or(false)
    }

    pub fn create_table(&mut self) {
        let Some(model) = self.migration_model() else {
            return;
        };

        let mut columns = vec![];
        let mut primary_keys = vec![];
        let mut inline_primary_key = false;

        for field in model.normal_fields() {
            let Some(column) = self.try_or_err(self.column_definition(field)) else {
                return;
            };
            if field.primary_key {
                primary_keys.push(self.quote(&field.db_name));
                inline_primary_key |= column.to_lowercase().contains("primary key");
            }
            columns.push(column);
        }

        let primary_key = if !primary_keys.is_empty() && !inline_primary_key {
            format!(", PRIMARY KEY ({})", primary_keys.join(","))
        } else {
            String::new()
        };
        let options = self
            .get::<String>(TABLE_OPTIONS)
            .map(|options| format!(" {options}"))
            .unwrap_or_default();

        let sql = format!(
            "CREATE TABLE {} ({}{primary_key}){options}",
            self.quoted_table_name(),
            columns.join(",")
        );
        self.run_ddl(sql);

        self.create_join_tables();
        self.auto_index();
    }

    pub fn drop_table(&mut self) {
        let sql = format!("DROP TABLE {}", self.quoted_table_name());
        self.run_ddl(sql);
    }

    pub fn drop_table_if_exists(&mut self) {
        if self.has_table() {
            self.drop_table();
        }
    }

    /// Creates the table when it is missing, otherwise adds missing columns;
    /// then ensures join tables and declared indexes.
    pub fn auto_migrate(&mut self) {
        if !self.has_table() {
            self.create_table();
            return;
        }

        let Some(model) = self.migration_model() else {
            return;
        };
        let table = self.table_name();
        let conn = self.db.conn.clone();

        for field in model.normal_fields() {
            let exists = self.dialect().has_column(&*conn, &table, &field.db_name);
            match self.try_or_err(exists) {
                Some(true) => {}
                Some(false) => {
                    let Some(column) = self.try_or_err(self.column_definition(field)) else {
                        return;
                    };
                    let sql = format!("ALTER TABLE {} ADD {column}", self.quoted_table_name());
                    self.run_ddl(sql);
                }
                None => return,
            }
        }

        self.create_join_tables();
        self.auto_index();
    }

    fn create_join_tables(&mut self) {
        let Some(model) = self.value_model_arc() else {
            return;
        };

        for (field, relationship) in model.relationships() {
            if relationship.kind != RelationKind::ManyToMany {
                continue;
            }
            if let Some(handler) = self.join_table_handler(field) {
                let stmt = handler.ensure_schema(self.dialect());
                self.run_statement(stmt);
            }
        }
    }

    /// Creates the indexes declared with `INDEX` and `UNIQUE_INDEX` tags.
    ///
    /// Fields naming the same index share it, in field order.
    fn auto_index(&mut self) {
        let Some(model) = self.model_arc() else {
            return;
        };
        let table = self.table_name();

        let mut indexes: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut unique_indexes: IndexMap<String, Vec<String>> = IndexMap::new();
        for field in model.normal_fields() {
            if let Some(name) = field.settings.get("INDEX") {
                let name = match name {
                    "INDEX" => format!("idx_{table}_{}", field.db_name),
                    name => name.to_string(),
                };
                indexes.entry(name).or_default().push(field.db_name.clone());
            }
            if let Some(name) = field.settings.get("UNIQUE_INDEX") {
                let name = match name {
                    "UNIQUE_INDEX" => format!("uix_{table}_{}", field.db_name),
                    name => name.to_string(),
                };
                unique_indexes
                    .entry(name)
                    .or_default()
                    .push(field.db_name.clone());
            }
        }

        let conn = self.db.conn.clone();
        let all = indexes
            .into_iter()
            .map(|index| (false, index))
            .chain(unique_indexes.into_iter().map(|index| (true, index)));
        for (unique, (name, columns)) in all {
            let exists = self.dialect().has_index(&*conn, &table, &name);
            match self.try_or_err(exists) {
                Some(true) => {}
                Some(false) => self.create_index(unique, &name, &columns),
                None => return,
            }
        }
    }

    pub fn add_index(&mut self, unique: bool, name: &str, columns: &[impl AsRef<str>]) {
        if self.migration_table().is_none() {
            return;
        }
        if self.has_index(name) {
            self.err(ormlette_core::err!("index `{name}` already exists"));
            return;
        }
        let columns: Vec<_> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self.create_index(unique, name, &columns);
    }

    fn create_index(&mut self, unique: bool, name: &str, columns: &[String]) {
        let columns: Vec<_> = columns
            .iter()
            .map(|column| self.quote(column))
            .collect();
        let sql = format!(
            "CREATE {}INDEX {} ON {}({})",
            if unique { "UNIQUE " } else { "" },
            self.quote(name),
            self.quoted_table_name(),
            columns.join(", ")
        );
        self.run_ddl(sql);
    }

    fn has_index(&mut self, name: &str) -> bool {
        let table = self.table_name();
        let conn = self.db.conn.clone();
        let result = self.dialect().has_index(&*conn, &table, name);
        self.try_or_err(result).unwrap_or(false)
    }

    pub fn remove_index(&mut self, name: &str) {
        let Some(table) = self.migration_table() else {
            return;
        };
        let sql = self.dialect().remove_index_sql(&table, name);
        self.run_ddl(sql);
    }

    pub fn modify_column(&mut self, column: &str, ty: &str) {
        let Some(table) = self.migration_table() else {
            return;
        };
        let sql = self.dialect().modify_column_sql(&table, column, ty);
        if let Some(sql) = self.try_or_err(sql) {
            self.run_ddl(sql);
        }
    }

    pub fn drop_column(&mut self, column: &str) {
        if self.migration_table().is_none() {
            return;
        }
        let sql = format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quoted_table_name(),
            self.quote(column)
        );
        self.run_ddl(sql);
    }

    pub fn add_foreign_key(
        &mut self,
        column: &str,
        destination: &str,
        on_delete: &str,
        on_update: &str,
    ) {
        let Some(table) = self.migration_table() else {
            return;
        };
        let name = foreign_key_name(&table, column, destination);
        let sql = self.dialect().add_foreign_key_sql(
            &table,
            &name,
            column,
            destination,
            on_delete,
            on_update,
        );
        if let Some(sql) = self.try_or_err(sql) {
            self.run_ddl(sql);
        }
    }
}

/// `{table}_{column}_{destination}_foreign`, with anything but ASCII
/// letters and digits replaced by `_`.
fn foreign_key_name(table: &str, column: &str, destination: &str) -> String {
    format!("{table}_{column}_{destination}_foreign")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
