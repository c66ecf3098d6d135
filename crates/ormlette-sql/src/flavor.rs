use super::{introspect, ty};

use ormlette_core::stmt::Type;
use ormlette_core::{Connection, Dialect, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

/// [`Dialect`] for the SQL databases ormlette knows about.
#[derive(Debug, Clone, Copy)]
pub struct SqlDialect {
    flavor: Flavor,
}

impl SqlDialect {
    pub const fn new(flavor: Flavor) -> SqlDialect {
        SqlDialect { flavor }
    }

    pub const fn sqlite() -> SqlDialect {
        SqlDialect::new(Flavor::Sqlite)
    }

    pub const fn postgresql() -> SqlDialect {
        SqlDialect::new(Flavor::Postgresql)
    }

    pub const fn mysql() -> SqlDialect {
        SqlDialect::new(Flavor::Mysql)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }
}

impl Dialect for SqlDialect {
    fn name(&self) -> &'static str {
        match self.flavor {
            Flavor::Postgresql => "postgres",
            Flavor::Sqlite => "sqlite",
            Flavor::Mysql => "mysql",
        }
    }

    fn quote(&self, ident: &str) -> String {
        match self.flavor {
            Flavor::Mysql => format!("`{}`", ident.replace('`', "``")),
            Flavor::Postgresql | Flavor::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    fn bind_var(&self, index: usize) -> String {
        match self.flavor {
            Flavor::Mysql => "?".to_string(),
            Flavor::Postgresql => format!("${index}"),
            Flavor::Sqlite => format!("?{index}"),
        }
    }

    fn type_name(&self, ty: Type, size: Option<u32>) -> String {
        ty::type_name(self.flavor, ty, size)
    }

    fn auto_increment_type(&self, ty: Type) -> String {
        ty::auto_increment_type(self.flavor, ty)
    }

    fn limit_and_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let limit = match (self.flavor, limit, offset) {
            (_, Some(limit), _) => Some(limit.to_string()),
            // SQLite and MySQL only accept OFFSET after a LIMIT
            (Flavor::Sqlite, None, Some(_)) => Some("-1".to_string()),
            (Flavor::Mysql, None, Some(_)) => Some(u64::MAX.to_string()),
            _ => None,
        };

        let mut sql = String::new();
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql
    }

    fn insert_ignore_prefix(&self) -> &'static str {
        match self.flavor {
            Flavor::Sqlite => "INSERT OR IGNORE INTO",
            Flavor::Mysql => "INSERT IGNORE INTO",
            Flavor::Postgresql => "INSERT INTO",
        }
    }

    fn insert_ignore_suffix(&self) -> &'static str {
        match self.flavor {
            Flavor::Postgresql => " ON CONFLICT DO NOTHING",
            Flavor::Sqlite | Flavor::Mysql => "",
        }
    }

    fn select_from_dummy_table(&self) -> &'static str {
        match self.flavor {
            Flavor::Mysql => " FROM DUAL",
            Flavor::Postgresql | Flavor::Sqlite => "",
        }
    }

    fn default_values(&self) -> &'static str {
        match self.flavor {
            Flavor::Mysql => "VALUES ()",
            Flavor::Postgresql | Flavor::Sqlite => "DEFAULT VALUES",
        }
    }

    fn returning_primary_key(&self, column: &str) -> Option<String> {
        match self.flavor {
            Flavor::Postgresql => Some(format!(" RETURNING {}", self.quote(column))),
            Flavor::Sqlite | Flavor::Mysql => None,
        }
    }

    fn has_table(&self, conn: &dyn Connection, table: &str) -> Result<bool> {
        introspect::has_table(self.flavor, conn, table)
    }

    fn has_column(&self, conn: &dyn Connection, table: &str, column: &str) -> Result<bool> {
        introspect::has_column(self.flavor, conn, table, column)
    }

    fn has_index(&self, conn: &dyn Connection, table: &str, index: &str) -> Result<bool> {
        introspect::has_index(self.flavor, conn, table, index)
    }

    fn remove_index_sql(&self, table: &str, index: &str) -> String {
        match self.flavor {
            Flavor::Mysql => format!("DROP INDEX {} ON {}", self.quote(index), self.quote(table)),
            Flavor::Postgresql | Flavor::Sqlite => format!("DROP INDEX {}", self.quote(index)),
        }
    }

    fn modify_column_sql(&self, table: &str, column: &str, ty: &str) -> Result<String> {
        match self.flavor {
            Flavor::Postgresql => Ok(format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {ty}",
                self.quote(table),
                self.quote(column)
            )),
            Flavor::Mysql => Ok(format!(
                "ALTER TABLE {} MODIFY COLUMN {} {ty}",
                self.quote(table),
                self.quote(column)
            )),
            Flavor::Sqlite => Err(self.unsupported("modifying a column")),
        }
    }

    fn add_foreign_key_sql(
        &self,
        table: &str,
        name: &str,
        column: &str,
        destination: &str,
        on_delete: &str,
        on_update: &str,
    ) -> Result<String> {
        if self.flavor == Flavor::Sqlite {
            return Err(self.unsupported("adding a foreign key to an existing table"));
        }

        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {destination} ON DELETE {on_delete} ON UPDATE {on_update}",
            self.quote(table),
            self.quote(name),
            self.quote(column),
        ))
    }
}
