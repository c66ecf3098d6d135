mod flavor;
pub use flavor::{Flavor, SqlDialect};

mod introspect;

mod ty;

use ormlette_core::{Dialect, Error, Result};
use std::sync::Arc;

/// Looks a dialect up by the name passed to `Db::open`.
pub fn dialect(name: &str) -> Result<Arc<dyn Dialect>> {
    let flavor = match name.to_ascii_lowercase().as_str() {
        "sqlite" | "sqlite3" => Flavor::Sqlite,
        "postgres" | "postgresql" | "foundation" => Flavor::Postgresql,
        "mysql" => Flavor::Mysql,
        _ => return Err(Error::unknown_dialect(name)),
    };
    Ok(Arc::new(SqlDialect::new(flavor)))
}
