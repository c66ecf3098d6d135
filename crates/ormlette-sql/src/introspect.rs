use super::Flavor;

use ormlette_core::dialect::exists;
use ormlette_core::{Connection, Result};

pub(crate) fn has_table(flavor: Flavor, conn: &dyn Connection, table: &str) -> Result<bool> {
    let sql = match flavor {
        Flavor::Sqlite => "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        Flavor::Postgresql => {
            "SELECT count(*) FROM information_schema.tables WHERE table_name = $1 AND table_type = 'BASE TABLE'"
        }
        Flavor::Mysql => {
            "SELECT count(*) FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ?"
        }
    };
    exists(conn, sql, &[table.into()])
}

pub(crate) fn has_column(
    flavor: Flavor,
    conn: &dyn Connection,
    table: &str,
    column: &str,
) -> Result<bool> {
    let sql = match flavor {
        Flavor::Sqlite => "SELECT count(*) FROM pragma_table_info(?1) WHERE name = ?2",
        Flavor::Postgresql => {
            "SELECT count(*) FROM information_schema.columns WHERE table_name = $1 AND column_name = $2"
        }
        Flavor::Mysql => {
            "SELECT count(*) FROM information_schema.columns WHERE table_schema = DATABASE() AND table_name = ? AND column_name = ?"
        }
    };
    exists(conn, sql, &[table.into(), column.into()])
}

pub(crate) fn has_index(
    flavor: Flavor,
    conn: &dyn Connection,
    table: &str,
    index: &str,
) -> Result<bool> {
    let sql = match flavor {
        Flavor::Sqlite => {
            "SELECT count(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND name = ?2"
        }
        Flavor::Postgresql => "SELECT count(*) FROM pg_indexes WHERE tablename = $1 AND indexname = $2",
        Flavor::Mysql => {
            "SELECT count(*) FROM information_schema.statistics WHERE table_schema = DATABASE() AND table_name = ? AND index_name = ?"
        }
    };
    exists(conn, sql, &[table.into(), index.into()])
}
