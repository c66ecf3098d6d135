use super::Flavor;

use ormlette_core::stmt::Type;

const DEFAULT_STRING_SIZE: u32 = 255;

pub(crate) fn type_name(flavor: Flavor, ty: Type, size: Option<u32>) -> String {
    let size = size.unwrap_or(DEFAULT_STRING_SIZE);

    match (flavor, ty) {
        (Flavor::Sqlite, Type::Bool) => "bool".into(),
        (Flavor::Sqlite, Type::I32) => "integer".into(),
        (Flavor::Sqlite, Type::I64 | Type::U64) => "bigint".into(),
        (Flavor::Sqlite, Type::F64) => "real".into(),
        (Flavor::Sqlite, Type::String) => format!("varchar({size})"),
        (Flavor::Sqlite, Type::Bytes) => "blob".into(),

        (Flavor::Postgresql, Type::Bool) => "boolean".into(),
        (Flavor::Postgresql, Type::I32) => "integer".into(),
        (Flavor::Postgresql, Type::I64 | Type::U64) => "bigint".into(),
        (Flavor::Postgresql, Type::F64) => "double precision".into(),
        (Flavor::Postgresql, Type::String) if size < 65532 => format!("varchar({size})"),
        (Flavor::Postgresql, Type::String) => "text".into(),
        (Flavor::Postgresql, Type::Bytes) => "bytea".into(),

        (Flavor::Mysql, Type::Bool) => "boolean".into(),
        (Flavor::Mysql, Type::I32) => "int".into(),
        (Flavor::Mysql, Type::I64) => "bigint".into(),
        (Flavor::Mysql, Type::U64) => "bigint unsigned".into(),
        (Flavor::Mysql, Type::F64) => "double".into(),
        (Flavor::Mysql, Type::String) if size < 65532 => format!("varchar({size})"),
        (Flavor::Mysql, Type::String) => "longtext".into(),
        (Flavor::Mysql, Type::Bytes) => "longblob".into(),
    }
}

pub(crate) fn auto_increment_type(flavor: Flavor, ty: Type) -> String {
    match (flavor, ty) {
        // SQLite only auto-increments an INTEGER PRIMARY KEY
        (Flavor::Sqlite, _) => "integer primary key autoincrement".into(),
        (Flavor::Postgresql, Type::I32) => "serial".into(),
        (Flavor::Postgresql, _) => "bigserial".into(),
        (Flavor::Mysql, Type::I32) => "int AUTO_INCREMENT".into(),
        (Flavor::Mysql, Type::U64) => "bigint unsigned AUTO_INCREMENT".into(),
        (Flavor::Mysql, _) => "bigint AUTO_INCREMENT".into(),
    }
}
