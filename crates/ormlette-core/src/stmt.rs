mod expr;
pub use expr::{placeholder_offsets, Expr};

mod primitive;
pub use primitive::Primitive;

mod row;
pub use row::Row;

mod statement;
pub use statement::Statement;

mod ty;
pub use ty::Type;

mod value;
pub use value::Value;
