/// Storage type of a primitive record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I32,
    I64,
    U64,
    F64,
    String,
    Bytes,
}

impl Type {
    pub fn is_integer(self) -> bool {
        matches!(self, Type::I32 | Type::I64 | Type::U64)
    }
}
