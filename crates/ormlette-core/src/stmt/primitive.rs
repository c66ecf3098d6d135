use super::{Type, Value};
use crate::{Error, Result};

/// A Rust type that maps onto a single column.
pub trait Primitive: Sized {
    /// Whether the column accepts `NULL`.
    const NULLABLE: bool = false;

    fn ty() -> Type;

    /// Loads the field from a column value returned by the database.
    fn load(value: Value) -> Result<Self>;

    fn to_value(&self) -> Value;
}

impl Primitive for bool {
    fn ty() -> Type {
        Type::Bool
    }

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            // SQLite stores booleans as integers
            Value::I64(v) => Ok(v != 0),
            Value::I32(v) => Ok(v != 0),
            _ => Err(Error::type_conversion(value, "bool")),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Primitive for i32 {
    fn ty() -> Type {
        Type::I32
    }

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::I32(v) => Ok(v),
            Value::I64(v) => i32::try_from(v).map_err(|_| Error::type_conversion(value, "i32")),
            _ => Err(Error::type_conversion(value, "i32")),
        }
    }

    fn to_value(&self) -> Value {
        Value::I32(*self)
    }
}

impl Primitive for i64 {
    fn ty() -> Type {
        Type::I64
    }

    fn load(value: Value) -> Result<Self> {
        match value.as_i64() {
            Some(v) => Ok(v),
            None => Err(Error::type_conversion(value, "i64")),
        }
    }

    fn to_value(&self) -> Value {
        Value::I64(*self)
    }
}

impl Primitive for u64 {
    fn ty() -> Type {
        Type::U64
    }

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::U64(v) => Ok(v),
            Value::I64(v) => u64::try_from(v).map_err(|_| Error::type_conversion(value, "u64")),
            Value::I32(v) => u64::try_from(v).map_err(|_| Error::type_conversion(value, "u64")),
            _ => Err(Error::type_conversion(value, "u64")),
        }
    }

    fn to_value(&self) -> Value {
        Value::U64(*self)
    }
}

impl Primitive for f64 {
    fn ty() -> Type {
        Type::F64
    }

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::F64(v) => Ok(v),
            Value::I64(v) => Ok(v as f64),
            Value::I32(v) => Ok(v.into()),
            _ => Err(Error::type_conversion(value, "f64")),
        }
    }

    fn to_value(&self) -> Value {
        Value::F64(*self)
    }
}

impl Primitive for String {
    fn ty() -> Type {
        Type::String
    }

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            _ => Err(Error::type_conversion(value, "String")),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Primitive for Vec<u8> {
    fn ty() -> Type {
        Type::Bytes
    }

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::String(v) => Ok(v.into_bytes()),
            _ => Err(Error::type_conversion(value, "Vec<u8>")),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl<T: Primitive> Primitive for Option<T> {
    const NULLABLE: bool = true;

    fn ty() -> Type {
        T::ty()
    }

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::load(value).map(Some),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}
