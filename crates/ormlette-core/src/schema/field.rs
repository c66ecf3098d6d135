use super::{Relationship, TagSettings};
use crate::stmt::{Type, Value};

/// Mapping metadata for one struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    /// Field name in the Rust struct.
    pub name: &'static str,

    /// Column name in the table.
    pub db_name: String,

    /// Storage type; `None` for relation fields.
    pub ty: Option<Type>,

    pub nullable: bool,

    pub settings: TagSettings,

    pub primary_key: bool,

    /// The database generates the value on insert.
    pub auto_increment: bool,

    /// A blank value is replaced by a random UUID on insert.
    pub generate_uuid: bool,

    /// Set for relation fields that could be classified.
    pub relationship: Option<Relationship>,
}

impl StructField {
    /// Returns `true` for a field stored in a column.
    pub fn is_normal(&self) -> bool {
        self.ty.is_some()
    }

    pub fn is_relation(&self) -> bool {
        self.ty.is_none()
    }

    pub fn is_zero(&self, value: &Value) -> bool {
        value.is_zero()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.db_name == name
    }

    pub fn size(&self) -> Option<u32> {
        self.settings.get("SIZE").and_then(|size| size.parse().ok())
    }
}
