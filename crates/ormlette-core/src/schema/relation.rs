use super::JoinTableHandler;
use crate::ModelType;

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    ManyToMany,
}

impl RelationKind {
    pub fn is_many(self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::ManyToMany)
    }
}

/// How a relation field connects the owner to the associated type.
///
/// | kind | `foreign_*` | `association_*` |
/// |---|---|---|
/// | belongs-to | owner field holding the key | associated primary key |
/// | has-one / has-many | associated field holding the key | owner primary key |
/// | many-to-many | owner primary key / join column | associated primary key / join column |
#[derive(Debug, Clone)]
pub struct Relationship {
    pub kind: RelationKind,
    pub target: ModelType,
    pub foreign_field: String,
    pub foreign_column: String,
    pub association_field: String,
    pub association_column: String,
    pub join_table: Option<Arc<dyn JoinTableHandler>>,
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Relationship) -> bool {
        self.kind == other.kind
            && self.target == other.target
            && self.foreign_field == other.foreign_field
            && self.foreign_column == other.foreign_column
            && self.association_field == other.association_field
            && self.association_column == other.association_column
            && self.join_table.as_ref().map(|handler| handler.table_name())
                == other.join_table.as_ref().map(|handler| handler.table_name())
    }
}
