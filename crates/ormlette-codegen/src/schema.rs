mod auto;
pub(crate) use auto::AutoStrategy;

mod column;
pub(crate) use column::Column;

mod error;
pub(crate) use error::ErrorSet;

mod field;
pub(crate) use field::{Field, FieldTy, RelationTy};

mod model;
pub(crate) use model::Model;

mod model_attr;
pub(crate) use model_attr::ModelAttr;

mod relation;
pub(crate) use relation::Relation;
