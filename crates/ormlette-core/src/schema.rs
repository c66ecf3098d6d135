mod cache;
pub use cache::StructCache;

mod field;
pub use field::StructField;

mod join_table;
pub use join_table::{DefaultJoinTableHandler, JoinSelection, JoinTableHandler, JoinTableSide};

mod model;
pub use model::ModelStruct;

mod relation;
pub use relation::{RelationKind, Relationship};

mod tag;
pub use tag::TagSettings;
