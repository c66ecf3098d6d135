pub mod association;
pub use association::Association;

pub mod callback;
pub use callback::{Callbacks, Chain, Operation, Step};

pub mod criteria;
pub use criteria::{Attrs, Combinator, Condition, Criteria, Fragment, Preload, Term};

pub mod db;
pub use db::{Builder, Db};

mod logger;
pub use logger::LogMode;

pub mod scope;
pub use scope::Scope;

pub mod settings;
pub use settings::Settings;

pub use ormlette_core::{
    driver::{self, Connection, ExecResult},
    schema::{self, JoinTableHandler, StructCache},
    stmt::{Expr, Primitive, Row, Type, Value},
    Dialect, Error, Hooks, ModelType, Record, Reflect, Result, Target,
};

pub use ormlette_macros::Record;

/// Builds an [`Attrs`] map, keeping the order the entries are written in.
///
/// ```ignore
/// db.filter(attrs! { "name" => "jinzhu", "age" => 20 })
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Attrs::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attrs = $crate::Attrs::new();
        $( attrs.insert($name, $value); )+
        attrs
    }};
}

#[doc(hidden)]
pub mod codegen_support {
    pub use ormlette_core::record::{
        downcast, FieldDef, FieldTy, Hooks, ModelDef, ModelType, Record, Reflect, Target,
    };
    pub use ormlette_core::stmt::{Primitive, Value};
    pub use ormlette_core::{Error, Result};
}
