pub mod dialect;
pub use dialect::Dialect;

pub mod driver;
pub use driver::Connection;

mod error;
pub use error::{Error, IntoError};

pub mod record;
pub use record::{Hooks, ModelType, Record, Reflect, Target};

pub mod schema;

pub mod stmt;

pub type Result<T, E = Error> = core::result::Result<T, E>;
