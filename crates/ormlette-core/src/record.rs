//! The contract between application structs and the engine.
//!
//! `#[derive(Record)]` implements [`Record`], [`Reflect`] and [`Target`] for a
//! struct. The engine only ever sees records through the object-safe
//! [`Reflect`] and [`Target`] traits, so a single code path handles every
//! record type, single records and collections alike.

use crate::stmt::{Type, Value};
use crate::{Error, Result};
use std::any::{Any, TypeId};
use std::fmt;

/// Identifies a record type at runtime.
#[derive(Clone, Copy)]
pub struct ModelType {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    def: fn() -> ModelDef,
    new_collection: fn() -> Box<dyn Target>,
}

impl ModelType {
    pub fn of<T: Record>() -> ModelType {
        ModelType {
            type_id: TypeId::of::<T>,
            type_name: std::any::type_name::<T>,
            def: T::model_def,
            new_collection: || Box::new(Vec::<T>::new()),
        }
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// The Rust path of the type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    pub fn def(&self) -> ModelDef {
        (self.def)()
    }

    /// An empty `Vec` of this record type.
    pub fn new_collection(&self) -> Box<dyn Target> {
        (self.new_collection)()
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &ModelType) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for ModelType {}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelType").field(&self.type_name()).finish()
    }
}

/// Static description of a record type.
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// Type name as written in the source, e.g. `UserProfile`.
    pub name: &'static str,

    /// Table name set with `#[table = "..."]`.
    pub table_name: Option<&'static str>,

    pub fields: Vec<FieldDef>,
}

impl ModelDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldTy,

    /// Raw tag settings, `KEY:VALUE;FLAG;...`.
    pub tag: &'static str,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    Primitive { ty: Type, nullable: bool },
    Relation { many: bool, target: ModelType },
}

/// An application struct mapped to a table.
pub trait Record: Reflect + Target + Default + Clone + 'static {
    fn model_def() -> ModelDef;
}

/// Dynamic access to the fields of one record.
pub trait Reflect: Any + Send + Sync + fmt::Debug {
    fn record_type(&self) -> ModelType;

    /// Reads a primitive field by its logical name.
    fn field(&self, name: &str) -> Option<Value>;

    /// Writes a primitive field by its logical name.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    /// Borrows a relation field as a load target.
    fn association(&self, name: &str) -> Option<&dyn Target>;

    fn association_mut(&mut self, name: &str) -> Option<&mut dyn Target>;

    /// Lifecycle hooks, when the record type opted in with `#[hooks]`.
    fn hooks(&mut self) -> Option<&mut dyn Hooks> {
        None
    }

    fn clone_record(&self) -> Box<dyn Reflect>;

    fn as_target(&self) -> &dyn Target;

    fn as_target_mut(&mut self) -> &mut dyn Target;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Somewhere query results can be written: a single record, an optional
/// record or a collection of records.
pub trait Target: Send + Sync + fmt::Debug {
    fn model_type(&self) -> ModelType;

    fn is_many(&self) -> bool;

    /// Returns `true` for `Option<T>`, which may legitimately stay empty.
    fn is_optional(&self) -> bool {
        false
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Removes every loaded record. A plain single record is left untouched.
    fn clear(&mut self);

    /// Makes room for one more record and returns it.
    ///
    /// Collections append a default record; single targets return the record
    /// itself so columns are scanned over its current values.
    fn push_default(&mut self) -> &mut dyn Reflect;

    /// Appends (or, for single targets, stores) a record of the same type.
    fn push_record(&mut self, record: Box<dyn Reflect>) -> Result<()>;

    fn clone_target(&self) -> Box<dyn Target>;
}

/// Optional lifecycle hooks.
///
/// A record type opts in with `#[hooks]` and implements the methods it needs.
/// An error returned from a hook stops the rest of the operation.
pub trait Hooks {
    fn before_save(&mut self) -> Result<()> {
        Ok(())
    }

    fn before_create(&mut self) -> Result<()> {
        Ok(())
    }

    fn after_create(&mut self) -> Result<()> {
        Ok(())
    }

    fn after_save(&mut self) -> Result<()> {
        Ok(())
    }

    fn before_update(&mut self) -> Result<()> {
        Ok(())
    }

    fn after_update(&mut self) -> Result<()> {
        Ok(())
    }

    fn before_delete(&mut self) -> Result<()> {
        Ok(())
    }

    fn after_delete(&mut self) -> Result<()> {
        Ok(())
    }

    fn after_find(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Takes ownership of a boxed record of type `T`.
pub fn downcast<T: Record>(record: Box<dyn Reflect>) -> Result<T> {
    let model_type = record.record_type();
    match record.into_any().downcast::<T>() {
        Ok(record) => Ok(*record),
        Err(_) => Err(Error::from_args(format_args!(
            "expected a `{}` record, got `{}`",
            std::any::type_name::<T>(),
            model_type.type_name()
        ))),
    }
}

impl<T: Record> Target for Vec<T> {
    fn model_type(&self) -> ModelType {
        ModelType::of::<T>()
    }

    fn is_many(&self) -> bool {
        true
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(|record| record as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(|record| record as &mut dyn Reflect)
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn push_default(&mut self) -> &mut dyn Reflect {
        self.push(T::default());
        let last = Vec::len(self) - 1;
        &mut self[last]
    }

    fn push_record(&mut self, record: Box<dyn Reflect>) -> Result<()> {
        self.push(downcast::<T>(record)?);
        Ok(())
    }

    fn clone_target(&self) -> Box<dyn Target> {
        Box::new(self.clone())
    }
}

impl<T: Record> Target for Option<T> {
    fn model_type(&self) -> ModelType {
        ModelType::of::<T>()
    }

    fn is_many(&self) -> bool {
        false
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn len(&self) -> usize {
        usize::from(self.is_some())
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        match (index, self) {
            (0, Some(record)) => Some(record),
            _ => None,
        }
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        match (index, self) {
            (0, Some(record)) => Some(record),
            _ => None,
        }
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn push_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn push_record(&mut self, record: Box<dyn Reflect>) -> Result<()> {
        *self = Some(downcast::<T>(record)?);
        Ok(())
    }

    fn clone_target(&self) -> Box<dyn Target> {
        Box::new(self.clone())
    }
}
