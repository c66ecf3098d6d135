//! Named values attached to a handle lineage or to a single scope.
//!
//! The engine stores its own per-operation flags here under the `ormlette:`
//! prefix; callbacks registered by applications may use any other name.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Primary-key ordering added by `first` (`"ASC"`) and `last` (`"DESC"`).
pub const ORDER_BY_PRIMARY_KEY: &str = "ormlette:order_by_primary_key";

/// Attributes passed to `update`, `updates` and `update_columns`.
pub const UPDATE_INTERFACE: &str = "ormlette:update_interface";

/// Lets an update assign the primary key.
pub const IGNORE_PROTECTED_ATTRS: &str = "ormlette:ignore_protected_attrs";

/// Column-only update: no hooks, no timestamps.
pub const UPDATE_COLUMN: &str = "ormlette:update_column";

/// Set to `false` to stop create and update from saving associations.
pub const SAVE_ASSOCIATIONS: &str = "ormlette:save_associations";

/// `create_ignore` in progress.
pub const INSERT_IGNORE: &str = "ormlette:insert_ignore";

/// Columns an update writes, after change detection.
pub const UPDATE_ATTRS: &str = "ormlette:update_attrs";

/// Appended to `CREATE TABLE`, e.g. `ENGINE=InnoDB`.
pub const TABLE_OPTIONS: &str = "ormlette:table_options";

/// Restricts update and delete of a collection to the keys it holds.
pub(crate) const COLLECTION_KEYS: &str = "ormlette:collection_keys";

#[derive(Clone, Default)]
pub struct Settings {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Settings {
    pub fn new() -> Settings {
        Settings::default()
    }

    pub fn set<V: Any + Send + Sync>(&mut self, name: impl Into<String>, value: V) {
        self.values.insert(name.into(), Arc::new(value));
    }

    /// Returns the value stored under `name` when it has type `V`.
    pub fn get<V: Any + Clone>(&self, name: &str) -> Option<V> {
        self.values.get(name)?.downcast_ref::<V>().cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.values.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}
