use super::ModelStruct;
use crate::ModelType;

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Memoized [`ModelStruct`]s, keyed by record type.
///
/// Entries are computed on first use and never change afterwards, except
/// that switching singular-table mode drops every entry at once.
#[derive(Debug, Default)]
pub struct StructCache {
    state: RwLock<State>,
    computations: AtomicUsize,
}

#[derive(Debug, Default)]
struct State {
    singular_table: bool,

    /// Bumped whenever naming changes, so a structure computed under the old
    /// naming is not inserted after the cache was cleared.
    generation: u64,

    entries: HashMap<TypeId, Arc<ModelStruct>>,
}

impl StructCache {
    pub fn new() -> StructCache {
        StructCache::default()
    }

    /// The process-wide cache used by handles that were not given their own.
    pub fn global() -> Arc<StructCache> {
        static GLOBAL: OnceLock<Arc<StructCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(StructCache::new())).clone()
    }

    pub fn resolve(&self, model_type: ModelType) -> Arc<ModelStruct> {
        let type_id = model_type.type_id();

        let (singular_table, generation) = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(model) = state.entries.get(&type_id) {
                return model.clone();
            }
            (state.singular_table, state.generation)
        };

        // Computed outside the lock; concurrent misses may compute the same
        // structure more than once and the first insert wins.
        let model = Arc::new(ModelStruct::build(model_type, singular_table));
        self.computations.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            model = model.name,
            table = %model.table_name,
            "resolved model structure"
        );

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation != generation {
            return model;
        }
        state.entries.entry(type_id).or_insert(model).clone()
    }

    /// Switches between singular and plural table names.
    ///
    /// Clears the cache so every type is resolved again under the new naming.
    pub fn set_singular_table(&self, enable: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.singular_table = enable;
        state.generation += 1;
        state.entries.clear();
    }

    pub fn singular_table(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .singular_table
    }

    /// Number of structures computed so far.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
