//! Named, ordered steps run for each kind of operation.
//!
//! Every terminal operation runs one [`Chain`]. Steps communicate through the
//! [`Scope`]: once a step records an error or calls [`Scope::skip_left`], the
//! remaining steps are skipped. Applications customize a handle's pipeline
//! with [`Db::callback_mut`](crate::Db::callback_mut); the change is visible
//! to that handle and handles cloned from it.

mod associations;
mod create;
mod delete;
mod hooks;
mod preload;
mod query;
mod update;

use crate::Scope;

use ormlette_core::{Error, Result};

use std::fmt;
use std::sync::Arc;

/// A callback step.
pub type Step = Arc<dyn Fn(&mut Scope<'_>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Query,
    Update,
    Delete,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Query => "query",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<(String, Step)>,
}

impl Chain {
    pub fn new() -> Chain {
        Chain::default()
    }

    /// Appends a step.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        step: impl Fn(&mut Scope<'_>) + Send + Sync + 'static,
    ) -> Result<&mut Chain> {
        let name = self.unused(name.into())?;
        self.steps.push((name, Arc::new(step)));
        Ok(self)
    }

    /// Inserts a step right before `anchor`.
    pub fn before(
        &mut self,
        anchor: &str,
        name: impl Into<String>,
        step: impl Fn(&mut Scope<'_>) + Send + Sync + 'static,
    ) -> Result<&mut Chain> {
        let name = self.unused(name.into())?;
        let index = self.position(anchor)?;
        self.steps.insert(index, (name, Arc::new(step)));
        Ok(self)
    }

    /// Inserts a step right after `anchor`.
    pub fn after(
        &mut self,
        anchor: &str,
        name: impl Into<String>,
        step: impl Fn(&mut Scope<'_>) + Send + Sync + 'static,
    ) -> Result<&mut Chain> {
        let name = self.unused(name.into())?;
        let index = self.position(anchor)?;
        self.steps.insert(index + 1, (name, Arc::new(step)));
        Ok(self)
    }

    /// Swaps the step registered as `anchor`, keeping its name and position.
    pub fn replace(
        &mut self,
        anchor: &str,
        step: impl Fn(&mut Scope<'_>) + Send + Sync + 'static,
    ) -> Result<&mut Chain> {
        let index = self.position(anchor)?;
        self.steps[index].1 = Arc::new(step);
        Ok(self)
    }

    pub fn remove(&mut self, anchor: &str) -> Result<&mut Chain> {
        let index = self.position(anchor)?;
        self.steps.remove(index);
        Ok(self)
    }

    /// Step names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.iter().any(|(step, _)| step == name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn run(&self, scope: &mut Scope<'_>) {
        for (name, step) in &self.steps {
            if scope.has_error() || scope.is_skipped() {
                break;
            }
            tracing::trace!(step = %name, "running callback");
            step(scope);
        }
    }

    fn position(&self, anchor: &str) -> Result<usize> {
        self.steps
            .iter()
            .position(|(name, _)| name == anchor)
            .ok_or_else(|| Error::invalid_callback(format!("no callback named `{anchor}`")))
    }

    fn unused(&self, name: String) -> Result<String> {
        if self.contains(&name) {
            return Err(Error::invalid_callback(format!(
                "a callback named `{name}` is already registered"
            )));
        }
        Ok(name)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// The four chains of a handle.
#[derive(Debug, Clone, Default)]
pub struct Callbacks {
    creates: Chain,
    queries: Chain,
    updates: Chain,
    deletes: Chain,
}

impl Callbacks {
    /// Empty chains.
    pub fn new() -> Callbacks {
        Callbacks::default()
    }

    /// The chains every handle starts with.
    pub fn default_chains() -> Callbacks {
        let mut callbacks = Callbacks::new();
        callbacks.creates = chain([
            ("ormlette:before_create", Arc::new(hooks::before_create) as Step),
            (
                "ormlette:save_before_associations",
                Arc::new(associations::save_before_associations),
            ),
            ("ormlette:update_time_stamp", Arc::new(create::update_time_stamp)),
            ("ormlette:create", Arc::new(create::create)),
            (
                "ormlette:save_after_associations",
                Arc::new(associations::save_after_associations),
            ),
            ("ormlette:after_create", Arc::new(hooks::after_create)),
        ]);
        callbacks.queries = chain([
            ("ormlette:query", Arc::new(query::query) as Step),
            ("ormlette:preload", Arc::new(preload::preload)),
            ("ormlette:after_query", Arc::new(hooks::after_query)),
        ]);
        callbacks.updates = chain([
            (
                "ormlette:assign_update_attributes",
                Arc::new(update::assign_update_attributes) as Step,
            ),
            ("ormlette:before_update", Arc::new(hooks::before_update)),
            (
                "ormlette:save_before_associations",
                Arc::new(associations::save_before_associations),
            ),
            ("ormlette:update_time_stamp", Arc::new(update::update_time_stamp)),
            ("ormlette:update", Arc::new(update::update)),
            (
                "ormlette:save_after_associations",
                Arc::new(associations::save_after_associations),
            ),
            ("ormlette:after_update", Arc::new(hooks::after_update)),
        ]);
        callbacks.deletes = chain([
            ("ormlette:before_delete", Arc::new(hooks::before_delete) as Step),
            ("ormlette:delete", Arc::new(delete::delete)),
            ("ormlette:after_delete", Arc::new(hooks::after_delete)),
        ]);
        callbacks
    }

    pub fn create(&mut self) -> &mut Chain {
        &mut self.creates
    }

    pub fn query(&mut self) -> &mut Chain {
        &mut self.queries
    }

    pub fn update(&mut self) -> &mut Chain {
        &mut self.updates
    }

    pub fn delete(&mut self) -> &mut Chain {
        &mut self.deletes
    }

    pub fn chain(&self, operation: Operation) -> &Chain {
        match operation {
            Operation::Create => &self.creates,
            Operation::Query => &self.queries,
            Operation::Update => &self.updates,
            Operation::Delete => &self.deletes,
        }
    }
}

fn chain<const N: usize>(steps: [(&str, Step); N]) -> Chain {
    Chain {
        steps: steps
            .into_iter()
            .map(|(name, step)| (name.to_string(), step))
            .collect(),
    }
}
