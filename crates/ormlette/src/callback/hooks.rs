use crate::settings::UPDATE_COLUMN;
use crate::Scope;

use ormlette_core::{Hooks, Result};

/// Runs `f` on the hooks of every record in the value that has them.
fn run(scope: &mut Scope<'_>, f: impl Fn(&mut dyn Hooks) -> Result<()>) {
    let result = scope.each_record_mut(|record| match record.hooks() {
        Some(hooks) => f(hooks),
        None => Ok(()),
    });
    if let Err(err) = result {
        scope.err(err);
    }
}

fn column_only(scope: &Scope<'_>) -> bool {
    scope.get::<bool>(UPDATE_COLUMN).unwrap_or(false)
}

pub(super) fn before_create(scope: &mut Scope<'_>) {
    run(scope, |hooks| {
        hooks.before_save()?;
        hooks.before_create()
    });
}

pub(super) fn after_create(scope: &mut Scope<'_>) {
    run(scope, |hooks| {
        hooks.after_create()?;
        hooks.after_save()
    });
}

pub(super) fn before_update(scope: &mut Scope<'_>) {
    if column_only(scope) {
        return;
    }
    run(scope, |hooks| {
        hooks.before_save()?;
        hooks.before_update()
    });
}

pub(super) fn after_update(scope: &mut Scope<'_>) {
    if column_only(scope) {
        return;
    }
    run(scope, |hooks| {
        hooks.after_update()?;
        hooks.after_save()
    });
}

pub(super) fn before_delete(scope: &mut Scope<'_>) {
    run(scope, |hooks| hooks.before_delete());
}

pub(super) fn after_delete(scope: &mut Scope<'_>) {
    run(scope, |hooks| hooks.after_delete());
}

pub(super) fn after_query(scope: &mut Scope<'_>) {
    run(scope, |hooks| hooks.after_find());
}
