use crate::criteria::Attrs;
use crate::settings::SAVE_ASSOCIATIONS;
use crate::{Db, Scope};

use ormlette_core::schema::{RelationKind, Relationship, StructField};
use ormlette_core::stmt::Value;
use ormlette_core::{Reflect, Result, Target};

fn enabled(scope: &Scope<'_>) -> bool {
    scope.get::<bool>(SAVE_ASSOCIATIONS).unwrap_or(true)
}

/// A record with every field at its zero value is not saved.
fn is_blank(record: &dyn Reflect) -> bool {
    Attrs::from_record(record).is_empty()
}

/// Snapshot of one relation field of the record being saved.
struct Pending {
    field: StructField,
    relationship: Relationship,
    value: Box<dyn Target>,
}

fn pending_associations(scope: &Scope<'_>, kinds: &[RelationKind]) -> Vec<Pending> {
    let (Some(model), Some(record)) = (scope.value_model(), scope.record()) else {
        return vec![];
    };

    model
        .relationships()
        .filter(|(_, relationship)| kinds.contains(&relationship.kind))
        .filter_map(|(field, relationship)| {
            let value = record.association(field.name)?;
            if value.is_empty() {
                return None;
            }
            Some(Pending {
                field: field.clone(),
                relationship: relationship.clone(),
                value: value.clone_target(),
            })
        })
        .collect()
}

/// Saves a single associated record through a nested handle.
fn save_record(db: &Db, record: &mut dyn Reflect) -> Result<()> {
    let saved = db.save(record.as_target_mut());
    match saved.error() {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

/// Writes a saved association back onto the record being saved.
fn store(scope: &mut Scope<'_>, name: &str, value: &dyn Target) -> Result<()> {
    let Some(record) = scope.record_mut() else {
        return Ok(());
    };
    let Some(target) = record.association_mut(name) else {
        return Ok(());
    };

    target.clear();
    for index in 0..value.len() {
        if let Some(saved) = value.get(index) {
            target.push_record(saved.clone_record())?;
        }
    }
    Ok(())
}

/// Saves belongs-to records first so the owner can store their keys.
pub(super) fn save_before_associations(scope: &mut Scope<'_>) {
    if !enabled(scope) {
        return;
    }

    if let Err(err) = save_before(scope) {
        scope.err(err);
    }
}

fn save_before(scope: &mut Scope<'_>) -> Result<()> {
    let db = scope.new_db();

    for mut pending in pending_associations(scope, &[RelationKind::BelongsTo]) {
        let Some(associated) = pending.value.get_mut(0) else {
            continue;
        };
        if is_blank(associated) {
            continue;
        }

        save_record(&db, associated)?;
        let key = associated
            .field(&pending.relationship.association_field)
            .unwrap_or_default();

        store(scope, pending.field.name, &*pending.value)?;
        if let Some(record) = scope.record_mut() {
            record.set_field(&pending.relationship.foreign_field, key)?;
        }
    }
    Ok(())
}

/// Saves has-one, has-many and many-to-many records once the owner has a
/// key, pointing them at the owner or linking them through the join table.
pub(super) fn save_after_associations(scope: &mut Scope<'_>) {
    if !enabled(scope) {
        return;
    }

    let rows_affected = scope.db.rows_affected;
    if let Err(err) = save_after(scope) {
        scope.err(err);
    }
    scope.db.rows_affected = rows_affected;
}

fn save_after(scope: &mut Scope<'_>) -> Result<()> {
    let db = scope.new_db();
    let kinds = [
        RelationKind::HasOne,
        RelationKind::HasMany,
        RelationKind::ManyToMany,
    ];

    for mut pending in pending_associations(scope, &kinds) {
        let relationship = &pending.relationship;
        let owner_field = match relationship.kind {
            RelationKind::ManyToMany => &relationship.foreign_field,
            _ => &relationship.association_field,
        };
        let Some(owner_key) = scope
            .record()
            .and_then(|record| record.field(owner_field))
            .filter(|key| !key.is_zero())
        else {
            continue;
        };

        let handler = match relationship.kind {
            RelationKind::ManyToMany => scope.join_table_handler(&pending.field),
            _ => None,
        };

        let mut links: Vec<Value> = vec![];
        for index in 0..pending.value.len() {
            let Some(associated) = pending.value.get_mut(index) else {
                continue;
            };
            if is_blank(associated) {
                continue;
            }

            if relationship.kind != RelationKind::ManyToMany {
                associated.set_field(&relationship.foreign_field, owner_key.clone())?;
            }
            save_record(&db, associated)?;

            if let Some(key) = associated.field(&relationship.association_field) {
                links.push(key);
            }
        }

        if let Some(handler) = handler {
            for key in &links {
                let stmt = handler.link(scope.dialect(), &owner_key, key);
                scope.run_statement(stmt);
            }
            if let Some(err) = scope.error() {
                return Err(err.clone());
            }
        }

        store(scope, pending.field.name, &*pending.value)?;
    }
    Ok(())
}
