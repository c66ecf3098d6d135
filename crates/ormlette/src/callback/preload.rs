use crate::criteria::{Attrs, Condition, Fragment};
use crate::scope::scan_row;
use crate::{Db, Scope};

use ormlette_core::schema::{JoinSelection, ModelStruct, RelationKind, Relationship, StructField};
use ormlette_core::stmt::Value;
use ormlette_core::{Error, Reflect, Result, Target};

use std::collections::HashSet;
use std::sync::Arc;

/// Loads the associations registered with `preload`, one query per name in
/// registration order.
///
/// A nested name such as `orders.items` loads `orders` first unless it was
/// registered on its own.
pub(super) fn preload(scope: &mut Scope<'_>) {
    let preloads = scope.criteria().preloads().to_vec();
    if preloads.is_empty() {
        return;
    }
    let Some(model) = scope.value_model_arc() else {
        return;
    };
    let db = scope.new_db();

    let Some(value) = scope.value_mut() else {
        return;
    };
    if let Err(err) = preload_all(&db, &model, value, &preloads) {
        scope.err(err);
    }
}

fn preload_all(
    db: &Db,
    model: &ModelStruct,
    value: &mut dyn Target,
    preloads: &[crate::Preload],
) -> Result<()> {
    let mut loaded = HashSet::new();

    for preload in preloads {
        let path: Vec<&str> = preload.name.split('.').collect();
        for depth in 1..=path.len() {
            let prefix = path[..depth].join(".");
            let last = depth == path.len();
            if !last && loaded.contains(&prefix) {
                continue;
            }

            let conditions = if last { &preload.conditions[..] } else { &[] };
            preload_path(db, model, value, &path[..depth], conditions)?;
            loaded.insert(prefix);
        }
    }
    Ok(())
}

/// Loads the last segment of `path` onto the records reached by walking the
/// earlier segments.
fn preload_path(
    db: &Db,
    model: &ModelStruct,
    value: &mut dyn Target,
    path: &[&str],
    conditions: &[Condition],
) -> Result<()> {
    let (name, rest) = match path {
        [name] => return preload_field(db, model, value, name, conditions),
        [name, rest @ ..] => (*name, rest),
        [] => return Ok(()),
    };

    let (field, relationship) = relation(model, name)?;
    let child_model = db.cache().resolve(relationship.target);

    // Gather every loaded child into one collection, load the rest of the
    // path on it, then hand the children back to their owners.
    let mut children = relationship.target.new_collection();
    for owner in records(value) {
        if let Some(loaded) = owner.association(field.name) {
            for index in 0..loaded.len() {
                if let Some(child) = loaded.get(index) {
                    children.push_record(child.clone_record())?;
                }
            }
        }
    }
    if children.is_empty() {
        return Ok(());
    }

    preload_path(db, &child_model, &mut *children, rest, conditions)?;

    let Some(primary) = child_model.primary_field() else {
        return Ok(());
    };
    for index in 0..value.len() {
        let Some(target) = value
            .get_mut(index)
            .and_then(|owner| owner.association_mut(field.name))
        else {
            continue;
        };

        let keys: Vec<Value> = (0..target.len())
            .filter_map(|i| target.get(i)?.field(primary.name))
            .collect();
        target.clear();
        for key in &keys {
            let loaded = records(&*children)
                .find(|child| child.field(primary.name).is_some_and(|k| k.key_eq(key)));
            if let Some(child) = loaded {
                target.push_record(child.clone_record())?;
            }
        }
    }
    Ok(())
}

fn relation<'m>(model: &'m ModelStruct, name: &str) -> Result<(&'m StructField, &'m Relationship)> {
    let field = model
        .fields
        .iter()
        .find(|field| field.name == name || field.db_name == name)
        .ok_or_else(|| {
            Error::invalid_association(format!("can't preload field `{name}` for `{}`", model.name))
        })?;
    let relationship = field.relationship.as_ref().ok_or_else(|| {
        Error::invalid_association(format!(
            "field `{name}` of `{}` is not a relationship",
            model.name
        ))
    })?;
    Ok((field, relationship))
}

fn records(value: &dyn Target) -> impl Iterator<Item = &dyn Reflect> {
    (0..value.len()).filter_map(move |index| value.get(index))
}

/// Distinct non-zero values of `field` across the owners.
fn distinct_keys(value: &dyn Target, field: &str) -> Vec<Value> {
    let mut keys: Vec<Value> = vec![];
    for key in records(value).filter_map(|owner| owner.field(field)) {
        if !key.is_zero() && !keys.iter().any(|seen| seen.key_eq(&key)) {
            keys.push(key);
        }
    }
    keys
}

fn filtered(db: Db, conditions: &[Condition]) -> Db {
    conditions
        .iter()
        .fold(db, |db, condition| db.filter(condition.clone()))
}

fn fail_on(db: &Db) -> Result<()> {
    match db.error() {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

fn preload_field(
    db: &Db,
    model: &ModelStruct,
    value: &mut dyn Target,
    name: &str,
    conditions: &[Condition],
) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }

    let (field, relationship) = relation(model, name)?;
    let target_model = db.cache().resolve(relationship.target);

    // A loaded record belongs to an owner when its key equals the owner's
    // `owner_field`.
    let (owner_field, loaded) = match relationship.kind {
        RelationKind::HasOne | RelationKind::HasMany => {
            let keys = distinct_keys(value, &relationship.association_field);
            if keys.is_empty() {
                return Ok(());
            }

            let mut loaded = relationship.target.new_collection();
            let filter = Attrs::from_iter([(relationship.foreign_column.clone(), Value::List(keys))]);
            let found = filtered(db.filter(filter), conditions).find(&mut *loaded);
            fail_on(&found)?;

            let pairs = records(&*loaded)
                .map(|record| (record.field(&relationship.foreign_field), record.clone_record()))
                .collect::<Vec<_>>();
            (&relationship.association_field, pairs)
        }
        RelationKind::BelongsTo => {
            let keys = distinct_keys(value, &relationship.foreign_field);
            if keys.is_empty() {
                return Ok(());
            }

            let mut loaded = relationship.target.new_collection();
            let filter =
                Attrs::from_iter([(relationship.association_column.clone(), Value::List(keys))]);
            let found = filtered(db.filter(filter), conditions).find(&mut *loaded);
            fail_on(&found)?;

            let pairs = records(&*loaded)
                .map(|record| (record.field(&relationship.association_field), record.clone_record()))
                .collect::<Vec<_>>();
            (&relationship.foreign_field, pairs)
        }
        RelationKind::ManyToMany => {
            let keys = distinct_keys(value, &relationship.foreign_field);
            if keys.is_empty() {
                return Ok(());
            }
            let Some(handler) = db.join_table_handler(model.model_type, field) else {
                return Err(Error::invalid_association(format!(
                    "field `{name}` of `{}` has no join table",
                    model.name
                )));
            };

            let selection = handler.join_by_sources(db.dialect(), &keys);
            let pairs = load_linked(db, &target_model, relationship, &selection, conditions)?;
            (&relationship.foreign_field, pairs)
        }
    };

    let many = relationship.kind.is_many();
    for index in 0..value.len() {
        let Some(owner) = value.get_mut(index) else {
            continue;
        };
        let Some(owner_key) = owner.field(owner_field).filter(|key| !key.is_zero()) else {
            continue;
        };
        let Some(target) = owner.association_mut(field.name) else {
            continue;
        };

        target.clear();
        for (key, record) in &loaded {
            if !key.as_ref().is_some_and(|key| key.key_eq(&owner_key)) {
                continue;
            }
            target.push_record(record.clone_record())?;
            if !many {
                break;
            }
        }
    }

    Ok(())
}

/// Runs the join-table query, returning each destination record with the
/// source key it was linked from.
fn load_linked(
    db: &Db,
    target_model: &Arc<ModelStruct>,
    relationship: &Relationship,
    selection: &JoinSelection,
    conditions: &[Condition],
) -> Result<Vec<(Option<Value>, Box<dyn Reflect>)>> {
    let sample = relationship.target.new_collection();
    let table = db.dialect().quote(&target_model.table_name);

    let query = db
        .model(&*sample)
        .joins(selection.join.as_str())
        .filter(Fragment::new(selection.condition.clone(), selection.args.clone()))
        .select(format!("{table}.*, {}", selection.source_key));
    let rows = filtered(query, conditions).rows()?;

    let mut collection = relationship.target.new_collection();
    let mut linked = vec![];
    for row in &rows {
        let record = collection.push_default();
        scan_row(record, target_model, row)?;
        let source = row.get(JoinSelection::SOURCE_ALIAS).cloned();
        linked.push((source, record.clone_record()));
    }
    Ok(linked)
}
