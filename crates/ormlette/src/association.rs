//! Access to one relationship of a loaded record.
//!
//! An [`Association`] is built by [`Db::association`] from the record set
//! with [`Db::model`]. It works on a snapshot of that record: reads and
//! writes go to the database, the model value itself is left alone.

use crate::criteria::{Attrs, Condition};
use crate::Db;

use ormlette_core::schema::{JoinTableHandler, ModelStruct, RelationKind, Relationship, StructField};
use ormlette_core::stmt::Value;
use ormlette_core::{Error, Result, Target};

use std::sync::Arc;

#[derive(Debug)]
pub struct Association {
    db: Db,
    resolved: Option<Resolved>,
    error: Option<Error>,
}

#[derive(Debug)]
struct Resolved {
    owner: Arc<ModelStruct>,
    field: StructField,
    relationship: Relationship,

    /// Value of the owner's key the relationship is joined on.
    key: Value,

    /// Field identifying an associated record: its primary key.
    target_key: String,
}

impl Association {
    pub(crate) fn new(db: &Db, name: &str) -> Association {
        let mut association = Association {
            db: db.clone(),
            resolved: None,
            error: None,
        };
        match resolve(db, name) {
            Ok(resolved) => association.resolved = Some(resolved),
            Err(err) => association.push_error(err),
        }
        association
    }

    fn push_error(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// The first error recorded on this association.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn result(&self) -> Result<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn resolved(&self) -> Result<&Resolved> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.resolved
            .as_ref()
            .ok_or_else(|| Error::invalid_association("association is not resolved"))
    }

    /// Loads the associated records into `out`.
    pub fn find(&self, out: &mut dyn Target) -> Db {
        match self.resolved() {
            Ok(resolved) => self.db.related_by(out, Some(resolved.field.name)),
            Err(err) => self.db.fail(err),
        }
    }

    /// Number of associated records.
    pub fn count(&self) -> Result<i64> {
        let resolved = self.resolved()?;
        let relationship = &resolved.relationship;
        let sample = relationship.target.new_collection();
        let db = self.db.new_session().model(&*sample);

        let db = match relationship.kind {
            RelationKind::BelongsTo => {
                db.filter(Attrs::from_iter([(relationship.association_column.clone(), resolved.key.clone())]))
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                db.filter(Attrs::from_iter([(relationship.foreign_column.clone(), resolved.key.clone())]))
            }
            RelationKind::ManyToMany => {
                let handler = self.handler(resolved)?;
                let selection = handler.join_by_sources(self.db.dialect(), &[resolved.key.clone()]);
                db.joins(selection.join.as_str())
                    .filter(Condition::new(selection.condition, selection.args))
            }
        };

        let mut count = 0;
        db.count(&mut count).result()?;
        Ok(count)
    }

    /// Saves `values` and associates them with the owner.
    pub fn append(&mut self, values: &mut dyn Target) -> &mut Association {
        if let Err(err) = self.try_append(values) {
            self.push_error(err);
        }
        self
    }

    /// Associates exactly `values` with the owner, detaching every other
    /// record.
    pub fn replace(&mut self, values: &mut dyn Target) -> &mut Association {
        let result = self
            .try_append(values)
            .and_then(|keys| self.detach(Detach::AllBut(keys)));
        if let Err(err) = result {
            self.push_error(err);
        }
        self
    }

    /// Detaches `values` from the owner. The records themselves are kept.
    pub fn delete(&mut self, values: &dyn Target) -> &mut Association {
        let result = self.resolved().map(|resolved| keys_of(resolved, values));
        let result = result.and_then(|keys| match keys.is_empty() {
            true => Ok(()),
            false => self.detach(Detach::Only(keys)),
        });
        if let Err(err) = result {
            self.push_error(err);
        }
        self
    }

    /// Detaches every associated record from the owner.
    pub fn clear(&mut self) -> &mut Association {
        if let Err(err) = self.detach(Detach::AllBut(vec![])) {
            self.push_error(err);
        }
        self
    }

    fn handler(&self, resolved: &Resolved) -> Result<Arc<dyn JoinTableHandler>> {
        self.db
            .join_table_handler(resolved.owner.model_type, &resolved.field)
            .ok_or_else(|| {
                Error::invalid_association(format!(
                    "field `{}` of `{}` has no join table",
                    resolved.field.name, resolved.owner.name
                ))
            })
    }

    /// Saves and links `values`, returning the keys of the linked records.
    fn try_append(&self, values: &mut dyn Target) -> Result<Vec<Value>> {
        let resolved = self.resolved()?;
        let relationship = &resolved.relationship;
        reject_belongs_to(resolved)?;

        let db = self.db.new_session();
        let mut keys = vec![];
        for index in 0..values.len() {
            let Some(record) = values.get_mut(index) else {
                continue;
            };
            if relationship.kind != RelationKind::ManyToMany {
                record.set_field(&relationship.foreign_field, resolved.key.clone())?;
            }
            db.save(record.as_target_mut()).result()?;
            if let Some(key) = record.field(&resolved.target_key) {
                keys.push(key);
            }
        }

        if relationship.kind == RelationKind::ManyToMany {
            let handler = self.handler(resolved)?;
            for key in &keys {
                let stmt = handler.link(self.db.dialect(), &resolved.key, key);
                self.db.exec_statement(stmt).result()?;
            }
        }
        Ok(keys)
    }

    fn detach(&self, detach: Detach) -> Result<()> {
        let resolved = self.resolved()?;
        let relationship = &resolved.relationship;
        reject_belongs_to(resolved)?;

        if relationship.kind == RelationKind::ManyToMany {
            let handler = self.handler(resolved)?;
            let stmt = match detach {
                Detach::Only(keys) => handler.unlink(self.db.dialect(), &resolved.key, &keys),
                Detach::AllBut(keys) if keys.is_empty() => {
                    handler.unlink(self.db.dialect(), &resolved.key, &[])
                }
                Detach::AllBut(keys) => {
                    let mut stmt = handler.unlink(self.db.dialect(), &resolved.key, &[]);
                    let binds = stmt.bind(self.db.dialect(), Value::List(keys));
                    stmt.sql.push_str(&format!(
                        " AND {} NOT IN ({binds})",
                        self.db.dialect().quote(&relationship.association_column)
                    ));
                    stmt
                }
            };
            return self.db.exec_statement(stmt).result();
        }

        let sample = relationship.target.new_collection();
        let owned = Attrs::from_iter([(relationship.foreign_column.clone(), resolved.key.clone())]);
        let db = self.db.new_session().model(&*sample).filter(owned);
        let db = match detach {
            Detach::Only(keys) => db.filter(Condition::PrimaryKey(Value::List(keys))),
            Detach::AllBut(keys) => db.not(Condition::PrimaryKey(Value::List(keys))),
        };

        let unset = Attrs::from_iter([(relationship.foreign_column.clone(), Value::Null)]);
        db.update_all(unset).result()
    }
}

enum Detach {
    Only(Vec<Value>),
    AllBut(Vec<Value>),
}

fn reject_belongs_to(resolved: &Resolved) -> Result<()> {
    if resolved.relationship.kind == RelationKind::BelongsTo {
        return Err(Error::invalid_association(format!(
            "belongs-to association `{}` of `{}` can't be changed from the owner",
            resolved.field.name, resolved.owner.name
        )));
    }
    Ok(())
}

/// Keys identifying `values` on the associated side.
fn keys_of(resolved: &Resolved, values: &dyn Target) -> Vec<Value> {
    let field = &resolved.target_key;
    (0..values.len())
        .filter_map(|index| values.get(index)?.field(field))
        .filter(|key| !key.is_zero())
        .collect()
}

fn resolve(db: &Db, name: &str) -> Result<Resolved> {
    let Some(value) = db.value() else {
        return Err(Error::invalid_association("association needs a model"));
    };
    let owner = db.cache().resolve(value.model_type());
    let Some(record) = value.get(0) else {
        return Err(Error::invalid_association(format!(
            "model `{}` holds no record",
            owner.name
        )));
    };

    let primary_blank = owner
        .primary_field()
        .and_then(|primary| record.field(primary.name))
        .map_or(true, |key| key.is_zero());
    if primary_blank {
        return Err(Error::invalid_association(format!(
            "primary key of `{}` can't be blank",
            owner.name
        )));
    }

    let Some(field) = owner.field(name).cloned() else {
        return Err(Error::invalid_association(format!(
            "`{}` has no field `{name}`",
            owner.name
        )));
    };
    let Some(relationship) = field.relationship.clone() else {
        return Err(Error::invalid_association(format!(
            "field `{name}` of `{}` is not a relationship",
            owner.name
        )));
    };

    let key_field = match relationship.kind {
        RelationKind::BelongsTo | RelationKind::ManyToMany => &relationship.foreign_field,
        RelationKind::HasOne | RelationKind::HasMany => &relationship.association_field,
    };
    let key = record.field(key_field).unwrap_or_default();

    let target_key = match relationship.kind {
        RelationKind::BelongsTo | RelationKind::ManyToMany => relationship.association_field.clone(),
        RelationKind::HasOne | RelationKind::HasMany => db
            .cache()
            .resolve(relationship.target)
            .primary_field()
            .map(|primary| primary.name.to_string())
            .unwrap_or_default(),
    };

    Ok(Resolved {
        owner,
        field,
        relationship,
        key,
        target_key,
    })
}
