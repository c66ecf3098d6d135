use super::Db;
use crate::callback::Operation;
use crate::criteria::{Attrs, Condition, Fragment};
use crate::settings::{ORDER_BY_PRIMARY_KEY, UPDATE_INTERFACE};

use ormlette_core::schema::{ModelStruct, RelationKind};
use ormlette_core::stmt::{Primitive, Row};
use ormlette_core::{Error, Result, Target};

impl Db {
    /// Loads the first record ordered by primary key.
    pub fn first(&self, out: &mut dyn Target) -> Db {
        self.first_with(out, vec![])
    }

    pub fn first_where(&self, out: &mut dyn Target, condition: impl Into<Condition>) -> Db {
        self.first_with(out, vec![condition.into()])
    }

    /// Loads the last record ordered by primary key.
    pub fn last(&self, out: &mut dyn Target) -> Db {
        self.last_with(out, vec![])
    }

    pub fn last_where(&self, out: &mut dyn Target, condition: impl Into<Condition>) -> Db {
        self.last_with(out, vec![condition.into()])
    }

    /// Loads every matching record.
    pub fn find(&self, out: &mut dyn Target) -> Db {
        self.run(Operation::Query, Some(out), |_| {})
    }

    pub fn find_where(&self, out: &mut dyn Target, condition: impl Into<Condition>) -> Db {
        let condition = condition.into();
        self.run(Operation::Query, Some(out), |scope| {
            scope.inline_condition([condition])
        })
    }

    /// Runs the query against the model or table and scans the results into
    /// `out`, which may be of another record type.
    pub fn scan(&self, out: &mut dyn Target) -> Db {
        self.run(Operation::Query, Some(out), |_| {})
    }

    fn first_with(&self, out: &mut dyn Target, inline: Vec<Condition>) -> Db {
        self.limit(1).run(Operation::Query, Some(out), |scope| {
            scope.set(ORDER_BY_PRIMARY_KEY, "ASC".to_string());
            scope.inline_condition(inline);
        })
    }

    fn last_with(&self, out: &mut dyn Target, inline: Vec<Condition>) -> Db {
        self.limit(1).run(Operation::Query, Some(out), |scope| {
            scope.set(ORDER_BY_PRIMARY_KEY, "DESC".to_string());
            scope.inline_condition(inline);
        })
    }

    /// The first row of the query.
    pub fn row(&self) -> Result<Option<Row>> {
        let rows = self.limit(1).rows()?;
        Ok(rows.into_iter().next())
    }

    /// Every row of the query, unscanned.
    pub fn rows(&self) -> Result<Vec<Row>> {
        let (db, rows) = self.with_scope("rows", None, |scope| {
            if let Err(err) = scope.prepare_query_sql() {
                scope.err(err);
                return None;
            }
            scope.query_rows()
        });
        db.result()?;
        Ok(rows.unwrap_or_default())
    }

    /// Loads a single column into `out`.
    pub fn pluck<P: Primitive>(&self, column: &str, out: &mut Vec<P>) -> Db {
        let (mut db, rows) = self.select(column).with_scope("pluck", None, |scope| {
            if let Err(err) = scope.prepare_query_sql() {
                scope.err(err);
                return None;
            }
            scope.query_rows()
        });

        out.clear();
        for row in rows.unwrap_or_default() {
            let Some(value) = row.into_values().into_iter().next() else {
                continue;
            };
            match P::load(value) {
                Ok(value) => out.push(value),
                Err(err) => {
                    db.push_error(err.context(ormlette_core::err!("plucking `{column}`")));
                    break;
                }
            }
        }
        db
    }

    /// Counts the matching rows. Orders, limit and offset are ignored.
    pub fn count(&self, out: &mut i64) -> Db {
        let mut db = self.clone();
        db.criteria.orders.clear();
        db.criteria.reordered = true;
        db.criteria.limit = None;
        db.criteria.offset = None;
        db.criteria.preloads.clear();
        if db.criteria.group.is_none() {
            db.criteria.select = Some(Fragment::from("count(*)"));
        }

        let (mut db, count) = db.with_scope("count", None, |scope| {
            if let Err(err) = scope.prepare_query_sql() {
                scope.err(err);
                return None;
            }
            if scope.criteria().group().is_some() {
                let sql = format!("SELECT count(*) FROM ({}) ormlette_count", scope.sql());
                scope.set_sql(sql);
            }
            let rows = scope.query_rows()?;
            Some(rows.first().and_then(|row| row.values().first().cloned()))
        });

        *out = 0;
        if let Some(Some(value)) = count {
            match value.as_i64() {
                Some(count) => *out = count,
                None => db.push_error(Error::type_conversion(value, "i64")),
            }
        }
        db
    }

    /// Loads the records of the model associated with `out`'s record type.
    pub fn related(&self, out: &mut dyn Target) -> Db {
        self.related_by(out, None)
    }

    /// Loads association `name` of the model, or the first association
    /// targeting `out`'s record type.
    pub(crate) fn related_by(&self, out: &mut dyn Target, name: Option<&str>) -> Db {
        let Some(owner) = self.value.clone() else {
            return self.fail(Error::invalid_association("`related` needs a model"));
        };
        let owner_model = self.cache().resolve(owner.model_type());
        let out_type = out.model_type();

        let found = owner_model.relationships().find(|(field, relationship)| match name {
            Some(name) => field.matches(name),
            None => relationship.target == out_type,
        });
        let Some((field, relationship)) = found else {
            return self.fail(Error::invalid_association(format!(
                "`{}` has no association with `{}`",
                owner_model.name,
                out_type.type_name()
            )));
        };
        let Some(record) = owner.get(0) else {
            return self.fail(Error::invalid_association(format!(
                "model `{}` holds no record",
                owner_model.name
            )));
        };

        let mut db = self.clone();
        db.value = None;

        match relationship.kind {
            RelationKind::BelongsTo => {
                let key = record.field(&relationship.foreign_field).unwrap_or_default();
                let filter = Attrs::from_iter([(relationship.association_column.clone(), key)]);
                db.filter(filter).find(out)
            }
            RelationKind::HasOne | RelationKind::HasMany => {
                let key = record.field(&relationship.association_field).unwrap_or_default();
                let filter = Attrs::from_iter([(relationship.foreign_column.clone(), key)]);
                db.filter(filter).find(out)
            }
            RelationKind::ManyToMany => {
                let Some(handler) = self.join_table_handler(owner_model.model_type, field) else {
                    return self.fail(Error::invalid_association(format!(
                        "field `{}` of `{}` has no join table",
                        field.name, owner_model.name
                    )));
                };
                let key = record.field(&relationship.foreign_field).unwrap_or_default();
                let selection = handler.join_by_sources(self.dialect(), &[key]);
                db.joins(selection.join.as_str())
                    .filter(Fragment::new(selection.condition, selection.args))
                    .find(out)
            }
        }
    }

    /// Loads the first match, or fills `out` from the equality conditions,
    /// `attrs` and `assign` when nothing matches. Nothing is written.
    pub fn first_or_init(&self, out: &mut dyn Target) -> Db {
        self.first_or_init_with(out, vec![])
    }

    pub fn first_or_init_where(&self, out: &mut dyn Target, condition: impl Into<Condition>) -> Db {
        self.first_or_init_with(out, vec![condition.into()])
    }

    /// Like [`Db::first_or_init`], but creates the record when nothing
    /// matches and writes `assign` to the record that did.
    pub fn first_or_create(&self, out: &mut dyn Target) -> Db {
        self.first_or_create_with(out, vec![])
    }

    pub fn first_or_create_where(
        &self,
        out: &mut dyn Target,
        condition: impl Into<Condition>,
    ) -> Db {
        self.first_or_create_with(out, vec![condition.into()])
    }

    fn first_or_init_with(&self, out: &mut dyn Target, inline: Vec<Condition>) -> Db {
        let found = self.first_with(out, inline.clone());
        match lookup(&found, out) {
            Lookup::Failed => found,
            Lookup::Missing => {
                let mut db = self.clone();
                let seed = self.criteria.seed_attrs(&inline);
                if let Err(err) = assign_attrs(self, out, &seed) {
                    db.push_error(err);
                }
                db
            }
            Lookup::Found => {
                let mut db = found;
                if let Err(err) = assign_attrs(self, out, &self.criteria.assign()) {
                    db.push_error(err);
                }
                db
            }
        }
    }

    fn first_or_create_with(&self, out: &mut dyn Target, inline: Vec<Condition>) -> Db {
        let found = self.first_with(out, inline.clone());
        match lookup(&found, out) {
            Lookup::Failed => found,
            Lookup::Missing => {
                let seed = self.criteria.seed_attrs(&inline);
                if let Err(err) = assign_attrs(self, out, &seed) {
                    return self.fail(err);
                }
                self.new_session().create(out)
            }
            Lookup::Found => {
                let assign = self.criteria.assign();
                if assign.is_empty() {
                    return found;
                }
                self.new_session()
                    .run(Operation::Update, Some(out), |scope| {
                        scope.instance_set(UPDATE_INTERFACE, assign)
                    })
            }
        }
    }
}

enum Lookup {
    Found,
    Missing,
    Failed,
}

fn lookup(found: &Db, out: &dyn Target) -> Lookup {
    match found.error() {
        Some(err) if err.is_record_not_found() => Lookup::Missing,
        Some(_) => Lookup::Failed,
        None if out.is_empty() => Lookup::Missing,
        None => Lookup::Found,
    }
}

/// Writes the known fields of `attrs` onto the record in `out`, adding one
/// when `out` holds none.
fn assign_attrs(db: &Db, out: &mut dyn Target, attrs: &Attrs) -> Result<()> {
    if attrs.is_empty() && !out.is_empty() {
        return Ok(());
    }
    let model = db.cache().resolve(out.model_type());
    let record = match out.len() {
        0 => out.push_default(),
        _ => match out.get_mut(0) {
            Some(record) => record,
            None => return Ok(()),
        },
    };

    for (name, value) in attrs.iter() {
        if let Some(field) = model_field(&model, name) {
            record.set_field(field, value.clone())?;
        }
    }
    Ok(())
}

fn model_field(model: &ModelStruct, name: &str) -> Option<&'static str> {
    model
        .field(name)
        .filter(|field| field.is_normal())
        .map(|field| field.name)
}
