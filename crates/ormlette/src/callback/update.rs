use super::create::timestamp_value;
use crate::criteria::Attrs;
use crate::settings::{IGNORE_PROTECTED_ATTRS, UPDATE_ATTRS, UPDATE_COLUMN, UPDATE_INTERFACE};
use crate::Scope;

use ormlette_core::err;
use ormlette_core::stmt::Value;

/// Turns the attributes passed to `update`/`updates` into the columns the
/// statement writes, copying them onto the record.
///
/// Primary keys are protected unless the update asked otherwise. For a
/// persisted record, attributes equal to the current values are dropped and
/// an update that changes nothing skips the rest of the chain.
pub(super) fn assign_update_attributes(scope: &mut Scope<'_>) {
    let Some(attrs) = scope.instance_get::<Attrs>(UPDATE_INTERFACE) else {
        return;
    };
    let ignore_protected = scope
        .instance_get::<bool>(IGNORE_PROTECTED_ATTRS)
        .unwrap_or(false);
    let model = scope.value_model_arc();
    let persisted = !scope.primary_key_zero();

    let mut columns = Attrs::new();
    for (name, value) in attrs.iter() {
        let field = model
            .as_ref()
            .and_then(|model| model.field(name))
            .filter(|field| field.is_normal());

        let Some(field) = field else {
            columns.insert(name, value.clone());
            continue;
        };
        if field.primary_key && !ignore_protected {
            continue;
        }
        if !scope.changeable_field(field) {
            continue;
        }
        // the database computes expressions; the record keeps its value
        if matches!(value, Value::Expr(_)) {
            columns.insert(field.db_name.clone(), value.clone());
            continue;
        }

        let current = scope.record().and_then(|record| record.field(field.name));
        if persisted && current.is_some_and(|current| current.key_eq(value)) {
            continue;
        }

        let field_name = field.name;
        columns.insert(field.db_name.clone(), value.clone());

        let result = scope.each_record_mut(|record| record.set_field(field_name, value.clone()));
        if let Err(err) = result {
            scope.err(err);
            return;
        }
    }

    if columns.is_empty() && persisted {
        scope.skip_left();
        return;
    }
    scope.instance_set(UPDATE_ATTRS, columns);
}

/// Sets `updated_at` to the current time.
pub(super) fn update_time_stamp(scope: &mut Scope<'_>) {
    if scope.get::<bool>(UPDATE_COLUMN).unwrap_or(false) {
        return;
    }
    let Some(model) = scope.value_model_arc() else {
        return;
    };
    let Some(field) = model.field("updated_at").filter(|field| field.is_normal()) else {
        return;
    };
    let Some(now) = timestamp_value(field.ty, scope.now()) else {
        return;
    };

    if let Some(mut attrs) = scope.instance_get::<Attrs>(UPDATE_ATTRS) {
        attrs.insert(field.db_name.clone(), now.clone());
        scope.instance_set(UPDATE_ATTRS, attrs);
    }

    let result = scope.each_record_mut(|record| record.set_field(field.name, now.clone()));
    if let Err(err) = result {
        scope.err(err);
    }
}

pub(super) fn update(scope: &mut Scope<'_>) {
    let mut sets = vec![];

    if let Some(attrs) = scope.instance_get::<Attrs>(UPDATE_ATTRS) {
        for (name, value) in attrs.iter() {
            let column = scope.quote(&scope.column_name(name));
            let bind = scope.add_to_vars(value.clone());
            sets.push(format!("{column} = {bind}"));
        }
    } else {
        let Some(model) = scope.value_model_arc() else {
            scope.err(err!("update needs a record or attributes"));
            return;
        };
        let Some(record) = scope.record().map(|record| record.clone_record()) else {
            scope.err(err!("save expects a single record"));
            return;
        };

        for field in model.normal_fields() {
            if field.primary_key || !scope.changeable_field(field) {
                continue;
            }
            let value = record.field(field.name).unwrap_or_default();
            let column = scope.quote(&field.db_name);
            let bind = scope.add_to_vars(value);
            sets.push(format!("{column} = {bind}"));
        }
    }

    if sets.is_empty() {
        return;
    }

    let filter = match scope.where_sql() {
        Ok(filter) => filter,
        Err(err) => {
            scope.err(err);
            return;
        }
    };
    let sql = format!(
        "UPDATE {} SET {}{filter}",
        scope.quoted_table_name(),
        sets.join(", ")
    );
    scope.set_sql(sql);
    scope.exec();
}
