use crate::settings::INSERT_IGNORE;
use crate::Scope;

use ormlette_core::stmt::{Type, Value};
use ormlette_core::err;

use uuid::Uuid;

/// Integer `created_at` / `updated_at` fields receive the current time.
pub(super) fn timestamp_value(ty: Option<Type>, now: i64) -> Option<Value> {
    match ty? {
        Type::I32 => i32::try_from(now).ok().map(Value::I32),
        Type::I64 => Some(Value::I64(now)),
        Type::U64 => u64::try_from(now).ok().map(Value::U64),
        _ => None,
    }
}

/// Fills blank `created_at` and `updated_at` fields.
pub(super) fn update_time_stamp(scope: &mut Scope<'_>) {
    let Some(model) = scope.value_model_arc() else {
        return;
    };
    let now = scope.now();

    let result = scope.each_record_mut(|record| {
        for name in ["created_at", "updated_at"] {
            let Some(field) = model.field(name).filter(|field| field.is_normal()) else {
                continue;
            };
            let blank = record.field(field.name).map_or(true, |value| value.is_zero());
            if let (true, Some(value)) = (blank, timestamp_value(field.ty, now)) {
                record.set_field(field.name, value)?;
            }
        }
        Ok(())
    });
    if let Err(err) = result {
        scope.err(err);
    }
}

pub(super) fn create(scope: &mut Scope<'_>) {
    let Some(model) = scope.value_model_arc() else {
        scope.err(err!("create needs a record"));
        return;
    };

    let result = scope.each_record_mut(|record| {
        for field in model.normal_fields().filter(|field| field.generate_uuid) {
            if record.field(field.name).map_or(true, |value| value.is_zero()) {
                record.set_field(field.name, Value::String(Uuid::new_v4().to_string()))?;
            }
        }
        Ok(())
    });
    if let Err(err) = result {
        scope.err(err);
        return;
    }

    let Some(record) = scope.record().map(|record| record.clone_record()) else {
        scope.err(err!("create expects a single record"));
        return;
    };

    let mut columns = vec![];
    let mut binds = vec![];
    for field in model.normal_fields() {
        if !scope.changeable_field(field) {
            continue;
        }

        let value = record.field(field.name).unwrap_or_default();
        let blank = value.is_zero();
        if blank && (field.auto_increment || field.settings.contains("DEFAULT")) {
            continue;
        }

        columns.push(scope.quote(&field.db_name));
        binds.push(scope.add_to_vars(value));
    }

    let dialect = scope.dialect();
    let ignore = scope.get::<bool>(INSERT_IGNORE).unwrap_or(false);
    let (prefix, suffix) = if ignore {
        (dialect.insert_ignore_prefix(), dialect.insert_ignore_suffix())
    } else {
        ("INSERT INTO", "")
    };

    let primary = model.primary_field().cloned();
    let pending_key = primary.as_ref().filter(|primary| {
        primary.auto_increment && record.field(primary.name).map_or(true, |key| key.is_zero())
    });
    let returning = pending_key
        .and_then(|primary| dialect.returning_primary_key(&primary.db_name))
        .unwrap_or_default();

    let body = if columns.is_empty() {
        dialect.default_values().to_string()
    } else {
        format!("({}) VALUES ({})", columns.join(","), binds.join(","))
    };
    let sql = format!(
        "{prefix} {} {body}{suffix}{returning}",
        scope.quoted_table_name()
    );
    scope.set_sql(sql);

    let generated = if returning.is_empty() {
        match scope.exec() {
            Some(res) if res.rows_affected > 0 => res.last_insert_id.map(Value::I64),
            _ => None,
        }
    } else {
        let rows = scope.query_rows();
        let key = rows
            .as_ref()
            .and_then(|rows| rows.first())
            .and_then(|row| row.values().first().cloned());
        if let Some(rows) = &rows {
            scope.db.rows_affected = rows.len() as u64;
        }
        key
    };

    let (Some(primary), Some(key)) = (pending_key, generated) else {
        return;
    };
    let name = primary.name;
    if let Some(record) = scope.record_mut() {
        if let Err(err) = record.set_field(name, key) {
            scope.err(err);
        }
    }
}
