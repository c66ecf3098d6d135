use super::create::timestamp_value;
use crate::Scope;

use ormlette_core::stmt::Value;

/// Deletes the matching rows, or marks them deleted when the table has a
/// soft-delete column and the criteria are scoped.
pub(super) fn delete(scope: &mut Scope<'_>) {
    let deleted_at = match scope.criteria().unscoped {
        true => None,
        false => scope
            .model()
            .and_then(|model| model.deleted_at_field())
            .cloned(),
    };

    let sql = match deleted_at {
        Some(field) => {
            let now = timestamp_value(field.ty, scope.now()).unwrap_or(Value::I64(scope.now()));
            let column = scope.quote(&field.db_name);
            let bind = scope.add_to_vars(now);
            format!("UPDATE {} SET {column} = {bind}", scope.quoted_table_name())
        }
        None => format!("DELETE FROM {}", scope.quoted_table_name()),
    };

    let filter = match scope.where_sql() {
        Ok(filter) => filter,
        Err(err) => {
            scope.err(err);
            return;
        }
    };
    scope.set_sql(format!("{sql}{filter}"));
    scope.exec();
}
