use super::Scope;

use ormlette_core::schema::ModelStruct;
use ormlette_core::stmt::{Row, Value};
use ormlette_core::{Error, Reflect, Result, Target};

/// Copies the columns of `row` into `record`.
///
/// Columns match fields by column name first, then by field name, ignoring
/// ASCII case. Columns with no matching field are skipped, and so is `NULL`
/// for a field that cannot hold it.
pub(crate) fn scan_row(record: &mut dyn Reflect, model: &ModelStruct, row: &Row) -> Result<()> {
    for (column, value) in row.iter() {
        let field = model
            .normal_fields()
            .find(|field| field.db_name.eq_ignore_ascii_case(column))
            .or_else(|| {
                model
                    .normal_fields()
                    .find(|field| field.name.eq_ignore_ascii_case(column))
            });

        let Some(field) = field else {
            continue;
        };
        if value.is_null() && !field.nullable {
            continue;
        }

        record
            .set_field(field.name, value.clone())
            .map_err(|err| err.context(ormlette_core::err!("scanning column `{column}`")))?;
    }
    Ok(())
}

/// Writes `rows` into `target`.
///
/// Collections and optional records are emptied first; a single record
/// takes the first row.
pub(crate) fn scan_into(target: &mut dyn Target, model: &ModelStruct, rows: &[Row]) -> Result<()> {
    if target.is_many() {
        target.clear();
        for row in rows {
            scan_row(target.push_default(), model, row)?;
        }
        return Ok(());
    }

    if target.is_optional() {
        target.clear();
    }
    if let Some(row) = rows.first() {
        scan_row(target.push_default(), model, row)?;
    }
    Ok(())
}

impl Scope<'_> {
    /// Scans query results into the scope's value.
    ///
    /// A plain single record with no rows to scan is `RecordNotFound`.
    pub fn scan_rows(&mut self, rows: &[Row]) {
        let Some(model) = self.value_model_arc() else {
            return;
        };
        let table = self.table_name();

        let Some(value) = self.value_mut() else {
            return;
        };
        if rows.is_empty() && !value.is_many() && !value.is_optional() {
            self.err(Error::record_not_found(format!("table={table}")));
            return;
        }

        if let Err(err) = scan_into(value, &model, rows) {
            self.err(err);
        }
    }

    /// Primary keys of every record in the value.
    pub(crate) fn record_keys(&self) -> Vec<Value> {
        let (Some(model), Some(value)) = (self.value_model(), self.value()) else {
            return vec![];
        };
        let Some(primary) = model.primary_field() else {
            return vec![];
        };

        (0..value.len())
            .filter_map(|index| value.get(index)?.field(primary.name))
            .filter(|key| !key.is_zero())
            .collect()
    }
}
