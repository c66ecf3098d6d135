use crate::Scope;

pub(super) fn query(scope: &mut Scope<'_>) {
    if let Err(err) = scope.prepare_query_sql() {
        scope.err(err);
        return;
    }

    if let Some(rows) = scope.query_rows() {
        scope.scan_rows(&rows);
    }
}
