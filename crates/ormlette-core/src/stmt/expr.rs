use super::Value;

/// A raw SQL expression used where a value is expected, such as
/// `age + ?` on the right-hand side of an update.
///
/// The expression is rendered inline and its arguments are bound in place of
/// its `?` placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    sql: String,
    args: Vec<Value>,
}

impl Expr {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Expr {
        Expr {
            sql: sql.into(),
            args,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl From<Expr> for Value {
    fn from(src: Expr) -> Value {
        Value::Expr(src)
    }
}

/// Byte offsets of the `?` placeholders in `sql`. A `?` inside a quoted
/// string or identifier is literal text.
pub fn placeholder_offsets(sql: &str) -> impl Iterator<Item = usize> + '_ {
    let mut quote = None;
    sql.char_indices().filter_map(move |(offset, c)| {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), _) if open == c => quote = None,
            (None, '?') => return Some(offset),
            _ => {}
        }
        None
    })
}
