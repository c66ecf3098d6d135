use super::{placeholder_offsets, Value};
use crate::Dialect;

/// SQL text plus its bound arguments, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub vars: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Statement {
        Statement {
            sql: sql.into(),
            vars: vec![],
        }
    }

    /// Adds an argument and returns its placeholder.
    ///
    /// A list expands into one placeholder per item, comma separated; an
    /// empty list becomes `NULL` so `IN (?)` still parses. An expression is
    /// returned as its SQL with its own arguments bound.
    pub fn bind(&mut self, dialect: &dyn Dialect, value: Value) -> String {
        match value {
            Value::List(items) if items.is_empty() => "NULL".to_string(),
            Value::List(items) => items
                .into_iter()
                .map(|item| self.bind(dialect, item))
                .collect::<Vec<_>>()
                .join(","),
            Value::Expr(expr) => {
                let text = expr.sql();
                let mut sql = String::with_capacity(text.len());
                let mut rest = 0;
                for (offset, arg) in placeholder_offsets(text).zip(expr.args()) {
                    sql.push_str(&text[rest..offset]);
                    sql.push_str(&self.bind(dialect, arg.clone()));
                    rest = offset + 1;
                }
                sql.push_str(&text[rest..]);
                sql
            }
            value => {
                self.vars.push(value);
                dialect.bind_var(self.vars.len())
            }
        }
    }
}
