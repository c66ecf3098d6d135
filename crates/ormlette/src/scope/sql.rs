use super::Scope;
use crate::criteria::{Combinator, Condition, Fragment};
use crate::settings::{COLLECTION_KEYS, ORDER_BY_PRIMARY_KEY};

use ormlette_core::stmt::Value;
use ormlette_core::{Error, Result};

impl Scope<'_> {
    /// Binds a fragment's arguments, returning its SQL with dialect
    /// placeholders.
    pub fn bind_fragment(&mut self, fragment: &Fragment) -> Result<String> {
        if fragment.sql().trim().is_empty() {
            return Err(Error::invalid_criteria("empty SQL fragment"));
        }
        if fragment.placeholders() != fragment.args().len() {
            return Err(Error::invalid_criteria(format!(
                "`{}` has {} placeholders but {} arguments",
                fragment.sql(),
                fragment.placeholders(),
                fragment.args().len()
            )));
        }

        let text = fragment.sql();
        let mut sql = String::with_capacity(text.len());
        let mut rest = 0;
        for (offset, arg) in fragment.placeholder_offsets().zip(fragment.args()) {
            sql.push_str(&text[rest..offset]);
            sql.push_str(&self.add_to_vars(arg.clone()));
            rest = offset + 1;
        }
        sql.push_str(&text[rest..]);
        Ok(sql)
    }

    /// Column name for an attribute key; unknown keys pass through.
    pub(crate) fn column_name(&self, name: &str) -> String {
        self.model()
            .and_then(|model| model.field(name))
            .filter(|field| field.is_normal())
            .map(|field| field.db_name.clone())
            .unwrap_or_else(|| name.to_string())
    }

    fn quoted_primary_key(&self) -> Result<String> {
        let Some(field) = self.primary_field() else {
            return Err(Error::invalid_criteria(format!(
                "table `{}` has no primary key",
                self.table_name()
            )));
        };
        Ok(format!(
            "{}.{}",
            self.quoted_table_name(),
            self.quote(&field.db_name)
        ))
    }

    /// Renders one condition. Returns `None` for a condition that adds no
    /// predicate, such as an empty attribute map.
    pub(crate) fn build_condition(
        &mut self,
        condition: &Condition,
        negate: bool,
    ) -> Result<Option<String>> {
        let sql = match condition {
            Condition::Sql(fragment) => {
                let sql = self.bind_fragment(fragment)?;
                if negate {
                    format!("NOT ({sql})")
                } else {
                    format!("({sql})")
                }
            }
            Condition::PrimaryKey(key) => {
                let column = self.quoted_primary_key()?;
                match key {
                    Value::List(keys) if keys.is_empty() => {
                        if negate {
                            return Ok(None);
                        }
                        "(1 <> 1)".to_string()
                    }
                    Value::List(_) => {
                        let binds = self.add_to_vars(key.clone());
                        let op = if negate { "NOT IN" } else { "IN" };
                        format!("({column} {op} ({binds}))")
                    }
                    _ => {
                        let bind = self.add_to_vars(key.clone());
                        let op = if negate { "<>" } else { "=" };
                        format!("({column} {op} {bind})")
                    }
                }
            }
            Condition::Attrs(attrs) => {
                if attrs.is_empty() {
                    return Ok(None);
                }

                let table = self.quoted_table_name();
                let mut predicates = vec![];
                for (name, value) in attrs.iter() {
                    let column = format!("{table}.{}", self.quote(&self.column_name(name)));
                    let predicate = match value {
                        Value::Null => format!("{column} IS NULL"),
                        Value::List(items) if items.is_empty() => "1 <> 1".to_string(),
                        Value::List(_) => {
                            format!("{column} IN ({})", self.add_to_vars(value.clone()))
                        }
                        _ => format!("{column} = {}", self.add_to_vars(value.clone())),
                    };
                    predicates.push(predicate);
                }

                let sql = predicates.join(" AND ");
                if negate {
                    format!("NOT ({sql})")
                } else {
                    format!("({sql})")
                }
            }
        };
        Ok(Some(sql))
    }

    fn primary_conditions(&mut self) -> Result<Vec<String>> {
        let mut conditions = vec![];
        let table = self.quoted_table_name();

        if !self.criteria().unscoped {
            if let Some(deleted_at) = self.model().and_then(|model| model.deleted_at_field()) {
                conditions.push(format!("{table}.{} IS NULL", self.quote(&deleted_at.db_name)));
            }
        }

        if self.value_is_model() {
            if let Some(key) = self.primary_key_value().filter(|key| !key.is_zero()) {
                let column = self.quoted_primary_key()?;
                let bind = self.add_to_vars(key);
                conditions.push(format!("{column} = {bind}"));
            }
        }

        if let Some(keys) = self.instance_get::<Vec<Value>>(COLLECTION_KEYS) {
            if keys.is_empty() {
                conditions.push("1 <> 1".to_string());
            } else {
                let column = self.quoted_primary_key()?;
                let binds = self.add_to_vars(Value::List(keys));
                conditions.push(format!("{column} IN ({binds})"));
            }
        }

        Ok(conditions)
    }

    /// Renders the `WHERE` clause, including its leading space.
    pub fn where_sql(&mut self) -> Result<String> {
        let mut conditions = self.primary_conditions()?;

        let terms = self.criteria().terms.clone();
        let mut and_conditions = vec![];
        let mut or_conditions = vec![];
        for term in &terms {
            let negate = term.combinator == Combinator::Not;
            let Some(sql) = self.build_condition(&term.condition, negate)? else {
                continue;
            };
            match term.combinator {
                Combinator::And | Combinator::Not => and_conditions.push(sql),
                Combinator::Or => or_conditions.push(sql),
            }
        }

        let mut combined = and_conditions.join(" AND ");
        let or_sql = or_conditions.join(" OR ");
        if !or_sql.is_empty() {
            if combined.is_empty() {
                combined = or_sql;
            } else {
                combined = format!("{combined} OR {or_sql}");
            }
        }
        if !combined.is_empty() {
            conditions.push(format!("({combined})"));
        }

        if conditions.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" WHERE {}", conditions.join(" AND ")))
    }

    fn select_sql(&mut self) -> Result<String> {
        if let Some(select) = self.criteria().select.clone() {
            return self.bind_fragment(&select);
        }

        let table = self.quoted_table_name();
        if !self.criteria().omit.is_empty() {
            if let Some(model) = self.model_arc() {
                let columns: Vec<_> = model
                    .normal_fields()
                    .filter(|field| self.changeable_field(field))
                    .map(|field| format!("{table}.{}", self.quote(&field.db_name)))
                    .collect();
                return Ok(columns.join(", "));
            }
        }

        if self.criteria().joins.is_empty() {
            Ok("*".to_string())
        } else {
            Ok(format!("{table}.*"))
        }
    }

    fn joins_sql(&mut self) -> Result<String> {
        let mut sql = String::new();
        for join in self.criteria().joins.clone() {
            sql.push(' ');
            sql.push_str(&self.bind_fragment(&join)?);
        }
        Ok(sql)
    }

    fn group_sql(&self) -> String {
        match self.criteria().group() {
            Some(group) => format!(" GROUP BY {group}"),
            None => String::new(),
        }
    }

    fn having_sql(&mut self) -> Result<String> {
        let having = self.criteria().having.clone();
        if having.is_empty() {
            return Ok(String::new());
        }

        let mut conditions = vec![];
        for fragment in &having {
            conditions.push(format!("({})", self.bind_fragment(fragment)?));
        }
        Ok(format!(" HAVING {}", conditions.join(" AND ")))
    }

    fn order_sql(&mut self) -> Result<String> {
        let mut orders = vec![];
        for order in self.criteria().orders.clone() {
            orders.push(self.bind_fragment(&order)?);
        }

        if !self.criteria().reordered {
            if let Some(direction) = self.get::<String>(ORDER_BY_PRIMARY_KEY) {
                if self.primary_field().is_some() {
                    orders.push(format!("{} {direction}", self.quoted_primary_key()?));
                }
            }
        }

        if orders.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" ORDER BY {}", orders.join(", ")))
    }

    fn limit_and_offset_sql(&self) -> String {
        let criteria = self.criteria();
        self.dialect()
            .limit_and_offset(criteria.limit, criteria.offset)
    }

    /// Assembles the `SELECT` statement for the current criteria.
    pub fn prepare_query_sql(&mut self) -> Result<()> {
        self.reset_statement();

        if self.criteria().raw {
            let raw = self.criteria().terms.iter().find_map(|term| match &term.condition {
                Condition::Sql(fragment) if term.combinator == Combinator::And => {
                    Some(fragment.clone())
                }
                _ => None,
            });
            let Some(raw) = raw else {
                return Err(Error::invalid_criteria("raw query without a statement"));
            };
            let sql = self.bind_fragment(&raw)?;
            self.set_sql(sql);
            return Ok(());
        }

        let select = self.select_sql()?;
        let joins = self.joins_sql()?;
        let filter = self.where_sql()?;
        let group = self.group_sql();
        let having = self.having_sql()?;
        let order = self.order_sql()?;
        let limit = self.limit_and_offset_sql();

        let sql = format!(
            "SELECT {select} FROM {}{joins}{filter}{group}{having}{order}{limit}",
            self.quoted_table_name()
        );
        self.set_sql(sql);
        Ok(())
    }
}
