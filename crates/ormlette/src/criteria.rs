//! Accumulated query and mutation options.
//!
//! A [`Criteria`] is a plain value: every fluent method on [`Db`](crate::Db)
//! clones the handle, and with it the criteria, before appending to it.

use ormlette_core::record::FieldTy;
use ormlette_core::stmt::{self, Value};
use ormlette_core::{Record, Reflect};

use indexmap::IndexMap;

/// A SQL fragment with positional `?` arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    sql: String,
    args: Vec<Value>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Fragment {
        Fragment {
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

    /// Number of `?` placeholders in the SQL text.
    pub fn placeholders(&self) -> usize {
        self.placeholder_offsets().count()
    }

    pub(crate) fn placeholder_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        stmt::placeholder_offsets(&self.sql)
    }
}

impl From<&str> for Fragment {
    fn from(sql: &str) -> Fragment {
        Fragment::new(sql, vec![])
    }
}

impl From<String> for Fragment {
    fn from(sql: String) -> Fragment {
        Fragment::new(sql, vec![])
    }
}

macro_rules! impl_fragment_tuple {
    ($($arg:ident),+) => {
        impl<S, $($arg),+> From<(S, $($arg),+)> for Fragment
        where
            S: Into<String>,
            $($arg: Into<Value>),+
        {
            #[allow(non_snake_case)]
            fn from((sql, $($arg),+): (S, $($arg),+)) -> Fragment {
                Fragment::new(sql, vec![$($arg.into()),+])
            }
        }

        impl<S, $($arg),+> From<(S, $($arg),+)> for Condition
        where
            S: Into<String>,
            $($arg: Into<Value>),+
        {
            fn from(tuple: (S, $($arg),+)) -> Condition {
                Condition::Sql(Fragment::from(tuple))
            }
        }
    };
}

impl_fragment_tuple!(A);
impl_fragment_tuple!(A, B);
impl_fragment_tuple!(A, B, C);
impl_fragment_tuple!(A, B, C, D);

/// Column values keyed by field or column name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs(IndexMap<String, Value>);

impl Attrs {
    pub fn new() -> Attrs {
        Attrs::default()
    }

    /// The non-zero fields of `record`, in declaration order.
    pub fn from_record(record: &dyn Reflect) -> Attrs {
        let def = record.record_type().def();
        def.fields
            .iter()
            .filter(|field| matches!(field.ty, FieldTy::Primitive { .. }))
            .filter_map(|field| {
                let value = record.field(field.name)?;
                (!value.is_zero()).then(|| (field.name.to_string(), value))
            })
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds every entry of `other`, overwriting existing names.
    pub fn extend(&mut self, other: &Attrs) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Attrs {
        Attrs(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl<T: Record> From<&T> for Attrs {
    fn from(record: &T) -> Attrs {
        Attrs::from_record(record)
    }
}

/// One condition of a `WHERE`, `OR` or `NOT` term.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// SQL fragment with positional arguments.
    Sql(Fragment),

    /// Primary key value, or a list of them.
    PrimaryKey(Value),

    /// One equality predicate per entry.
    Attrs(Attrs),
}

impl Condition {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Condition {
        Condition::Sql(Fragment::new(sql, args))
    }

    /// Equality on every non-zero field of `record`.
    pub fn record(record: &dyn Reflect) -> Condition {
        Condition::Attrs(Attrs::from_record(record))
    }

    /// The attribute map of this condition, for `first_or_init` seeding.
    pub(crate) fn as_attrs(&self) -> Option<&Attrs> {
        match self {
            Condition::Attrs(attrs) => Some(attrs),
            _ => None,
        }
    }
}

impl From<Fragment> for Condition {
    fn from(fragment: Fragment) -> Condition {
        Condition::Sql(fragment)
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Condition {
        Condition::Sql(sql.into())
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Condition {
        Condition::Sql(sql.into())
    }
}

impl From<Attrs> for Condition {
    fn from(attrs: Attrs) -> Condition {
        Condition::Attrs(attrs)
    }
}

impl From<i32> for Condition {
    fn from(key: i32) -> Condition {
        Condition::PrimaryKey(key.into())
    }
}

impl From<i64> for Condition {
    fn from(key: i64) -> Condition {
        Condition::PrimaryKey(key.into())
    }
}

impl From<u64> for Condition {
    fn from(key: u64) -> Condition {
        Condition::PrimaryKey(key.into())
    }
}

impl From<Vec<i64>> for Condition {
    fn from(keys: Vec<i64>) -> Condition {
        Condition::PrimaryKey(Value::list(keys))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub combinator: Combinator,
    pub condition: Condition,
}

/// An association to load after the primary result.
#[derive(Debug, Clone, PartialEq)]
pub struct Preload {
    /// Relation field name. Nested relations are separated by `.`.
    pub name: String,

    /// Extra conditions applied to the association query.
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub(crate) terms: Vec<Term>,
    pub(crate) select: Option<Fragment>,
    pub(crate) omit: Vec<String>,
    pub(crate) orders: Vec<Fragment>,
    pub(crate) reordered: bool,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) group: Option<String>,
    pub(crate) having: Vec<Fragment>,
    pub(crate) joins: Vec<Fragment>,
    pub(crate) preloads: Vec<Preload>,
    pub(crate) raw: bool,
    pub(crate) unscoped: bool,
    pub(crate) table: Option<String>,
    pub(crate) init_attrs: Vec<Condition>,
    pub(crate) assign_attrs: Vec<Condition>,
}

impl Criteria {
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn select(&self) -> Option<&Fragment> {
        self.select.as_ref()
    }

    pub fn omit(&self) -> &[String] {
        &self.omit
    }

    pub fn orders(&self) -> &[Fragment] {
        &self.orders
    }

    /// `reorder` was called; the implicit primary-key order is suppressed.
    pub fn is_reordered(&self) -> bool {
        self.reordered
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn having(&self) -> &[Fragment] {
        &self.having
    }

    pub fn joins(&self) -> &[Fragment] {
        &self.joins
    }

    pub fn preloads(&self) -> &[Preload] {
        &self.preloads
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub fn is_unscoped(&self) -> bool {
        self.unscoped
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn init_attrs(&self) -> &[Condition] {
        &self.init_attrs
    }

    pub fn assign_attrs(&self) -> &[Condition] {
        &self.assign_attrs
    }

    pub(crate) fn push(&mut self, combinator: Combinator, condition: Condition) {
        self.terms.push(Term {
            combinator,
            condition,
        });
    }

    pub(crate) fn order(&mut self, order: Fragment, reorder: bool) {
        if reorder {
            self.orders.clear();
            self.reordered = true;
        }
        if !order.sql().trim().is_empty() {
            self.orders.push(order);
        }
    }

    pub(crate) fn preload(&mut self, name: &str, conditions: Vec<Condition>) {
        match self.preloads.iter_mut().find(|preload| preload.name == name) {
            Some(preload) => preload.conditions = conditions,
            None => self.preloads.push(Preload {
                name: name.to_string(),
                conditions,
            }),
        }
    }

    /// Columns named by the select fragment, for restricting writes.
    pub(crate) fn select_attrs(&self) -> Vec<&str> {
        match &self.select {
            Some(select) => select
                .sql()
                .split(',')
                .map(str::trim)
                .filter(|attr| !attr.is_empty())
                .collect(),
            None => vec![],
        }
    }

    /// Merged attribute seeds: equality conditions, then `attrs`, then
    /// `assign`.
    pub(crate) fn seed_attrs(&self, inline: &[Condition]) -> Attrs {
        let mut seed = Attrs::new();

        let conditions = self
            .terms
            .iter()
            .filter(|term| term.combinator == Combinator::And)
            .map(|term| &term.condition)
            .chain(inline)
            .chain(&self.init_attrs)
            .chain(&self.assign_attrs);

        for attrs in conditions.filter_map(Condition::as_attrs) {
            seed.extend(attrs);
        }
        seed
    }

    /// Merged `assign` attributes.
    pub(crate) fn assign(&self) -> Attrs {
        let mut assign = Attrs::new();
        for attrs in self.assign_attrs.iter().filter_map(Condition::as_attrs) {
            assign.extend(attrs);
        }
        assign
    }
}
