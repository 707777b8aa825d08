//! Typed query-intent AST.
//!
//! Every shape a caller can express is an explicit variant, so the compiler
//! never has to guess whether a map holds operators or a nested relation.
//! The single place that still guesses from loosely-shaped JSON is
//! [`crate::decode::classify_filter_value`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field name used for logical AND groups.
pub const AND: &str = "$and";
/// Field name used for logical OR groups.
pub const OR: &str = "$or";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Comparison operators understood by the backend query dialect.
///
/// `Other` carries keys that are not on the allowlist but sit in a map that
/// already contains allowlisted operators; they are emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    In,
    NotIn,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
    Contains,
    NotContains,
    Containsi,
    NotContainsi,
    StartsWith,
    EndsWith,
    Null,
    NotNull,
    Other(String),
}

impl Operator {
    /// Operators recognised when classifying a map, in wire spelling.
    pub const ALLOWLIST: [&'static str; 17] = [
        "$eq",
        "$ne",
        "$in",
        "$notIn",
        "$lt",
        "$lte",
        "$gt",
        "$gte",
        "$between",
        "$contains",
        "$notContains",
        "$containsi",
        "$notContainsi",
        "$startsWith",
        "$endsWith",
        "$null",
        "$notNull",
    ];

    /// Parse an allowlisted operator. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let op = match raw {
            "$eq" => Self::Eq,
            "$ne" => Self::Ne,
            "$in" => Self::In,
            "$notIn" => Self::NotIn,
            "$lt" => Self::Lt,
            "$lte" => Self::Lte,
            "$gt" => Self::Gt,
            "$gte" => Self::Gte,
            "$between" => Self::Between,
            "$contains" => Self::Contains,
            "$notContains" => Self::NotContains,
            "$containsi" => Self::Containsi,
            "$notContainsi" => Self::NotContainsi,
            "$startsWith" => Self::StartsWith,
            "$endsWith" => Self::EndsWith,
            "$null" => Self::Null,
            "$notNull" => Self::NotNull,
            _ => return None,
        };
        Some(op)
    }

    /// Parse any key found inside an operator map, keeping unknown keys.
    pub fn parse_lenient(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| Self::Other(raw.to_string()))
    }

    #[inline]
    pub fn is_allowlisted(raw: &str) -> bool {
        Self::ALLOWLIST.contains(&raw)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::In => "$in",
            Self::NotIn => "$notIn",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Between => "$between",
            Self::Contains => "$contains",
            Self::NotContains => "$notContains",
            Self::Containsi => "$containsi",
            Self::NotContainsi => "$notContainsi",
            Self::StartsWith => "$startsWith",
            Self::EndsWith => "$endsWith",
            Self::Null => "$null",
            Self::NotNull => "$notNull",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf value in a filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    /// Render the value the way it appears on the wire (before percent-encoding).
    pub fn to_wire_string(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => format_numeric(*value),
            Self::Bool(value) => value.to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Right-hand side of an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Operand {
    pub fn list<S: Into<Scalar>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>> From<T> for Operand {
    fn from(value: T) -> Self {
        Self::Scalar(value.into())
    }
}

/// The value attached to one key of a [`FilterNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Operator map, e.g. `{ "$containsi": "acme" }`.
    Operators(Vec<(Operator, Operand)>),
    /// Relation traversal, e.g. `{ "customer": { "name": ... } }`.
    Nested(FilterNode),
    /// Implicit equality.
    Scalar(Scalar),
    /// Implicit membership by position.
    List(Vec<Scalar>),
    /// Members of a `$and` / `$or` combinator.
    Group(Vec<FilterNode>),
}

impl FilterValue {
    pub fn op(operator: Operator, operand: impl Into<Operand>) -> Self {
        Self::Operators(vec![(operator, operand.into())])
    }

    pub fn list<S: Into<Scalar>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>> From<T> for FilterValue {
    fn from(value: T) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<FilterNode> for FilterValue {
    fn from(node: FilterNode) -> Self {
        Self::Nested(node)
    }
}

/// Ordered mapping from field name (or combinator) to a [`FilterValue`].
///
/// # Examples
///
/// ```
/// use intentql::types::{FilterNode, Operand, Operator};
///
/// let filters = FilterNode::new()
///     .where_op("status", Operator::Eq, "open")
///     .nested("customer", FilterNode::new().where_op("name", Operator::Containsi, "acme"))
///     .where_op("id", Operator::In, Operand::list([1, 2, 3]));
/// assert_eq!(filters.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterNode {
    entries: Vec<(String, FilterValue)>,
}

impl FilterNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A repeated key is kept as a second entry, as the wire
    /// format allows.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Add `operator` to the operator map of `field`, creating it when needed.
    pub fn where_op(mut self, field: impl Into<String>, operator: Operator, operand: impl Into<Operand>) -> Self {
        let field = field.into();
        let operand = operand.into();
        if let Some((_, FilterValue::Operators(ops))) = self.entries.iter_mut().find(|(key, _)| *key == field) {
            ops.push((operator, operand));
        } else {
            self.entries.push((field, FilterValue::Operators(vec![(operator, operand)])));
        }
        self
    }

    #[inline]
    pub fn nested(self, relation: impl Into<String>, node: FilterNode) -> Self {
        self.with(relation, FilterValue::Nested(node))
    }

    /// Combine `nodes` under `$and`.
    #[inline]
    pub fn all_of(self, nodes: impl IntoIterator<Item = FilterNode>) -> Self {
        self.with(AND, FilterValue::Group(nodes.into_iter().collect()))
    }

    /// Combine `nodes` under `$or`.
    #[inline]
    pub fn any_of(self, nodes: impl IntoIterator<Item = FilterNode>) -> Self {
        self.with(OR, FilterValue::Group(nodes.into_iter().collect()))
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FilterValue)> for FilterNode {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FilterNode {
    type Item = (String, FilterValue);
    type IntoIter = std::vec::IntoIter<(String, FilterValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Which related entities to include in a response.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulateSpec {
    /// Every first-level relation.
    All,
    Relation(String),
    Relations(Vec<String>),
    Shaped(Vec<(String, RelationPopulate)>),
}

impl PopulateSpec {
    pub fn relations<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::Relations(names.into_iter().map(Into::into).collect())
    }

    /// Start (or extend) a shaped populate tree.
    pub fn with(self, relation: impl Into<String>, populate: impl Into<RelationPopulate>) -> Self {
        let mut entries = match self {
            Self::Shaped(entries) => entries,
            Self::All => Vec::new(),
            Self::Relation(name) => vec![(name, RelationPopulate::Flag(true))],
            Self::Relations(names) => names.into_iter().map(|name| (name, RelationPopulate::Flag(true))).collect(),
        };
        entries.push((relation.into(), populate.into()));
        Self::Shaped(entries)
    }
}

/// How a single relation is included.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationPopulate {
    Flag(bool),
    Name(String),
    Shape(PopulateShape),
}

impl From<bool> for RelationPopulate {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<PopulateShape> for RelationPopulate {
    fn from(shape: PopulateShape) -> Self {
        Self::Shape(shape)
    }
}

/// Projection, nested inclusion, ordering and filtering for one relation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopulateShape {
    pub fields: Vec<String>,
    pub populate: Option<Box<PopulateSpec>>,
    pub sort: Vec<String>,
    pub filters: Option<FilterNode>,
}

impl PopulateShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_populate(mut self, populate: PopulateSpec) -> Self {
        self.populate = Some(Box::new(populate));
        self
    }

    pub fn with_sort<S: Into<String>>(mut self, sort: impl IntoIterator<Item = S>) -> Self {
        self.sort = sort.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filters(mut self, filters: FilterNode) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.populate.is_none() && self.sort.is_empty() && self.filters.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub start: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn page(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn offset(start: i64, limit: i64) -> Self {
        Self {
            start: Some(start),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// `limit = -1`, which the backend reads as "no limit".
    pub fn unbounded() -> Self {
        Self {
            limit: Some(-1),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.page.is_none() && self.page_size.is_none() && self.start.is_none() && self.limit.is_none()
    }
}

/// Everything a caller wants from one list/read request.
///
/// # Examples
///
/// ```
/// use intentql::types::{FilterNode, Operator, QueryIntent, SortOrder};
///
/// let intent = QueryIntent::new()
///     .with_filters(FilterNode::new().where_op("name", Operator::Containsi, "acme"))
///     .sort_by("createdAt", SortOrder::Desc)
///     .with_page(1, 25);
/// assert_eq!(intent.sort, vec!["createdAt:desc".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryIntent {
    pub filters: Option<FilterNode>,
    pub populate: Option<PopulateSpec>,
    pub sort: Vec<String>,
    pub pagination: Option<Pagination>,
    pub fields: Vec<String>,
    pub locale: Option<String>,
    pub publication_state: Option<String>,
    pub q: Option<String>,
}

impl QueryIntent {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_filters(mut self, filters: FilterNode) -> Self {
        self.filters = Some(filters);
        self
    }

    #[inline]
    pub fn with_populate(mut self, populate: PopulateSpec) -> Self {
        self.populate = Some(populate);
        self
    }

    /// Replace the sort list. Entries are `"field"` or `"field:direction"`.
    pub fn with_sort<S: Into<String>>(mut self, sort: impl IntoIterator<Item = S>) -> Self {
        self.sort = sort.into_iter().map(Into::into).collect();
        self
    }

    /// Append a `"field:direction"` sort entry.
    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push(format!("{}:{}", field, order.as_str()));
        self
    }

    #[inline]
    pub fn with_page(self, page: i64, page_size: i64) -> Self {
        self.with_pagination(Pagination::page(page, page_size))
    }

    #[inline]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[inline]
    pub fn with_publication_state(mut self, state: impl Into<String>) -> Self {
        self.publication_state = Some(state.into());
        self
    }

    /// Set the free-text search term.
    #[inline]
    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }
}

pub(crate) fn format_numeric(value: f64) -> String {
    // -0.0 == 0.0, so this also folds negative zero into "0".
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
