//! JSON front-end for query intents.
//!
//! Callers that build intents as loosely-shaped JSON (the way browser code
//! does) go through here. The only shape heuristic in the crate lives in
//! [`classify_filter_value`]: a map is an operator map iff at least one of its
//! keys is on [`Operator::ALLOWLIST`].
//!
//! Decoding is permissive. `null`, non-object `filters`/`populate`, and values
//! of the wrong type are skipped rather than rejected; only a document that
//! is not valid JSON or not an object is an error.

use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::errors::{IntentError, IntentResult};
use crate::types::{
    AND, FilterNode, FilterValue, OR, Operand, Operator, Pagination, PopulateShape, PopulateSpec, QueryIntent,
    RelationPopulate, Scalar,
};

const KNOWN_INTENT_KEYS: [&str; 8] = [
    "filters",
    "populate",
    "sort",
    "pagination",
    "fields",
    "locale",
    "publicationState",
    "q",
];

const SHAPE_KEYS: [&str; 4] = ["fields", "populate", "sort", "filters"];

impl QueryIntent {
    /// Parse a JSON document into an intent.
    ///
    /// ```
    /// use intentql::types::QueryIntent;
    ///
    /// let intent = QueryIntent::from_json_str(r#"{"sort": "name:asc", "pagination": {"page": 2}}"#).unwrap();
    /// assert_eq!(intent.sort, vec!["name:asc".to_string()]);
    /// assert_eq!(intent.pagination.and_then(|p| p.page), Some(2));
    /// ```
    pub fn from_json_str(raw: &str) -> IntentResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> IntentResult<Self> {
        match value {
            Value::Object(map) => Ok(decode_intent(map)),
            other => Err(IntentError::invalid_shape(format!(
                "expected a JSON object, found {}",
                json_kind(other)
            ))),
        }
    }

    pub fn to_json_value(&self) -> Value {
        encode_intent(self)
    }
}

impl FilterNode {
    /// Decode a filter tree; anything other than an object is absent.
    pub fn from_json_value(value: &Value) -> Option<Self> {
        decode_filters(value)
    }

    pub fn to_json_value(&self) -> Value {
        encode_filters(self)
    }
}

impl PopulateSpec {
    pub fn from_json_value(value: &Value) -> Option<Self> {
        decode_populate(value)
    }

    pub fn to_json_value(&self) -> Value {
        encode_populate(self)
    }
}

/// Decode the recognised top-level keys of an intent object.
pub fn decode_intent(map: &Map<String, Value>) -> QueryIntent {
    for key in map.keys() {
        if !KNOWN_INTENT_KEYS.contains(&key.as_str()) {
            debug!("ignoring unknown intent key {:?}", key);
        }
    }

    QueryIntent {
        filters: map.get("filters").and_then(decode_filters),
        populate: map.get("populate").and_then(decode_populate),
        sort: map.get("sort").map(decode_strings).unwrap_or_default(),
        pagination: map.get("pagination").and_then(decode_pagination),
        fields: map.get("fields").map(decode_strings).unwrap_or_default(),
        locale: map.get("locale").and_then(decode_text),
        publication_state: map.get("publicationState").and_then(decode_text),
        q: map.get("q").and_then(decode_text),
    }
}

pub fn decode_filters(value: &Value) -> Option<FilterNode> {
    let Value::Object(map) = value else {
        if !value.is_null() {
            debug!("ignoring non-object filters ({})", json_kind(value));
        }
        return None;
    };
    Some(
        map.iter()
            .filter_map(|(key, value)| classify_filter_value(key, value).map(|v| (key.clone(), v)))
            .collect(),
    )
}

/// Returns `true` if at least one key of `map` is an allowlisted operator.
pub fn is_operator_map(map: &Map<String, Value>) -> bool {
    map.keys().any(|key| Operator::is_allowlisted(key))
}

/// Classify the JSON value found under `key` in a filter object.
///
/// | JSON value                              | Result                 |
/// |-----------------------------------------|------------------------|
/// | `null`                                  | `None` (key skipped)   |
/// | object with an allowlisted operator key | `Operators`            |
/// | any other object                        | `Nested`               |
/// | array under `$and` / `$or`              | `Group`                |
/// | any other array                         | `List`                 |
/// | string, number, bool                    | `Scalar`               |
pub fn classify_filter_value(key: &str, value: &Value) -> Option<FilterValue> {
    match value {
        Value::Null => None,
        Value::Object(map) if is_operator_map(map) => Some(FilterValue::Operators(decode_operators(key, map))),
        Value::Object(_) => decode_filters(value).map(FilterValue::Nested),
        Value::Array(items) if key == AND || key == OR => Some(FilterValue::Group(
            items
                .iter()
                .filter_map(|item| {
                    let member = decode_filters(item);
                    if member.is_none() {
                        debug!("skipping non-object member of {}", key);
                    }
                    member
                })
                .collect(),
        )),
        Value::Array(items) => Some(FilterValue::List(decode_scalars(key, items))),
        scalar => decode_scalar(scalar).map(FilterValue::Scalar),
    }
}

fn decode_operators(field: &str, map: &Map<String, Value>) -> Vec<(Operator, Operand)> {
    map.iter()
        .filter_map(|(raw, value)| {
            let operand = match value {
                Value::Null => return None,
                Value::Array(items) => Operand::List(decode_scalars(field, items)),
                Value::Object(_) => {
                    debug!("skipping object operand {}[{}]", field, raw);
                    return None;
                }
                scalar => Operand::Scalar(decode_scalar(scalar)?),
            };
            Some((Operator::parse_lenient(raw), operand))
        })
        .collect()
}

fn decode_scalars(field: &str, items: &[Value]) -> Vec<Scalar> {
    items
        .iter()
        .filter_map(|item| {
            let scalar = decode_scalar(item);
            if scalar.is_none() {
                debug!("skipping non-scalar list element under {}", field);
            }
            scalar
        })
        .collect()
}

fn decode_scalar(value: &Value) -> Option<Scalar> {
    match value {
        Value::String(s) => Some(Scalar::String(s.clone())),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => Some(number_to_scalar(n)),
        _ => None,
    }
}

fn number_to_scalar(number: &Number) -> Scalar {
    if let Some(i) = number.as_i64() {
        Scalar::Integer(i)
    } else {
        Scalar::Float(number.as_f64().unwrap_or_default())
    }
}

pub fn decode_populate(value: &Value) -> Option<PopulateSpec> {
    match value {
        Value::Bool(true) => Some(PopulateSpec::All),
        Value::String(name) if !name.is_empty() => Some(PopulateSpec::Relation(name.clone())),
        Value::Array(_) => Some(PopulateSpec::Relations(decode_strings(value))),
        Value::Object(map) => Some(PopulateSpec::Shaped(
            map.iter()
                .filter_map(|(relation, value)| decode_relation(relation, value).map(|p| (relation.clone(), p)))
                .collect(),
        )),
        _ => None,
    }
}

fn decode_relation(relation: &str, value: &Value) -> Option<RelationPopulate> {
    match value {
        Value::Bool(flag) => Some(RelationPopulate::Flag(*flag)),
        Value::String(name) => Some(RelationPopulate::Name(name.clone())),
        Value::Object(map) => {
            for key in map.keys() {
                if !SHAPE_KEYS.contains(&key.as_str()) {
                    debug!("ignoring unsupported populate key {}[{}]", relation, key);
                }
            }
            Some(RelationPopulate::Shape(PopulateShape {
                fields: map.get("fields").map(decode_strings).unwrap_or_default(),
                populate: map.get("populate").and_then(decode_populate).map(Box::new),
                sort: map.get("sort").map(decode_strings).unwrap_or_default(),
                filters: map.get("filters").and_then(decode_filters),
            }))
        }
        other => {
            debug!("ignoring populate value for {} ({})", relation, json_kind(other));
            None
        }
    }
}

fn decode_pagination(value: &Value) -> Option<Pagination> {
    let Value::Object(map) = value else {
        return None;
    };
    let member = |name: &str| map.get(name).and_then(decode_integer);
    let pagination = Pagination {
        page: member("page"),
        page_size: member("pageSize"),
        start: member("start"),
        limit: member("limit"),
    };
    (!pagination.is_empty()).then_some(pagination)
}

fn decode_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A string, or an array whose string elements are kept in order.
fn decode_strings(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}

fn decode_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn encode_filters(node: &FilterNode) -> Value {
    Value::Object(
        node.iter()
            .map(|(key, value)| (key.to_string(), encode_filter_value(value)))
            .collect(),
    )
}

fn encode_filter_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Operators(ops) => Value::Object(
            ops.iter()
                .map(|(op, operand)| {
                    let encoded = match operand {
                        Operand::Scalar(scalar) => encode_scalar(scalar),
                        Operand::List(values) => Value::Array(values.iter().map(encode_scalar).collect()),
                    };
                    (op.as_str().to_string(), encoded)
                })
                .collect(),
        ),
        FilterValue::Nested(node) => encode_filters(node),
        FilterValue::Scalar(scalar) => encode_scalar(scalar),
        FilterValue::List(values) => Value::Array(values.iter().map(encode_scalar).collect()),
        FilterValue::Group(nodes) => Value::Array(nodes.iter().map(encode_filters).collect()),
    }
}

fn encode_scalar(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::String(s) => Value::String(s.clone()),
        Scalar::Integer(i) => Value::Number((*i).into()),
        Scalar::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Scalar::Bool(b) => Value::Bool(*b),
    }
}

pub fn encode_populate(spec: &PopulateSpec) -> Value {
    match spec {
        PopulateSpec::All => Value::Bool(true),
        PopulateSpec::Relation(name) => Value::String(name.clone()),
        PopulateSpec::Relations(names) => Value::Array(names.iter().cloned().map(Value::String).collect()),
        PopulateSpec::Shaped(relations) => Value::Object(
            relations
                .iter()
                .map(|(relation, populate)| {
                    let encoded = match populate {
                        RelationPopulate::Flag(flag) => Value::Bool(*flag),
                        RelationPopulate::Name(name) => Value::String(name.clone()),
                        RelationPopulate::Shape(shape) => encode_shape(shape),
                    };
                    (relation.clone(), encoded)
                })
                .collect(),
        ),
    }
}

fn encode_shape(shape: &PopulateShape) -> Value {
    let mut map = Map::new();
    if !shape.fields.is_empty() {
        map.insert("fields".to_string(), string_array(&shape.fields));
    }
    if let Some(populate) = &shape.populate {
        map.insert("populate".to_string(), encode_populate(populate));
    }
    if !shape.sort.is_empty() {
        map.insert("sort".to_string(), string_array(&shape.sort));
    }
    if let Some(filters) = &shape.filters {
        map.insert("filters".to_string(), encode_filters(filters));
    }
    Value::Object(map)
}

pub fn encode_intent(intent: &QueryIntent) -> Value {
    let mut map = Map::new();
    if let Some(filters) = &intent.filters {
        map.insert("filters".to_string(), encode_filters(filters));
    }
    if let Some(populate) = &intent.populate {
        map.insert("populate".to_string(), encode_populate(populate));
    }
    if !intent.sort.is_empty() {
        map.insert("sort".to_string(), string_array(&intent.sort));
    }
    if let Some(pagination) = &intent.pagination
        && let Ok(value) = serde_json::to_value(pagination)
    {
        map.insert("pagination".to_string(), strip_nulls(value));
    }
    if !intent.fields.is_empty() {
        map.insert("fields".to_string(), string_array(&intent.fields));
    }
    for (key, value) in [
        ("locale", &intent.locale),
        ("publicationState", &intent.publication_state),
        ("q", &intent.q),
    ] {
        if let Some(value) = value {
            map.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    Value::Object(map)
}

fn string_array(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => other,
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_filters(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_filters(&value).ok_or_else(|| D::Error::custom("filters must be a JSON object"))
    }
}

impl Serialize for PopulateSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_populate(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PopulateSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_populate(&value).ok_or_else(|| D::Error::custom("populate must be true, a string, an array or an object"))
    }
}

impl Serialize for QueryIntent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_intent(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryIntent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        QueryIntent::from_json_value(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_key_makes_operator_map() {
        let value = classify_filter_value("name", &json!({ "$containsi": "x" }));
        assert_eq!(value, Some(FilterValue::op(Operator::Containsi, "x")));
    }

    #[test]
    fn map_without_operator_keys_is_nested() {
        let value = classify_filter_value("customer", &json!({ "name": { "$eq": "x" } }));
        let expected = FilterNode::new().where_op("name", Operator::Eq, "x");
        assert_eq!(value, Some(FilterValue::Nested(expected)));
    }

    #[test]
    fn unknown_keys_in_operator_map_are_kept() {
        let value = classify_filter_value("name", &json!({ "$eq": "a", "$custom": "b" }));
        assert_eq!(
            value,
            Some(FilterValue::Operators(vec![
                (Operator::Eq, Operand::from("a")),
                (Operator::Other("$custom".to_string()), Operand::from("b")),
            ]))
        );
    }

    #[test]
    fn unknown_operator_alone_is_treated_as_nested_path() {
        let value = classify_filter_value("name", &json!({ "$custom": "b" }));
        assert_eq!(value, Some(FilterValue::Nested(FilterNode::new().with("$custom", "b"))));
    }

    #[test]
    fn arrays_split_into_groups_and_lists() {
        let group = classify_filter_value("$or", &json!([{ "a": 1 }, 5, { "b": true }]));
        assert_eq!(
            group,
            Some(FilterValue::Group(vec![
                FilterNode::new().with("a", 1),
                FilterNode::new().with("b", true),
            ]))
        );

        let list = classify_filter_value("id", &json!([1, "two", null, 3.5]));
        assert_eq!(
            list,
            Some(FilterValue::List(vec![Scalar::Integer(1), Scalar::from("two"), Scalar::Float(3.5)]))
        );
    }

    #[test]
    fn null_values_and_operands_are_skipped() {
        let node = decode_filters(&json!({ "a": null, "b": { "$eq": null, "$ne": 2 } })).unwrap();
        assert_eq!(node, FilterNode::new().where_op("b", Operator::Ne, 2));
    }

    #[test]
    fn non_object_filters_are_absent() {
        assert_eq!(decode_filters(&json!("name")), None);
        assert_eq!(decode_filters(&json!(null)), None);
        let intent = QueryIntent::from_json_value(&json!({ "filters": [1, 2], "populate": 4 })).unwrap();
        assert_eq!(intent, QueryIntent::new());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let node = decode_filters(&json!({ "zeta": 1, "alpha": 2, "mid": 3 })).unwrap();
        let keys: Vec<&str> = node.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn populate_shapes() {
        assert_eq!(decode_populate(&json!(true)), Some(PopulateSpec::All));
        assert_eq!(decode_populate(&json!(false)), None);
        assert_eq!(decode_populate(&json!("customer")), Some(PopulateSpec::Relation("customer".to_string())));
        assert_eq!(decode_populate(&json!(["a", 1, "b"])), Some(PopulateSpec::relations(["a", "b"])));

        let shaped = decode_populate(&json!({
            "customer": { "fields": ["name"], "populate": { "prices": true }, "sort": "name:asc", "extra": 1 },
            "image": "*",
            "skip": null
        }))
        .unwrap();
        let expected = PopulateSpec::Shaped(vec![
            (
                "customer".to_string(),
                RelationPopulate::Shape(
                    PopulateShape::new()
                        .with_fields(["name"])
                        .with_populate(PopulateSpec::Shaped(vec![("prices".to_string(), RelationPopulate::Flag(true))]))
                        .with_sort(["name:asc"]),
                ),
            ),
            ("image".to_string(), RelationPopulate::Name("*".to_string())),
        ]);
        assert_eq!(shaped, expected);
    }

    #[test]
    fn pagination_members() {
        let intent = QueryIntent::from_json_value(&json!({ "pagination": { "page": "3", "limit": -1, "pageSize": 2.0, "start": "x" } }))
            .unwrap();
        assert_eq!(
            intent.pagination,
            Some(Pagination {
                page: Some(3),
                page_size: Some(2),
                start: None,
                limit: Some(-1),
            })
        );
        let empty = QueryIntent::from_json_value(&json!({ "pagination": {} })).unwrap();
        assert_eq!(empty.pagination, None);
    }

    #[test]
    fn non_object_document_is_an_error() {
        assert!(matches!(
            QueryIntent::from_json_str("[1, 2]"),
            Err(IntentError::InvalidShape { .. })
        ));
        assert!(matches!(QueryIntent::from_json_str("{"), Err(IntentError::Json(_))));
    }

    #[test]
    fn serde_round_trip_preserves_structure() {
        let raw = json!({
            "filters": {
                "type": { "$in": ["sale", "return"] },
                "customer": { "name": { "$containsi": "acme" } },
                "$or": [{ "total": { "$gt": 10 } }, { "paid": false }],
                "id": [1, 2]
            },
            "populate": { "customer": { "fields": ["name"] } },
            "sort": ["createdAt:desc"],
            "pagination": { "page": 1, "pageSize": 25 },
            "fields": ["number"],
            "locale": "en",
            "publicationState": "live",
            "q": "acme"
        });
        let intent: QueryIntent = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&intent).unwrap(), raw);
    }
}
