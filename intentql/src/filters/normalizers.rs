//! Value normalizers applied to filter trees before compilation.
//!
//! Two rules run over a deep copy of the input:
//!
//! - the configured type field (`type` by default) has its `$in` / `$eq`
//!   candidates lower-cased and checked against [`TypeCodes`]; unknown codes
//!   are dropped
//! - bare `YYYY-MM-DD` strings become `YYYY-MM-DDT00:00:00.000Z`
//!
//! Nothing here fails. Whatever was dropped is recorded in the
//! [`NormalizeReport`] so callers can tell "no filter" apart from "a filter
//! that can no longer match anything".

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::IntentError;
use crate::keys::KeyPath;
use crate::registry::TypeCodes;
use crate::types::{FilterNode, FilterValue, Operand, Operator, PopulateSpec, QueryIntent, RelationPopulate, Scalar};
use crate::validators::expand_calendar_date;

pub const DEFAULT_TYPE_FIELD: &str = "type";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Field whose operator values are canonicalized against `type_codes`.
    pub type_field: String,
    pub type_codes: TypeCodes,
    pub expand_dates: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            type_field: DEFAULT_TYPE_FIELD.to_string(),
            type_codes: TypeCodes::default(),
            expand_dates: true,
        }
    }
}

impl NormalizeOptions {
    pub fn validate(&self) -> Result<(), IntentError> {
        if self.type_field.trim().is_empty() {
            return Err(IntentError::config("normalizer type_field must not be empty"));
        }
        if self.type_codes.is_empty() {
            return Err(IntentError::config("normalizer type_codes must list at least one code"));
        }
        Ok(())
    }
}

/// A candidate removed by type-code canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedValue {
    /// Bracket path of the operator the value was removed from.
    pub path: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NormalizeReport {
    pub dropped_values: Vec<DroppedValue>,
    /// Bracket paths of type `$in` lists that ended up empty.
    pub emptied_fields: Vec<String>,
    pub expanded_dates: usize,
    pub canonicalized_codes: usize,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_values.is_empty()
            && self.emptied_fields.is_empty()
            && self.expanded_dates == 0
            && self.canonicalized_codes == 0
    }

    fn merge(&mut self, other: NormalizeReport) {
        self.dropped_values.extend(other.dropped_values);
        self.emptied_fields.extend(other.emptied_fields);
        self.expanded_dates += other.expanded_dates;
        self.canonicalized_codes += other.canonicalized_codes;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOutcome {
    /// Output equals input.
    Unchanged,
    /// Values were rewritten or dropped; the filter still selects rows.
    Normalized,
    /// A type `$in` list is empty, so the request cannot match any row.
    /// The compiler emits nothing for an empty list, so sending the request
    /// anyway would return unfiltered results.
    MatchesNothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    pub report: NormalizeReport,
}

impl<T> Normalized<T> {
    pub fn outcome(&self) -> FilterOutcome {
        outcome_of(&self.report)
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

pub fn outcome_of(report: &NormalizeReport) -> FilterOutcome {
    if !report.emptied_fields.is_empty() {
        FilterOutcome::MatchesNothing
    } else if report.is_clean() {
        FilterOutcome::Unchanged
    } else {
        FilterOutcome::Normalized
    }
}

/// Normalize a filter tree with the default options.
///
/// # Examples
///
/// ```
/// use intentql::filters::normalize;
/// use intentql::types::{FilterNode, Operand, Operator};
///
/// let filters = FilterNode::new().where_op("type", Operator::In, Operand::list(["SALE", "bogus"]));
/// let expected = FilterNode::new().where_op("type", Operator::In, Operand::list(["sale"]));
/// assert_eq!(normalize(&filters), expected);
/// ```
pub fn normalize(filters: &FilterNode) -> FilterNode {
    normalize_with(filters, &NormalizeOptions::default()).value
}

/// Normalize a filter tree and report what changed.
pub fn normalize_with(filters: &FilterNode, options: &NormalizeOptions) -> Normalized<FilterNode> {
    let mut walker = Walker::new(options);
    let value = walker.node(filters, &KeyPath::root("filters"));
    Normalized {
        value,
        report: walker.report,
    }
}

/// Normalize the top-level filters and every relation filter of an intent.
pub fn normalize_intent(intent: &QueryIntent) -> QueryIntent {
    normalize_intent_with(intent, &NormalizeOptions::default()).value
}

pub fn normalize_intent_with(intent: &QueryIntent, options: &NormalizeOptions) -> Normalized<QueryIntent> {
    let mut report = NormalizeReport::default();
    let mut normalized = intent.clone();

    if let Some(filters) = &intent.filters {
        let result = normalize_with(filters, options);
        report.merge(result.report);
        normalized.filters = Some(result.value);
    }

    if let Some(populate) = &intent.populate {
        let mut walker = Walker::new(options);
        normalized.populate = Some(walker.populate(populate, &KeyPath::root("populate")));
        report.merge(walker.report);
    }

    Normalized {
        value: normalized,
        report,
    }
}

struct Walker<'a> {
    options: &'a NormalizeOptions,
    report: NormalizeReport,
}

impl<'a> Walker<'a> {
    fn new(options: &'a NormalizeOptions) -> Self {
        Self {
            options,
            report: NormalizeReport::default(),
        }
    }

    fn node(&mut self, node: &FilterNode, prefix: &KeyPath) -> FilterNode {
        node.iter()
            .map(|(key, value)| {
                let path = prefix.child(key);
                let value = match value {
                    FilterValue::Operators(ops) if key == self.options.type_field => {
                        FilterValue::Operators(self.type_operators(ops, &path))
                    }
                    FilterValue::Operators(ops) => FilterValue::Operators(
                        ops.iter()
                            .map(|(op, operand)| (op.clone(), self.operand(operand)))
                            .collect(),
                    ),
                    FilterValue::Nested(child) => FilterValue::Nested(self.node(child, &path)),
                    FilterValue::Scalar(scalar) => FilterValue::Scalar(self.scalar(scalar)),
                    FilterValue::List(values) => FilterValue::List(values.iter().map(|v| self.scalar(v)).collect()),
                    FilterValue::Group(members) => FilterValue::Group(
                        members
                            .iter()
                            .enumerate()
                            .map(|(index, member)| self.node(member, &path.index(index)))
                            .collect(),
                    ),
                };
                (key.to_string(), value)
            })
            .collect()
    }

    fn populate(&mut self, spec: &PopulateSpec, prefix: &KeyPath) -> PopulateSpec {
        let PopulateSpec::Shaped(relations) = spec else {
            return spec.clone();
        };
        let relations = relations
            .iter()
            .map(|(relation, populate)| {
                let path = prefix.child(relation);
                let populate = match populate {
                    RelationPopulate::Shape(shape) => {
                        let mut shape = shape.clone();
                        if let Some(nested) = &shape.populate {
                            shape.populate = Some(Box::new(self.populate(nested, &path.child("populate"))));
                        }
                        if let Some(filters) = &shape.filters {
                            shape.filters = Some(self.node(filters, &path.child("filters")));
                        }
                        RelationPopulate::Shape(shape)
                    }
                    other => other.clone(),
                };
                (relation.clone(), populate)
            })
            .collect();
        PopulateSpec::Shaped(relations)
    }

    fn type_operators(&mut self, ops: &[(Operator, Operand)], path: &KeyPath) -> Vec<(Operator, Operand)> {
        let mut kept = Vec::with_capacity(ops.len());
        for (op, operand) in ops {
            let op_path = path.child(op.as_str());
            match (op, operand) {
                (Operator::In, Operand::List(values)) => {
                    let filtered: Vec<Scalar> = values
                        .iter()
                        .filter_map(|value| self.type_code(value, &op_path).map(Scalar::String))
                        .collect();
                    if filtered.is_empty() {
                        debug!("type filter {} matches no known code", op_path);
                        self.report.emptied_fields.push(op_path.into_string());
                    }
                    kept.push((Operator::In, Operand::List(filtered)));
                }
                (Operator::Eq, Operand::Scalar(value)) => {
                    if let Some(code) = self.type_code(value, &op_path) {
                        kept.push((Operator::Eq, Operand::Scalar(Scalar::String(code))));
                    }
                }
                _ => kept.push((op.clone(), self.operand(operand))),
            }
        }
        kept
    }

    fn type_code(&mut self, value: &Scalar, path: &KeyPath) -> Option<String> {
        let canonical = value.as_str().and_then(|raw| self.options.type_codes.canonicalize(raw));
        match (&canonical, value.as_str()) {
            (Some(code), Some(raw)) if code != raw => self.report.canonicalized_codes += 1,
            (None, _) => {
                let raw = value.to_wire_string();
                debug!("dropping unknown type code {:?} at {}", raw, path);
                self.report.dropped_values.push(DroppedValue {
                    path: path.to_string(),
                    value: raw,
                });
            }
            _ => {}
        }
        canonical
    }

    fn operand(&mut self, operand: &Operand) -> Operand {
        match operand {
            Operand::Scalar(value) => Operand::Scalar(self.scalar(value)),
            Operand::List(values) => Operand::List(values.iter().map(|v| self.scalar(v)).collect()),
        }
    }

    fn scalar(&mut self, value: &Scalar) -> Scalar {
        if self.options.expand_dates
            && let Scalar::String(raw) = value
            && let Some(expanded) = expand_calendar_date(raw)
        {
            self.report.expanded_dates += 1;
            return Scalar::String(expanded);
        }
        value.clone()
    }
}
