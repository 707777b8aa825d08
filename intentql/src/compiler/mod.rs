//! # Query-intent compilation
//!
//! Lowers a [`QueryIntent`] into ordered [`WireParams`] and serializes them to
//! the bracket-path query dialect of the content API.
//!
//! ## Lowering Quick Reference
//!
//! | Input                                          | Output                                          |
//! |------------------------------------------------|-------------------------------------------------|
//! | `{ name: { $containsi: "x" } }`                | `filters[name][$containsi]=x`                   |
//! | `{ customer: { name: { $eq: "x" } } }`         | `filters[customer][name][$eq]=x`                |
//! | `{ id: { $in: [1, 2] } }`                      | `filters[id][$in][0]=1&filters[id][$in][1]=2`   |
//! | `{ id: [1, 2] }`                               | `filters[id][0]=1&filters[id][1]=2`             |
//! | `{ $or: [{ a: 1 }, { b: 2 }] }`                | `filters[$or][0][a]=1&filters[$or][1][b]=2`     |
//! | populate `["customer"]`                        | `populate[0]=customer`                          |
//! | populate `{ customer: { fields: ["name"] } }`  | `populate[customer][fields][0]=name`            |
//! | sort `"name:asc"`                              | `sort[0]=name%3Aasc`                            |
//! | pagination `{ page: 2 }`                       | `pagination[page]=2`                            |
//!
//! Categories are always emitted in [`Category`] declaration order:
//! filters, populate, sort, pagination, fields, locale, publicationState, q.

mod wire;

pub use wire::{Category, WireParam, WireParams, encode_value};

use log::trace;

use crate::keys::KeyPath;
use crate::types::{FilterNode, FilterValue, Operand, Pagination, PopulateSpec, QueryIntent, RelationPopulate};

/// Wildcard value used when every first-level relation is populated.
pub const POPULATE_ALL: &str = "*";

/// Compile an intent into a query string (without the leading `?`).
///
/// # Examples
///
/// ```
/// use intentql::compiler::compile;
/// use intentql::types::{FilterNode, Operator, QueryIntent};
///
/// let intent = QueryIntent::new()
///     .with_filters(FilterNode::new().where_op("name", Operator::Containsi, "acme"))
///     .with_page(2, 25);
/// assert_eq!(
///     compile(&intent),
///     "filters[name][$containsi]=acme&pagination[page]=2&pagination[pageSize]=25"
/// );
/// ```
pub fn compile(intent: &QueryIntent) -> String {
    compile_params(intent).to_query_string()
}

/// Lower an intent into ordered wire parameters.
pub fn compile_params(intent: &QueryIntent) -> WireParams {
    let mut params = WireParams::new();

    if let Some(filters) = &intent.filters {
        lower_filters(filters, &KeyPath::root(Category::Filters.root()), &mut params);
    }

    if let Some(populate) = &intent.populate {
        lower_populate(populate, &KeyPath::root(Category::Populate.root()), &mut params);
    }

    lower_indexed(&intent.sort, &KeyPath::root(Category::Sort.root()), Category::Sort, &mut params);

    if let Some(pagination) = &intent.pagination {
        lower_pagination(pagination, &mut params);
    }

    lower_indexed(&intent.fields, &KeyPath::root(Category::Fields.root()), Category::Fields, &mut params);

    for (category, value) in [
        (Category::Locale, &intent.locale),
        (Category::PublicationState, &intent.publication_state),
        (Category::Search, &intent.q),
    ] {
        if let Some(value) = value
            && !value.is_empty()
        {
            params.push(category, category.root(), value.as_str());
        }
    }

    trace!("compiled query intent into {} wire params", params.len());
    params
}

/// Lower a filter tree rooted at `prefix` into `params`.
pub fn lower_filters(node: &FilterNode, prefix: &KeyPath, params: &mut WireParams) {
    for (key, value) in node.iter() {
        let path = prefix.child(key);
        match value {
            FilterValue::Operators(ops) => {
                for (operator, operand) in ops {
                    let op_path = path.child(operator.as_str());
                    match operand {
                        Operand::List(values) => {
                            for (index, value) in values.iter().enumerate() {
                                params.push(Category::Filters, op_path.index(index).into_string(), value.to_wire_string());
                            }
                        }
                        Operand::Scalar(value) => {
                            params.push(Category::Filters, op_path.into_string(), value.to_wire_string());
                        }
                    }
                }
            }
            FilterValue::Nested(child) => lower_filters(child, &path, params),
            FilterValue::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    params.push(Category::Filters, path.index(index).into_string(), value.to_wire_string());
                }
            }
            FilterValue::Scalar(value) => {
                params.push(Category::Filters, path.into_string(), value.to_wire_string());
            }
            FilterValue::Group(nodes) => {
                for (index, member) in nodes.iter().enumerate() {
                    lower_filters(member, &path.index(index), params);
                }
            }
        }
    }
}

/// Lower a populate specification rooted at `prefix` into `params`.
pub fn lower_populate(spec: &PopulateSpec, prefix: &KeyPath, params: &mut WireParams) {
    match spec {
        PopulateSpec::All => params.push(Category::Populate, prefix.as_str(), POPULATE_ALL),
        PopulateSpec::Relation(name) => {
            if !name.is_empty() {
                params.push(Category::Populate, prefix.as_str(), name.as_str());
            }
        }
        PopulateSpec::Relations(names) => lower_indexed(names, prefix, Category::Populate, params),
        PopulateSpec::Shaped(relations) => {
            for (relation, populate) in relations {
                let path = prefix.child(relation);
                match populate {
                    RelationPopulate::Flag(flag) => params.push(Category::Populate, path.into_string(), flag.to_string()),
                    RelationPopulate::Name(name) => params.push(Category::Populate, path.into_string(), name.as_str()),
                    RelationPopulate::Shape(shape) if shape.is_empty() => {
                        params.push(Category::Populate, path.into_string(), "true")
                    }
                    RelationPopulate::Shape(shape) => {
                        lower_indexed(&shape.fields, &path.child("fields"), Category::Populate, params);
                        if let Some(nested) = &shape.populate {
                            lower_populate(nested, &path.child("populate"), params);
                        }
                        lower_indexed(&shape.sort, &path.child("sort"), Category::Populate, params);
                        if let Some(filters) = &shape.filters {
                            lower_relation_filters(filters, &path.child("filters"), params);
                        }
                    }
                }
            }
        }
    }
}

/// Filters inside a populate shape belong to the populate category.
fn lower_relation_filters(node: &FilterNode, prefix: &KeyPath, params: &mut WireParams) {
    let mut scoped = WireParams::new();
    lower_filters(node, prefix, &mut scoped);
    for param in scoped.iter() {
        params.push(Category::Populate, param.key.as_str(), param.value.as_str());
    }
}

fn lower_pagination(pagination: &Pagination, params: &mut WireParams) {
    let root = KeyPath::root(Category::Pagination.root());
    for (name, value) in [
        ("page", pagination.page),
        ("pageSize", pagination.page_size),
        ("start", pagination.start),
        ("limit", pagination.limit),
    ] {
        if let Some(value) = value {
            params.push(Category::Pagination, root.child(name).into_string(), value.to_string());
        }
    }
}

fn lower_indexed(values: &[String], prefix: &KeyPath, category: Category, params: &mut WireParams) {
    for (index, value) in values.iter().enumerate() {
        params.push(category, prefix.index(index).into_string(), value.as_str());
    }
}
