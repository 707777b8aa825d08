//! intentql core library.
//!
//! Turns a structured description of a data request (filters, relation
//! population, sort, pagination, projection, locale, publication state,
//! free-text search) into the bracket-path query string understood by the
//! content API, after optionally canonicalizing filter values.
//!
//! ```
//! use intentql::{compile, normalize_intent};
//! use intentql::types::QueryIntent;
//!
//! let intent = QueryIntent::from_json_str(
//!     r#"{"filters": {"type": {"$in": ["SALE", "bogus"]}, "createdAt": {"$gte": "2024-01-15"}}}"#,
//! )
//! .unwrap();
//! assert_eq!(
//!     compile(&normalize_intent(&intent)),
//!     "filters[type][$in][0]=sale&filters[createdAt][$gte]=2024-01-15T00%3A00%3A00.000Z"
//! );
//! ```
//!
//! Every function here is pure and synchronous; nothing is cached and no
//! I/O happens, so all of it is safe to call from any number of threads.

pub mod compiler;
pub mod decode;
pub mod errors;
pub mod examples;
pub mod filters;
pub mod keys;
pub mod registry;
pub mod types;
pub mod validators;

pub use compiler::{Category, WireParam, WireParams, compile, compile_params};
pub use errors::*;
pub use filters::{
    FilterOutcome, NormalizeOptions, NormalizeReport, Normalized, normalize, normalize_intent, normalize_intent_with,
    normalize_with,
};
pub use registry::TypeCodes;
pub use types::{
    FilterNode, FilterValue, Operand, Operator, Pagination, PopulateShape, PopulateSpec, QueryIntent, RelationPopulate,
    Scalar, SortOrder,
};

/// Normalize an intent with `options`, then compile it.
///
/// The report is returned alongside so callers can short-circuit on
/// [`FilterOutcome::MatchesNothing`] instead of sending a request that the
/// backend would answer unfiltered.
pub fn compile_normalized(intent: &QueryIntent, options: &NormalizeOptions) -> (String, Normalized<QueryIntent>) {
    let normalized = normalize_intent_with(intent, options);
    (compile(&normalized.value), normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_normalized_reports_empty_type_filter() {
        let intent = QueryIntent::new().with_filters(FilterNode::new().where_op(
            "type",
            Operator::In,
            Operand::list(["bogus"]),
        ));
        let (query, normalized) = compile_normalized(&intent, &NormalizeOptions::default());
        assert_eq!(query, "");
        assert_eq!(normalized.outcome(), FilterOutcome::MatchesNothing);
    }
}
