//! Example 02 – Customer Search
//!
//! Search box text goes to `q`; the territory picker filters through the
//! `territory` relation; a "VIP or recently active" toggle uses `$or`.

use anyhow::Result;

use crate::compiler::{Category, compile_params};
use crate::types::{FilterNode, Operator, QueryIntent};

pub fn run() -> Result<()> {
    let filters = FilterNode::new()
        .nested("territory", FilterNode::new().where_op("code", Operator::Eq, "NORTH"))
        .any_of([
            FilterNode::new().where_op("tier", Operator::Eq, "vip"),
            FilterNode::new().where_op("lastOrderAt", Operator::Gte, "2024-06-01T00:00:00.000Z"),
        ]);

    let intent = QueryIntent::new()
        .with_filters(filters)
        .with_search("Acme & Sons")
        .with_page(1, 10);

    let params = compile_params(&intent);
    assert_eq!(params.get("filters[territory][code][$eq]"), Some("NORTH"));
    assert_eq!(params.get("filters[$or][0][tier][$eq]"), Some("vip"));
    assert_eq!(params.category(Category::Filters).count(), 3);

    // The ampersand in the search text is encoded once; the keys are not.
    let query = params.to_query_string();
    assert!(query.ends_with("&q=Acme%20%26%20Sons"));
    assert!(query.contains("filters[$or][1][lastOrderAt][$gte]=2024-06-01T00%3A00%3A00.000Z"));
    assert!(!query.contains("%5B"));

    Ok(())
}
