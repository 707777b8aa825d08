//! Example 01 – Order Listing
//!
//! The list page of an orders screen: one status filter, a date window,
//! newest first, 25 per page.

use anyhow::Result;

use crate::compile;
use crate::types::{FilterNode, Operator, QueryIntent, SortOrder};

pub fn run() -> Result<()> {
    let filters = FilterNode::new()
        .where_op("status", Operator::Eq, "confirmed")
        .where_op("orderDate", Operator::Gte, "2024-01-01T00:00:00.000Z")
        .where_op("orderDate", Operator::Lt, "2024-02-01T00:00:00.000Z");

    let intent = QueryIntent::new()
        .with_filters(filters)
        .sort_by("orderDate", SortOrder::Desc)
        .with_page(1, 25);

    let query = compile(&intent);
    assert_eq!(
        query,
        "filters[status][$eq]=confirmed\
         &filters[orderDate][$gte]=2024-01-01T00%3A00%3A00.000Z\
         &filters[orderDate][$lt]=2024-02-01T00%3A00%3A00.000Z\
         &sort[0]=orderDate%3Adesc\
         &pagination[page]=1&pagination[pageSize]=25"
    );

    // Compiling is deterministic.
    assert_eq!(compile(&intent), query);

    // Next page only changes the pagination keys.
    let next = compile(&intent.clone().with_page(2, 25));
    assert!(next.ends_with("pagination[page]=2&pagination[pageSize]=25"));

    Ok(())
}
