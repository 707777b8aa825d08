//! Example 04 – Relation Shaping
//!
//! An invoice detail view: include the customer with a few fields and their
//! price lists, and only the open lines sorted by position.

use anyhow::Result;

use crate::compile;
use crate::types::{FilterNode, Operator, PopulateShape, PopulateSpec, QueryIntent};

pub fn run() -> Result<()> {
    let populate = PopulateSpec::Shaped(Vec::new())
        .with(
            "customer",
            PopulateShape::new()
                .with_fields(["name", "email"])
                .with_populate(PopulateSpec::relations(["prices"])),
        )
        .with(
            "lines",
            PopulateShape::new()
                .with_sort(["position:asc"])
                .with_filters(FilterNode::new().where_op("invoiced", Operator::Eq, false)),
        )
        .with("attachments", true);

    let intent = QueryIntent::new()
        .with_filters(FilterNode::new().with("id", 42))
        .with_populate(populate);

    assert_eq!(
        compile(&intent),
        "filters[id]=42\
         &populate[customer][fields][0]=name\
         &populate[customer][fields][1]=email\
         &populate[customer][populate][0]=prices\
         &populate[lines][sort][0]=position%3Aasc\
         &populate[lines][filters][invoiced][$eq]=false\
         &populate[attachments]=true"
    );

    // The same tree decoded from JSON compiles identically.
    let from_json = QueryIntent::from_json_str(
        r#"{
            "filters": { "id": 42 },
            "populate": {
                "customer": { "fields": ["name", "email"], "populate": ["prices"] },
                "lines": { "sort": ["position:asc"], "filters": { "invoiced": { "$eq": false } } },
                "attachments": true
            }
        }"#,
    )?;
    assert_eq!(compile(&from_json), compile(&intent));

    Ok(())
}
