//! Example 05 – Export Everything
//!
//! Spreadsheet export fetches every matching row in one request with a
//! narrow projection. The export page's `#export` anchor stays last.

use anyhow::Result;

use crate::compiler::compile_params;
use crate::types::{FilterNode, Operator, Pagination, QueryIntent};

pub fn run() -> Result<()> {
    let intent = QueryIntent::new()
        .with_filters(FilterNode::new().where_op("stock", Operator::Gt, 0))
        .with_pagination(Pagination::unbounded())
        .with_fields(["sku", "name", "stock"])
        .with_locale("en");

    let url = compile_params(&intent).to_url("https://cms.example.com/api/products#export")?;
    assert_eq!(
        url,
        "https://cms.example.com/api/products?filters[stock][$gt]=0\
         &pagination[limit]=-1\
         &fields[0]=sku&fields[1]=name&fields[2]=stock\
         &locale=en#export"
    );

    // Nothing to send means the URL is left alone.
    assert_eq!(
        compile_params(&QueryIntent::new()).to_url("https://cms.example.com/api/products")?,
        "https://cms.example.com/api/products"
    );

    Ok(())
}
