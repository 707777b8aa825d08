//! Worked examples of building and compiling query intents.
//!
//! Each example is a `run()` function with assertions on the exact wire
//! output, exercised by `tests/examples.rs`.
//!
//! - ex01: Order listing - filters, sort, pagination with typed builders
//! - ex02: Customer search - free-text search, nested relation filters, `$or`
//! - ex03: Document lookup - JSON intents, type-code and date normalization
//! - ex04: Relation shaping - populate trees with fields, sort and filters
//! - ex05: Export everything - `limit=-1`, projections, appending to a URL

pub mod ex01_order_listing;
pub mod ex02_customer_search;
pub mod ex03_document_lookup;
pub mod ex04_relation_shaping;
pub mod ex05_export_everything;
