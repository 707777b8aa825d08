//! Example 03 – Document Lookup
//!
//! Intents arriving as JSON from a browser form, with user-typed type codes
//! and bare dates, normalized before compiling.

use anyhow::Result;

use crate::filters::{FilterOutcome, NormalizeOptions};
use crate::types::QueryIntent;
use crate::{compile, compile_normalized};

pub fn run() -> Result<()> {
    let intent = QueryIntent::from_json_str(
        r#"{
            "filters": {
                "type": { "$in": ["SALE", "Return", "bogus"] },
                "issuedAt": { "$between": ["2024-01-01", "2024-01-31"] },
                "customer": { "name": { "$containsi": "acme" } }
            },
            "sort": "issuedAt:desc"
        }"#,
    )?;

    let (query, normalized) = compile_normalized(&intent, &NormalizeOptions::default());
    assert_eq!(normalized.outcome(), FilterOutcome::Normalized);
    assert_eq!(normalized.report.dropped_values.len(), 1);
    assert_eq!(
        query,
        "filters[type][$in][0]=sale&filters[type][$in][1]=return\
         &filters[issuedAt][$between][0]=2024-01-01T00%3A00%3A00.000Z\
         &filters[issuedAt][$between][1]=2024-01-31T00%3A00%3A00.000Z\
         &filters[customer][name][$containsi]=acme\
         &sort[0]=issuedAt%3Adesc"
    );

    // Normalizing twice changes nothing further.
    let (again, _) = compile_normalized(&normalized.value, &NormalizeOptions::default());
    assert_eq!(again, query);

    // A filter left with no valid type codes is flagged instead of silently widened.
    let unknown = QueryIntent::from_json_str(r#"{"filters": {"type": {"$in": ["bogus"]}}}"#)?;
    let (query, normalized) = compile_normalized(&unknown, &NormalizeOptions::default());
    assert_eq!(normalized.outcome(), FilterOutcome::MatchesNothing);
    assert_eq!(query, compile(&QueryIntent::new()));

    Ok(())
}
