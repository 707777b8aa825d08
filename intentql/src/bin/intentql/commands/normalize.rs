use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use intentql::IntentError;
use intentql::filters::{FilterOutcome, normalize_with};
use intentql::types::FilterNode;

use super::read_json_input;
use crate::context::ConfigContext;
use crate::examples::ExampleGroup;
use crate::output::{NormalizedFilters, OutputManager};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Normalize Filters",
    commands: &[
        "intentql normalize filters.json                       # Show the normalized tree and what changed",
        "intentql --output compact normalize intent.json       # Normalized filters as one-line JSON",
        "intentql --config ./ops.toml normalize filters.json   # Use another type-code allowlist",
    ],
}];

#[derive(Args)]
pub struct NormalizeArgs {
    /// Filter tree or intent JSON file (stdin when omitted or `-`)
    pub file: Option<PathBuf>,
}

pub fn handle_normalize(args: NormalizeArgs, ctx: &ConfigContext, output: &OutputManager) -> Result<()> {
    let document = read_json_input(args.file.as_deref())?;
    let filters = extract_filters(&document)?;

    let normalized = normalize_with(&filters, &ctx.config.normalizer);
    let outcome = normalized.outcome();
    output.outcome(outcome);
    if outcome == FilterOutcome::MatchesNothing {
        for field in &normalized.report.emptied_fields {
            output.warning(&format!("{field} no longer matches any known type code"));
        }
    }

    output.display(&NormalizedFilters {
        filters: normalized.value,
        outcome,
        report: normalized.report,
    })
}

/// Use the `filters` member of an intent document, or the whole document
/// when it has none.
fn extract_filters(document: &Value) -> Result<FilterNode> {
    let Value::Object(map) = document else {
        return Err(IntentError::invalid_shape("expected a JSON object of filters").into());
    };
    let source = match map.get("filters") {
        Some(filters @ Value::Object(_)) => filters,
        _ => document,
    };
    Ok(FilterNode::from_json_value(source).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uses_filters_member_when_present() {
        let node = extract_filters(&json!({"filters": {"name": {"$eq": "a"}}, "q": "x"})).unwrap();
        assert_eq!(node.len(), 1);
        assert!(node.get("name").is_some());
    }

    #[test]
    fn whole_document_is_a_filter_tree_otherwise() {
        let node = extract_filters(&json!({"type": {"$in": ["SALE"]}, "status": "open"})).unwrap();
        assert_eq!(node.len(), 2);
    }

    #[test]
    fn rejects_non_objects() {
        assert!(extract_filters(&json!([1, 2])).is_err());
    }
}
