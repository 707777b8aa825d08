use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use intentql::compile_params;
use intentql::filters::{FilterOutcome, normalize_intent_with};
use intentql::types::QueryIntent;

use super::read_json_input;
use crate::context::ConfigContext;
use crate::examples::ExampleGroup;
use crate::output::{CompiledQuery, OutputManager};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Compile",
        commands: &[
            "intentql compile intent.json                     # Key/value table of every parameter",
            "intentql --output compact compile intent.json    # Just the query string",
            "cat intent.json | intentql compile               # Read the intent from stdin",
        ],
    },
    ExampleGroup {
        title: "Normalize and Target",
        commands: &[
            "intentql compile intent.json --normalize                          # Canonicalize type codes and dates first",
            "intentql compile intent.json --base-url https://api.test/orders   # Print a full request URL",
        ],
    },
];

#[derive(Args)]
pub struct CompileArgs {
    /// Intent JSON file (stdin when omitted or `-`)
    pub file: Option<PathBuf>,

    /// Normalize filters before compiling
    #[arg(long)]
    pub normalize: bool,

    /// Prefix the query string with this URL
    #[arg(long)]
    pub base_url: Option<String>,
}

pub fn handle_compile(args: CompileArgs, ctx: &ConfigContext, output: &OutputManager) -> Result<()> {
    let document = read_json_input(args.file.as_deref())?;
    let mut intent = QueryIntent::from_json_value(&document)?;

    let mut outcome = None;
    if args.normalize || ctx.config.compiler.normalize {
        let normalized = normalize_intent_with(&intent, &ctx.config.normalizer);
        for dropped in &normalized.report.dropped_values {
            output.verbose(&format!("dropped {} at {}", dropped.value, dropped.path));
        }
        if normalized.outcome() == FilterOutcome::MatchesNothing {
            output.warning("A type filter lost every value; the backend would ignore it and return unfiltered rows.");
        }
        output.outcome(normalized.outcome());
        outcome = Some(normalized.outcome());
        intent = normalized.into_inner();
    }

    let params = compile_params(&intent);
    let query = params.to_query_string();
    let base_url = args.base_url.or_else(|| ctx.config.compiler.base_url.clone());
    let url = base_url.map(|base| params.to_url(&base)).transpose()?;

    output.verbose(&format!("compiled {} parameters", params.len()));
    output.display(&CompiledQuery {
        query,
        url,
        params,
        outcome,
    })
}
