use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use intentql::filters::{FilterOutcome, NormalizeReport};
use intentql::types::FilterNode;
use intentql::WireParams;

use crate::theme::{KEY_COLOR, Tone, VALUE_COLOR, category_color, outcome_label, outcome_tone};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Key/value table (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Just the query string or document
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Trait for data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display data according to the configured output format.
    ///
    /// Compact output is printed even in quiet mode since it is the result
    /// scripts consume.
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        match self.options.output_format {
            OutputFormat::Compact => println!("{}", data.to_compact()),
            _ if self.options.quiet => {}
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(&self.options);
                println!("{table}");
            }
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.status(Tone::Success, message));
        }
    }

    /// Errors go to stderr and ignore `--quiet`.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.status(Tone::Error, message));
    }

    /// Warnings go to stderr so they never mix with compact output.
    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.status(Tone::Warning, message));
        }
    }

    pub fn info(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.status(Tone::Info, message));
        }
    }

    /// Display verbose information (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.status(Tone::Detail, message));
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if !self.options.quiet {
            let output = if self.options.no_color {
                format!("{key}: {value}")
            } else {
                format!("{}: {}", key.color(KEY_COLOR).bold(), value.color(VALUE_COLOR))
            };
            println!("{output}");
        }
    }

    /// One status line on stderr describing what normalization did.
    pub fn outcome(&self, outcome: FilterOutcome) {
        if !self.options.quiet {
            let message = format!("filters {}", outcome_label(outcome));
            eprintln!("{}", self.status(outcome_tone(outcome), &message));
        }
    }

    /// Indented hint line on stderr.
    pub fn hint(&self, text: &str) {
        if !self.options.quiet {
            let bullet = if self.options.no_color { "•".normal() } else { "•".color(Tone::Detail.color()) };
            eprintln!("  {bullet} {text}");
        }
    }

    fn status(&self, tone: Tone, message: &str) -> String {
        if self.options.no_color {
            format!("{} {message}", tone.icon())
        } else {
            format!("{} {}", tone.icon().color(tone.color()), message.color(tone.color()))
        }
    }
}

/// Create a themed table with a bold header row.
pub fn themed_table(options: &GlobalOptions, headers: &[&str]) -> Table {
    let mut table = Table::new();
    if options.no_color {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    } else {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    }

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| {
            let cell = Cell::new(h).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(header_cells);
    table
}

/// Result of `intentql compile`.
#[derive(Debug, Serialize)]
pub struct CompiledQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub params: WireParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FilterOutcome>,
}

impl TableDisplay for CompiledQuery {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["#", "Category", "Key", "Value"]);
        if self.params.is_empty() {
            table.add_row(vec![Cell::new("-"), Cell::new("-"), Cell::new("(no parameters)"), Cell::new("")]);
            return table;
        }
        for (index, param) in self.params.iter().enumerate() {
            let mut category = Cell::new(param.category.root());
            if !options.no_color {
                category = category.fg(category_color(param.category));
            }
            table.add_row(vec![Cell::new(index), category, Cell::new(&param.key), Cell::new(&param.value)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.url.clone().unwrap_or_else(|| self.query.clone())
    }
}

/// Result of `intentql normalize`.
#[derive(Debug, Serialize)]
pub struct NormalizedFilters {
    pub filters: FilterNode,
    pub outcome: FilterOutcome,
    pub report: NormalizeReport,
}

impl TableDisplay for NormalizedFilters {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Item", "Value"]);
        let pretty = serde_json::to_string_pretty(&self.filters).unwrap_or_default();
        table.add_row(vec![Cell::new("filters"), Cell::new(pretty)]);
        table.add_row(vec![Cell::new("outcome"), Cell::new(outcome_label(self.outcome))]);
        table.add_row(vec![Cell::new("expanded dates"), Cell::new(self.report.expanded_dates)]);
        table.add_row(vec![
            Cell::new("canonicalized codes"),
            Cell::new(self.report.canonicalized_codes),
        ]);
        for dropped in &self.report.dropped_values {
            table.add_row(vec![
                Cell::new("dropped"),
                Cell::new(format!("{} at {}", dropped.value, dropped.path)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        serde_json::to_string(&self.filters).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intentql::compile_params;
    use intentql::types::{FilterNode, Operator, QueryIntent};

    fn compiled() -> CompiledQuery {
        let intent = QueryIntent::new().with_filters(FilterNode::new().where_op("name", Operator::Eq, "a b"));
        let params = compile_params(&intent);
        CompiledQuery {
            query: params.to_query_string(),
            url: None,
            params,
            outcome: None,
        }
    }

    #[test]
    fn compact_prefers_url() {
        let mut data = compiled();
        assert_eq!(data.to_compact(), "filters[name][$eq]=a%20b");
        data.url = Some("https://api.test/x?filters[name][$eq]=a%20b".to_string());
        assert!(data.to_compact().starts_with("https://"));
    }

    #[test]
    fn table_lists_every_param() {
        let options = GlobalOptions {
            no_color: true,
            ..Default::default()
        };
        let rendered = compiled().to_table(&options).to_string();
        assert!(rendered.contains("filters[name][$eq]"));
        assert!(rendered.contains("a b"));
    }

    #[test]
    fn json_output_skips_absent_fields() {
        let json = serde_json::to_value(compiled()).unwrap();
        assert!(json.get("url").is_none());
        assert_eq!(json["params"][0]["key"], "filters[name][$eq]");
        assert_eq!(json["params"][0]["category"], "filters");
    }

    #[test]
    fn table_labels_categories_by_wire_root() {
        let intent = QueryIntent::new().with_search("acme");
        let params = compile_params(&intent);
        let data = CompiledQuery {
            query: params.to_query_string(),
            url: None,
            params,
            outcome: None,
        };
        let options = GlobalOptions {
            no_color: true,
            ..Default::default()
        };
        let rendered = data.to_table(&options).to_string();
        assert!(rendered.contains("| q "));
        assert!(!rendered.contains("search"));
    }

    #[test]
    fn display_in_quiet_mode_is_ok() {
        let manager = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(manager.display(&compiled()).is_ok());
    }
}
