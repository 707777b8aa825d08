mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    compile::{CompileArgs, handle_compile},
    init::{InitArgs, handle_init},
    normalize::{NormalizeArgs, handle_normalize},
};
use context::ConfigContext;
use examples::{command_examples, render_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};

const ENVIRONMENT_HELP: &str = "\
Environment Variables:
  INTENTQL_CONFIG  Path to intentql.toml (overrides the directory search)
  RUST_LOG         Log filter, e.g. intentql=debug

Use 'intentql <command> --help' to view examples for each command.";

#[derive(Parser)]
#[command(name = "intentql", version)]
#[command(
    about = "Compile structured query intents into bracket-path REST query strings",
    long_about = r#"Query intent compiler for bracket-path REST APIs that provides:

• Deterministic query strings (filters, populate, sort, pagination, fields)
• Type-code canonicalization and calendar-date expansion
• A key/value breakdown of every emitted parameter"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(styles = help_styles(), after_long_help = ENVIRONMENT_HELP)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors and compact results will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (defaults to the nearest intentql.toml)
    #[arg(long, env = "INTENTQL_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an intent JSON document into a query string
    Compile(CompileArgs),

    /// Canonicalize type codes and dates in a filter tree
    Normalize(NormalizeArgs),

    /// Write a default intentql.toml
    Init(InitArgs),
}

fn help_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().bold())
        .usage(AnsiColor::BrightBlue.on_default().bold())
        .literal(AnsiColor::Magenta.on_default())
        .placeholder(AnsiColor::BrightBlack.on_default())
}

/// The derived command with each subcommand's examples in its long help.
fn build_command() -> Command {
    let mut command = Cli::command();
    for example in command_examples() {
        command = command.mut_subcommand(example.name, |sub| {
            sub.after_long_help(render_examples(example.groups))
        });
    }
    command
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() {
    let matches = build_command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli, &output) {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    let load_config = || -> Result<ConfigContext> {
        let ctx = ConfigContext::load(cli.config.as_deref())?;
        output.verbose(&format!("configuration: {}", ctx.source_label()));
        Ok(ctx)
    };

    match cli.command {
        Commands::Init(args) => handle_init(args, output),
        Commands::Compile(args) => handle_compile(args, &load_config()?, output),
        Commands::Normalize(args) => handle_normalize(args, &load_config()?, output),
    }
}
