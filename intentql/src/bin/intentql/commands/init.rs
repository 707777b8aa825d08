use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::context::{CONFIG_FILE_NAME, IntentqlConfig};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Initialize",
    commands: &[
        "intentql init                          # Write intentql.toml with default settings",
        "intentql init --force                  # Overwrite an existing intentql.toml",
        "intentql init --path config/q.toml     # Write the file somewhere else",
    ],
}];

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the configuration file
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    if args.path.exists() && !args.force {
        output.warning(&format!("{} already exists.", args.path.display()));
        output.info("Use --force to overwrite it.");
        anyhow::bail!("Refusing to overwrite {}", args.path.display());
    }

    write_default_config(&args.path)?;

    output.success(&format!("Wrote {}", args.path.display()));
    output.key_value("Type field", "type");
    output.key_value("Date expansion", "on");
    output.hint("Edit [normalizer].type_codes to match your backend's enumerations");
    output.hint("Set [compiler].base_url to print full request URLs");
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(&IntentqlConfig::default()).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConfigContext;
    use crate::output::GlobalOptions;
    use tempfile::TempDir;

    fn quiet() -> OutputManager {
        OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        })
    }

    #[test]
    fn writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE_NAME);
        handle_init(
            InitArgs {
                path: path.clone(),
                force: false,
            },
            &quiet(),
        )
        .unwrap();

        let ctx = ConfigContext::from_file(&path).unwrap();
        assert_eq!(ctx.config, IntentqlConfig::default());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "# mine\n").unwrap();

        let args = InitArgs {
            path: path.clone(),
            force: false,
        };
        assert!(handle_init(args, &quiet()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        let args = InitArgs {
            path: path.clone(),
            force: true,
        };
        handle_init(args, &quiet()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[normalizer]"));
    }
}
