use std::fmt::Write;

use crate::commands::{compile, init, normalize};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "compile",
            groups: compile::EXAMPLES,
        },
        CommandExample {
            name: "normalize",
            groups: normalize::EXAMPLES,
        },
        CommandExample {
            name: "init",
            groups: init::EXAMPLES,
        },
    ]
}

/// Plain-text `Examples:` block for a subcommand's long help.
pub fn render_examples(groups: &[ExampleGroup]) -> String {
    let mut buffer = String::from("Examples:\n");
    for group in groups {
        let _ = writeln!(buffer, "\n  {}", group.title);
        for command in group.commands {
            let _ = writeln!(buffer, "    $ {command}");
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_examples() {
        for example in command_examples() {
            assert!(!example.groups.is_empty(), "{} has no examples", example.name);
            let rendered = render_examples(example.groups);
            assert!(rendered.starts_with("Examples:\n"));
            assert!(rendered.contains(&format!("intentql {}", example.name)));
        }
    }
}
