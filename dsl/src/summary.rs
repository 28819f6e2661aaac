//! Serializable view of a finalized command tree.

use serde::Serialize;

use optspec_core::{Arity, CastKind, OptionSpec, Value};

use crate::command::{Command, Entry};
use crate::super_command::SuperCommand;

/// Everything declared about one option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSummary {
    pub name: String,
    pub short: Option<String>,
    pub long: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negated: Option<String>,
    pub param: Option<String>,
    pub arity: Arity,
    pub cast: Option<CastKind>,
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    pub description: Option<String>,
}

impl From<&OptionSpec> for OptionSummary {
    fn from(option: &OptionSpec) -> Self {
        Self {
            name: option.name().to_string(),
            short: option.short_flag().map(String::from),
            long: option.long_flag().map(String::from),
            negated: option.negated_flag().map(String::from),
            param: option.metaname().map(String::from),
            arity: option.arity(),
            cast: option.cast(),
            default: option.default_value().cloned(),
            restricted: option.restricted().map(<[String]>::to_vec),
            dependencies: option.dependent_options().to_vec(),
            description: option.description().map(String::from),
        }
    }
}

/// Everything declared about a command, subcommands included.
///
/// # Examples
///
/// ```
/// use optspec_dsl::{CommandSummary, SuperCommand};
///
/// let tool = SuperCommand::build("tool", |b| {
///     b.boolean("debug", "Debug output")?;
///     b.command("run", |_| Ok(()))?;
///     Ok(())
/// })
/// .unwrap();
///
/// let summary = CommandSummary::from(&tool);
/// assert_eq!(summary.options[0].long.as_deref(), Some("--debug"));
/// assert_eq!(summary.commands[0].name, "run");
/// assert_eq!(summary.metaname.as_deref(), Some("COMMAND"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSummary {
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metaname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsimonious: Option<bool>,
    pub options: Vec<OptionSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSummary>,
}

impl From<&Command> for CommandSummary {
    fn from(command: &Command) -> Self {
        Self {
            name: command.name().to_string(),
            summary: command.summary().map(String::from),
            description: command.description().map(String::from),
            metaname: None,
            parsimonious: None,
            options: command
                .options()
                .map(|option| OptionSummary::from(option.as_ref()))
                .collect(),
            commands: command
                .listing()
                .iter()
                .filter_map(|entry| match entry {
                    Entry::Command(sub) => Some(CommandSummary::from(sub.as_ref())),
                    Entry::Super(sub) => Some(CommandSummary::from(sub.as_ref())),
                    _ => None,
                })
                .collect(),
        }
    }
}

impl From<&SuperCommand> for CommandSummary {
    fn from(command: &SuperCommand) -> Self {
        Self {
            metaname: Some(command.metaname().to_string()),
            parsimonious: Some(command.is_parsimonious()),
            ..CommandSummary::from(command.command())
        }
    }
}
