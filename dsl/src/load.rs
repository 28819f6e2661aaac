//! Declaring command trees in YAML.
//!
//! A declaration file describes one command. Listing `commands` makes it a
//! super-command whose subcommands are declared the same way, nested
//! super-commands included.
//!
//! # Example YAML
//!
//! ```yaml
//! name: deploy
//! summary: Ship a build
//! printer: { kind: standard, color: false }
//! help: true
//! version: "1.0.0"        # or version_file: VERSION
//! metaname: TARGET
//! options:
//!   - boolean: [verbose, "Print more"]
//!   - separator: "Tuning"
//!   - integers_: [retry, "Retry delays", { default: [1, 5] }]
//!   - region: { short: -r, long: --region, cast: symbol, restricted: [eu, us] }
//! commands:
//!   - name: staging
//!     summary: Deploy to staging
//!     arguments: filepath
//! ```
//!
//! Each `options` entry holds a single key. `separator` appends a
//! separator. A declaration method such as `integers_` takes
//! `[name, desc, config?]`. Any other key declares an option from a
//! mapping, as in [`OptionBuilder::from_declaration`]. A method name
//! followed by a list is always read as a method call, never as a
//! dependency list.
//!
//! [`OptionBuilder::from_declaration`]: optspec_core::OptionBuilder::from_declaration

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value as Yaml;
use tracing::debug;

use optspec_core::{CastKind, ConfigurationError, Flow, OptionConfig, Value, Version};

use crate::builder::CommandBuilder;
use crate::command::Command;
use crate::error::LoadError;
use crate::printer::{PrinterKind, PrinterOptions};
use crate::summary::CommandSummary;
use crate::super_command::{SuperCommand, SuperCommandBuilder};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    name: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    printer: Option<PrinterDecl>,
    #[serde(default)]
    help: Option<HelpDecl>,
    #[serde(default)]
    help_command: Option<HelpDecl>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    version_file: Option<PathBuf>,
    #[serde(default)]
    arguments: Option<CastKind>,
    #[serde(default)]
    metaname: Option<String>,
    #[serde(default)]
    parsimonious: bool,
    #[serde(default)]
    options: Vec<Yaml>,
    #[serde(default)]
    commands: Option<Vec<Document>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PrinterDecl {
    kind: String,
    #[serde(default)]
    template: Option<PathBuf>,
    #[serde(default)]
    color: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HelpDecl {
    Enabled(bool),
    Message(String),
}

impl HelpDecl {
    /// `None` when disabled, `Some(None)` for the default message.
    fn message(&self) -> Option<Option<&str>> {
        match self {
            HelpDecl::Enabled(false) => None,
            HelpDecl::Enabled(true) => Some(None),
            HelpDecl::Message(msg) => Some(Some(msg)),
        }
    }
}

/// A loaded declaration.
#[derive(Debug)]
pub enum Loaded {
    Command(Command),
    Super(SuperCommand),
}

impl Loaded {
    pub fn name(&self) -> &str {
        match self {
            Loaded::Command(command) => command.name(),
            Loaded::Super(command) => command.name(),
        }
    }

    pub fn summary(&self) -> CommandSummary {
        match self {
            Loaded::Command(command) => CommandSummary::from(command),
            Loaded::Super(command) => CommandSummary::from(command),
        }
    }

    pub fn print_help(&self, out: &mut dyn io::Write) -> io::Result<()> {
        match self {
            Loaded::Command(command) => command.print_help(out),
            Loaded::Super(command) => command.print_help(out),
        }
    }
}

/// Loads a declaration file.
///
/// Relative template paths are resolved against the file's directory.
///
/// # Errors
///
/// Returns [`LoadError::IoError`] if the file cannot be read,
/// [`LoadError::YamlError`] if it is not valid YAML, and
/// [`LoadError::Configuration`] or [`LoadError::Invalid`] if the
/// declarations are rejected.
pub fn load(path: impl AsRef<Path>) -> Result<Loaded, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let document: Document = serde_yaml::from_str(&text)?;
    let loaded = build(document, path.parent())?;
    debug!(path = %path.display(), command = loaded.name(), "declaration loaded");
    Ok(loaded)
}

/// Loads a declaration from YAML text.
///
/// ```
/// use optspec_dsl::load::{Loaded, from_yaml_str};
///
/// let loaded = from_yaml_str("name: tool\noptions:\n  - integer: [depth, How deep]\n").unwrap();
/// let Loaded::Command(command) = loaded else { panic!("expected a plain command") };
/// assert_eq!(command.option("depth").unwrap().short_flag(), Some("-d"));
/// ```
pub fn from_yaml_str(text: &str) -> Result<Loaded, LoadError> {
    let document: Document = serde_yaml::from_str(text)?;
    build(document, None)
}

fn build(document: Document, base: Option<&Path>) -> Result<Loaded, LoadError> {
    match document.commands {
        Some(_) => build_super(document, base).map(Loaded::Super),
        None => {
            if document.metaname.is_some() || document.parsimonious || document.help_command.is_some() {
                return Err(LoadError::Invalid(format!(
                    "{}: metaname, parsimonious and help_command need subcommands",
                    document.name
                )));
            }
            build_command(document, base).map(Loaded::Command)
        }
    }
}

fn build_super(mut document: Document, base: Option<&Path>) -> Result<SuperCommand, LoadError> {
    let mut builder = SuperCommandBuilder::new(&document.name)?;
    apply(&mut builder, &document, base)?;

    if let Some(metaname) = &document.metaname {
        builder.metaname(metaname);
    }
    if document.parsimonious {
        builder.parsimonious();
    }

    for sub in document.commands.take().unwrap_or_default() {
        match build(sub, base)? {
            Loaded::Command(command) => builder.add_command(command)?,
            Loaded::Super(command) => builder.add_command(command)?,
        };
    }

    if let Some(msg) = document.help_command.as_ref().and_then(HelpDecl::message) {
        builder.help_command(msg)?;
    }

    Ok(builder.finalize()?)
}

fn build_command(document: Document, base: Option<&Path>) -> Result<Command, LoadError> {
    let mut builder = CommandBuilder::new(&document.name)?;
    apply(&mut builder, &document, base)?;
    Ok(builder.finalize()?)
}

fn apply(
    builder: &mut CommandBuilder,
    document: &Document,
    base: Option<&Path>,
) -> Result<(), LoadError> {
    if let Some(summary) = &document.summary {
        builder.summary(summary);
    }
    if let Some(description) = &document.description {
        builder.desc(description);
    }

    if let Some(printer) = &document.printer {
        let kind = PrinterKind::from_name(&printer.kind)
            .ok_or_else(|| LoadError::Invalid(format!("unknown printer: {}", printer.kind)))?;
        let options = PrinterOptions {
            template: printer
                .template
                .as_deref()
                .map(|template| resolve(template, base)),
            color: printer.color,
        };
        builder.printer(kind, Some(&options))?;
    }

    for entry in &document.options {
        apply_entry(builder, entry)?;
    }

    if let Some(cast) = document.arguments {
        builder.arguments(move |tokens| {
            let values = tokens
                .iter()
                .map(|token| cast.convert(token))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Flow::Continue(Value::List(values)))
        });
    }

    if let Some(msg) = document.help.as_ref().and_then(HelpDecl::message) {
        builder.help(msg)?;
    }
    match (&document.version, &document.version_file) {
        (Some(_), Some(_)) => {
            return Err(LoadError::Invalid(format!(
                "{}: version and version_file are exclusive",
                document.name
            )));
        }
        (Some(version), None) => {
            builder.version(version)?;
        }
        (None, Some(path)) => {
            let version = Version::load(resolve(path, base))?;
            builder.version(&version.to_string())?;
        }
        (None, None) => {}
    }

    Ok(())
}

fn apply_entry(builder: &mut CommandBuilder, entry: &Yaml) -> Result<(), LoadError> {
    let malformed = || {
        ConfigurationError::MalformedDeclaration(
            "each options entry must be a single-entry mapping".to_string(),
        )
    };
    let mapping = entry
        .as_mapping()
        .filter(|mapping| mapping.len() == 1)
        .ok_or_else(malformed)?;
    let (key, value) = mapping.iter().next().ok_or_else(malformed)?;
    let key = key.as_str().ok_or_else(malformed)?;

    if key == "separator" {
        match value {
            Yaml::Null => builder.separator(None),
            Yaml::String(text) => builder.separator(Some(text)),
            _ => return Err(LoadError::Invalid("separator must be text or null".to_string())),
        };
        return Ok(());
    }

    match (CommandBuilder::declaration(key), value.as_sequence()) {
        (Some(_), Some(args)) => {
            let name = args
                .first()
                .and_then(Yaml::as_str)
                .ok_or_else(|| LoadError::Invalid(format!("{key}: missing option name")))?;
            let desc = match args.get(1) {
                None => "",
                Some(desc) => desc
                    .as_str()
                    .ok_or_else(|| LoadError::Invalid(format!("{name}: description must be text")))?,
            };
            let config = match args.get(2) {
                None => None,
                Some(Yaml::Mapping(config)) => Some(OptionConfig::from_mapping(name, config)?),
                Some(_) => {
                    return Err(LoadError::Invalid(format!(
                        "{name}: configuration must be a mapping"
                    )));
                }
            };
            if args.len() > 3 {
                return Err(LoadError::Invalid(format!(
                    "{name}: expected [name, desc, config]"
                )));
            }
            builder.declare_by_method(key, name, desc, config.as_ref())?;
        }
        _ => {
            builder.option_from(entry)?;
        }
    }

    Ok(())
}

fn resolve(path: &Path, base: Option<&Path>) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}
