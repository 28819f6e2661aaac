//! Commands that dispatch to named subcommands.

use std::collections::HashMap;
use std::io;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::debug;

use optspec_core::{ConfigurationError, Flow};

use crate::builder::CommandBuilder;
use crate::command::{Command, Entry};
use crate::error::Result;

/// Placeholder for a pending subcommand when none is configured.
pub const DEFAULT_METANAME: &str = "COMMAND";

/// Name of the subcommand registered by
/// [`SuperCommandBuilder::help_command`].
pub const HELP_COMMAND: &str = "help";

/// A command whose listing also holds subcommands.
///
/// Dereferences to its [`Command`], so options, listing and text are read
/// the same way.
///
/// # Examples
///
/// ```
/// use optspec_dsl::SuperCommand;
///
/// let git = SuperCommand::build("git", |b| {
///     b.boolean("verbose", "Print more")?;
///     b.command("commit", |c| {
///         c.summary("Record changes");
///         c.string("message", "Commit message")?;
///         Ok(())
///     })?;
///     b.super_command("remote", |r| {
///         r.metaname("ACTION");
///         r.command("add", |_| Ok(()))?;
///         Ok(())
///     })?;
///     b.parsimonious();
///     Ok(())
/// })
/// .unwrap();
///
/// assert!(git.is_parsimonious());
/// assert_eq!(git.metaname(), "COMMAND");
/// assert_eq!(git.subcommand("commit").unwrap().summary(), Some("Record changes"));
///
/// let remote = git.entry("remote").and_then(|entry| entry.as_super()).unwrap();
/// assert_eq!(remote.metaname(), "ACTION");
/// assert!(remote.subcommand("add").is_some());
/// ```
#[derive(Debug)]
pub struct SuperCommand {
    command: Command,
    subcommands: HashMap<String, Entry>,
    parsimonious: bool,
    metaname: String,
}

impl SuperCommand {
    /// Declares and finalizes a super-command in one go.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error raised by `block` or by the
    /// finalize pass.
    pub fn build<F>(name: &str, block: F) -> Result<Self>
    where
        F: FnOnce(&mut SuperCommandBuilder) -> Result<()>,
    {
        let mut builder = SuperCommandBuilder::new(name)?;
        block(&mut builder)?;
        builder.finalize()
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Looks up a subcommand by name, plain or nested super-command.
    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.get(name).and_then(Entry::as_subcommand)
    }

    /// The registered entry for a subcommand, keeping its kind.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.subcommands.get(name)
    }

    /// Subcommands in listing order.
    pub fn subcommands(&self) -> impl Iterator<Item = &Command> {
        self.command.listing().iter().filter_map(Entry::as_subcommand)
    }

    /// Once a subcommand token is seen, every later token belongs to it.
    pub fn is_parsimonious(&self) -> bool {
        self.parsimonious
    }

    /// Usage placeholder for the pending subcommand.
    pub fn metaname(&self) -> &str {
        &self.metaname
    }

    /// Writes help with the metaname in the usage line.
    pub fn print_help(&self, out: &mut dyn io::Write) -> io::Result<()> {
        self.command.print_help_with(Some(&self.metaname), out)
    }
}

impl Deref for SuperCommand {
    type Target = Command;

    fn deref(&self) -> &Command {
        &self.command
    }
}

/// Fluent DSL over a [`SuperCommand`].
///
/// Every option declaration of [`CommandBuilder`] is available through
/// `Deref`.
#[derive(Debug)]
pub struct SuperCommandBuilder {
    builder: CommandBuilder,
    subcommands: HashMap<String, Entry>,
    parsimonious: bool,
    metaname: Option<String>,
}

impl SuperCommandBuilder {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyName`] for a blank name.
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            builder: CommandBuilder::new(name)?,
            subcommands: HashMap::new(),
            parsimonious: false,
            metaname: None,
        })
    }

    /// Declares a subcommand, finalizes it and registers it.
    ///
    /// # Errors
    ///
    /// Returns errors from `block` or from the subcommand's finalize pass,
    /// and [`ConfigurationError::DuplicateCommand`] when the name is taken.
    pub fn command<F>(&mut self, name: &str, block: F) -> Result<Arc<Command>>
    where
        F: FnOnce(&mut CommandBuilder) -> Result<()>,
    {
        self.ensure_unregistered(name)?;
        let mut builder = CommandBuilder::new(name)?;
        block(&mut builder)?;
        let command = Arc::new(builder.finalize()?);
        self.add_command(Arc::clone(&command))?;
        Ok(command)
    }

    /// Declares a nested super-command, finalizes it and registers it.
    ///
    /// # Errors
    ///
    /// Same as [`SuperCommandBuilder::command`].
    pub fn super_command<F>(&mut self, name: &str, block: F) -> Result<Arc<SuperCommand>>
    where
        F: FnOnce(&mut SuperCommandBuilder) -> Result<()>,
    {
        self.ensure_unregistered(name)?;
        let mut builder = SuperCommandBuilder::new(name)?;
        block(&mut builder)?;
        let command = Arc::new(builder.finalize()?);
        self.add_command(Arc::clone(&command))?;
        Ok(command)
    }

    /// Registers an already-built command or super-command as is.
    ///
    /// The same `Arc` ends up in the listing and the registry; the command
    /// is not finalized again.
    pub fn add_command(&mut self, command: impl Into<Entry>) -> Result<Entry> {
        let entry = command.into();
        let Some(name) = entry.as_subcommand().map(|sub| sub.name().to_string()) else {
            return Err(ConfigurationError::MalformedDeclaration(
                "only commands can be registered as subcommands".to_string(),
            ));
        };
        self.ensure_unregistered(&name)?;

        self.subcommands.insert(name.clone(), entry.clone());
        self.builder.command_mut().push(entry.clone());
        debug!(
            command = self.builder.command().name(),
            subcommand = name.as_str(),
            nested = entry.as_super().is_some(),
            "subcommand registered"
        );
        Ok(entry)
    }

    /// Registers a `help` subcommand.
    ///
    /// Its positional-argument step asks for help on the first token, or
    /// on the super-command itself when there is none.
    pub fn help_command(&mut self, msg: Option<&str>) -> Result<Arc<Command>> {
        let summary = msg.unwrap_or("Show the info for a command, or this message");
        self.command(HELP_COMMAND, |help| {
            help.summary(summary)
                .arguments(|tokens| Ok(Flow::Help(tokens.first().cloned())));
            Ok(())
        })
    }

    pub fn parsimonious(&mut self) -> &mut Self {
        self.parsimonious = true;
        self
    }

    pub fn metaname(&mut self, metaname: &str) -> &mut Self {
        self.metaname = Some(metaname.to_string());
        self
    }

    /// Finalizes the base command and defaults the metaname.
    pub fn finalize(self) -> Result<SuperCommand> {
        let metaname = self
            .metaname
            .unwrap_or_else(|| DEFAULT_METANAME.to_string());
        Ok(SuperCommand {
            command: self.builder.finalize()?,
            subcommands: self.subcommands,
            parsimonious: self.parsimonious,
            metaname,
        })
    }

    fn ensure_unregistered(&self, name: &str) -> Result<()> {
        if self.subcommands.contains_key(name) {
            return Err(ConfigurationError::DuplicateCommand {
                command: self.builder.command().name().to_string(),
                subcommand: name.to_string(),
            });
        }
        Ok(())
    }
}

impl From<Command> for Entry {
    fn from(command: Command) -> Self {
        Entry::Command(Arc::new(command))
    }
}

impl From<Arc<Command>> for Entry {
    fn from(command: Arc<Command>) -> Self {
        Entry::Command(command)
    }
}

impl From<SuperCommand> for Entry {
    fn from(command: SuperCommand) -> Self {
        Entry::Super(Arc::new(command))
    }
}

impl From<Arc<SuperCommand>> for Entry {
    fn from(command: Arc<SuperCommand>) -> Self {
        Entry::Super(command)
    }
}

impl Deref for SuperCommandBuilder {
    type Target = CommandBuilder;

    fn deref(&self) -> &CommandBuilder {
        &self.builder
    }
}

impl DerefMut for SuperCommandBuilder {
    fn deref_mut(&mut self) -> &mut CommandBuilder {
        &mut self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SuperCommandBuilder {
        SuperCommandBuilder::new("superfoo").unwrap()
    }

    #[test]
    fn test_command_adds_to_listing() {
        let mut b = builder();
        b.command("foo", |c| {
            c.boolean("count", "The count")?;
            Ok(())
        })
        .unwrap();
        let sup = b.finalize().unwrap();
        assert_eq!(sup.listing().len(), 1);
    }

    #[test]
    fn test_command_registry_holds_returned_command() {
        let mut b = builder();
        let foo = b
            .command("foo", |c| {
                c.integer("size", "The size")?;
                Ok(())
            })
            .unwrap();
        let sup = b.finalize().unwrap();
        assert!(std::ptr::eq(sup.subcommand("foo").unwrap(), foo.as_ref()));
    }

    #[test]
    fn test_command_is_finalized() {
        let mut b = builder();
        let foo = b.command("foo", |_| Ok(())).unwrap();
        assert!(foo.printer().is_some());
    }

    #[test]
    fn test_add_existing_command_keeps_identity() {
        let cmd = Arc::new(
            Command::build("cmd", |c| {
                c.float("float", "Float")?;
                Ok(())
            })
            .unwrap(),
        );
        let mut b = builder();
        b.add_command(Arc::clone(&cmd)).unwrap();
        let sup = b.finalize().unwrap();
        let first = sup.listing()[0].as_command().unwrap();
        assert!(Arc::ptr_eq(first, &cmd));
    }

    #[test]
    fn test_nested_super_command_keeps_identity() {
        let remote = Arc::new(
            SuperCommand::build("remote", |r| {
                r.metaname("ACTION");
                r.command("add", |_| Ok(()))?;
                Ok(())
            })
            .unwrap(),
        );
        let mut b = builder();
        b.add_command(Arc::clone(&remote)).unwrap();
        let stash = b
            .super_command("stash", |s| {
                s.parsimonious();
                s.command("pop", |_| Ok(()))?;
                Ok(())
            })
            .unwrap();
        let sup = b.finalize().unwrap();

        assert!(Arc::ptr_eq(sup.listing()[0].as_super().unwrap(), &remote));
        assert!(Arc::ptr_eq(sup.entry("stash").unwrap().as_super().unwrap(), &stash));
        assert!(std::ptr::eq(sup.subcommand("remote").unwrap(), remote.command()));
        assert_eq!(
            sup.subcommands().map(Command::name).collect::<Vec<_>>(),
            vec!["remote", "stash"]
        );

        let nested = sup.entry("remote").unwrap().as_super().unwrap();
        assert_eq!(nested.metaname(), "ACTION");
        assert!(nested.subcommand("add").is_some());
        assert!(stash.is_parsimonious());
    }

    #[test]
    fn test_nested_super_command_name_must_be_unique() {
        let mut b = builder();
        b.command("foo", |_| Ok(())).unwrap();
        assert!(matches!(
            b.super_command("foo", |_| Ok(())),
            Err(ConfigurationError::DuplicateCommand { .. })
        ));
    }

    #[test]
    fn test_add_separator_rejected() {
        let mut b = builder();
        assert!(matches!(
            b.add_command(Entry::Separator(String::new())),
            Err(ConfigurationError::MalformedDeclaration(_))
        ));
    }

    #[test]
    fn test_nested_super_command_in_help() {
        let mut b = builder();
        b.printer(
            crate::PrinterKind::Standard,
            Some(&crate::PrinterOptions {
                template: None,
                color: Some(false),
            }),
        )
        .unwrap();
        b.super_command("remote", |r| {
            r.summary("Manage remotes");
            Ok(())
        })
        .unwrap();
        let sup = b.finalize().unwrap();

        let mut out = Vec::new();
        sup.print_help(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("  remote  Manage remotes"));
    }

    #[test]
    fn test_duplicate_subcommand_rejected() {
        let mut b = builder();
        b.command("foo", |_| Ok(())).unwrap();
        assert!(matches!(
            b.command("foo", |_| Ok(())),
            Err(ConfigurationError::DuplicateCommand { .. })
        ));
    }

    #[test]
    fn test_parsimonious() {
        assert!(!builder().finalize().unwrap().is_parsimonious());
        let mut b = builder();
        b.parsimonious();
        assert!(b.finalize().unwrap().is_parsimonious());
    }

    #[test]
    fn test_metaname() {
        let mut b = builder();
        b.metaname("META");
        assert_eq!(b.finalize().unwrap().metaname(), "META");
        assert_eq!(builder().finalize().unwrap().metaname(), DEFAULT_METANAME);
    }

    #[test]
    fn test_standard_options_through_deref() {
        let mut b = builder();
        b.boolean("count", "The count").unwrap();
        let sup = b.finalize().unwrap();
        assert_eq!(sup.option("count").unwrap().name(), "count");
    }

    #[test]
    fn test_help_command() {
        let mut b = builder();
        let help = b.help_command(None).unwrap();
        assert!(help.summary().unwrap().contains("Show the info"));

        let sup = b.finalize().unwrap();
        assert!(Arc::ptr_eq(sup.listing()[0].as_command().unwrap(), &help));

        let arguments = help.arguments().unwrap();
        assert_eq!(arguments.validate(&[]).unwrap(), Flow::Help(None));
        assert_eq!(
            arguments.validate(&["foo".to_string()]).unwrap(),
            Flow::Help(Some("foo".to_string()))
        );
    }

    #[test]
    fn test_help_command_custom_summary() {
        let mut b = builder();
        let help = b.help_command(Some("Show this help message")).unwrap();
        assert!(help.summary().unwrap().starts_with("Show this"));
    }

    #[test]
    fn test_print_help_uses_metaname() {
        let mut b = builder();
        b.printer(
            crate::PrinterKind::Standard,
            Some(&crate::PrinterOptions {
                template: None,
                color: Some(false),
            }),
        )
        .unwrap();
        b.command("foo", |c| {
            c.summary("Does foo");
            Ok(())
        })
        .unwrap();
        let sup = b.finalize().unwrap();

        let mut out = Vec::new();
        sup.print_help(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Usage: superfoo COMMAND\n"));
        assert!(text.contains("  foo  Does foo"));
    }
}
