//! Finalized command definitions.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use optspec_core::{Argument, OptionSpec};

use crate::builder::CommandBuilder;
use crate::error::Result;
use crate::executor::{ExecResult, Executable, Invocation};
use crate::printer::{HelpRenderer, StandardPrinter};
use crate::super_command::SuperCommand;

/// One entry of a command's listing, in presentation order.
#[derive(Debug, Clone)]
pub enum Entry {
    /// Blank line (empty string) or literal text.
    Separator(String),
    Option(Arc<OptionSpec>),
    Command(Arc<Command>),
    /// A nested super-command, kept whole so its metaname and
    /// parsimonious flag survive.
    Super(Arc<SuperCommand>),
}

impl Entry {
    pub fn as_option(&self) -> Option<&Arc<OptionSpec>> {
        match self {
            Entry::Option(option) => Some(option),
            _ => None,
        }
    }

    pub fn as_command(&self) -> Option<&Arc<Command>> {
        match self {
            Entry::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn as_super(&self) -> Option<&Arc<SuperCommand>> {
        match self {
            Entry::Super(command) => Some(command),
            _ => None,
        }
    }

    /// The command behind a subcommand entry, plain or super.
    pub fn as_subcommand(&self) -> Option<&Command> {
        match self {
            Entry::Command(command) => Some(command),
            Entry::Super(command) => Some(command.command()),
            _ => None,
        }
    }
}

/// A command: its listing, options, executor, printer and descriptive text.
///
/// Commands are produced by [`CommandBuilder`] and only read afterwards.
/// Every option in the listing is also registered by name, and the other
/// way round.
///
/// # Examples
///
/// ```
/// use optspec_dsl::Command;
///
/// let command = Command::build("fetch", |b| {
///     b.summary("Download things");
///     b.boolean("quiet", "Say nothing")?;
///     b.integer_("retries", "How often to retry")?;
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(command.listing().len(), 2);
/// assert_eq!(command.option("retries").unwrap().long_flag(), Some("--retries"));
/// assert!(command.printer().is_some());
/// ```
pub struct Command {
    name: String,
    listing: Vec<Entry>,
    options: HashMap<String, Arc<OptionSpec>>,
    executor: Option<Arc<dyn Executable>>,
    printer: Option<Box<dyn HelpRenderer>>,
    summary: Option<String>,
    description: Option<String>,
    arguments: Option<Argument>,
}

impl Command {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listing: Vec::new(),
            options: HashMap::new(),
            executor: None,
            printer: None,
            summary: None,
            description: None,
            arguments: None,
        }
    }

    /// Declares and finalizes a command in one go.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error raised by `block` or by the
    /// finalize pass.
    pub fn build<F>(name: &str, block: F) -> Result<Self>
    where
        F: FnOnce(&mut CommandBuilder) -> Result<()>,
    {
        let mut builder = CommandBuilder::new(name)?;
        block(&mut builder)?;
        builder.finalize()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listing(&self) -> &[Entry] {
        &self.listing
    }

    /// Looks up an option by name.
    pub fn option(&self, name: &str) -> Option<&Arc<OptionSpec>> {
        self.options.get(name)
    }

    /// Options in listing order.
    pub fn options(&self) -> impl Iterator<Item = &Arc<OptionSpec>> {
        self.listing.iter().filter_map(Entry::as_option)
    }

    /// Finds the option answering to a flag such as `-v` or `--no-color`.
    pub fn find_flag(&self, flag: &str) -> Option<&Arc<OptionSpec>> {
        self.options().find(|o| o.matches(flag))
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn executor(&self) -> Option<&Arc<dyn Executable>> {
        self.executor.as_ref()
    }

    pub fn printer(&self) -> Option<&dyn HelpRenderer> {
        self.printer.as_deref()
    }

    /// Positional-argument declaration, if any.
    pub fn arguments(&self) -> Option<&Argument> {
        self.arguments.as_ref()
    }

    /// Runs the executor.
    ///
    /// # Errors
    ///
    /// Fails when no executor was registered, or with whatever the
    /// executor returns.
    pub fn execute(&self, invocation: &Invocation) -> ExecResult {
        match &self.executor {
            Some(executor) => executor.execute(invocation),
            None => Err(format!("no executor registered for command {}", self.name).into()),
        }
    }

    /// Writes help for this command with its printer.
    pub fn print_help(&self, out: &mut dyn io::Write) -> io::Result<()> {
        self.print_help_with(None, out)
    }

    pub(crate) fn print_help_with(
        &self,
        metaname: Option<&str>,
        out: &mut dyn io::Write,
    ) -> io::Result<()> {
        match &self.printer {
            Some(printer) => printer.print_help(self, metaname, out),
            None => StandardPrinter::default().print_help(self, metaname, out),
        }
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.listing.push(entry);
    }

    pub(crate) fn contains_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub(crate) fn register_option(&mut self, option: Arc<OptionSpec>) {
        self.options
            .insert(option.name().to_string(), Arc::clone(&option));
        self.listing.push(Entry::Option(option));
    }

    pub(crate) fn set_executor(&mut self, executor: Arc<dyn Executable>) {
        self.executor = Some(executor);
    }

    pub(crate) fn set_printer(&mut self, printer: Box<dyn HelpRenderer>) {
        self.printer = Some(printer);
    }

    pub(crate) fn has_printer(&self) -> bool {
        self.printer.is_some()
    }

    pub(crate) fn set_summary(&mut self, summary: &str) {
        self.summary = Some(summary.to_string());
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    pub(crate) fn set_arguments(&mut self, arguments: Argument) {
        self.arguments = Some(arguments);
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("listing", &self.listing)
            .field("summary", &self.summary)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("executor", &self.executor.is_some())
            .field("printer", &self.printer.is_some())
            .finish()
    }
}
