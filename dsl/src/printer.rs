//! Help rendering.
//!
//! A command's printer is anything implementing [`HelpRenderer`]. Two are
//! bundled: [`StandardPrinter`], which lays out usage, text and listing,
//! and [`TemplatePrinter`], which fills placeholders in a template file.
//! Printers that can switch colour off expose it through
//! [`ColorToggleable`].

use std::fmt::Write as _;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

use optspec_core::{ConfigurationError, OptionSpec};

use crate::command::{Command, Entry};
use crate::error::Result;

/// Widest label column before descriptions wrap to their own alignment.
const MAX_LABEL_WIDTH: usize = 30;

/// Capability of printers whose colour output can be toggled.
pub trait ColorToggleable {
    fn enable(&mut self);
    fn disable(&mut self);
    fn is_enabled(&self) -> bool;
}

/// Renders help for a command.
pub trait HelpRenderer: Send + Sync {
    /// Writes help for `command`.
    ///
    /// `metaname` is the placeholder for a pending subcommand and is only
    /// set when printing a super-command.
    fn print_help(
        &self,
        command: &Command,
        metaname: Option<&str>,
        out: &mut dyn io::Write,
    ) -> io::Result<()>;

    /// Colour switch, for printers that have one.
    fn color_mut(&mut self) -> Option<&mut dyn ColorToggleable> {
        None
    }
}

/// Which printer a command should use.
pub enum PrinterKind {
    Standard,
    Template,
    Custom(Box<dyn HelpRenderer>),
}

impl PrinterKind {
    /// Resolves a bundled printer by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(PrinterKind::Standard),
            "template" => Some(PrinterKind::Template),
            _ => None,
        }
    }

    /// Builds the printer, applying `options`.
    ///
    /// # Errors
    ///
    /// A template printer needs `options.template` to name an existing
    /// file: [`ConfigurationError::MissingTemplate`] or
    /// [`ConfigurationError::TemplateNotFound`] otherwise.
    pub(crate) fn into_printer(
        self,
        options: Option<&PrinterOptions>,
    ) -> Result<Box<dyn HelpRenderer>> {
        let mut printer: Box<dyn HelpRenderer> = match self {
            PrinterKind::Standard => Box::new(StandardPrinter::default()),
            PrinterKind::Template => {
                let template = options
                    .and_then(|o| o.template.as_ref())
                    .ok_or(ConfigurationError::MissingTemplate)?;
                Box::new(TemplatePrinter::new(template)?)
            }
            PrinterKind::Custom(printer) => printer,
        };

        if let Some(enabled) = options.and_then(|o| o.color) {
            if let Some(color) = printer.color_mut() {
                if enabled {
                    color.enable();
                } else {
                    color.disable();
                }
            }
        }

        Ok(printer)
    }
}

/// Options for a printer declaration.
///
/// # Examples
///
/// ```
/// use optspec_dsl::PrinterOptions;
///
/// let options: PrinterOptions = serde_yaml::from_str("color: false").unwrap();
/// assert_eq!(options.color, Some(false));
/// assert!(options.template.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterOptions {
    /// Template file for the template printer.
    #[serde(default)]
    pub template: Option<PathBuf>,
    /// Turns colour on or off when the printer supports it.
    #[serde(default)]
    pub color: Option<bool>,
}

/// Usage line, text and listing in columns.
///
/// # Examples
///
/// ```
/// use optspec_dsl::{Command, StandardPrinter};
///
/// let command = Command::build("fetch", |b| {
///     b.integer("depth", "How deep")?;
///     Ok(())
/// })
/// .unwrap();
///
/// let help = StandardPrinter::new(false).render(&command, None);
/// assert!(help.starts_with("Usage: fetch [OPTIONS]"));
/// assert!(help.contains("-d, --depth DEPTH"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardPrinter {
    color: bool,
}

impl Default for StandardPrinter {
    fn default() -> Self {
        Self {
            color: should_use_color(),
        }
    }
}

impl StandardPrinter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, command: &Command, metaname: Option<&str>) -> String {
        let mut out = String::new();

        let usage = usage_line(command, metaname);
        if self.color {
            let _ = writeln!(out, "{} {usage}", "Usage:".bold());
        } else {
            let _ = writeln!(out, "Usage: {usage}");
        }

        for text in [command.summary(), command.description()].into_iter().flatten() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{text}");
        }

        let listing = render_listing(command, self.color);
        if !listing.is_empty() {
            let _ = writeln!(out);
            out.push_str(&listing);
        }

        out
    }
}

impl HelpRenderer for StandardPrinter {
    fn print_help(
        &self,
        command: &Command,
        metaname: Option<&str>,
        out: &mut dyn io::Write,
    ) -> io::Result<()> {
        out.write_all(self.render(command, metaname).as_bytes())
    }

    fn color_mut(&mut self) -> Option<&mut dyn ColorToggleable> {
        Some(self)
    }
}

impl ColorToggleable for StandardPrinter {
    fn enable(&mut self) {
        self.color = true;
    }

    fn disable(&mut self) {
        self.color = false;
    }

    fn is_enabled(&self) -> bool {
        self.color
    }
}

/// Fills `{{name}}`, `{{summary}}`, `{{description}}`, `{{usage}}` and
/// `{{options}}` in a template file.
///
/// The file must exist when the printer is created; it is read each time
/// help is printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePrinter {
    template: PathBuf,
    color: bool,
}

impl TemplatePrinter {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::TemplateNotFound`] if `template` does
    /// not exist.
    pub fn new(template: impl AsRef<Path>) -> Result<Self> {
        let template = template.as_ref();
        if !template.is_file() {
            return Err(ConfigurationError::TemplateNotFound(
                template.display().to_string(),
            ));
        }
        Ok(Self {
            template: template.to_path_buf(),
            color: should_use_color(),
        })
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn render(&self, command: &Command, metaname: Option<&str>) -> io::Result<String> {
        let text = std::fs::read_to_string(&self.template)?;
        Ok(text
            .replace("{{name}}", command.name())
            .replace("{{summary}}", command.summary().unwrap_or_default())
            .replace("{{description}}", command.description().unwrap_or_default())
            .replace("{{usage}}", &usage_line(command, metaname))
            .replace("{{options}}", render_listing(command, self.color).trim_end()))
    }
}

impl HelpRenderer for TemplatePrinter {
    fn print_help(
        &self,
        command: &Command,
        metaname: Option<&str>,
        out: &mut dyn io::Write,
    ) -> io::Result<()> {
        out.write_all(self.render(command, metaname)?.as_bytes())
    }

    fn color_mut(&mut self) -> Option<&mut dyn ColorToggleable> {
        Some(self)
    }
}

impl ColorToggleable for TemplatePrinter {
    fn enable(&mut self) {
        self.color = true;
    }

    fn disable(&mut self) {
        self.color = false;
    }

    fn is_enabled(&self) -> bool {
        self.color
    }
}

/// Default colour setting for bundled printers.
///
/// `NO_COLOR` turns colour off and `FORCE_COLOR` turns it on. Otherwise
/// colour follows whether stdout is a terminal.
fn should_use_color() -> bool {
    color_from(
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var_os("FORCE_COLOR").is_some(),
        io::stdout().is_terminal(),
    )
}

fn color_from(no_color: bool, force_color: bool, terminal: bool) -> bool {
    if no_color {
        return false;
    }
    force_color || terminal
}

fn usage_line(command: &Command, metaname: Option<&str>) -> String {
    let mut usage = command.name().to_string();
    if command.options().next().is_some() {
        usage.push_str(" [OPTIONS]");
    }
    match metaname {
        Some(meta) => {
            usage.push(' ');
            usage.push_str(meta);
        }
        None if command.arguments().is_some() => usage.push_str(" ARGS"),
        None => {}
    }
    usage
}

fn option_label(option: &OptionSpec) -> String {
    let long = match (option.long_flag(), option.negation()) {
        (Some(long), Some(prefix)) => Some(format!("--[{prefix}-]{}", &long[2..])),
        (Some(long), None) => Some(long.to_string()),
        (None, _) => None,
    };

    let mut label = match (option.short_flag(), long) {
        (Some(short), Some(long)) => format!("{short}, {long}"),
        (Some(short), None) => short.to_string(),
        (None, Some(long)) => format!("    {long}"),
        (None, None) => String::new(),
    };

    if let Some(meta) = option.metaname() {
        label.push(' ');
        label.push_str(meta);
    }
    label
}

fn render_listing(command: &Command, color: bool) -> String {
    let rows: Vec<(String, String)> = command
        .listing()
        .iter()
        .filter_map(|entry| match entry {
            Entry::Option(option) => Some((
                option_label(option),
                option.description().unwrap_or_default().to_string(),
            )),
            Entry::Command(_) | Entry::Super(_) => entry.as_subcommand().map(|sub| {
                (
                    sub.name().to_string(),
                    sub.summary().unwrap_or_default().to_string(),
                )
            }),
            Entry::Separator(_) => None,
        })
        .collect();
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .filter(|len| *len <= MAX_LABEL_WIDTH)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let mut rows = rows.into_iter();
    for entry in command.listing() {
        match entry {
            Entry::Separator(text) if text.is_empty() => {
                let _ = writeln!(out);
            }
            Entry::Separator(text) => {
                if color {
                    let _ = writeln!(out, "{}", text.bold());
                } else {
                    let _ = writeln!(out, "{text}");
                }
            }
            Entry::Option(_) | Entry::Command(_) | Entry::Super(_) => {
                if let Some((label, desc)) = rows.next() {
                    let line = format!("  {label:<width$}  {desc}");
                    let _ = writeln!(out, "{}", line.trim_end());
                }
            }
        }
    }
    out
}
