//! Builder DSL for command and super-command declarations.
//!
//! On top of the option model in [`optspec_core`], this crate provides:
//!
//! - [`CommandBuilder`] with one declaration method per cast kind and
//!   shape (`integer`, `integer_`, `integers`, `integers_`, ...), plus
//!   `help`, `version`, `arguments` and printer selection.
//! - [`Command`], the finalized result with its ordered listing.
//! - [`SuperCommandBuilder`] and [`SuperCommand`] for commands that
//!   dispatch to subcommands.
//! - [`StandardPrinter`] and [`TemplatePrinter`] for help output.
//! - [`load`], which reads a whole command tree from YAML.
//!
//! # Example
//!
//! ```
//! use optspec_core::Flow;
//! use optspec_dsl::{Command, HELP};
//!
//! let command = Command::build("fetch", |b| {
//!     b.summary("Download things");
//!     b.boolean("quiet", "Say nothing")?;
//!     b.strings_("header", "Extra headers")?;
//!     b.help(None)?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let help = command.find_flag("-h").unwrap();
//! assert_eq!(help.name(), HELP);
//! assert_eq!(help.argument().validate(&[]).unwrap(), Flow::Help(None));
//! ```

mod builder;
mod command;
mod error;
mod executor;
pub mod load;
mod printer;
mod summary;
mod super_command;

pub use builder::{CommandBuilder, HELP, Shape, VERSION};
pub use command::{Command, Entry};
pub use error::LoadError;
pub use executor::{ExecResult, Executable, Invocation};
pub use load::{Loaded, load};
pub use printer::{
    ColorToggleable, HelpRenderer, PrinterKind, PrinterOptions, StandardPrinter, TemplatePrinter,
};
pub use summary::{CommandSummary, OptionSummary};
pub use super_command::{DEFAULT_METANAME, HELP_COMMAND, SuperCommand, SuperCommandBuilder};
