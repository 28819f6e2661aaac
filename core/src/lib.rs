//! Declarative option and argument model for command-line interfaces.
//!
//! This crate defines the value layer of command-line declarations:
//!
//! - [`Argument`]: arity, cast kind, default value and validation step of
//!   anything that carries a value.
//! - [`OptionSpec`]: a named flag built around an [`Argument`], with short
//!   and long forms, negation and dependencies.
//! - [`OptionBuilder`]: the mutable draft that produces an [`OptionSpec`]
//!   through its finalize pass.
//! - [`OptionConfig`]: an ordered configuration mapping applied to a
//!   builder in one go.
//! - [`CastKind`] and [`Converter`]: the registry of value conversions.
//! - [`Flow`]: what a validation step returns, including help and version
//!   requests.
//!
//! Every declaration problem is reported as a [`ConfigurationError`].
//!
//! # Example
//!
//! ```
//! use optspec_core::*;
//!
//! let mut builder = OptionBuilder::new("verbose");
//! builder.short("-v").long("--verbose").desc("Print more");
//! let verbose = builder.finalize().unwrap();
//!
//! assert_eq!(verbose.cast(), Some(CastKind::Boolean));
//! assert_eq!(verbose.default_value(), Some(&Value::Bool(false)));
//!
//! // Negating needs a boolean with a long flag
//! let mut bad = OptionBuilder::new("level");
//! bad.long("--level").param(Some("LEVEL")).negate("no");
//! assert!(matches!(
//!     bad.finalize(),
//!     Err(ConfigurationError::NegatedNonBoolean(_))
//! ));
//! ```

mod argument;
mod builder;
mod config;
mod convert;
mod error;
mod flow;
mod option;
mod version;

pub use argument::{Argument, Arity, StepResult, ValidationStep};
pub use builder::OptionBuilder;
pub use config::{ConfigEntry, OptionConfig};
pub use convert::{CastKind, Converter, Value};
pub use error::{ConfigurationError, ConversionError, Result, ValidationError, VersionError};
pub use flow::Flow;
pub use option::OptionSpec;
pub use version::Version;
