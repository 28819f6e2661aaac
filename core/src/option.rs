//! Named flags and the finalize pass that validates them.

use crate::argument::{Argument, Arity, ValidationStep};
use crate::convert::{CastKind, Value};
use crate::error::{ConfigurationError, Result};

/// A named flag with short/long forms, description, negation and
/// dependencies.
///
/// The value-carrying part (arity, cast kind, default, validation step)
/// lives in an [`Argument`]; the accessors here forward to it.
///
/// An `OptionSpec` is produced by an [`OptionBuilder`](crate::OptionBuilder)
/// and is only read once finalized.
///
/// # Examples
///
/// ```
/// use optspec_core::{CastKind, OptionBuilder};
///
/// let mut builder = OptionBuilder::new("force");
/// builder.long("--force").negate("no");
/// let option = builder.finalize().unwrap();
///
/// assert_eq!(option.cast(), Some(CastKind::Boolean));
/// assert_eq!(option.negated_flag(), Some("--no-force"));
/// ```
#[derive(Debug, Clone)]
pub struct OptionSpec {
    name: String,
    description: Option<String>,
    short_flag: Option<String>,
    long_flag: Option<String>,
    negation: Option<String>,
    negated_flag: Option<String>,
    dependent_options: Vec<String>,
    argument: Argument,
}

impl OptionSpec {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            short_flag: None,
            long_flag: None,
            negation: None,
            negated_flag: None,
            dependent_options: Vec::new(),
            argument: Argument::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn short_flag(&self) -> Option<&str> {
        self.short_flag.as_deref()
    }

    pub fn long_flag(&self) -> Option<&str> {
        self.long_flag.as_deref()
    }

    /// Negation prefix, e.g. `no` for `--no-force`.
    pub fn negation(&self) -> Option<&str> {
        self.negation.as_deref()
    }

    pub fn is_negated(&self) -> bool {
        self.negation.is_some()
    }

    /// The negated long flag; set by finalize for negated options.
    pub fn negated_flag(&self) -> Option<&str> {
        self.negated_flag.as_deref()
    }

    pub fn dependent_options(&self) -> &[String] {
        &self.dependent_options
    }

    pub fn argument(&self) -> &Argument {
        &self.argument
    }

    pub fn arity(&self) -> Arity {
        self.argument.arity()
    }

    pub fn cast(&self) -> Option<CastKind> {
        self.argument.cast()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.argument.default_value()
    }

    pub fn metaname(&self) -> Option<&str> {
        self.argument.metaname()
    }

    pub fn restricted(&self) -> Option<&[String]> {
        self.argument.restricted()
    }

    pub fn validation_step(&self) -> Option<&ValidationStep> {
        self.argument.validation_step()
    }

    /// Every flag this option answers to, negated flag included.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        [
            self.short_flag.as_deref(),
            self.long_flag.as_deref(),
            self.negated_flag.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Checks if this option answers to the given flag.
    pub fn matches(&self, flag: &str) -> bool {
        self.flags().any(|f| f == flag)
    }

    pub(crate) fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub(crate) fn set_short_flag(&mut self, flag: impl Into<String>) {
        self.short_flag = Some(flag.into());
    }

    pub(crate) fn set_long_flag(&mut self, flag: impl Into<String>) {
        self.long_flag = Some(flag.into());
    }

    pub(crate) fn set_negation(&mut self, prefix: impl Into<String>) {
        self.negation = Some(prefix.into());
    }

    pub(crate) fn set_dependent_options(&mut self, names: Vec<String>) {
        self.dependent_options = names;
    }

    pub(crate) fn argument_mut(&mut self) -> &mut Argument {
        &mut self.argument
    }

    /// Resolves defaults and rejects inconsistent declarations.
    ///
    /// Checks run in order and stop at the first failure:
    ///
    /// 1. arity and cast kind get their defaults;
    /// 2. a boolean must not be restricted, and needs a long flag to be
    ///    negated; its default value becomes `false` when unset;
    /// 3. a non-boolean must not be negated;
    /// 4. short and long flags must be well formed.
    pub(crate) fn finalize(&mut self) -> Result<()> {
        self.argument.finalize();

        if self.argument.is_boolean() {
            if self.argument.is_restricted() {
                return Err(ConfigurationError::BooleanRestricted(self.name.clone()));
            }
            if self.is_negated() && self.long_flag.is_none() {
                return Err(ConfigurationError::NegationWithoutLong(self.name.clone()));
            }
            if self.argument.default_value().is_none() {
                self.argument.set_default(Value::Bool(false));
            }
        } else if self.is_negated() {
            return Err(ConfigurationError::NegatedNonBoolean(self.name.clone()));
        }

        if let Some(short) = &self.short_flag {
            if !short.starts_with('-') || short.starts_with("--") || short.chars().count() != 2 {
                return Err(ConfigurationError::InvalidShortFlag {
                    option: self.name.clone(),
                    flag: short.clone(),
                });
            }
        }

        if let Some(long) = &self.long_flag {
            if !long.starts_with("--") || long.len() < 3 {
                return Err(ConfigurationError::InvalidLongFlag {
                    option: self.name.clone(),
                    flag: long.clone(),
                });
            }
        }

        if let (Some(prefix), Some(long)) = (&self.negation, &self.long_flag) {
            if self.negated_flag.is_none() {
                self.negated_flag = Some(format!("--{prefix}-{}", &long[2..]));
            }
        }

        Ok(())
    }
}
