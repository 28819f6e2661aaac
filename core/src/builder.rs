//! Fluent builder for [`OptionSpec`].

use std::sync::Arc;

use serde_yaml::Value as Yaml;
use tracing::debug;

use crate::argument::{Arity, StepResult};
use crate::config::{ConfigEntry, OptionConfig};
use crate::convert::{CastKind, Value};
use crate::error::{ConfigurationError, Result};
use crate::option::OptionSpec;

/// Mutable draft of an option.
///
/// Every setter returns `&mut Self` so calls chain. [`finalize`] consumes
/// the builder, validates the draft and hands back the finished option.
///
/// [`finalize`]: OptionBuilder::finalize
///
/// # Examples
///
/// ```
/// use optspec_core::{Arity, CastKind, OptionBuilder};
///
/// let mut builder = OptionBuilder::new("size");
/// builder
///     .short("-s")
///     .long("--size")
///     .desc("The size")
///     .param(Some("SIZE"))
///     .cast(CastKind::Integer);
///
/// let option = builder.finalize().unwrap();
/// assert_eq!(option.arity(), Arity::One);
/// assert_eq!(option.metaname(), Some("SIZE"));
/// ```
#[derive(Debug, Clone)]
pub struct OptionBuilder {
    option: OptionSpec,
}

impl OptionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            option: OptionSpec::new(name),
        }
    }

    /// Builds a draft from a single-entry mapping.
    ///
    /// The key names the option. A sequence value is read as its
    /// dependency list and a mapping value as its configuration.
    ///
    /// ```
    /// use optspec_core::OptionBuilder;
    ///
    /// let decl = serde_yaml::from_str("{ output: [format, dir] }").unwrap();
    /// let option = OptionBuilder::from_declaration(&decl).unwrap().finalize().unwrap();
    /// assert_eq!(option.dependent_options(), ["format", "dir"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MalformedDeclaration`] for anything that
    /// is not a single-entry mapping with a sequence or mapping value.
    pub fn from_declaration(declaration: &Yaml) -> Result<Self> {
        let Some(mapping) = declaration.as_mapping() else {
            return Err(ConfigurationError::MalformedDeclaration(
                "expected a single-entry mapping".to_string(),
            ));
        };
        if mapping.len() != 1 {
            return Err(ConfigurationError::MalformedDeclaration(format!(
                "expected exactly one option name, found {}",
                mapping.len()
            )));
        }

        let Some((key, value)) = mapping.iter().next() else {
            return Err(ConfigurationError::MalformedDeclaration(
                "empty declaration".to_string(),
            ));
        };
        let name = key.as_str().ok_or_else(|| {
            ConfigurationError::MalformedDeclaration("option name must be a string".to_string())
        })?;
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName);
        }

        let mut builder = Self::new(name);
        match value {
            Yaml::Sequence(items) => {
                let names = items
                    .iter()
                    .map(|item| item.as_str().map(String::from))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        ConfigurationError::MalformedDeclaration(format!(
                            "{name}: dependencies must be option names"
                        ))
                    })?;
                builder.dependencies(names);
            }
            Yaml::Mapping(config) => {
                builder.from_config(&OptionConfig::from_mapping(name, config)?);
            }
            _ => {
                return Err(ConfigurationError::MalformedDeclaration(format!(
                    "unable to process option declaration for {name}"
                )));
            }
        }

        Ok(builder)
    }

    pub fn name(&self) -> &str {
        self.option.name()
    }

    /// The draft as it stands.
    pub fn option(&self) -> &OptionSpec {
        &self.option
    }

    pub fn short(&mut self, flag: &str) -> &mut Self {
        self.option.set_short_flag(flag);
        self
    }

    pub fn long(&mut self, flag: &str) -> &mut Self {
        self.option.set_long_flag(flag);
        self
    }

    pub fn desc(&mut self, description: &str) -> &mut Self {
        self.option.set_description(description);
        self
    }

    pub fn cast(&mut self, kind: CastKind) -> &mut Self {
        self.option.argument_mut().set_cast(kind);
        self
    }

    pub fn arity(&mut self, arity: Arity) -> &mut Self {
        self.option.argument_mut().set_arity(arity);
        self
    }

    /// Sets the parameter label shown in help and the arity it implies:
    /// no label takes no tokens, a trailing `+` takes many, anything else
    /// takes one.
    pub fn param(&mut self, label: Option<&str>) -> &mut Self {
        let arity = match label {
            None => Arity::Zero,
            Some(l) if l.ends_with('+') => Arity::Many,
            Some(_) => Arity::One,
        };
        let argument = self.option.argument_mut();
        argument.set_metaname(label.map(String::from));
        argument.set_arity(arity);
        self
    }

    pub fn dependencies<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option
            .set_dependent_options(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.option.argument_mut().set_default(value.into());
        self
    }

    pub fn restricted<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option
            .argument_mut()
            .set_restricted(values.into_iter().map(Into::into).collect());
        self
    }

    /// Enables a negated long flag, e.g. prefix `no` gives `--no-force`.
    pub fn negate(&mut self, prefix: &str) -> &mut Self {
        self.option.set_negation(prefix);
        self
    }

    /// Applies configuration entries in order.
    pub fn from_config(&mut self, config: &OptionConfig) -> &mut Self {
        for entry in config.entries() {
            match entry {
                ConfigEntry::Short(flag) => self.short(flag),
                ConfigEntry::Long(flag) => self.long(flag),
                ConfigEntry::Description(text) => self.desc(text),
                ConfigEntry::Cast(kind) => self.cast(*kind),
                ConfigEntry::Default(value) => self.default_value(value.clone()),
                ConfigEntry::Restricted(values) => self.restricted(values.iter().cloned()),
                ConfigEntry::Negation(prefix) => self.negate(prefix),
                ConfigEntry::Dependencies(names) => self.dependencies(names.iter().cloned()),
            };
        }
        self
    }

    /// Attaches a validation step run over the option's raw tokens.
    pub fn validate<F>(&mut self, step: F) -> &mut Self
    where
        F: Fn(&[String]) -> StepResult + Send + Sync + 'static,
    {
        self.option
            .argument_mut()
            .set_validation_step(Arc::new(step));
        self
    }

    /// Validates the draft and returns the finished option.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] the finalize pass finds;
    /// see [`OptionSpec`] for the rules.
    pub fn finalize(mut self) -> Result<OptionSpec> {
        if self.option.name().trim().is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        self.option.finalize()?;
        debug!(
            option = self.option.name(),
            cast = ?self.option.cast(),
            arity = ?self.option.arity(),
            "option finalized"
        );
        Ok(self.option)
    }
}
