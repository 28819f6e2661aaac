//! Option configuration mappings.
//!
//! A configuration mapping sets several option fields at once. Entries are
//! kept in the order they were written and applied in that order, so when
//! two entries touch the same field the later one wins.
//!
//! # Example YAML
//!
//! ```yaml
//! short: -o
//! long: --output
//! desc: Where to write the report
//! cast: filepath
//! default: report.txt
//! ```
//!
//! # Examples
//!
//! ```
//! use optspec_core::{CastKind, OptionConfig};
//!
//! let config = OptionConfig::from_yaml_str("output", "short: -o\ncast: filepath\n").unwrap();
//! assert_eq!(config.len(), 2);
//!
//! let config = OptionConfig::new().short("-o").cast(CastKind::Filepath);
//! assert_eq!(config.len(), 2);
//! ```

use serde_yaml::{Mapping, Value as Yaml};

use crate::convert::{CastKind, Value};
use crate::error::{ConfigurationError, Result};

/// One recognised configuration key with its value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEntry {
    Short(String),
    Long(String),
    Description(String),
    Cast(CastKind),
    Default(Value),
    Restricted(Vec<String>),
    Negation(String),
    Dependencies(Vec<String>),
}

/// Ordered set of configuration entries for one option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionConfig {
    entries: Vec<ConfigEntry>,
}

impl OptionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a YAML mapping. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidConfig`] when a recognised key
    /// carries a value of the wrong shape, and
    /// [`ConfigurationError::MalformedDeclaration`] when the text is not a
    /// YAML mapping.
    pub fn from_yaml_str(option: &str, text: &str) -> Result<Self> {
        let value: Yaml = serde_yaml::from_str(text)
            .map_err(|e| ConfigurationError::MalformedDeclaration(format!("{option}: {e}")))?;
        match value {
            Yaml::Mapping(mapping) => Self::from_mapping(option, &mapping),
            Yaml::Null => Ok(Self::new()),
            _ => Err(ConfigurationError::MalformedDeclaration(format!(
                "{option}: configuration must be a mapping"
            ))),
        }
    }

    /// Reads an already-parsed YAML mapping. Unknown keys are ignored.
    pub fn from_mapping(option: &str, mapping: &Mapping) -> Result<Self> {
        let mut config = Self::new();

        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };
            let invalid = |reason: &str| ConfigurationError::InvalidConfig {
                option: option.to_string(),
                key: key.to_string(),
                reason: reason.to_string(),
            };

            let entry = match key {
                "short" => ConfigEntry::Short(scalar(value).ok_or_else(|| invalid("expected a string"))?),
                "long" => ConfigEntry::Long(scalar(value).ok_or_else(|| invalid("expected a string"))?),
                "description" | "desc" => {
                    ConfigEntry::Description(scalar(value).ok_or_else(|| invalid("expected a string"))?)
                }
                "cast" => {
                    let tag = value.as_str().ok_or_else(|| invalid("expected a cast tag"))?;
                    ConfigEntry::Cast(
                        CastKind::from_tag(tag).ok_or_else(|| invalid("unknown cast tag"))?,
                    )
                }
                "default" => match Value::from_yaml(value) {
                    Some(v) => ConfigEntry::Default(v),
                    None => continue,
                },
                "restricted" => {
                    ConfigEntry::Restricted(list(value).ok_or_else(|| invalid("expected a list"))?)
                }
                "negation" => {
                    ConfigEntry::Negation(scalar(value).ok_or_else(|| invalid("expected a string"))?)
                }
                "dependencies" => {
                    ConfigEntry::Dependencies(list(value).ok_or_else(|| invalid("expected a list"))?)
                }
                _ => continue,
            };
            config.entries.push(entry);
        }

        Ok(config)
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: ConfigEntry) {
        self.entries.push(entry);
    }

    pub fn short(mut self, flag: &str) -> Self {
        self.push(ConfigEntry::Short(flag.to_string()));
        self
    }

    pub fn long(mut self, flag: &str) -> Self {
        self.push(ConfigEntry::Long(flag.to_string()));
        self
    }

    pub fn desc(mut self, description: &str) -> Self {
        self.push(ConfigEntry::Description(description.to_string()));
        self
    }

    pub fn cast(mut self, kind: CastKind) -> Self {
        self.push(ConfigEntry::Cast(kind));
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.push(ConfigEntry::Default(value.into()));
        self
    }

    pub fn restricted<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(ConfigEntry::Restricted(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn negation(mut self, prefix: &str) -> Self {
        self.push(ConfigEntry::Negation(prefix.to_string()));
        self
    }

    pub fn dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(ConfigEntry::Dependencies(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }
}

fn scalar(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn list(value: &Yaml) -> Option<Vec<String>> {
    value.as_sequence()?.iter().map(scalar).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_keeps_key_order() {
        let config = OptionConfig::from_yaml_str(
            "output",
            "desc: first\nshort: -o\ndescription: second\n",
        )
        .unwrap();
        assert_eq!(
            config.entries(),
            &[
                ConfigEntry::Description("first".to_string()),
                ConfigEntry::Short("-o".to_string()),
                ConfigEntry::Description("second".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_yaml_ignores_unknown_keys() {
        let config =
            OptionConfig::from_yaml_str("output", "colour: red\nlong: --output\n").unwrap();
        assert_eq!(config.entries(), &[ConfigEntry::Long("--output".to_string())]);
    }

    #[test]
    fn test_from_yaml_reads_lists_and_defaults() {
        let config = OptionConfig::from_yaml_str(
            "format",
            "restricted: [json, yaml]\ndefault: json\ndependencies: [output]\ncast: int\n",
        )
        .unwrap();
        assert_eq!(
            config.entries(),
            &[
                ConfigEntry::Restricted(vec!["json".to_string(), "yaml".to_string()]),
                ConfigEntry::Default(Value::Str("json".to_string())),
                ConfigEntry::Dependencies(vec!["output".to_string()]),
                ConfigEntry::Cast(CastKind::Integer),
            ]
        );
    }

    #[test]
    fn test_from_yaml_rejects_wrong_shapes() {
        let err = OptionConfig::from_yaml_str("format", "restricted: json\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidConfig { ref key, .. } if key == "restricted"));

        let err = OptionConfig::from_yaml_str("format", "cast: date\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidConfig { ref key, .. } if key == "cast"));

        let err = OptionConfig::from_yaml_str("format", "- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedDeclaration(_)));
    }

    #[test]
    fn test_null_default_is_skipped() {
        let config = OptionConfig::from_yaml_str("format", "default: ~\n").unwrap();
        assert!(config.is_empty());
    }
}
