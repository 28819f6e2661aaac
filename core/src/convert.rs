//! Cast kinds and the conversion table.
//!
//! Every option carries a [`CastKind`] that names the scalar type its raw
//! string tokens are converted to. The [`Converter`] exposes the registry
//! of kinds in a fixed order; the command builder generates its
//! declaration methods from that registry.
//!
//! # Examples
//!
//! ```
//! use optspec_core::{CastKind, Value};
//!
//! assert_eq!(CastKind::from_tag("int"), Some(CastKind::Integer));
//! assert_eq!(CastKind::Integer.convert("42").unwrap(), Value::Integer(42));
//! assert!(CastKind::Integer.convert("forty-two").is_err());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// Semantic scalar type of an option's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastKind {
    #[serde(alias = "bool")]
    Boolean,
    String,
    Symbol,
    #[serde(alias = "int")]
    Integer,
    Float,
    Filepath,
    File,
    Yaml,
}

/// Tag table, aliases included. Order is registry order.
const TAGS: &[(&str, CastKind)] = &[
    ("boolean", CastKind::Boolean),
    ("bool", CastKind::Boolean),
    ("string", CastKind::String),
    ("symbol", CastKind::Symbol),
    ("integer", CastKind::Integer),
    ("int", CastKind::Integer),
    ("float", CastKind::Float),
    ("filepath", CastKind::Filepath),
    ("file", CastKind::File),
    ("yaml", CastKind::Yaml),
];

impl CastKind {
    /// Resolves a tag (or alias) to its cast kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        TAGS.iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag))
            .map(|(_, kind)| *kind)
    }

    /// Canonical tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            CastKind::Boolean => "boolean",
            CastKind::String => "string",
            CastKind::Symbol => "symbol",
            CastKind::Integer => "integer",
            CastKind::Float => "float",
            CastKind::Filepath => "filepath",
            CastKind::File => "file",
            CastKind::Yaml => "yaml",
        }
    }

    pub fn is_boolean(self) -> bool {
        self == CastKind::Boolean
    }

    /// Converts a raw token to a value of this kind.
    pub fn convert(self, raw: &str) -> Result<Value, ConversionError> {
        let invalid = || ConversionError::Invalid {
            kind: self.tag().to_string(),
            value: raw.to_string(),
        };

        match self {
            CastKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            CastKind::String => Ok(Value::Str(raw.to_string())),
            CastKind::Symbol => {
                if raw.is_empty() {
                    return Err(invalid());
                }
                Ok(Value::Symbol(raw.to_string()))
            }
            CastKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid()),
            CastKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid()),
            CastKind::Filepath => Ok(Value::Path(PathBuf::from(raw))),
            CastKind::File => {
                if !Path::new(raw).exists() {
                    return Err(ConversionError::FileNotFound(raw.to_string()));
                }
                Ok(Value::Path(PathBuf::from(raw)))
            }
            CastKind::Yaml => serde_yaml::from_str(raw)
                .map(Value::Yaml)
                .map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Registry of conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter;

impl Converter {
    /// Every registered kind, in registry order, without aliases.
    pub fn kinds() -> &'static [CastKind] {
        &[
            CastKind::Boolean,
            CastKind::String,
            CastKind::Symbol,
            CastKind::Integer,
            CastKind::Float,
            CastKind::Filepath,
            CastKind::File,
            CastKind::Yaml,
        ]
    }

    /// Every registered tag, aliases included.
    pub fn tags() -> impl Iterator<Item = &'static str> {
        TAGS.iter().map(|(tag, _)| *tag)
    }

    /// Converts `raw` using the kind registered under `tag`.
    ///
    /// Returns `None` when the tag is unknown.
    pub fn convert(tag: &str, raw: &str) -> Option<Result<Value, ConversionError>> {
        CastKind::from_tag(tag).map(|kind| kind.convert(raw))
    }
}

/// A converted option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Str(String),
    Symbol(String),
    Integer(i64),
    Float(f64),
    Path(PathBuf),
    Yaml(serde_yaml::Value),
    List(Vec<Value>),
}

impl Value {
    /// Maps a YAML scalar or sequence onto a value; `null` maps to `None`.
    pub fn from_yaml(value: &serde_yaml::Value) -> Option<Self> {
        use serde_yaml::Value as Y;

        match value {
            Y::Null => None,
            Y::Bool(b) => Some(Value::Bool(*b)),
            Y::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Integer(i)),
                None => n.as_f64().map(Value::Float),
            },
            Y::String(s) => Some(Value::Str(s.clone())),
            Y::Sequence(items) => Some(Value::List(
                items.iter().filter_map(Value::from_yaml).collect(),
            )),
            other => Some(Value::Yaml(other.clone())),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) | Value::Symbol(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::Yaml(y) => match serde_yaml::to_string(y) {
                Ok(s) => f.write_str(s.trim_end()),
                Err(_) => f.write_str("<yaml>"),
            },
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}
