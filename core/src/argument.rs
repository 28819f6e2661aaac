//! The value-carrying part shared by options and positional arguments.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::convert::{CastKind, Value};
use crate::error::ValidationError;
use crate::flow::Flow;

/// Result of running a validation step.
pub type StepResult = Result<Flow<Value>, ValidationError>;

/// Callback over the raw tokens of an argument.
pub type ValidationStep = Arc<dyn Fn(&[String]) -> StepResult + Send + Sync>;

/// How many tokens an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    #[default]
    Zero,
    One,
    Many,
}

/// Arity, cast kind, default value and validation of a declared value.
///
/// Builders mutate an `Argument` until it is finalized; after that it is
/// only read.
#[derive(Clone, Default)]
pub struct Argument {
    arity: Option<Arity>,
    cast: Option<CastKind>,
    default_value: Option<Value>,
    metaname: Option<String>,
    restricted: Option<Vec<String>>,
    validation_step: Option<ValidationStep>,
}

impl Argument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arity; `Zero` when never set.
    pub fn arity(&self) -> Arity {
        self.arity.unwrap_or_default()
    }

    pub fn set_arity(&mut self, arity: Arity) {
        self.arity = Some(arity);
    }

    /// Cast kind; `None` only before finalize.
    pub fn cast(&self) -> Option<CastKind> {
        self.cast
    }

    pub fn set_cast(&mut self, cast: CastKind) {
        self.cast = Some(cast);
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn set_default(&mut self, value: Value) {
        self.default_value = Some(value);
    }

    /// Parameter label shown in help, e.g. `NAME` or `NAME+`.
    pub fn metaname(&self) -> Option<&str> {
        self.metaname.as_deref()
    }

    pub fn set_metaname(&mut self, metaname: Option<String>) {
        self.metaname = metaname;
    }

    pub fn restricted(&self) -> Option<&[String]> {
        self.restricted.as_deref()
    }

    pub fn set_restricted(&mut self, values: Vec<String>) {
        self.restricted = Some(values);
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted.is_some()
    }

    /// Takes no tokens and has no restricted value set.
    pub fn is_boolean_shaped(&self) -> bool {
        self.arity() == Arity::Zero && !self.is_restricted()
    }

    pub fn is_boolean(&self) -> bool {
        self.cast.is_some_and(CastKind::is_boolean)
    }

    pub fn validation_step(&self) -> Option<&ValidationStep> {
        self.validation_step.as_ref()
    }

    pub fn set_validation_step(&mut self, step: ValidationStep) {
        self.validation_step = Some(step);
    }

    /// Fills in the arity and cast kind when they were never set.
    pub fn finalize(&mut self) {
        if self.arity.is_none() {
            self.arity = Some(Arity::Zero);
        }

        if self.cast.is_none() {
            self.cast = Some(if self.is_boolean_shaped() {
                CastKind::Boolean
            } else {
                CastKind::String
            });
        }
    }

    /// Validates raw tokens.
    ///
    /// A custom validation step takes precedence. Otherwise the tokens are
    /// checked against the restricted set and cast according to the arity:
    /// no tokens yields `true`, a single-valued argument takes exactly one
    /// token and yields a scalar, and many tokens yield a list.
    pub fn validate(&self, tokens: &[String]) -> StepResult {
        if let Some(step) = &self.validation_step {
            return step(tokens);
        }

        if let Some(allowed) = &self.restricted {
            if let Some(bad) = tokens.iter().find(|t| !allowed.contains(t)) {
                return Err(ValidationError::NotAllowed {
                    value: bad.clone(),
                    allowed: allowed.join(", "),
                });
            }
        }

        let cast = self.cast.unwrap_or(CastKind::String);
        match self.arity() {
            Arity::Zero => Ok(Flow::Continue(Value::Bool(true))),
            Arity::One => match tokens {
                [token] => Ok(Flow::Continue(cast.convert(token)?)),
                [] => Err(ValidationError::Rejected("missing argument".to_string())),
                _ => Err(ValidationError::Rejected(format!(
                    "expected one argument, got {}",
                    tokens.len()
                ))),
            },
            Arity::Many => {
                let values = tokens
                    .iter()
                    .map(|t| cast.convert(t))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Flow::Continue(Value::List(values)))
            }
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("arity", &self.arity)
            .field("cast", &self.cast)
            .field("default_value", &self.default_value)
            .field("metaname", &self.metaname)
            .field("restricted", &self.restricted)
            .field("validation_step", &self.validation_step.is_some())
            .finish()
    }
}
