//! Error types for option declarations.
//!
//! Configuration problems are programmer errors in a CLI's own declarations
//! and surface as a single kind, [`ConfigurationError`]. Casting raw tokens
//! and running validation steps have their own kinds so that a driver can
//! tell a broken declaration apart from bad user input.

use thiserror::Error;

/// Errors raised while declaring or finalizing options and commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A boolean option was given a restricted set of values.
    #[error("options cannot be both boolean and restricted to certain arguments: {0}")]
    BooleanRestricted(String),

    /// A negated option has no long flag to derive the negation from.
    #[error("the long flag is required for negation: {0}")]
    NegationWithoutLong(String),

    /// Only boolean options can be negated.
    #[error("unable to negate a non-boolean option: {0}")]
    NegatedNonBoolean(String),

    /// Short flag is not of the form `-x`.
    #[error("invalid short flag for {option}: {flag}")]
    InvalidShortFlag { option: String, flag: String },

    /// Long flag does not start with `--` or has no name after it.
    #[error("invalid long flag for {option}: {flag}")]
    InvalidLongFlag { option: String, flag: String },

    /// An option declaration mapping could not be interpreted.
    #[error("malformed option declaration: {0}")]
    MalformedDeclaration(String),

    /// A configuration key carried a value of the wrong shape.
    #[error("invalid value for '{key}' on {option}: {reason}")]
    InvalidConfig {
        option: String,
        key: String,
        reason: String,
    },

    /// Two options in the same command share a name.
    #[error("duplicate option in command {command}: {option}")]
    DuplicateOption { command: String, option: String },

    /// Two options in the same command share a flag.
    #[error("duplicate flag in command {command}: {flag}")]
    DuplicateFlag { command: String, flag: String },

    /// Two subcommands in the same super-command share a name.
    #[error("duplicate subcommand in {command}: {subcommand}")]
    DuplicateCommand { command: String, subcommand: String },

    /// An option depends on an option the command never declares.
    #[error("option {option} depends on unknown option: {dependency}")]
    UnknownDependency { option: String, dependency: String },

    /// A template printer was requested without a template path.
    #[error("no template file given to the template printer")]
    MissingTemplate,

    /// A template printer was given a path that does not exist.
    #[error("the template file doesn't exist: {0}")]
    TemplateNotFound(String),

    /// A declaration method name is not in the dispatch table.
    #[error("unknown declaration method: {0}")]
    UnknownDeclaration(String),

    /// An option or command was declared with an empty name.
    #[error("the name of an option or command cannot be empty")]
    EmptyName,
}

/// A raw token could not be cast to the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("'{value}' is not a valid {kind}")]
    Invalid { kind: String, value: String },

    #[error("file does not exist: {0}")]
    FileNotFound(String),
}

/// A validation step rejected the tokens it was given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("value '{value}' is not one of: {allowed}")]
    NotAllowed { value: String, allowed: String },

    #[error("{0}")]
    Rejected(String),
}

/// Errors reading or parsing a version file.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid version string: '{0}' (expected MAJOR.MINOR.TINY)")]
    Malformed(String),
}

/// Convenience alias for results with [`ConfigurationError`].
pub type Result<T> = std::result::Result<T, ConfigurationError>;
