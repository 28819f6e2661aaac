//! Control flow returned by validation steps.
//!
//! The built-in `help` and `version` options do not fail; they ask the
//! driver to stop normal processing and render something instead. That
//! request travels as an ordinary return value so a driver can match on
//! it instead of inspecting error messages.

/// Outcome of a validation step.
///
/// # Examples
///
/// ```
/// use optspec_core::Flow;
///
/// let flow: Flow<i64> = Flow::Continue(3);
/// assert_eq!(flow.map(|n| n * 2), Flow::Continue(6));
///
/// let help: Flow<i64> = Flow::Help(Some("push".to_string()));
/// assert!(help.is_interrupt());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<T> {
    /// Keep parsing with the validated value.
    Continue(T),
    /// Help was requested, optionally for a named subcommand.
    Help(Option<String>),
    /// The version message was requested.
    Version(String),
}

impl<T> Flow<T> {
    /// Returns `true` for help and version requests.
    pub fn is_interrupt(&self) -> bool {
        !matches!(self, Flow::Continue(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Flow::Continue(value) => Flow::Continue(f(value)),
            Flow::Help(subcommand) => Flow::Help(subcommand),
            Flow::Version(message) => Flow::Version(message),
        }
    }

    pub fn continued(self) -> Option<T> {
        match self {
            Flow::Continue(value) => Some(value),
            _ => None,
        }
    }
}
