//! What a command runs once its arguments are parsed.

use std::collections::BTreeMap;
use std::error::Error;

use optspec_core::Value;

/// Parsed input handed to an executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    /// Option values keyed by option name.
    pub options: BTreeMap<String, Value>,
    /// Positional arguments left after flag parsing.
    pub arguments: Vec<String>,
}

/// Result of running an executor.
pub type ExecResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Anything that can run a parsed invocation.
///
/// Closures taking an [`Invocation`] implement this directly, so both a
/// plain function and a dedicated type can be registered as an executor.
///
/// # Examples
///
/// ```
/// use optspec_dsl::{ExecResult, Executable, Invocation};
///
/// let exec = |inv: &Invocation| -> ExecResult {
///     assert!(inv.arguments.is_empty());
///     Ok(())
/// };
/// exec.execute(&Invocation::default()).unwrap();
/// ```
pub trait Executable: Send + Sync {
    fn execute(&self, invocation: &Invocation) -> ExecResult;
}

impl<F> Executable for F
where
    F: Fn(&Invocation) -> ExecResult + Send + Sync,
{
    fn execute(&self, invocation: &Invocation) -> ExecResult {
        self(invocation)
    }
}
