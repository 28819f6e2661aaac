//! Version strings injected into a command tree.
//!
//! A program's version is plain configuration: read it once (from a file
//! or a literal) and hand it to the `version` declaration of the command
//! that should answer `--version`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A `MAJOR.MINOR.TINY` version.
///
/// # Examples
///
/// ```
/// use optspec_core::Version;
///
/// let version: Version = "1.4.2".parse().unwrap();
/// assert_eq!((version.major, version.minor, version.tiny), (1, 4, 2));
/// assert_eq!(version.to_string(), "1.4.2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub tiny: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, tiny: u64) -> Self {
        Self { major, minor, tiny }
    }

    /// Reads a version file; surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::IoError`] if the file cannot be read, or
    /// [`VersionError::Malformed`] if its contents do not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VersionError> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || VersionError::Malformed(trimmed.to_string());

        let mut parts = trimmed.split('.');
        let mut next = || -> Result<u64, VersionError> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(malformed)
        };
        let version = Version::new(next()?, next()?, next()?);

        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.tiny)
    }
}
