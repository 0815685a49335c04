//! Version model and bump arithmetic.
//!
//! Versions here have the narrow `major.minor.patch[-id.N]` shape that project
//! manifests carry. The submodules turn textual signals into a [`BumpSignal`]
//! and fold it into a final decision:
//!
//! - [`commits`] — classify commit messages against wording rules
//! - [`explicit`] — map an explicitly requested version part to a signal
//! - [`decision`] — merge signal, override and pre-release id into a result

pub mod commits;
pub mod decision;
pub mod explicit;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from version operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The text is not a `major.minor.patch[-pre]` version.
    #[error("malformed version: {0:?}")]
    Malformed(String),

    /// An explicit version part was not one of the recognized names.
    #[error(
        "unknown version part {0:?} (expected major, minor, patch, premajor, preminor, prepatch or prerelease)"
    )]
    UnknownVersionPart(String),

    /// A pre-release bump was requested but no identifier could be resolved.
    #[error("pre-release bump requested but no pre-release id is configured or found in commits")]
    MissingPreReleaseId,

    /// The pre-release identifier contains characters a version cannot carry.
    #[error("invalid pre-release id {0:?} (only ASCII letters, digits and `_` are allowed)")]
    InvalidPreReleaseId(String),

    /// Incrementing a version field would exceed `u64::MAX`.
    #[error("cannot bump {field} of {version}: the field is already at its maximum")]
    Overflow {
        /// The field that overflowed.
        field: &'static str,
        /// The version being bumped.
        version: String,
    },

    /// The bump-commit filter did not compile.
    #[error("invalid bump commit pattern {pattern:?}: {message}")]
    InvalidBumpPattern {
        /// The pattern after `{{version}}` expansion.
        pattern: String,
        /// Regex compilation error.
        message: String,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)(?:-([0-9A-Za-z_.]+))?$")
        .expect("version pattern is valid")
});

/// A pre-release suffix such as `rc.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreRelease {
    /// The label, e.g. `rc`.
    pub id: String,
    /// The counter after the label. `None` only for suffixes parsed without one
    /// (e.g. `1.0.0-beta`); every suffix produced by a bump carries a number.
    pub number: Option<u64>,
}

impl PreRelease {
    /// A suffix with an explicit counter.
    pub fn new(id: impl Into<String>, number: u64) -> Self {
        Self {
            id: id.into(),
            number: Some(number),
        }
    }

    fn parse(suffix: &str) -> Self {
        if let Some((id, number)) = suffix.rsplit_once('.')
            && !id.is_empty()
            && !number.is_empty()
            && number.bytes().all(|b| b.is_ascii_digit())
            && let Ok(number) = number.parse()
        {
            return Self {
                id: id.to_string(),
                number: Some(number),
            };
        }
        Self {
            id: suffix.to_string(),
            number: None,
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{}.{n}", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// A `major.minor.patch[-id.N]` version.
///
/// Values are never mutated in place: [`apply_bump`](Self::apply_bump)
/// derives a new instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Optional pre-release suffix.
    pub pre_release: Option<PreRelease>,
}

impl SemanticVersion {
    /// A release version without a pre-release suffix.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
        }
    }

    /// Attach a pre-release suffix.
    #[must_use]
    pub fn with_pre_release(mut self, pre_release: PreRelease) -> Self {
        self.pre_release = Some(pre_release);
        self
    }

    /// Parse `major.minor.patch` with an optional `-suffix`.
    ///
    /// Surrounding whitespace is ignored. Anything else that does not match
    /// the full pattern fails with [`VersionError::Malformed`].
    pub fn parse(text: &str) -> VersionResult<Self> {
        let trimmed = text.trim();
        let malformed = || VersionError::Malformed(text.to_string());
        let caps = VERSION_RE.captures(trimmed).ok_or_else(malformed)?;

        let field = |i: usize| caps[i].parse::<u64>().map_err(|_| malformed());
        Ok(Self {
            major: field(1)?,
            minor: field(2)?,
            patch: field(3)?,
            pre_release: caps.get(4).map(|m| PreRelease::parse(m.as_str())),
        })
    }

    /// Apply a bump signal.
    ///
    /// The highest of major > minor > patch fires, zeroing lower fields and
    /// dropping any pre-release suffix. With `signal.pre_release` also set, a
    /// fresh `{id}.0` suffix is appended. A pre-release-only signal increments
    /// the counter when the current suffix has the same id and starts a new
    /// `{id}.0` suffix otherwise.
    pub fn apply_bump(&self, signal: BumpSignal, pre_release_id: Option<&str>) -> VersionResult<Self> {
        let id = pre_release_id.map(str::trim).filter(|id| !id.is_empty());
        let id = match (signal.pre_release, id) {
            (false, _) => None,
            (true, None) => return Err(VersionError::MissingPreReleaseId),
            (true, Some(id)) => Some(validate_pre_release_id(id)?),
        };

        let base = if signal.major {
            Some(Self::new(self.increment("major", self.major)?, 0, 0))
        } else if signal.minor {
            Some(Self::new(self.major, self.increment("minor", self.minor)?, 0))
        } else if signal.patch {
            Some(Self::new(
                self.major,
                self.minor,
                self.increment("patch", self.patch)?,
            ))
        } else {
            None
        };

        let next = match (base, id) {
            (Some(base), None) => base,
            (Some(base), Some(id)) => base.with_pre_release(PreRelease::new(id, 0)),
            (None, Some(id)) => {
                let number = match &self.pre_release {
                    Some(PreRelease {
                        id: current,
                        number: Some(n),
                    }) if current == id => self.increment("pre-release number", *n)?,
                    _ => 0,
                };
                Self::new(self.major, self.minor, self.patch)
                    .with_pre_release(PreRelease::new(id, number))
            }
            (None, None) => self.clone(),
        };
        Ok(next)
    }

    fn increment(&self, field: &'static str, value: u64) -> VersionResult<u64> {
        value.checked_add(1).ok_or_else(|| VersionError::Overflow {
            field,
            version: self.to_string(),
        })
    }

    /// Convert to a [`semver::Version`] for precedence comparisons.
    pub fn to_semver(&self) -> Result<semver::Version, semver::Error> {
        semver::Version::parse(&self.to_string())
    }
}

fn validate_pre_release_id(id: &str) -> VersionResult<&str> {
    if id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(id)
    } else {
        Err(VersionError::InvalidPreReleaseId(id.to_string()))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre_release {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> VersionResult<Self> {
        Self::parse(s)
    }
}

/// Which version components a run should bump.
///
/// All-false means "no bump". Flags are independent; precedence between
/// them is resolved by [`SemanticVersion::apply_bump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpSignal {
    /// Bump the major component.
    pub major: bool,
    /// Bump the minor component.
    pub minor: bool,
    /// Bump the patch component.
    pub patch: bool,
    /// Add or advance a pre-release suffix.
    pub pre_release: bool,
}

impl BumpSignal {
    /// The empty signal.
    pub const NONE: Self = Self {
        major: false,
        minor: false,
        patch: false,
        pre_release: false,
    };

    /// True when no flag is set.
    pub const fn is_empty(self) -> bool {
        !(self.major || self.minor || self.patch || self.pre_release)
    }
}

impl fmt::Display for BumpSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let flags = [
            (self.major, "major"),
            (self.minor, "minor"),
            (self.patch, "patch"),
            (self.pre_release, "pre-release"),
        ];
        let names: Vec<&str> = flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("+"))
    }
}
