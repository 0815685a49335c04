//! Explicit version-part mode: map a requested part name to a signal.
//!
//! When a part is requested the commit history is never consulted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::version::{BumpSignal, VersionError, VersionResult};

/// A version part a user can request directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionPart {
    /// `X.0.0`
    Major,
    /// `x.Y.0`
    Minor,
    /// `x.y.Z`
    Patch,
    /// `X.0.0-id.0`
    PreMajor,
    /// `x.Y.0-id.0`
    PreMinor,
    /// `x.y.Z-id.0`
    PrePatch,
    /// Advance (or start) the pre-release counter only.
    PreRelease,
}

impl VersionPart {
    /// All recognized parts.
    pub const ALL: &[Self] = &[
        Self::Major,
        Self::Minor,
        Self::Patch,
        Self::PreMajor,
        Self::PreMinor,
        Self::PrePatch,
        Self::PreRelease,
    ];

    /// The lowercase name accepted on input.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::PreMajor => "premajor",
            Self::PreMinor => "preminor",
            Self::PrePatch => "prepatch",
            Self::PreRelease => "prerelease",
        }
    }

    /// The bump signal this part stands for.
    pub const fn signal(self) -> BumpSignal {
        let none = BumpSignal::NONE;
        match self {
            Self::Major => BumpSignal { major: true, ..none },
            Self::Minor => BumpSignal { minor: true, ..none },
            Self::Patch => BumpSignal { patch: true, ..none },
            Self::PreMajor => BumpSignal {
                major: true,
                pre_release: true,
                ..none
            },
            Self::PreMinor => BumpSignal {
                minor: true,
                pre_release: true,
                ..none
            },
            Self::PrePatch => BumpSignal {
                patch: true,
                pre_release: true,
                ..none
            },
            Self::PreRelease => BumpSignal {
                pre_release: true,
                ..none
            },
        }
    }
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionPart {
    type Err = VersionError;

    fn from_str(s: &str) -> VersionResult<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|part| part.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| VersionError::UnknownVersionPart(s.to_string()))
    }
}

/// Resolve an explicit part request.
///
/// Returns `None` for an empty request, meaning commits decide instead.
#[instrument]
pub fn resolve_version_part(part: &str) -> VersionResult<Option<BumpSignal>> {
    if part.trim().is_empty() {
        return Ok(None);
    }
    let part: VersionPart = part.parse()?;
    let signal = part.signal();
    debug!(%part, %signal, "resolved explicit version part");
    Ok(Some(signal))
}
