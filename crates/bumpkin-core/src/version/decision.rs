//! The bump decision: fold an override, a signal and a pre-release id into
//! either a new version or a reasoned "no bump".

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::version::{BumpSignal, SemanticVersion, VersionError, VersionResult};

/// The version a run settles on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewVersion {
    /// Computed by applying a signal to the current version.
    Computed(SemanticVersion),
    /// Taken verbatim from the configured override.
    Override(String),
}

impl fmt::Display for NewVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed(v) => fmt::Display::fmt(v, f),
            Self::Override(s) => f.write_str(s),
        }
    }
}

/// Why a run decided not to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoBumpReason {
    /// No flag was set by commits or the version part.
    NothingToBump,
    /// A pre-release bump was wanted but no id could be resolved.
    MissingPreReleaseId,
}

impl fmt::Display for NoBumpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToBump => write!(f, "no version bump requested"),
            Self::MissingPreReleaseId => write!(f, "no pre-release id available"),
        }
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Bump to this version.
    Bumped(NewVersion),
    /// Leave the version alone.
    NoBump(NoBumpReason),
}

/// Decide the next version.
///
/// A non-empty `version_override` wins outright and is used verbatim. An
/// empty signal means no bump. Otherwise the signal is applied; a missing
/// pre-release id downgrades to [`NoBumpReason::MissingPreReleaseId`]
/// instead of failing the run.
#[instrument(skip_all, fields(%current, %signal))]
pub fn decide(
    current: &SemanticVersion,
    signal: BumpSignal,
    version_override: Option<&str>,
    pre_release_id: Option<&str>,
) -> VersionResult<Decision> {
    if let Some(forced) = version_override.map(str::trim).filter(|v| !v.is_empty()) {
        warn_if_not_newer(current, forced);
        info!(version = forced, "using version override");
        return Ok(Decision::Bumped(NewVersion::Override(forced.to_string())));
    }

    if signal.is_empty() {
        info!("no version bump found, skipping");
        return Ok(Decision::NoBump(NoBumpReason::NothingToBump));
    }

    match current.apply_bump(signal, pre_release_id) {
        Ok(next) => {
            debug!(%next, "computed next version");
            Ok(Decision::Bumped(NewVersion::Computed(next)))
        }
        Err(VersionError::MissingPreReleaseId) => {
            warn!("pre-release bump requested but no pre-release id found, skipping");
            Ok(Decision::NoBump(NoBumpReason::MissingPreReleaseId))
        }
        Err(e) => Err(e),
    }
}

fn warn_if_not_newer(current: &SemanticVersion, forced: &str) {
    let Ok(current) = current.to_semver() else {
        return;
    };
    let Ok(forced) = semver::Version::parse(forced) else {
        debug!(forced, "override is not strict semver, skipping precedence check");
        return;
    };
    if forced <= current {
        warn!(%current, %forced, "version override does not move the version forward");
    }
}
