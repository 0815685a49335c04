//! Bump orchestration.
//!
//! All sequencing lives here. The CLI is purely a display layer.
//!
//! One run reads the manifest, gathers a bump signal from exactly one
//! source (override, explicit version part, or commit messages), decides
//! the next version, then persists it: manifest write and git actions,
//! both skipped under dry-run.
//!
//! Collaborators come in through [`CommitSource`] and [`GitActions`], and
//! environment facts through [`RunContext`], so nothing in here reads the
//! process environment.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::BumpSettings;
use crate::event::{CommitSource, EventError};
use crate::git::{self, GitActions, GitError, Identity, ReleaseCommit};
use crate::manifest::{ManifestError, ManifestKind};
use crate::version::commits::{classify, find_pre_release_id, relevant_commits};
use crate::version::decision::{Decision, NoBumpReason, decide};
use crate::version::explicit::resolve_version_part;
use crate::version::{BumpSignal, SemanticVersion, VersionError};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum BumpError {
    /// No manifest path was configured.
    #[error("no manifest path configured (set bump.manifest_path, the path-to-file input, or --file)")]
    NoManifestPath,

    /// The manifest could not be read.
    #[error("failed to read manifest {path}: {source}")]
    ReadManifest {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest could not be written.
    #[error("failed to write manifest {path}: {source}")]
    WriteManifest {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Manifest format problem.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Version parsing or computation failed.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Commit retrieval failed.
    #[error(transparent)]
    Event(#[from] EventError),

    /// A git step failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

// ──────────────────────────────────────────────
// Inputs and outputs
// ──────────────────────────────────────────────

/// Facts about the CI environment, captured once at the process boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Directory relative manifest paths are resolved against.
    pub workspace: Utf8PathBuf,
    /// Path of the triggering event's JSON payload.
    pub event_path: Option<Utf8PathBuf>,
    /// API token for fetching pull request commits.
    pub token: Option<String>,
    /// The triggering ref, e.g. `refs/heads/main`.
    pub git_ref: Option<String>,
    /// Source branch of a pull request.
    pub head_ref: Option<String>,
}

impl RunContext {
    /// Build a context from GitHub Actions variables read through `lookup`.
    ///
    /// The workspace falls back to `cwd` when `GITHUB_WORKSPACE` is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, cwd: &Utf8Path) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            workspace: var("GITHUB_WORKSPACE").map_or_else(|| cwd.to_path_buf(), Utf8PathBuf::from),
            event_path: var("GITHUB_EVENT_PATH").map(Utf8PathBuf::from),
            token: var("GITHUB_TOKEN"),
            git_ref: var("GITHUB_REF"),
            head_ref: var("GITHUB_HEAD_REF"),
        }
    }

    /// Resolve a manifest path against the workspace.
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.workspace.join(path)
    }
}

/// How a run ended. Every status is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpStatus {
    /// A new version was computed (and persisted unless dry-run).
    Bumped,
    /// Nothing asked for a bump.
    NoBump,
    /// Every commit was an earlier bump commit.
    NoRelevantCommits,
}

impl BumpStatus {
    /// One-line summary for users.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Bumped => "Version bumped",
            Self::NoBump => "No action necessary",
            Self::NoRelevantCommits => "Skipped: latest commit was already a version bump",
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BumpOutcome {
    /// Version found in the manifest.
    pub old_version: String,
    /// The new version, when bumped.
    pub new_version: Option<String>,
    /// Whether a new version was decided.
    pub was_bumped: bool,
    /// How the run ended.
    pub status: BumpStatus,
    /// Why there was no bump, for [`BumpStatus::NoBump`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoBumpReason>,
    /// Tag created for the new version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// The manifest that was read.
    pub manifest_path: Utf8PathBuf,
    /// Rendered manifest content, when bumped.
    #[serde(skip)]
    pub manifest_content: Option<String>,
    /// Whether persistence was skipped.
    pub dry_run: bool,
    /// Whether git actions ran.
    pub git_updated: bool,
}

impl BumpOutcome {
    fn unchanged(
        old_version: String,
        manifest_path: Utf8PathBuf,
        status: BumpStatus,
        reason: Option<NoBumpReason>,
        dry_run: bool,
    ) -> Self {
        Self {
            old_version,
            new_version: None,
            was_bumped: false,
            status,
            reason,
            tag: None,
            manifest_path,
            manifest_content: None,
            dry_run,
            git_updated: false,
        }
    }
}

/// A signal plus the pre-release id to use with it.
struct Gathered {
    signal: BumpSignal,
    pre_release_id: Option<String>,
}

// ──────────────────────────────────────────────
// Run
// ──────────────────────────────────────────────

/// The manifest and the version it currently carries.
#[derive(Debug, Clone)]
pub struct CurrentVersion {
    /// Resolved manifest path.
    pub manifest_path: Utf8PathBuf,
    /// Manifest format.
    pub kind: ManifestKind,
    /// Full manifest content.
    pub content: String,
    /// The version text as found in the manifest.
    pub raw: String,
    /// The parsed version.
    pub version: SemanticVersion,
}

/// Read the manifest and parse its current version.
#[instrument(skip_all, fields(workspace = %context.workspace))]
pub fn current_version(settings: &BumpSettings, context: &RunContext) -> BumpResult<CurrentVersion> {
    let kind = settings.manifest_kind()?;
    let relative = settings
        .manifest_path
        .as_deref()
        .filter(|p| !p.as_str().trim().is_empty())
        .ok_or(BumpError::NoManifestPath)?;
    let manifest_path = context.resolve(relative);
    info!(path = %manifest_path, %kind, "reading manifest");

    let content = std::fs::read_to_string(&manifest_path).map_err(|source| BumpError::ReadManifest {
        path: manifest_path.clone(),
        source,
    })?;
    let raw = kind.read_current_version(&content)?;
    let version = SemanticVersion::parse(&raw)?;
    info!(current = %version, "current version");

    Ok(CurrentVersion {
        manifest_path,
        kind,
        content,
        raw,
        version,
    })
}

/// Run one bump end to end.
#[instrument(skip_all, fields(workspace = %context.workspace, dry_run = settings.dry_run))]
pub fn run_bump(
    settings: &BumpSettings,
    context: &RunContext,
    source: &impl CommitSource,
    git: &impl GitActions,
) -> BumpResult<BumpOutcome> {
    let CurrentVersion {
        manifest_path,
        kind,
        content,
        raw: old_version,
        version: current,
    } = current_version(settings, context)?;

    let gathered = match gather_signal(settings, source)? {
        Some(gathered) => gathered,
        None => {
            info!("no action necessary because latest commit was a bump");
            return Ok(BumpOutcome::unchanged(
                old_version,
                manifest_path,
                BumpStatus::NoRelevantCommits,
                None,
                settings.dry_run,
            ));
        }
    };

    let next = match decide(
        &current,
        gathered.signal,
        settings.version_override(),
        gathered.pre_release_id.as_deref(),
    )? {
        Decision::Bumped(next) => next.to_string(),
        Decision::NoBump(reason) => {
            info!(%reason, "no bump");
            return Ok(BumpOutcome::unchanged(
                old_version,
                manifest_path,
                BumpStatus::NoBump,
                Some(reason),
                settings.dry_run,
            ));
        }
    };
    info!(new_version = %next, "new version");

    let new_content = kind.render_new_content(&next, &content);
    debug!(content = %new_content, "new manifest content");
    if settings.dry_run {
        info!("dry run, skipping manifest write and git (tag|commit|push)");
    } else {
        std::fs::write(&manifest_path, &new_content).map_err(|source| BumpError::WriteManifest {
            path: manifest_path.clone(),
            source,
        })?;
        info!(path = %manifest_path, "manifest written");
    }

    let git_updated = settings.performs_git_updates();
    if git_updated {
        persist_to_git(settings, context, git, &next)?;
    } else if !settings.dry_run {
        debug!("commit, tag and push all skipped");
    }

    let tag = (git_updated && !settings.skip_tag).then(|| settings.tag_for(&next));
    Ok(BumpOutcome {
        old_version,
        new_version: Some(next),
        was_bumped: true,
        status: BumpStatus::Bumped,
        reason: None,
        tag,
        manifest_path,
        manifest_content: Some(new_content),
        dry_run: settings.dry_run,
        git_updated,
    })
}

/// Pick the signal source. `None` means every commit was a bump commit.
fn gather_signal(
    settings: &BumpSettings,
    source: &impl CommitSource,
) -> BumpResult<Option<Gathered>> {
    let configured_id = settings.pre_release_id().map(ToOwned::to_owned);

    if settings.version_override().is_some() {
        debug!("version override set, not consulting commits");
        return Ok(Some(Gathered {
            signal: BumpSignal::NONE,
            pre_release_id: configured_id,
        }));
    }

    if let Some(part) = settings.version_part()
        && let Some(signal) = resolve_version_part(part)?
    {
        return Ok(Some(Gathered {
            signal,
            pre_release_id: configured_id,
        }));
    }

    let messages = source.fetch_commit_messages()?;
    let filter = settings.bump_commit_filter()?;
    let relevant = relevant_commits(&messages, &filter);
    if relevant.is_empty() {
        return Ok(None);
    }

    let rules = settings.wording_rules();
    let signal = classify(&relevant, &rules);
    let pre_release_id = match configured_id {
        Some(id) => Some(id),
        None if signal.pre_release => {
            let found = find_pre_release_id(&rules.pre_release, &relevant);
            debug!(?found, "pre-release id from commits");
            found
        }
        None => None,
    };
    Ok(Some(Gathered {
        signal,
        pre_release_id,
    }))
}

fn persist_to_git(
    settings: &BumpSettings,
    context: &RunContext,
    git: &impl GitActions,
    version: &str,
) -> BumpResult<()> {
    git.configure_identity(&Identity {
        name: settings.git_user_name.clone(),
        email: settings.git_user_email.clone(),
    })?;

    let branch = git::resolve_branch(
        settings.target_branch.as_deref(),
        context.head_ref.as_deref(),
        context.git_ref.as_deref(),
    );
    info!(?branch, "current branch");

    git.commit_tag_and_push(&ReleaseCommit {
        message: settings.commit_message_for(version),
        tag: settings.tag_for(version),
        branch,
        skip_commit: settings.skip_commit,
        skip_tag: settings.skip_tag,
        skip_push: settings.skip_push,
    })?;
    Ok(())
}
