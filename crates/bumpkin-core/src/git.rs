//! Git operations for persisting a bump.
//!
//! Shells out to `git` for all operations. This ensures we inherit the
//! runner's credentials, hooks, and other configuration.

use std::process::Command;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "commit").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// What to persist for a bump and which steps to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCommit {
    /// Commit message, already interpolated.
    pub message: String,
    /// Tag name, e.g. `v1.2.3`.
    pub tag: String,
    /// Branch to push to. `None` pushes the current upstream.
    pub branch: Option<String>,
    /// Skip creating the commit.
    pub skip_commit: bool,
    /// Skip creating the tag.
    pub skip_tag: bool,
    /// Skip pushing.
    pub skip_push: bool,
}

impl ReleaseCommit {
    /// True when every git step is skipped.
    pub const fn skips_everything(&self) -> bool {
        self.skip_commit && self.skip_tag && self.skip_push
    }
}

/// The identity used for bump commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// `user.name`
    pub name: String,
    /// `user.email`
    pub email: String,
}

/// Git side effects of a bump.
pub trait GitActions {
    /// Configure the committer identity for this repository.
    fn configure_identity(&self, identity: &Identity) -> GitResult<()>;

    /// Commit, tag and push as requested.
    fn commit_tag_and_push(&self, release: &ReleaseCommit) -> GitResult<()>;
}

const REMOTE: &str = "origin";

/// [`GitActions`] implemented by running `git` in a working tree.
#[derive(Debug, Clone)]
pub struct ShellGit {
    root: Utf8PathBuf,
}

impl ShellGit {
    /// Operate on the repository at `root`, pushing to `origin`.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl GitActions for ShellGit {
    #[instrument(skip(self))]
    fn configure_identity(&self, identity: &Identity) -> GitResult<()> {
        if !is_inside_repo(&self.root)? {
            return Err(GitError::NotARepo);
        }
        git(&self.root, &["config", "user.name", &identity.name])?;
        git(&self.root, &["config", "user.email", &identity.email])?;
        Ok(())
    }

    #[instrument(skip(self), fields(root = %self.root))]
    fn commit_tag_and_push(&self, release: &ReleaseCommit) -> GitResult<()> {
        if release.skips_everything() {
            debug!("nothing to do");
            return Ok(());
        }

        if release.skip_commit {
            debug!("skipping commit");
        } else {
            commit_all(&self.root, &release.message)?;
        }

        if release.skip_tag {
            debug!("skipping tag");
        } else {
            create_tag(&self.root, &release.tag)?;
        }

        if release.skip_push {
            debug!("skipping push");
            return Ok(());
        }

        push_branch(&self.root, REMOTE, release.branch.as_deref())?;
        if !release.skip_tag {
            push_tag(&self.root, REMOTE, &release.tag)?;
        }
        Ok(())
    }
}

/// Commit all tracked changes.
///
/// Returns the short hash of the new commit.
#[instrument]
pub fn commit_all(root: &Utf8Path, message: &str) -> GitResult<String> {
    git(root, &["commit", "--all", "--message", message])?;
    let hash = git(root, &["rev-parse", "--short", "HEAD"])?.trim().to_string();
    info!(%hash, "committed version bump");
    Ok(hash)
}

/// Create a lightweight tag at `HEAD`.
#[instrument]
pub fn create_tag(root: &Utf8Path, tag: &str) -> GitResult<()> {
    git(root, &["tag", tag])?;
    info!(%tag, "created tag");
    Ok(())
}

/// Push `HEAD` to `branch` on `remote`, or the current upstream when no
/// branch is given.
#[instrument]
pub fn push_branch(root: &Utf8Path, remote: &str, branch: Option<&str>) -> GitResult<()> {
    match branch {
        Some(branch) => {
            let refspec = format!("HEAD:refs/heads/{branch}");
            git(root, &["push", remote, &refspec])?;
        }
        None => {
            git(root, &["push", remote])?;
        }
    }
    info!(%remote, ?branch, "pushed");
    Ok(())
}

/// Push a single tag.
#[instrument]
pub fn push_tag(root: &Utf8Path, remote: &str, tag: &str) -> GitResult<()> {
    let refspec = format!("refs/tags/{tag}");
    git(root, &["push", remote, &refspec])?;
    info!(%remote, %tag, "pushed tag");
    Ok(())
}

/// Check if `root` is inside a git work tree.
#[instrument]
pub fn is_inside_repo(root: &Utf8Path) -> GitResult<bool> {
    match git(root, &["rev-parse", "--is-inside-work-tree"]) {
        Ok(output) => Ok(output.trim() == "true"),
        Err(GitError::Command { .. } | GitError::NotARepo) => Ok(false),
        Err(e) => Err(e),
    }
}

static REF_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^refs/[a-zA-Z]+/(.+)$").expect("ref pattern is valid"));

/// Pick the branch a bump is pushed to.
///
/// An explicit target wins, then the pull request head ref, then the branch
/// named by the triggering ref (`refs/heads/main` gives `main`).
pub fn resolve_branch(
    target_branch: Option<&str>,
    head_ref: Option<&str>,
    git_ref: Option<&str>,
) -> Option<String> {
    fn non_empty(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }

    non_empty(target_branch)
        .or_else(|| non_empty(head_ref))
        .map(ToOwned::to_owned)
        .or_else(|| {
            let git_ref = non_empty(git_ref)?;
            REF_BRANCH
                .captures(git_ref)
                .map(|caps| caps[1].to_string())
        })
}

/// Run a git command in `root` and return its stdout.
fn git(root: &Utf8Path, args: &[&str]) -> GitResult<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root.as_std_path())
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if stderr.contains("not a git repository") {
            return Err(GitError::NotARepo);
        }

        Err(GitError::Command {
            command: args.first().unwrap_or(&"").to_string(),
            stderr,
        })
    }
}
