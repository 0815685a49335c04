//! Commit retrieval from CI event payloads.
//!
//! Push events list their commits inline. Pull request events only carry a
//! `commits_url`, which is fetched through `gh api` so the caller's token and
//! GitHub host settings apply.

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::version::commits::{CommitMessage, CommitOrigin};

/// Errors from commit retrieval.
#[derive(Error, Debug)]
pub enum EventError {
    /// The event payload could not be read.
    #[error("failed to read event payload {path}: {source}")]
    Read {
        /// Payload path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The event payload or API response is not the expected JSON.
    #[error("invalid JSON in {what}: {source}")]
    Json {
        /// What was being parsed.
        what: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// `gh api` failed.
    #[error("gh api {endpoint} failed: {message}")]
    Api {
        /// The requested endpoint.
        endpoint: String,
        /// Error details.
        message: String,
    },
}

/// Result alias for event operations.
pub type EventResult<T> = Result<T, EventError>;

/// Anything that can deliver the commit messages for a run, newest first.
pub trait CommitSource {
    /// Fetch the commit messages. An empty list is a valid answer.
    fn fetch_commit_messages(&self) -> EventResult<Vec<CommitMessage>>;
}

/// The parts of a GitHub event payload this crate reads.
#[derive(Debug, Default, Deserialize)]
pub struct EventPayload {
    /// Commits of a push event, oldest first.
    #[serde(default)]
    pub commits: Vec<PushCommit>,
    /// Present on pull request events.
    pub pull_request: Option<PullRequest>,
}

/// A commit entry in a push payload.
#[derive(Debug, Deserialize)]
pub struct PushCommit {
    /// Full commit message.
    pub message: String,
}

/// The pull request object of a pull request payload.
#[derive(Debug, Deserialize)]
pub struct PullRequest {
    /// API URL listing the pull request's commits.
    pub commits_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    message: String,
}

impl EventPayload {
    /// Parse a payload from JSON text.
    pub fn from_json(json: &str) -> EventResult<Self> {
        serde_json::from_str(json).map_err(|source| EventError::Json {
            what: "event payload".into(),
            source,
        })
    }

    /// Push commit messages, newest first.
    pub fn push_messages(&self) -> Vec<CommitMessage> {
        self.commits
            .iter()
            .rev()
            .map(|c| CommitMessage::new(c.message.clone(), CommitOrigin::Push))
            .collect()
    }
}

/// Parse a pull request commit listing (`GET /pulls/{n}/commits`), newest first.
///
/// `gh api --paginate` prints one JSON array per page back to back; every
/// page is read, oldest page first.
pub fn parse_pull_request_commits(json: &str) -> EventResult<Vec<CommitMessage>> {
    let mut commits = Vec::new();
    for page in serde_json::Deserializer::from_str(json).into_iter::<Vec<ApiCommit>>() {
        let page = page.map_err(|source| EventError::Json {
            what: "pull request commits".into(),
            source,
        })?;
        commits.extend(page);
    }
    Ok(commits
        .into_iter()
        .rev()
        .map(|c| CommitMessage::new(c.commit.message, CommitOrigin::PullRequest))
        .collect())
}

/// Commit source backed by the GitHub Actions event payload.
#[derive(Debug, Clone, Default)]
pub struct GitHubEventSource {
    event_path: Option<Utf8PathBuf>,
    token: Option<String>,
}

impl GitHubEventSource {
    /// Create a source for the given payload path and API token.
    pub const fn new(event_path: Option<Utf8PathBuf>, token: Option<String>) -> Self {
        Self { event_path, token }
    }

    fn load_payload(path: &Utf8Path) -> EventResult<EventPayload> {
        let json = std::fs::read_to_string(path).map_err(|source| EventError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        EventPayload::from_json(&json)
    }

    fn fetch_pull_request_commits(&self, commits_url: &str) -> EventResult<Vec<CommitMessage>> {
        let endpoint = api_endpoint(commits_url);
        debug!(%endpoint, "fetching pull request commits");

        let mut cmd = Command::new("gh");
        cmd.args([
            "api",
            "--method",
            "GET",
            "--paginate",
            "-F",
            "per_page=100",
            endpoint.as_str(),
        ]);
        if let Some(ref token) = self.token {
            cmd.env("GH_TOKEN", token);
        }

        let output = cmd.output().map_err(|e| EventError::Api {
            endpoint: endpoint.clone(),
            message: format!("failed to execute gh: {e}"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(EventError::Api {
                endpoint,
                message: stderr,
            });
        }

        parse_pull_request_commits(&String::from_utf8_lossy(&output.stdout))
    }
}

impl CommitSource for GitHubEventSource {
    #[instrument(skip(self), fields(event_path = ?self.event_path))]
    fn fetch_commit_messages(&self) -> EventResult<Vec<CommitMessage>> {
        let Some(ref path) = self.event_path else {
            debug!("no event payload, no commits");
            return Ok(Vec::new());
        };

        let payload = Self::load_payload(path)?;
        let messages = match payload.pull_request {
            Some(ref pr) => self.fetch_pull_request_commits(&pr.commits_url)?,
            None => payload.push_messages(),
        };

        info!(count = messages.len(), "found commit messages");
        for commit in &messages {
            debug!(text = %commit.message, origin = ?commit.origin, "commit");
        }
        Ok(messages)
    }
}

/// Strip the public API host so `gh` resolves the path against its own host.
fn api_endpoint(url: &str) -> String {
    url.strip_prefix("https://api.github.com/")
        .unwrap_or(url)
        .to_string()
}
