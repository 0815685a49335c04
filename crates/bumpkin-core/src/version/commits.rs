//! Commit classification.
//!
//! Turns the commit messages of a push or pull request into a
//! [`BumpSignal`]. Messages that are themselves version-bump commits are
//! filtered out first so a run never re-triggers on its own previous bump.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::version::{BumpSignal, VersionError, VersionResult};

/// Placeholder for the version inside commit message templates and patterns.
pub const VERSION_PLACEHOLDER: &str = "{{version}}";

/// Where a commit message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitOrigin {
    /// Listed in a push event payload.
    Push,
    /// Fetched from a pull request's commit list.
    PullRequest,
}

/// A raw commit message plus its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMessage {
    /// The full message text.
    pub message: String,
    /// Which event delivered it.
    pub origin: CommitOrigin,
}

impl CommitMessage {
    /// Create a commit message.
    pub fn new(message: impl Into<String>, origin: CommitOrigin) -> Self {
        Self {
            message: message.into(),
            origin,
        }
    }
}

/// Keyword lists that map commit text to bump flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordingRules {
    /// Keywords that trigger a major bump.
    pub major: Vec<String>,
    /// Keywords that trigger a minor bump.
    pub minor: Vec<String>,
    /// Keywords that trigger a patch bump.
    pub patch: Vec<String>,
    /// Keywords that trigger a pre-release bump.
    pub pre_release: Vec<String>,
}

impl WordingRules {
    /// Build rules from comma-separated wording strings.
    pub fn from_wording(major: &str, minor: &str, patch: &str, pre_release: &str) -> Self {
        Self {
            major: split_wording(major),
            minor: split_wording(minor),
            patch: split_wording(patch),
            pre_release: split_wording(pre_release),
        }
    }
}

/// Split a comma-separated wording list, dropping blank entries.
pub fn split_wording(wording: &str) -> Vec<String> {
    wording
        .split(',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Recognizes commit messages produced by a previous version bump.
#[derive(Debug, Clone)]
pub struct BumpCommitFilter {
    regex: Option<Regex>,
}

impl BumpCommitFilter {
    /// Build a filter from a regular expression.
    ///
    /// `{{version}}` in the pattern expands to the tag prefix followed by a
    /// version. Matching is case-insensitive and unanchored. An empty pattern
    /// matches nothing.
    pub fn from_pattern(pattern: &str, tag_prefix: &str) -> VersionResult<Self> {
        if pattern.trim().is_empty() {
            return Ok(Self { regex: None });
        }
        let expanded = pattern.replace(VERSION_PLACEHOLDER, &version_wildcard(tag_prefix));
        Self::compile(expanded)
    }

    /// Build a filter from a commit message template.
    ///
    /// Everything but `{{version}}` is matched literally.
    pub fn from_template(template: &str, tag_prefix: &str) -> VersionResult<Self> {
        if template.trim().is_empty() {
            return Ok(Self { regex: None });
        }
        let wildcard = version_wildcard(tag_prefix);
        let expanded = template
            .split(VERSION_PLACEHOLDER)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(wildcard.as_str());
        Self::compile(expanded)
    }

    fn compile(pattern: String) -> VersionResult<Self> {
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| VersionError::InvalidBumpPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        debug!(%pattern, "compiled bump commit filter");
        Ok(Self { regex: Some(regex) })
    }

    /// True if the message looks like a version-bump commit.
    pub fn is_bump_commit(&self, message: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(message))
    }
}

fn version_wildcard(tag_prefix: &str) -> String {
    format!(
        r"{}[0-9]+\.[0-9]+\.[0-9]+(?:-[0-9A-Za-z_.]+)?",
        regex::escape(tag_prefix)
    )
}

/// Drop every message that is itself a version-bump commit.
#[instrument(skip_all, fields(total = messages.len()))]
pub fn relevant_commits(messages: &[CommitMessage], filter: &BumpCommitFilter) -> Vec<CommitMessage> {
    let relevant: Vec<CommitMessage> = messages
        .iter()
        .filter(|commit| !filter.is_bump_commit(&commit.message))
        .cloned()
        .collect();
    debug!(relevant = relevant.len(), "filtered bump commits");
    relevant
}

/// Scan messages for wording keywords.
///
/// Each flag is set when any message contains any of its keywords. Flags
/// accumulate across messages, and one message may set several.
#[instrument(skip_all, fields(messages = messages.len()))]
pub fn classify(messages: &[CommitMessage], rules: &WordingRules) -> BumpSignal {
    let mentions = |keywords: &[String]| {
        messages.iter().any(|commit| {
            keywords
                .iter()
                .any(|keyword| commit.message.contains(keyword.as_str()))
        })
    };

    let signal = BumpSignal {
        major: mentions(&rules.major),
        minor: mentions(&rules.minor),
        patch: mentions(&rules.patch),
        pre_release: mentions(&rules.pre_release),
    };
    debug!(%signal, "classified commits");
    signal
}

/// Recover a pre-release id from the newest message carrying a keyword.
///
/// A keyword with a tail after its last `-` names the id itself, so
/// `pre-rc` gives `rc` whatever follows it. Otherwise the token attached to
/// the keyword by `-` or `.` is used (`pre-beta` with keyword `pre` gives
/// `beta`).
pub fn find_pre_release_id(keywords: &[String], messages: &[CommitMessage]) -> Option<String> {
    messages.iter().find_map(|commit| {
        keywords.iter().find_map(|keyword| {
            let start = commit.message.find(keyword.as_str())? + keyword.len();
            keyword_tail(keyword).or_else(|| token_after(&commit.message[start..]))
        })
    })
}

fn token_after(rest: &str) -> Option<String> {
    let attached = rest.strip_prefix(['-', '.'])?;
    let token: String = attached
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    (!token.is_empty()).then_some(token)
}

fn keyword_tail(keyword: &str) -> Option<String> {
    let (_, tail) = keyword.rsplit_once('-')?;
    (!tail.is_empty() && tail.chars().all(|c| c.is_ascii_alphanumeric())).then(|| tail.to_string())
}
