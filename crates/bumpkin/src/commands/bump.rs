//! Bump command: thin CLI layer over `bumpkin_core::bump`.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use bumpkin_core::bump::{self, BumpOutcome, BumpStatus, RunContext};
use bumpkin_core::config::{Config, SettingsOverrides};
use bumpkin_core::event::GitHubEventSource;
use bumpkin_core::git::ShellGit;

use crate::outputs::ActionsEnv;

/// Arguments for the `bump` subcommand.
///
/// Every flag overrides the matching configuration value and action input.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    /// Manifest to update, relative to the workspace
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<Utf8PathBuf>,

    /// Manifest format (csproj or assembly)
    #[arg(long = "type", value_name = "KIND")]
    pub manifest_type: Option<String>,

    /// Prefix for tags and versions in commit messages (e.g. "v")
    #[arg(long, value_name = "PREFIX")]
    pub tag_prefix: Option<String>,

    /// Comma-separated keywords that request a major bump
    #[arg(long, value_name = "WORDS")]
    pub major_wording: Option<String>,

    /// Comma-separated keywords that request a minor bump
    #[arg(long, value_name = "WORDS")]
    pub minor_wording: Option<String>,

    /// Comma-separated keywords that request a patch bump
    #[arg(long, value_name = "WORDS")]
    pub patch_wording: Option<String>,

    /// Comma-separated keywords that request a pre-release bump
    #[arg(long, value_name = "WORDS")]
    pub rc_wording: Option<String>,

    /// Bump this part instead of scanning commits
    /// (major, minor, patch, premajor, preminor, prepatch, prerelease)
    #[arg(long, value_name = "PART")]
    pub version_part: Option<String>,

    /// Use this version verbatim
    #[arg(long, value_name = "VERSION")]
    pub version_override: Option<String>,

    /// Pre-release label (e.g. "rc")
    #[arg(long, value_name = "ID")]
    pub pre_release_id: Option<String>,

    /// Branch to push to
    #[arg(long, value_name = "BRANCH")]
    pub target_branch: Option<String>,

    /// Commit message template; {{version}} is replaced with the tag
    #[arg(long, value_name = "TEMPLATE")]
    pub commit_message: Option<String>,

    /// Pattern that recognizes earlier bump commits
    #[arg(long, value_name = "REGEX")]
    pub release_commit_message_regex: Option<String>,

    /// Don't tag the bump commit
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub skip_tag: Option<bool>,

    /// Don't commit the manifest change
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub skip_commit: Option<bool>,

    /// Don't push
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub skip_push: Option<bool>,

    /// Compute and report, but write and push nothing
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub dry_run: Option<bool>,
}

impl BumpArgs {
    /// The settings these flags override.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            tag_prefix: self.tag_prefix.clone(),
            major_wording: self.major_wording.clone(),
            minor_wording: self.minor_wording.clone(),
            patch_wording: self.patch_wording.clone(),
            rc_wording: self.rc_wording.clone(),
            version_part: self.version_part.clone(),
            version_override: self.version_override.clone(),
            pre_release_id: self.pre_release_id.clone(),
            skip_tag: self.skip_tag,
            skip_commit: self.skip_commit,
            skip_push: self.skip_push,
            target_branch: self.target_branch.clone(),
            commit_message: self.commit_message.clone(),
            release_commit_message_regex: self.release_commit_message_regex.clone(),
            manifest_path: self.file.clone(),
            manifest_type: self.manifest_type.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Execute the bump command.
#[instrument(name = "cmd_bump", skip_all, fields(json_output))]
pub fn cmd_bump(
    global_json: bool,
    config: &Config,
    context: &RunContext,
    actions: &ActionsEnv,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing bump command");

    let source = GitHubEventSource::new(context.event_path.clone(), context.token.clone());
    let git = ShellGit::new(context.workspace.clone());
    let outcome =
        bump::run_bump(&config.bump, context, &source, &git).context("failed to bump version")?;

    actions
        .write_outputs(&outcome)
        .context("failed to write step outputs")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn print_outcome(outcome: &BumpOutcome) {
    match outcome.status {
        BumpStatus::Bumped => {
            let new_version = outcome.new_version.as_deref().unwrap_or_default();
            println!(
                "{} {}: {} → {}",
                "✓".green(),
                outcome.status.message().bold(),
                outcome.old_version.dimmed(),
                new_version.green().bold()
            );
            println!("  {} {}", "→".dimmed(), outcome.manifest_path.cyan());
            if let Some(ref tag) = outcome.tag {
                println!("  {} {}", "tag".dimmed(), tag);
            }
            if outcome.dry_run {
                println!("{}", "Dry run, no changes written.".yellow());
            }
        }
        BumpStatus::NoBump => {
            let reason = outcome
                .reason
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            println!(
                "{}{}: version stays {}",
                outcome.status.message().bold(),
                reason.dimmed(),
                outcome.old_version
            );
        }
        BumpStatus::NoRelevantCommits => {
            println!("{}", outcome.status.message().yellow());
        }
    }
}
