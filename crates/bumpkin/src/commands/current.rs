//! Current command: report the manifest's version without deciding anything.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use bumpkin_core::bump::{self, RunContext};
use bumpkin_core::config::{Config, SettingsOverrides};

/// Arguments for the `current` subcommand.
#[derive(Args, Debug, Default)]
pub struct CurrentArgs {
    /// Manifest to read, relative to the workspace
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<Utf8PathBuf>,

    /// Manifest format (csproj or assembly)
    #[arg(long = "type", value_name = "KIND")]
    pub manifest_type: Option<String>,
}

impl CurrentArgs {
    /// The settings these flags override.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            manifest_path: self.file.clone(),
            manifest_type: self.manifest_type.clone(),
            ..SettingsOverrides::default()
        }
    }
}

/// Execute the current command.
#[instrument(name = "cmd_current", skip_all)]
pub fn cmd_current(global_json: bool, config: &Config, context: &RunContext) -> anyhow::Result<()> {
    let current =
        bump::current_version(&config.bump, context).context("failed to read current version")?;
    debug!(version = %current.version, "read current version");

    if global_json {
        let json = serde_json::json!({
            "version": current.raw,
            "manifest_path": current.manifest_path,
            "manifest_type": current.kind,
            "pre_release": current.version.pre_release.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!(
            "{} {}",
            current.raw.bold(),
            format!("({})", current.manifest_path).dimmed()
        );
    }

    Ok(())
}
