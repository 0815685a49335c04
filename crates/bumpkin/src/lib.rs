//! Library interface for the `bumpkin` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for testing. The actual entry point is in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations
//! - [`outputs`] - GitHub Actions step outputs and annotations

pub mod commands;

pub mod outputs;

use bumpkin_core::config::SettingsOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }

    /// Whether log lines on stderr should carry ANSI colors.
    pub fn stderr_ansi(self) -> bool {
        use std::io::IsTerminal;
        match self {
            Self::Auto => std::io::stderr().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG              Log filter (e.g., debug, bumpkin_core=trace)
    BUMPKIN_LOG_PATH      Explicit JSONL log file path
    BUMPKIN_LOG_DIR       JSONL log directory
    INPUT_<NAME>          GitHub Actions inputs (e.g., INPUT_TAG-PREFIX)
    GITHUB_WORKSPACE      Directory manifest paths are relative to
    GITHUB_EVENT_PATH     Event payload to read commit messages from
    GITHUB_TOKEN          Token for fetching pull request commits
    GITHUB_REF            Triggering ref, used to pick the push branch
    GITHUB_HEAD_REF       Pull request branch, preferred over GITHUB_REF
    GITHUB_OUTPUT         File that receives oldVersion, newVersion, wasBumped
";

/// Command-line interface definition for bumpkin.
#[derive(Parser)]
#[command(name = "bumpkin")]
#[command(about = "Commit-driven semantic version bumps for CI pipelines", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Decide the next version from commits and persist it
    Bump(commands::bump::BumpArgs),

    /// Print the manifest's current version
    Current(commands::current::CurrentArgs),
}

impl Commands {
    /// Settings the command's flags override.
    pub fn overrides(&self) -> SettingsOverrides {
        match self {
            Self::Bump(args) => args.overrides(),
            Self::Current(args) => args.overrides(),
        }
    }
}
