//! Core library for bumpkin.
//!
//! This crate decides the next semantic version of a project from its
//! recent commit messages (or an explicit request) and persists it to the
//! project manifest and git. The `bumpkin` CLI is a thin layer on top.
//!
//! # Modules
//!
//! - [`bump`] - Run orchestration and outcomes
//! - [`config`] - Configuration loading and management
//! - [`error`] - Configuration error types
//! - [`event`] - Commit retrieval from CI event payloads
//! - [`git`] - Git commit, tag and push
//! - [`manifest`] - Reading and rewriting manifest versions
//! - [`version`] - Version model, commit classification and the bump decision
//!
//! # Quick Start
//!
//! ```no_run
//! use bumpkin_core::bump::{RunContext, run_bump};
//! use bumpkin_core::event::GitHubEventSource;
//! use bumpkin_core::git::ShellGit;
//! use bumpkin_core::ConfigLoader;
//! use camino::Utf8Path;
//!
//! let config = ConfigLoader::new()
//!     .with_user_config(true)
//!     .load()
//!     .expect("Failed to load configuration");
//!
//! let context = RunContext::from_lookup(|name| std::env::var(name).ok(), Utf8Path::new("/repo"));
//! let source = GitHubEventSource::new(context.event_path.clone(), context.token.clone());
//! let git = ShellGit::new(context.workspace.clone());
//! let outcome = run_bump(&config.bump, &context, &source, &git).expect("bump failed");
//! println!("{}", outcome.status.message());
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod error;

pub mod event;

pub mod git;

pub mod manifest;

pub mod version;

pub use bump::{BumpError, BumpOutcome, BumpResult, BumpStatus, RunContext, run_bump};

pub use config::{BumpSettings, Config, ConfigLoader, LogLevel, SettingsOverrides};

pub use error::{ConfigError, ConfigResult};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
