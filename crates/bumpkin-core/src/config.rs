//! Configuration loading and discovery.
//!
//! This module provides configuration file discovery by:
//! 1. Walking up from the current directory to find project config
//! 2. Loading user config from XDG config directory
//! 3. Merging with defaults, then CI action inputs and CLI flags
//!
//! # Supported formats
//!
//! The following configuration file formats are supported:
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - `.bumpkin.<ext>` in current directory or any parent
//! - `bumpkin.<ext>` in current directory or any parent
//! - `~/.config/bumpkin/config.<ext>` (user config)
//!
//! Where `<ext>` is one of: `toml`, `yaml`, `yml`, `json`
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use bumpkin_core::config::{ConfigLoader, SettingsOverrides};
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let inputs = SettingsOverrides::from_action_inputs(|name| std::env::var(name).ok()).unwrap();
//! let config = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .with_overrides(inputs)
//!     .load()
//!     .unwrap();
//! println!("tag prefix: {:?}", config.bump.tag_prefix);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::manifest::{ManifestKind, ManifestResult};
use crate::version::VersionResult;
use crate::version::commits::{BumpCommitFilter, WordingRules};

/// The configuration for bumpkin.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files. No file logging when unset.
    pub log_dir: Option<Utf8PathBuf>,
    /// Run parameters for a bump.
    pub bump: BumpSettings,
}

/// Every parameter of a bump run.
///
/// Wordings are comma-separated keyword lists. `{{version}}` in
/// `commit_message` and `release_commit_message_regex` stands for the tag
/// prefix followed by a version.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BumpSettings {
    /// Prefix for tags and for versions in commit messages (e.g. `v`).
    pub tag_prefix: String,
    /// Keywords that request a major bump.
    pub major_wording: String,
    /// Keywords that request a minor bump.
    pub minor_wording: String,
    /// Keywords that request a patch bump.
    pub patch_wording: String,
    /// Keywords that request a pre-release bump.
    pub rc_wording: String,
    /// Explicit part to bump; commits are not scanned when set.
    pub version_part: Option<String>,
    /// Use this version verbatim.
    pub version_override: Option<String>,
    /// Pre-release label. Recovered from commits when unset.
    pub pre_release_id: Option<String>,
    /// Don't create a tag.
    pub skip_tag: bool,
    /// Don't commit the manifest change.
    pub skip_commit: bool,
    /// Don't push.
    pub skip_push: bool,
    /// Branch to push to instead of the triggering one.
    pub target_branch: Option<String>,
    /// Commit message template.
    pub commit_message: String,
    /// Pattern recognizing earlier bump commits. Falls back to
    /// `commit_message` when unset.
    pub release_commit_message_regex: Option<String>,
    /// Manifest path, relative to the workspace.
    pub manifest_path: Option<Utf8PathBuf>,
    /// Manifest format name (`csproj` or `assembly`).
    pub manifest_type: String,
    /// Compute and log, but don't write or push.
    pub dry_run: bool,
    /// `user.name` for bump commits.
    pub git_user_name: String,
    /// `user.email` for bump commits.
    pub git_user_email: String,
}

impl Default for BumpSettings {
    fn default() -> Self {
        Self {
            tag_prefix: String::new(),
            major_wording: "MAJOR,BREAKING CHANGE".into(),
            minor_wording: "feat,minor".into(),
            patch_wording: "fix,patch".into(),
            rc_wording: "pre-alpha,pre-beta,pre-rc".into(),
            version_part: None,
            version_override: None,
            pre_release_id: None,
            skip_tag: true,
            skip_commit: false,
            skip_push: false,
            target_branch: None,
            commit_message: "ci: version bump to {{version}}".into(),
            release_commit_message_regex: None,
            manifest_path: None,
            manifest_type: ManifestKind::Csproj.as_str().into(),
            dry_run: false,
            git_user_name: "Automated Version Bump".into(),
            git_user_email: "gh-action-bump-version@users.noreply.github.com".into(),
        }
    }
}

impl BumpSettings {
    /// Keyword lists parsed from the four wordings.
    pub fn wording_rules(&self) -> WordingRules {
        WordingRules::from_wording(
            &self.major_wording,
            &self.minor_wording,
            &self.patch_wording,
            &self.rc_wording,
        )
    }

    /// The filter for earlier bump commits.
    ///
    /// An explicit regex wins; otherwise the commit message template is
    /// matched literally.
    pub fn bump_commit_filter(&self) -> VersionResult<BumpCommitFilter> {
        match non_empty(self.release_commit_message_regex.as_deref()) {
            Some(pattern) => BumpCommitFilter::from_pattern(pattern, &self.tag_prefix),
            None => BumpCommitFilter::from_template(&self.commit_message, &self.tag_prefix),
        }
    }

    /// The configured manifest format.
    pub fn manifest_kind(&self) -> ManifestResult<ManifestKind> {
        self.manifest_type.parse()
    }

    /// The tag for `version`.
    pub fn tag_for(&self, version: &str) -> String {
        format!("{}{version}", self.tag_prefix)
    }

    /// The commit message for `version`.
    pub fn commit_message_for(&self, version: &str) -> String {
        self.commit_message.replace(
            crate::version::commits::VERSION_PLACEHOLDER,
            &self.tag_for(version),
        )
    }

    /// The configured version part, if any.
    pub fn version_part(&self) -> Option<&str> {
        non_empty(self.version_part.as_deref())
    }

    /// The configured override, if any.
    pub fn version_override(&self) -> Option<&str> {
        non_empty(self.version_override.as_deref())
    }

    /// The configured pre-release id, if any.
    pub fn pre_release_id(&self) -> Option<&str> {
        non_empty(self.pre_release_id.as_deref())
    }

    /// Whether any git step will run.
    pub const fn performs_git_updates(&self) -> bool {
        !self.dry_run && !(self.skip_tag && self.skip_commit && self.skip_push)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Partial [`BumpSettings`] layered on top of config files.
///
/// Unset fields leave the lower layers alone.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SettingsOverrides {
    /// Overrides [`BumpSettings::tag_prefix`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,
    /// Overrides [`BumpSettings::major_wording`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_wording: Option<String>,
    /// Overrides [`BumpSettings::minor_wording`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_wording: Option<String>,
    /// Overrides [`BumpSettings::patch_wording`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_wording: Option<String>,
    /// Overrides [`BumpSettings::rc_wording`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc_wording: Option<String>,
    /// Overrides [`BumpSettings::version_part`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_part: Option<String>,
    /// Overrides [`BumpSettings::version_override`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_override: Option<String>,
    /// Overrides [`BumpSettings::pre_release_id`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_release_id: Option<String>,
    /// Overrides [`BumpSettings::skip_tag`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_tag: Option<bool>,
    /// Overrides [`BumpSettings::skip_commit`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_commit: Option<bool>,
    /// Overrides [`BumpSettings::skip_push`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_push: Option<bool>,
    /// Overrides [`BumpSettings::target_branch`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
    /// Overrides [`BumpSettings::commit_message`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Overrides [`BumpSettings::release_commit_message_regex`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_commit_message_regex: Option<String>,
    /// Overrides [`BumpSettings::manifest_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<Utf8PathBuf>,
    /// Overrides [`BumpSettings::manifest_type`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_type: Option<String>,
    /// Overrides [`BumpSettings::dry_run`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl SettingsOverrides {
    /// Read GitHub Actions inputs (`INPUT_<NAME>`) through `lookup`.
    ///
    /// Input names follow the action's metadata (`tag-prefix`,
    /// `path-to-file`, ...). Empty values are treated as unset.
    pub fn from_action_inputs(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let input = |name: &str| {
            lookup(&format!("INPUT_{}", name.replace(' ', "_").to_uppercase()))
                .filter(|v| !v.trim().is_empty())
        };
        let flag = |name: &str| input(name).map(|v| parse_action_bool(name, &v)).transpose();

        Ok(Self {
            tag_prefix: input("tag-prefix"),
            major_wording: input("major-wording"),
            minor_wording: input("minor-wording"),
            patch_wording: input("patch-wording"),
            rc_wording: input("release-candidate-wording"),
            version_part: input("version-part"),
            version_override: input("version-override"),
            pre_release_id: input("pre-release-id"),
            skip_tag: flag("skip-tag")?,
            skip_commit: flag("skip-commit")?,
            skip_push: flag("skip-push")?,
            target_branch: input("target-branch"),
            commit_message: input("commit-message"),
            release_commit_message_regex: input("release-commit-message-regex"),
            manifest_path: input("path-to-file").map(Utf8PathBuf::from),
            manifest_type: input("type"),
            dry_run: flag("dry-run")?,
        })
    }

    /// Overlay `other` on top of `self`; set fields in `other` win.
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        Self {
            tag_prefix: other.tag_prefix.or(self.tag_prefix),
            major_wording: other.major_wording.or(self.major_wording),
            minor_wording: other.minor_wording.or(self.minor_wording),
            patch_wording: other.patch_wording.or(self.patch_wording),
            rc_wording: other.rc_wording.or(self.rc_wording),
            version_part: other.version_part.or(self.version_part),
            version_override: other.version_override.or(self.version_override),
            pre_release_id: other.pre_release_id.or(self.pre_release_id),
            skip_tag: other.skip_tag.or(self.skip_tag),
            skip_commit: other.skip_commit.or(self.skip_commit),
            skip_push: other.skip_push.or(self.skip_push),
            target_branch: other.target_branch.or(self.target_branch),
            commit_message: other.commit_message.or(self.commit_message),
            release_commit_message_regex: other
                .release_commit_message_regex
                .or(self.release_commit_message_regex),
            manifest_path: other.manifest_path.or(self.manifest_path),
            manifest_type: other.manifest_type.or(self.manifest_type),
            dry_run: other.dry_run.or(self.dry_run),
        }
    }
}

/// Booleans as the Actions toolkit accepts them.
fn parse_action_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(ConfigError::InvalidInput {
            name: name.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "bumpkin";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load (for testing or programmatic use).
    explicit_files: Vec<Utf8PathBuf>,
    /// Setting overrides applied after every file, in order.
    overrides: Vec<SettingsOverrides>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    ///
    /// The loader will walk up from this directory looking for config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/bumpkin/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Disable boundary marker (search all the way to filesystem root).
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Layer setting overrides above all files. Later calls win.
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides.push(overrides);
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. Overrides (in order added via `with_overrides`)
    /// 2. Explicit files (in order added via `with_file`)
    /// 3. Project config (closest to search root)
    /// 4. User config (`~/.config/bumpkin/config.<ext>`)
    /// 5. Default values
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            tracing::debug!(path = %user_config, "merging user config");
            figment = Self::merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            tracing::debug!(path = %project_config, "merging project config");
            figment = Self::merge_file(figment, &project_config);
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }

        for overrides in self.overrides {
            figment = figment.merge(Serialized::default("bump", overrides));
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            manifest_type = %config.bump.manifest_type,
            dry_run = config.bump.dry_run,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration, returning an error if no config file is found.
    pub fn load_or_error(self) -> ConfigResult<Config> {
        let has_user = self.include_user_config && self.find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_ref()
            .and_then(|root| self.find_project_config(root))
            .is_some();
        let has_explicit = !self.explicit_files.is_empty();

        if !has_user && !has_project && !has_explicit {
            return Err(ConfigError::NotFound);
        }

        self.load()
    }

    /// Find project config by walking up from the given directory.
    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    return Some(dotfile);
                }

                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    return Some(regular);
                }
            }

            // The directory holding the marker is the last one searched.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        None
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}

/// Get the user config directory path.
///
/// Returns `~/.config/bumpkin/` on Linux, `~/Library/Application Support/bumpkin/`
/// on macOS, and equivalent on other platforms.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}
