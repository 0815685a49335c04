//! Project manifests that carry the version.
//!
//! Each [`ManifestKind`] knows how to find the current version in a file's
//! content and how to render the content with a new version. Persisting the
//! rendered content is the orchestrator's job.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from manifest handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// The configured manifest type is not supported.
    #[error("manifest type not recognized: {0:?} (expected csproj or assembly)")]
    UnrecognizedManifestType(String),

    /// The manifest has no version element.
    #[error("could not find a version in the {0} manifest")]
    VersionNotFound(ManifestKind),
}

/// Result alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// A supported manifest format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    /// An MSBuild project file with a `<Version>` element.
    Csproj,
    /// An `AssemblyInfo` source file with `[assembly: AssemblyVersion("...")]`.
    Assembly,
}

static CSPROJ_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<open><Version>)(?P<value>[^<]*)(?P<close></Version>)")
        .expect("csproj pattern is valid")
});

static ASSEMBLY_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<open>\[assembly:\s*AssemblyVersion\s*\(\s*")(?P<value>[^"]*)(?P<close>"\s*\)\s*\])"#)
        .expect("assembly pattern is valid")
});

static ASSEMBLY_ANY_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<open>\[assembly:\s*Assembly(?:File)?Version\s*\(\s*")(?P<value>[^"]*)(?P<close>"\s*\)\s*\])"#,
    )
    .expect("assembly pattern is valid")
});

impl ManifestKind {
    /// All supported kinds.
    pub const ALL: &[Self] = &[Self::Csproj, Self::Assembly];

    /// The name used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csproj => "csproj",
            Self::Assembly => "assembly",
        }
    }

    /// Extract the current version string from manifest content.
    #[instrument(skip(content))]
    pub fn read_current_version(self, content: &str) -> ManifestResult<String> {
        let pattern = match self {
            Self::Csproj => &*CSPROJ_VERSION,
            Self::Assembly => &*ASSEMBLY_VERSION,
        };
        let version = pattern
            .captures(content)
            .map(|caps| caps["value"].trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ManifestError::VersionNotFound(self))?;
        debug!(%version, "read current version");
        Ok(version)
    }

    /// Render the manifest content with every version element set to
    /// `new_version`.
    ///
    /// For assembly files both `AssemblyVersion` and `AssemblyFileVersion`
    /// are rewritten.
    pub fn render_new_content(self, new_version: &str, content: &str) -> String {
        let pattern = match self {
            Self::Csproj => &*CSPROJ_VERSION,
            Self::Assembly => &*ASSEMBLY_ANY_VERSION,
        };
        pattern
            .replace_all(content, |caps: &Captures<'_>| {
                format!("{}{new_version}{}", &caps["open"], &caps["close"])
            })
            .into_owned()
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = ManifestError;

    fn from_str(s: &str) -> ManifestResult<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ManifestError::UnrecognizedManifestType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Version>1.4.9</Version>
  </PropertyGroup>
</Project>
"#;

    const ASSEMBLY_INFO: &str = r#"using System.Reflection;

[assembly: AssemblyTitle("Demo")]
[assembly: AssemblyVersion("2.0.1-rc.0")]
[assembly: AssemblyFileVersion("2.0.1-rc.0")]
"#;

    #[test]
    fn parse_kind() {
        assert_eq!("csproj".parse::<ManifestKind>().unwrap(), ManifestKind::Csproj);
        assert_eq!("Assembly".parse::<ManifestKind>().unwrap(), ManifestKind::Assembly);
    }

    #[test]
    fn parse_unknown_kind() {
        assert_eq!(
            "gradle".parse::<ManifestKind>(),
            Err(ManifestError::UnrecognizedManifestType("gradle".into()))
        );
    }

    #[test]
    fn read_csproj_version() {
        assert_eq!(
            ManifestKind::Csproj.read_current_version(CSPROJ).unwrap(),
            "1.4.9"
        );
    }

    #[test]
    fn read_assembly_version() {
        assert_eq!(
            ManifestKind::Assembly
                .read_current_version(ASSEMBLY_INFO)
                .unwrap(),
            "2.0.1-rc.0"
        );
    }

    #[test]
    fn read_missing_version() {
        assert_eq!(
            ManifestKind::Csproj.read_current_version("<Project />"),
            Err(ManifestError::VersionNotFound(ManifestKind::Csproj))
        );
        assert_eq!(
            ManifestKind::Csproj.read_current_version("<Version></Version>"),
            Err(ManifestError::VersionNotFound(ManifestKind::Csproj))
        );
    }

    #[test]
    fn render_csproj_replaces_only_the_version() {
        let rendered = ManifestKind::Csproj.render_new_content("1.5.0", CSPROJ);
        assert_eq!(rendered, CSPROJ.replace("1.4.9", "1.5.0"));
    }

    #[test]
    fn render_assembly_updates_file_version_too() {
        let rendered = ManifestKind::Assembly.render_new_content("2.0.1-rc.1", ASSEMBLY_INFO);
        assert!(rendered.contains(r#"[assembly: AssemblyVersion("2.0.1-rc.1")]"#));
        assert!(rendered.contains(r#"[assembly: AssemblyFileVersion("2.0.1-rc.1")]"#));
        assert!(rendered.contains(r#"[assembly: AssemblyTitle("Demo")]"#));
    }

    #[test]
    fn render_does_not_expand_dollar_signs() {
        let rendered = ManifestKind::Csproj.render_new_content("$1", "<Version>1.0.0</Version>");
        assert_eq!(rendered, "<Version>$1</Version>");
    }
}
