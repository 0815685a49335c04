//! GitHub Actions plumbing: step outputs and error annotations.
//!
//! Step outputs are appended to the file named by `GITHUB_OUTPUT`. Workflow
//! commands such as `::error::` are read by the runner from stdout.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use bumpkin_core::bump::BumpOutcome;
use tracing::debug;

const MULTILINE_DELIMITER: &str = "BUMPKIN_EOF";

/// The Actions variables the CLI itself reads.
#[derive(Debug, Clone, Default)]
pub struct ActionsEnv {
    /// Step output file.
    pub output_file: Option<PathBuf>,
    /// Whether we run inside GitHub Actions.
    pub in_actions: bool,
}

impl ActionsEnv {
    /// Read `GITHUB_OUTPUT` and `GITHUB_ACTIONS` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            output_file: lookup("GITHUB_OUTPUT")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            in_actions: lookup("GITHUB_ACTIONS").is_some_and(|v| v == "true"),
        }
    }

    /// Append `oldVersion`, `newVersion` (when bumped) and `wasBumped`.
    pub fn write_outputs(&self, outcome: &BumpOutcome) -> io::Result<()> {
        let Some(ref path) = self.output_file else {
            return Ok(());
        };
        debug!(path = %path.display(), "writing step outputs");
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(render_outputs(outcome).as_bytes())
    }

    /// Print an `::error::` annotation when running under Actions.
    pub fn annotate_error(&self, message: &str) {
        if self.in_actions {
            println!("::error::{}", escape_data(message));
        }
    }
}

fn render_outputs(outcome: &BumpOutcome) -> String {
    let mut rendered = output_line("oldVersion", &outcome.old_version);
    if let Some(ref new_version) = outcome.new_version {
        rendered.push_str(&output_line("newVersion", new_version));
    }
    rendered.push_str(&output_line("wasBumped", &outcome.was_bumped.to_string()));
    rendered
}

fn output_line(name: &str, value: &str) -> String {
    if value.contains('\n') {
        format!("{name}<<{MULTILINE_DELIMITER}\n{value}\n{MULTILINE_DELIMITER}\n")
    } else {
        format!("{name}={value}\n")
    }
}

/// Escape message data for a workflow command.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
