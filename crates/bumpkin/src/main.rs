//! bumpkin CLI
#![deny(unsafe_code)]

use anyhow::Context;
use bumpkin::outputs::ActionsEnv;
use bumpkin::{Cli, Commands, commands};
use bumpkin_core::bump::RunContext;
use bumpkin_core::config::{ConfigLoader, SettingsOverrides};
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    let actions = ActionsEnv::from_lookup(|name| std::env::var(name).ok());
    let result = run(cli, &actions);
    if let Err(ref err) = result {
        actions.annotate_error(&format!("{err:#}"));
    }
    result
}

fn run(cli: Cli, actions: &ActionsEnv) -> anyhow::Result<()> {
    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;

    let inputs = SettingsOverrides::from_action_inputs(|name| std::env::var(name).ok())
        .context("invalid action input")?;

    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        let config_path = Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let config = loader
        .with_overrides(inputs.merged_with(cli.command.overrides()))
        .load()
        .context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::new(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
        cli.color.stderr_ansi(),
    );
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging/tracing")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        "CLI initialized"
    );

    let context = RunContext::from_lookup(|name| std::env::var(name).ok(), &cwd);
    debug!(workspace = %context.workspace, "resolved run context");

    let result = match cli.command {
        Commands::Bump(_) => commands::bump::cmd_bump(cli.json, &config, &context, actions),
        Commands::Current(_) => commands::current::cmd_current(cli.json, &config, &context),
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
