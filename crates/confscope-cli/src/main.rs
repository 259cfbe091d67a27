// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! confscope - Environment-scoped configuration CLI

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::Result;

mod cmd_dump;
mod cmd_env;
mod cmd_show;
mod cmd_sources;
mod cmd_watch;

use cmd_dump::CmdDump;
use cmd_env::CmdEnv;
use cmd_show::CmdShow;
use cmd_sources::CmdSources;
use cmd_watch::CmdWatch;

#[derive(Parser)]
#[clap(
    name = "confscope",
    about = "Environment-scoped configuration repository",
    version,
    long_about = "Resolve configuration attributes with fallback from specific to general environments"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// Where configuration sources and settings come from.
#[derive(Parser, Clone, Debug, Default)]
pub struct SourceFlags {
    /// Directory containing <name>.json / <name>.yaml sources
    #[clap(short = 'd', long = "dir", env = "CONFSCOPE_DIR")]
    pub dir: Option<PathBuf>,

    /// Settings file (defaults to ./confscope.yaml when present)
    #[clap(short = 'c', long = "config", env = "CONFSCOPE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl SourceFlags {
    /// Settings from the settings file and environment, with flags on top.
    pub fn settings(&self) -> Result<confscope::Settings> {
        let default_file = PathBuf::from(confscope::SETTINGS_FILENAME);
        let file = match &self.config {
            Some(path) => Some(path.clone()),
            None => default_file.is_file().then_some(default_file),
        };
        let mut settings = confscope::Settings::load(file.as_deref())?;
        if let Some(dir) = &self.dir {
            settings.source_dir = dir.clone();
        }
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    pub fn loader(&self) -> Result<confscope::Loader> {
        let settings = self.settings()?;
        let repository = Arc::new(confscope::ConfigurationRepository::new());
        Ok(confscope::Loader::from_settings(repository, &settings)?)
    }
}

/// Output format for resolved configurations.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Display a configuration resolved for an environment
    Show(CmdShow),

    /// Display every value of a configuration grouped by environment
    Dump(CmdDump),

    /// Display the fallback chain of an environment
    Env(CmdEnv),

    /// List available configuration sources
    Sources(CmdSources),

    /// Re-display a configuration whenever its sources change
    Watch(CmdWatch),
}

impl Opt {
    async fn run(self) -> Result<i32> {
        // Setup logging
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        // Dispatch to command
        match self.cmd {
            Command::Show(mut cmd) => cmd.run().await,
            Command::Dump(mut cmd) => cmd.run().await,
            Command::Env(mut cmd) => cmd.run().await,
            Command::Sources(mut cmd) => cmd.run().await,
            Command::Watch(mut cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run().await?;
    std::process::exit(code);
}
