// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `confscope watch` command.

use clap::Args;
use colored::Colorize;
use miette::Result;
use tokio::time::sleep;

use crate::OutputFormat;
use crate::cmd_show::print_configuration;

/// Re-display a configuration whenever its sources change
#[derive(Debug, Args)]
pub struct CmdWatch {
    /// Name of the configuration
    name: String,

    /// Environment to resolve in, e.g. dev.eu (defaults to the settings)
    #[clap(short = 'e', long = "env")]
    environment: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Stop after this many reloads
    #[clap(long)]
    max_reloads: Option<usize>,

    #[clap(flatten)]
    sources: crate::SourceFlags,
}

impl CmdWatch {
    pub async fn run(&mut self) -> Result<i32> {
        let settings = self.sources.settings()?;
        let loader = self.sources.loader()?;
        let env = self
            .environment
            .as_deref()
            .map(|e| e.parse::<confscope::Environment>().unwrap_or_default());

        let config = loader.configuration(&self.name, env.as_ref())?;
        print_configuration(&config, self.format)?;

        let interval = settings.poll_interval();
        let mut reloads = 0;
        loop {
            sleep(interval).await;
            let changed = loader.poll();
            if changed.is_empty() {
                continue;
            }

            let names: Vec<&str> = changed.iter().map(|k| k.name.as_str()).collect();
            println!();
            println!("{} {}", "Changed:".bold(), names.join(", ").yellow());

            // A source may be mid-write; report and keep watching.
            match loader.configuration(&self.name, env.as_ref()) {
                Ok(config) => print_configuration(&config, self.format)?,
                Err(err) => tracing::warn!("failed to reload {}: {err}", self.name),
            }

            reloads += 1;
            if self.max_reloads.is_some_and(|max| reloads >= max) {
                return Ok(0);
            }
        }
    }
}
