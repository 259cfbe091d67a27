// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `confscope show` command.

use clap::Args;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use crate::OutputFormat;

/// Display a configuration resolved for an environment
#[derive(Debug, Args)]
pub struct CmdShow {
    /// Name of the configuration
    name: String,

    /// Environment to resolve in, e.g. dev.eu (defaults to the settings)
    #[clap(short = 'e', long = "env")]
    environment: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t)]
    format: OutputFormat,

    #[clap(flatten)]
    sources: crate::SourceFlags,
}

impl CmdShow {
    pub async fn run(&mut self) -> Result<i32> {
        let loader = self.sources.loader()?;
        let env = self
            .environment
            .as_deref()
            .map(|e| e.parse::<confscope::Environment>().unwrap_or_default());

        let config = loader.configuration(&self.name, env.as_ref())?;
        print_configuration(&config, self.format)?;
        Ok(0)
    }
}

/// Print a resolved configuration in the requested format.
pub fn print_configuration(config: &confscope::Configuration, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(config).into_diagnostic()?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config).into_diagnostic()?);
        }
        OutputFormat::Table => {
            println!(
                "{} {}",
                config.name().bold(),
                format!("[{}]", config.environment()).yellow()
            );
            println!();

            if config.is_empty() {
                println!("  {}", "(no attributes)".dimmed());
            } else {
                let width = config.attribute_names().map(str::len).max().unwrap_or(0);
                for (name, value) in config.attributes() {
                    println!("  {} = {}", format!("{name:width$}").cyan(), value.green());
                }
            }

            if !config.includes().is_empty() {
                println!();
                println!("{}", "Includes:".bold());
                for include in config.includes() {
                    println!("  - {}", include.name.blue());
                }
            }

            println!();
            println!("Total: {} attribute(s)", config.len());
        }
    }
    Ok(())
}
