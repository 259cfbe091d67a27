// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `confscope dump` command.

use std::collections::BTreeMap;

use clap::Args;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use crate::OutputFormat;

/// Display every value of a configuration grouped by environment
#[derive(Debug, Args)]
pub struct CmdDump {
    /// Name of the configuration
    name: String,

    /// Output format
    #[clap(long, value_enum, default_value_t)]
    format: OutputFormat,

    #[clap(flatten)]
    sources: crate::SourceFlags,
}

impl CmdDump {
    pub async fn run(&mut self) -> Result<i32> {
        let loader = self.sources.loader()?;
        let artefact = loader.artefact(&self.name)?;

        // Canonical form keys sort the global environment first.
        let content: BTreeMap<String, BTreeMap<String, String>> = artefact
            .content()
            .into_iter()
            .map(|(env, values)| (env.canonical_form(), values.into_iter().collect()))
            .collect();

        match self.format {
            OutputFormat::Yaml => {
                print!("{}", serde_yaml::to_string(&content).into_diagnostic()?);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&content).into_diagnostic()?);
            }
            OutputFormat::Table => {
                println!("{}", artefact.name().bold());
                for (env, values) in &content {
                    let label = if env.is_empty() { "(global)" } else { env.as_str() };
                    println!();
                    println!("  {}", label.yellow());
                    for (name, value) in values {
                        println!("    {} = {}", name.cyan(), value.green());
                    }
                }

                let includes = artefact.includes();
                if !includes.is_empty() {
                    println!();
                    println!("{}", "Includes:".bold());
                    for include in &includes {
                        println!("  - {}", include.to_string().blue());
                    }
                }

                println!();
                println!(
                    "Total: {} attribute(s) in {} environment(s)",
                    artefact.attribute_count(),
                    content.len()
                );
            }
        }
        Ok(0)
    }
}
