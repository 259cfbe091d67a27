// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `confscope sources` command.

use clap::Args;
use colored::Colorize;
use miette::Result;

/// List available configuration sources
#[derive(Debug, Args)]
pub struct CmdSources {
    #[clap(flatten)]
    sources: crate::SourceFlags,
}

impl CmdSources {
    pub async fn run(&mut self) -> Result<i32> {
        let loader = self.sources.loader()?;
        let source = loader.source();
        let keys = source.list()?;

        println!(
            "{} {}",
            "Sources in".bold(),
            source.root().display().to_string().cyan()
        );
        println!();

        if keys.is_empty() {
            println!("  {}", "(no configuration sources)".dimmed());
        }
        for key in &keys {
            let modified = source
                .fingerprint(key)
                .map(|fp| fp.modified_iso8601())
                .unwrap_or_else(|_| "-".to_string());
            println!(
                "  {} {} {}",
                key.name.green(),
                format!("[{:?}]", key.format).to_lowercase().blue(),
                modified.dimmed()
            );
        }

        println!();
        println!("Total: {} source(s)", keys.len());
        Ok(0)
    }
}
