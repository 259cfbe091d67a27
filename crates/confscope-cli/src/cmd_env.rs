// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `confscope env` command.

use clap::Args;
use colored::Colorize;
use miette::Result;

/// Display the fallback chain of an environment
#[derive(Debug, Args)]
pub struct CmdEnv {
    /// Dotted scope path, e.g. dev.eu
    #[clap(default_value = "")]
    environment: String,

    /// Interpret the argument as a locale such as de_DE
    #[clap(long)]
    locale: bool,
}

impl CmdEnv {
    pub async fn run(&mut self) -> Result<i32> {
        let env: confscope::Environment = if self.locale {
            confscope::LocaleEnvironment::parse(&self.environment)
                .ok_or_else(|| miette::miette!("Invalid locale: '{}'", self.environment))?
                .into()
        } else {
            self.environment.parse().unwrap_or_default()
        };

        println!("{}", "Fallback chain:".bold());
        println!();
        for (i, step) in env.fallback_chain().iter().enumerate() {
            println!(
                "  {}. {} {}",
                i + 1,
                step.to_string().green(),
                format!("(key: {:?})", step.canonical_form()).dimmed()
            );
        }
        Ok(0)
    }
}
