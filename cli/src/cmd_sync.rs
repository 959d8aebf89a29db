// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use colored::Colorize;
use kcal_core::Kcal;

use crate::arg::CommonArgs;
use crate::util::OutputFormat;

#[derive(Debug, Clone, Copy)]
pub struct CmdSync {
    pub full: bool,
    pub output_format: OutputFormat,
}

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Fetch item changes from the remote store")
            .arg(arg!(--full "Re-read every item instead of the changes since the last sync"))
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            full: matches.get_flag("full"),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "syncing items...");
        let report = kcal.sync(self.full).await?;

        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Table if report.updated == 0 && report.deleted == 0 => {
                println!("{} Already up to date", "✔".green());
            }
            OutputFormat::Table => println!(
                "{} {} updated, {} deleted",
                "✔".green(),
                report.updated,
                report.deleted
            ),
        }
        Ok(())
    }
}
