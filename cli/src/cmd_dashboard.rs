// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use kcal_core::Kcal;

use crate::arg::CommonArgs;
use crate::summary_formatter::SummaryFormatter;
use crate::util::OutputFormat;

#[derive(Debug, Clone, Copy)]
pub struct CmdDashboard {
    pub output_format: OutputFormat,
}

impl Default for CmdDashboard {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Table,
        }
    }
}

impl CmdDashboard {
    pub const NAME: &str = "dashboard";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Show today's intake against the calorie target")
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    /// Show the dashboard of today.
    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "generating dashboard...");

        let today = kcal.today()?;
        let summary = kcal.daily_summary(today).await?;

        let formatter =
            SummaryFormatter::new(kcal.time_zone().clone()).with_output_format(self.output_format);
        if self.output_format == OutputFormat::Table {
            println!("🍽️ {} {}", "Today".bold(), today);
        }
        println!("{}", formatter.format(&summary));
        Ok(())
    }
}
