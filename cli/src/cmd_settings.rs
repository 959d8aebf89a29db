// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use clap_num::number_range;
use colored::Colorize;
use kcal_core::{Error as CoreError, Kcal, Settings};

use crate::arg::CommonArgs;
use crate::util::OutputFormat;

#[derive(Debug, Clone, Copy)]
pub struct CmdSettingsShow {
    pub output_format: OutputFormat,
}

impl Default for CmdSettingsShow {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Table,
        }
    }
}

impl CmdSettingsShow {
    pub const NAME: &str = "show";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Show your settings")
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "reading settings...");
        let settings = kcal.settings().await?;
        print_settings(&settings, self.output_format)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CmdSettingsSet {
    pub calorie_target: Option<u32>,
    pub weight: Option<u32>,
}

impl CmdSettingsSet {
    pub const NAME: &str = "set";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Change your settings")
            .arg_required_else_help(true)
            .arg(
                arg!(--"calorie-target" <KCAL> "Daily calorie target, in kcal")
                    .value_parser(|s: &str| number_range(s, 0u32, 20_000)),
            )
            .arg(
                arg!(--weight <KG> "Body weight, in kilograms")
                    .value_parser(|s: &str| number_range(s, 0u32, 1_000)),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            calorie_target: matches.get_one("calorie-target").copied(),
            weight: matches.get_one("weight").copied(),
        }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "updating settings...");
        let current = match kcal.settings().await {
            Ok(settings) => settings,
            Err(CoreError::NotFound(_)) => Settings::default(),
            Err(e) => return Err(e.into()),
        };

        let settings = current.with(self.calorie_target, self.weight);
        if settings == current {
            tracing::info!(?settings, "settings unchanged, skipping update");
            println!("{} Nothing to change", "Warning:".yellow());
            return Ok(());
        }

        kcal.update_settings(settings).await?;
        print_settings(&settings, OutputFormat::Table)
    }
}

fn print_settings(settings: &Settings, output_format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(settings)?),
        OutputFormat::Table => {
            let label = |s: &str| format!("{s:<15}").bold();
            println!("{}{} kcal", label("Calorie target"), settings.calorie_target);
            match settings.weight {
                0 => println!("{}{}", label("Weight"), "unknown".dimmed()),
                w => println!("{}{} kg", label("Weight"), w),
            }
        }
    }
    Ok(())
}
