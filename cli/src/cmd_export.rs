// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, value_parser};
use colored::Colorize;
use kcal_core::Kcal;

#[derive(Debug, Clone)]
pub struct CmdExport {
    pub path: PathBuf,
}

impl CmdExport {
    pub const NAME: &str = "export";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Export items, settings and the consumption log as JSON")
            .arg(
                arg!(path: <PATH> "File to write")
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        match matches.get_one::<PathBuf>("path") {
            Some(path) => Self { path: path.clone() },
            _ => unreachable!(),
        }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "exporting data...");
        let data = kcal.export(&self.path).await?;
        println!(
            "{} Exported {} items and {} consumptions to {}",
            "✔".green(),
            data.items.len(),
            data.consumptions.len(),
            self.path.display()
        );
        Ok(())
    }
}
