// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use clap_num::number_range;
use colored::Colorize;
use kcal_core::Kcal;

use crate::arg::ItemArgs;
use crate::util::format_amount;

#[derive(Debug, Clone)]
pub struct CmdEat {
    pub id: String,
    pub quantity: u32,
}

impl CmdEat {
    pub const NAME: &str = "eat";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Log portions of an item as eaten now")
            .arg(ItemArgs::id())
            .arg(
                arg!(-q --quantity <N> "Number of portions")
                    .value_parser(|s: &str| number_range(s, 1u32, 100))
                    .default_value("1"),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: ItemArgs::get_id(matches),
            quantity: matches.get_one("quantity").copied().unwrap_or(1),
        }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "logging consumption...");
        let consumption = kcal.consume(&self.id, self.quantity).await?;
        println!(
            "{} {}× {} ({} kcal)",
            "✔".green(),
            consumption.quantity,
            consumption.name.bold(),
            format_amount(consumption.total_calories())
        );

        let summary = kcal.daily_summary(consumption.date).await?;
        let left = summary.calories_left();
        match left < 0.0 {
            true => println!("{} kcal over today's target", format_amount(-left).red()),
            false => println!("{} kcal left today", format_amount(left).green()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CmdEat, clap::Error> {
        let cmd = Command::new("test").subcommand(CmdEat::command());
        let matches = cmd.try_get_matches_from(args)?;
        Ok(CmdEat::from(matches.subcommand_matches("eat").unwrap()))
    }

    #[test]
    fn test_parse_eat() {
        let parsed = parse(&["test", "eat", "a1"]).unwrap();
        assert_eq!(parsed.id, "a1");
        assert_eq!(parsed.quantity, 1);

        let parsed = parse(&["test", "eat", "a1", "-q", "3"]).unwrap();
        assert_eq!(parsed.quantity, 3);
    }

    #[test]
    fn test_parse_eat_rejects_zero() {
        assert!(parse(&["test", "eat", "a1", "-q", "0"]).is_err());
        assert!(parse(&["test", "eat", "a1", "--quantity", "101"]).is_err());
    }
}
