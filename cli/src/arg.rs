// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use clap::{Arg, ArgMatches, ValueHint, arg, value_parser};

use crate::util::{OutputFormat, parse_amount};

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn output_format() -> Arg {
        arg!(--"output-format" <FORMAT> "Output format")
            .value_parser(value_parser!(OutputFormat))
            .default_value("table")
    }

    pub fn get_output_format(matches: &ArgMatches) -> OutputFormat {
        matches
            .get_one("output-format")
            .copied()
            .unwrap_or(OutputFormat::Table)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ItemArgs;

impl ItemArgs {
    pub fn id() -> Arg {
        arg!(id: <ID> "The id of the item")
    }

    pub fn get_id(matches: &ArgMatches) -> String {
        matches
            .get_one::<String>("id")
            .expect("id is required")
            .clone()
    }

    pub fn name(positional: bool) -> Arg {
        if positional {
            arg!(name: <NAME> "Name of the item")
        } else {
            arg!(name: -n --name <NAME> "Name of the item")
        }
    }

    pub fn get_name(matches: &ArgMatches) -> Option<String> {
        matches.get_one("name").cloned()
    }

    pub fn calories() -> Arg {
        arg!(--calories <KCAL> "Calories per portion, in kcal").value_parser(parse_amount)
    }

    pub fn get_calories(matches: &ArgMatches) -> Option<f64> {
        matches.get_one("calories").copied()
    }

    pub fn carbohydrates() -> Arg {
        arg!(--carbohydrates <GRAMS> "Carbohydrates per portion, in grams")
            .visible_alias("carbs")
            .value_parser(parse_amount)
    }

    pub fn get_carbohydrates(matches: &ArgMatches) -> Option<f64> {
        matches.get_one("carbohydrates").copied()
    }

    pub fn fat() -> Arg {
        arg!(--fat <GRAMS> "Fat per portion, in grams").value_parser(parse_amount)
    }

    pub fn get_fat(matches: &ArgMatches) -> Option<f64> {
        matches.get_one("fat").copied()
    }

    pub fn protein() -> Arg {
        arg!(--protein <GRAMS> "Protein per portion, in grams").value_parser(parse_amount)
    }

    pub fn get_protein(matches: &ArgMatches) -> Option<f64> {
        matches.get_one("protein").copied()
    }

    pub fn img() -> Arg {
        arg!(--img <IMAGE> "Local image to upload, or an image URL")
            .long_help(
                "\
Image of the item. A local path is uploaded before the item is saved, an http(s) URL is \
stored as is. Pass an empty string to remove the image.",
            )
            .value_hint(ValueHint::FilePath)
    }

    pub fn get_img(matches: &ArgMatches) -> Option<String> {
        matches.get_one("img").cloned()
    }
}
