// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use colored::Colorize;
use kcal_core::{Item, ItemPatch, Kcal, NewItem};

use crate::arg::{CommonArgs, ItemArgs};
use crate::config::Config;
use crate::item_formatter::ItemFormatter;
use crate::util::OutputFormat;

#[derive(Debug, Clone)]
pub struct CmdItemList {
    pub query: Option<String>,
    pub output_format: OutputFormat,
}

impl CmdItemList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List the cached items, by name")
            .arg(arg!(query: [QUERY] "Only list items whose name contains this text"))
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            query: matches.get_one("query").cloned(),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, kcal: &Kcal, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing items...");
        let items = kcal.list_items(self.query.as_deref()).await?;

        let formatter = ItemFormatter::new()
            .with_output_format(self.output_format)
            .with_header(config.header);
        println!("{}", formatter.format(&items));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdItemShow {
    pub id: String,
    pub output_format: OutputFormat,
}

impl CmdItemShow {
    pub const NAME: &str = "show";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Read an item from the remote store")
            .arg(ItemArgs::id())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: ItemArgs::get_id(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "reading item...");
        let item = kcal
            .get_item(&self.id)
            .await?
            .ok_or_else(|| format!("Item not found: {}", self.id))?;

        print_items(&[item], self.output_format);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdItemNew {
    pub name: String,
    pub calories: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    pub protein: f64,
    pub img: Option<String>,

    pub output_format: OutputFormat,
}

impl CmdItemNew {
    pub const NAME: &str = "new";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("add")
            .about("Add a new item")
            .arg(ItemArgs::name(true))
            .arg(ItemArgs::calories().required(true))
            .arg(ItemArgs::carbohydrates())
            .arg(ItemArgs::fat())
            .arg(ItemArgs::protein())
            .arg(ItemArgs::img())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let name = ItemArgs::get_name(matches).ok_or("Name is required for new item")?;
        let calories =
            ItemArgs::get_calories(matches).ok_or("Calories are required for new item")?;

        Ok(Self {
            name,
            calories,
            carbohydrates: ItemArgs::get_carbohydrates(matches).unwrap_or_default(),
            fat: ItemArgs::get_fat(matches).unwrap_or_default(),
            protein: ItemArgs::get_protein(matches).unwrap_or_default(),
            img: ItemArgs::get_img(matches).filter(|a| !a.is_empty()),

            output_format: CommonArgs::get_output_format(matches),
        })
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "adding new item...");
        let new = NewItem {
            name: self.name,
            calories: self.calories,
            carbohydrates: self.carbohydrates,
            fat: self.fat,
            protein: self.protein,
            img_uri: self.img,
        };
        let item = kcal.create_item(new).await?;

        print_items(&[item], self.output_format);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdItemEdit {
    pub id: String,
    pub patch: ItemPatch,

    pub output_format: OutputFormat,
}

impl CmdItemEdit {
    pub const NAME: &str = "edit";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Edit an item")
            .arg(ItemArgs::id())
            .arg(ItemArgs::name(false))
            .arg(ItemArgs::calories())
            .arg(ItemArgs::carbohydrates())
            .arg(ItemArgs::fat())
            .arg(ItemArgs::protein())
            .arg(ItemArgs::img())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: ItemArgs::get_id(matches),
            patch: ItemPatch {
                name: ItemArgs::get_name(matches),
                calories: ItemArgs::get_calories(matches),
                carbohydrates: ItemArgs::get_carbohydrates(matches),
                fat: ItemArgs::get_fat(matches),
                protein: ItemArgs::get_protein(matches),
                img: ItemArgs::get_img(matches),
            },

            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "editing item...");
        if self.patch.is_empty() {
            println!("{} Nothing to change", "Warning:".yellow());
            return Ok(());
        }

        let item = kcal.update_item(&self.id, &self.patch).await?;
        print_items(&[item], self.output_format);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdItemDelete {
    pub ids: Vec<String>,
}

impl CmdItemDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete items, other devices drop them on their next sync")
            .arg(ItemArgs::id().num_args(1..))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        let ids = matches
            .get_many::<String>("id")
            .expect("id is required")
            .cloned()
            .collect();
        Self { ids }
    }

    pub async fn run(self, kcal: &Kcal) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting items...");
        for id in &self.ids {
            kcal.remove_item(id).await?;
            println!("{} Deleted {}", "✔".green(), id);
        }
        Ok(())
    }
}

fn print_items(items: &[Item], output_format: OutputFormat) {
    let formatter = ItemFormatter::new().with_output_format(output_format);
    println!("{}", formatter.format(items));
}
