// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::Color;
use kcal_core::Item;

use crate::table::{PaddingDirection, Table, TableColumn};
use crate::util::{OutputFormat, format_amount};

#[derive(Debug)]
pub struct ItemFormatter {
    columns: Vec<ItemColumn>,
    format: OutputFormat,
    header: bool,
}

impl ItemFormatter {
    pub fn new() -> Self {
        Self {
            columns: vec![
                ItemColumn::Id,
                ItemColumn::Calories,
                ItemColumn::Carbohydrates,
                ItemColumn::Fat,
                ItemColumn::Protein,
                ItemColumn::Name,
            ],
            format: OutputFormat::Table,
            header: true,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn format<'a>(&'a self, items: &'a [Item]) -> Display<'a> {
        Display {
            items,
            formatter: self,
        }
    }
}

#[derive(Debug)]
pub struct Display<'a> {
    items: &'a [Item],
    formatter: &'a ItemFormatter,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formatter.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(self.items).map_err(|_| fmt::Error)?;
                write!(f, "{json}")
            }
            OutputFormat::Table if self.items.is_empty() => write!(f, "No items"),
            OutputFormat::Table => write!(
                f,
                "{}",
                Table::new(&self.formatter.columns, self.items).with_header(self.formatter.header)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemColumn {
    Id,
    Name,
    Calories,
    Carbohydrates,
    Fat,
    Protein,
}

impl TableColumn<Item> for ItemColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            ItemColumn::Id => "ID",
            ItemColumn::Name => "Name",
            ItemColumn::Calories => "kcal",
            ItemColumn::Carbohydrates => "Carbs",
            ItemColumn::Fat => "Fat",
            ItemColumn::Protein => "Protein",
        }
        .into()
    }

    fn format<'a>(&self, item: &'a Item) -> Cow<'a, str> {
        match self {
            ItemColumn::Id => item.id.as_str().into(),
            ItemColumn::Name if item.img_url.is_empty() => item.name.as_str().into(),
            ItemColumn::Name => format!("{} 📷", item.name).into(),
            ItemColumn::Calories => format_amount(item.calories).into(),
            ItemColumn::Carbohydrates => format!("{}g", format_amount(item.carbohydrates)).into(),
            ItemColumn::Fat => format!("{}g", format_amount(item.fat)).into(),
            ItemColumn::Protein => format!("{}g", format_amount(item.protein)).into(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            ItemColumn::Id | ItemColumn::Name => PaddingDirection::Left,
            _ => PaddingDirection::Right,
        }
    }

    fn get_color(&self, _item: &Item) -> Option<Color> {
        match self {
            ItemColumn::Id => Some(Color::BrightBlack),
            ItemColumn::Calories => Some(Color::Yellow),
            _ => None,
        }
    }
}
