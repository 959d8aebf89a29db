// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::{Color, Colorize};
use jiff::tz::TimeZone;
use kcal_core::{Consumption, DailySummary};

use crate::table::{PaddingDirection, Table, TableColumn};
use crate::util::{OutputFormat, format_amount, format_time};

#[derive(Debug)]
pub struct SummaryFormatter {
    columns: Vec<EntryColumn>,
    format: OutputFormat,
}

impl SummaryFormatter {
    pub fn new(tz: TimeZone) -> Self {
        Self {
            columns: vec![
                EntryColumn::Time(tz),
                EntryColumn::Quantity,
                EntryColumn::Calories,
                EntryColumn::Name,
            ],
            format: OutputFormat::Table,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format<'a>(&'a self, summary: &'a DailySummary) -> Display<'a> {
        Display {
            summary,
            formatter: self,
        }
    }
}

#[derive(Debug)]
pub struct Display<'a> {
    summary: &'a DailySummary,
    formatter: &'a SummaryFormatter,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryJson<'a> {
    #[serde(flatten)]
    summary: &'a DailySummary,
    calories_left: f64,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        if self.formatter.format == OutputFormat::Json {
            let json = SummaryJson {
                summary: s,
                calories_left: s.calories_left(),
            };
            let json = serde_json::to_string_pretty(&json).map_err(|_| fmt::Error)?;
            return write!(f, "{json}");
        }

        let left = s.calories_left();
        let left = match left < 0.0 {
            true => format!("{} kcal over", format_amount(-left)).red(),
            false => format!("{} kcal left", format_amount(left)).green(),
        };
        writeln!(
            f,
            " {} {} / {} kcal, {}",
            "►".green(),
            format_amount(s.calories).bold(),
            s.calorie_target,
            left
        )?;
        write!(
            f,
            "   carbs {}g, fat {}g, protein {}g",
            format_amount(s.carbohydrates),
            format_amount(s.fat),
            format_amount(s.protein)
        )?;

        if s.entries.is_empty() {
            write!(f, "\n\nNothing eaten yet")
        } else {
            let table = Table::new(&self.formatter.columns, &s.entries);
            write!(f, "\n\n{table}")
        }
    }
}

#[derive(Debug, Clone)]
pub enum EntryColumn {
    Time(TimeZone),
    Quantity,
    Calories,
    Name,
}

impl TableColumn<Consumption> for EntryColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            EntryColumn::Time(_) => "Time",
            EntryColumn::Quantity => "Quantity",
            EntryColumn::Calories => "kcal",
            EntryColumn::Name => "Name",
        }
        .into()
    }

    fn format<'a>(&self, c: &'a Consumption) -> Cow<'a, str> {
        match self {
            EntryColumn::Time(tz) => format_time(c.consumed_at, tz).into(),
            EntryColumn::Quantity => format!("{}×", c.quantity).into(),
            EntryColumn::Calories => format_amount(c.total_calories()).into(),
            EntryColumn::Name => c.name.as_str().into(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            EntryColumn::Quantity | EntryColumn::Calories => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn get_color(&self, _c: &Consumption) -> Option<Color> {
        match self {
            EntryColumn::Calories => Some(Color::Yellow),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    // 2025-03-14T12:00:00Z
    const NOON: i64 = 1_741_953_600_000;

    fn entry(name: &str, calories: f64, quantity: u32, consumed_at: i64) -> Consumption {
        Consumption {
            id: Some(1),
            item_id: "1".to_string(),
            name: name.to_string(),
            calories,
            carbohydrates: 10.0,
            fat: 1.0,
            protein: 2.0,
            quantity,
            consumed_at,
            date: date(2025, 3, 14),
        }
    }

    #[test]
    fn test_format_summary() {
        colored::control::set_override(false);
        let summary = DailySummary::new(
            date(2025, 3, 14),
            1800,
            vec![
                entry("Apple", 95.0, 2, NOON),
                entry("Egg", 78.0, 1, NOON + 90 * 60 * 1000),
            ],
        );
        let out = SummaryFormatter::new(TimeZone::UTC)
            .format(&summary)
            .to_string();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], " ► 268 / 1800 kcal, 1532 kcal left");
        assert_eq!(lines[1], "   carbs 30g, fat 3g, protein 6g");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "12:00 2× 190 Apple");
        assert_eq!(lines[4], "13:30 1×  78 Egg");
    }

    #[test]
    fn test_format_over_target() {
        colored::control::set_override(false);
        let summary = DailySummary::new(date(2025, 3, 14), 100, vec![entry("Pie", 150.0, 1, NOON)]);
        let out = SummaryFormatter::new(TimeZone::UTC)
            .format(&summary)
            .to_string();
        assert!(out.starts_with(" ► 150 / 100 kcal, 50 kcal over"));
    }

    #[test]
    fn test_format_empty_day() {
        colored::control::set_override(false);
        let summary = DailySummary::new(date(2025, 3, 14), 2100, vec![]);
        let out = SummaryFormatter::new(TimeZone::UTC)
            .format(&summary)
            .to_string();
        assert!(out.ends_with("Nothing eaten yet"));
    }

    #[test]
    fn test_format_json() {
        let summary = DailySummary::new(date(2025, 3, 14), 1800, vec![entry("Apple", 95.0, 2, NOON)]);
        let out = SummaryFormatter::new(TimeZone::UTC)
            .with_output_format(OutputFormat::Json)
            .format(&summary)
            .to_string();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["date"], "2025-03-14");
        assert_eq!(value["calorieTarget"], 1800);
        assert_eq!(value["caloriesLeft"], 1610.0);
        assert_eq!(value["entries"][0]["name"], "Apple");
    }
}
