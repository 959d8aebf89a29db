// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::Date;

use crate::item::Item;

/// A logged consumption of an item.
///
/// Nutrition values are copied from the item at the time of consumption, so
/// later edits or deletion of the item do not rewrite the history.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumption {
    /// Local row id, `None` until stored.
    pub id: Option<i64>,
    /// Id of the consumed item.
    pub item_id: String,
    /// Name of the item when consumed.
    pub name: String,
    /// Calories per portion.
    pub calories: f64,
    /// Carbohydrates per portion.
    pub carbohydrates: f64,
    /// Fat per portion.
    pub fat: f64,
    /// Protein per portion.
    pub protein: f64,
    /// Number of portions.
    pub quantity: u32,
    /// Time of consumption, milliseconds since the epoch.
    pub consumed_at: i64,
    /// Local calendar date of consumption.
    pub date: Date,
}

impl Consumption {
    /// Records `quantity` portions of `item`.
    pub fn of(item: &Item, quantity: u32, consumed_at: i64, date: Date) -> Self {
        Self {
            id: None,
            item_id: item.id.clone(),
            name: item.name.clone(),
            calories: item.calories,
            carbohydrates: item.carbohydrates,
            fat: item.fat,
            protein: item.protein,
            quantity,
            consumed_at,
            date,
        }
    }

    /// Total calories of this consumption.
    pub fn total_calories(&self) -> f64 {
        self.calories * f64::from(self.quantity)
    }
}

/// Intake totals of a single day.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// The day.
    pub date: Date,
    /// Total calories consumed.
    pub calories: f64,
    /// Total carbohydrates consumed.
    pub carbohydrates: f64,
    /// Total fat consumed.
    pub fat: f64,
    /// Total protein consumed.
    pub protein: f64,
    /// Calorie target of the day.
    pub calorie_target: u32,
    /// Consumptions of the day, oldest first.
    pub entries: Vec<Consumption>,
}

impl DailySummary {
    /// Sums up the consumptions of a day.
    pub fn new(date: Date, calorie_target: u32, entries: Vec<Consumption>) -> Self {
        let mut summary = Self {
            date,
            calories: 0.0,
            carbohydrates: 0.0,
            fat: 0.0,
            protein: 0.0,
            calorie_target,
            entries: Vec::new(),
        };
        for c in &entries {
            let q = f64::from(c.quantity);
            summary.calories += c.calories * q;
            summary.carbohydrates += c.carbohydrates * q;
            summary.fat += c.fat * q;
            summary.protein += c.protein * q;
        }
        summary.entries = entries;
        summary
    }

    /// Calories left until the target, negative when over target.
    pub fn calories_left(&self) -> f64 {
        f64::from(self.calorie_target) - self.calories
    }
}
