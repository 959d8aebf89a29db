// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::Date;
use sqlx::SqlitePool;

use crate::Consumption;

#[derive(Debug, Clone)]
pub struct Consumptions {
    pool: SqlitePool,
}

impl Consumptions {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a consumption and returns its row id.
    pub async fn insert(&self, record: &ConsumptionRecord) -> Result<i64, sqlx::Error> {
        const SQL: &str = "\
INSERT INTO consumptions
    (item_id, name, calories, carbohydrates, fat, protein, quantity, consumed_at, date)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING id;
";

        let (id,): (i64,) = sqlx::query_as(SQL)
            .bind(&record.item_id)
            .bind(&record.name)
            .bind(record.calories)
            .bind(record.carbohydrates)
            .bind(record.fat)
            .bind(record.protein)
            .bind(record.quantity)
            .bind(record.consumed_at)
            .bind(&record.date)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    /// Consumptions of a day, oldest first.
    pub async fn list_by_date(&self, date: Date) -> Result<Vec<ConsumptionRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, item_id, name, calories, carbohydrates, fat, protein, quantity, consumed_at, date
FROM consumptions
WHERE date = ?
ORDER BY consumed_at, id;
";

        sqlx::query_as(SQL)
            .bind(date.to_string())
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<ConsumptionRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, item_id, name, calories, carbohydrates, fat, protein, quantity, consumed_at, date
FROM consumptions
ORDER BY consumed_at, id;
";

        sqlx::query_as(SQL).fetch_all(&self.pool).await
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConsumptionRecord {
    id: i64,
    item_id: String,
    name: String,
    calories: f64,
    carbohydrates: f64,
    fat: f64,
    protein: f64,
    quantity: u32,
    consumed_at: i64,
    date: String, // YYYY-MM-DD
}

impl From<&Consumption> for ConsumptionRecord {
    fn from(c: &Consumption) -> Self {
        Self {
            id: c.id.unwrap_or_default(),
            item_id: c.item_id.clone(),
            name: c.name.clone(),
            calories: c.calories,
            carbohydrates: c.carbohydrates,
            fat: c.fat,
            protein: c.protein,
            quantity: c.quantity,
            consumed_at: c.consumed_at,
            date: c.date.to_string(),
        }
    }
}

impl TryFrom<ConsumptionRecord> for Consumption {
    type Error = jiff::Error;

    fn try_from(record: ConsumptionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(record.id),
            item_id: record.item_id,
            name: record.name,
            calories: record.calories,
            carbohydrates: record.carbohydrates,
            fat: record.fat,
            protein: record.protein,
            quantity: record.quantity,
            consumed_at: record.consumed_at,
            date: record.date.parse()?,
        })
    }
}
