// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::Item;

#[derive(Debug, Clone)]
pub struct Items {
    pool: SqlitePool,
}

impl Items {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert<'e, E>(executor: E, item: &ItemRecord) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        const SQL: &str = "\
INSERT INTO items (id, name, calories, carbohydrates, fat, protein, img_url)
VALUES (?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
    name          = excluded.name,
    calories      = excluded.calories,
    carbohydrates = excluded.carbohydrates,
    fat           = excluded.fat,
    protein       = excluded.protein,
    img_url       = excluded.img_url;
";

        sqlx::query(SQL)
            .bind(&item.id)
            .bind(&item.name)
            .bind(item.calories)
            .bind(item.carbohydrates)
            .bind(item.fat)
            .bind(item.protein)
            .bind(&item.img_url)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn delete<'e, E>(executor: E, id: &str) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM items WHERE id = ?;")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, id: &str) -> Result<Option<ItemRecord>, sqlx::Error> {
        const SQL: &str = "\
SELECT id, name, calories, carbohydrates, fat, protein, img_url
FROM items
WHERE id = ?;
";

        sqlx::query_as(SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Lists items ordered by name, optionally filtered by a case-insensitive
    /// substring of the name.
    pub async fn list(&self, name_like: Option<&str>) -> Result<Vec<ItemRecord>, sqlx::Error> {
        let mut sql = "\
SELECT id, name, calories, carbohydrates, fat, protein, img_url
FROM items
"
        .to_string();
        if name_like.is_some() {
            sql += "WHERE name LIKE ? ESCAPE '\\'\n";
        }
        sql += "ORDER BY name COLLATE NOCASE, id;";

        let mut query = sqlx::query_as(&sql);
        if let Some(name) = name_like {
            query = query.bind(format!("%{}%", escape_like(name)));
        }
        query.fetch_all(&self.pool).await
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items;")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRecord {
    id: String,
    name: String,
    calories: f64,
    carbohydrates: f64,
    fat: f64,
    protein: f64,
    img_url: String,
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            calories: item.calories,
            carbohydrates: item.carbohydrates,
            fat: item.fat,
            protein: item.protein,
            img_url: item.img_url.clone(),
        }
    }
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            calories: record.calories,
            carbohydrates: record.carbohydrates,
            fat: record.fat,
            protein: record.protein,
            img_url: record.img_url,
        }
    }
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("apple"), "apple");
    }
}
