// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod consumptions;
mod items;
mod kv;


use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jiff::civil::Date;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Error;
use crate::localdb::consumptions::{ConsumptionRecord, Consumptions};
use crate::localdb::items::{ItemRecord, Items};
use crate::localdb::kv::Kv;
use crate::store::WatermarkCache;
use crate::{Consumption, Item, ItemUpdates};

/// Name of the database file inside the state directory.
pub const DB_FILENAME: &str = "kcal.db";

const KEY_ITEMS_LAST_UPDATED: &str = "items_last_updated";

pub(crate) static IN_MEMORY_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Local SQLite cache of the item collection and the consumption log.
#[derive(Debug, Clone)]
pub struct LocalDb {
    pool: SqlitePool,

    pub(crate) items: Items,
    pub(crate) kv: Kv,
    pub(crate) consumptions: Consumptions,
}

impl LocalDb {
    /// Opens a sqlite database connection.
    /// If `state_dir` is `None`, it opens an in-memory database.
    pub async fn open(state_dir: Option<&Path>) -> Result<Self, Error> {
        let options = if let Some(dir) = state_dir {
            let filename = dir.join(DB_FILENAME);
            tracing::info!(path = %filename.display(), "connecting to SQLite database");
            SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true)
        } else {
            // a named shared-cache database, so all pooled connections see the same data
            let db_id = IN_MEMORY_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
            tracing::info!(db_id, "connecting to in-memory SQLite database");
            SqliteConnectOptions::new()
                .filename(format!("file:kcal_memdb_{db_id}:?mode=memory&cache=shared"))
                .in_memory(true)
                .shared_cache(true)
                .create_if_missing(true)
        };

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("src/localdb/migrations") // relative path from the crate root
            .run(&pool)
            .await
            .map_err(|e| Error::Database(e.into()))?;

        tracing::debug!("ensuring tables in the database");
        Ok(LocalDb {
            items: Items::new(pool.clone()),
            kv: Kv::new(pool.clone()),
            consumptions: Consumptions::new(pool.clone()),
            pool,
        })
    }

    /// Applies fetched changes: upserts updated items and removes deleted ones,
    /// all within a single transaction.
    pub async fn apply_updates(&self, updates: &ItemUpdates) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        for item in &updates.updated_items {
            Items::upsert(&mut *tx, &ItemRecord::from(item)).await?;
        }
        for id in &updates.deleted_item_ids {
            Items::delete(&mut *tx, id).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            updated = updates.updated_items.len(),
            deleted = updates.deleted_item_ids.len(),
            "applied item changes to local cache"
        );
        Ok(())
    }

    pub async fn upsert_item(&self, item: &Item) -> Result<(), Error> {
        Items::upsert(&self.pool, &ItemRecord::from(item)).await?;
        Ok(())
    }

    pub async fn remove_item(&self, id: &str) -> Result<bool, Error> {
        Ok(Items::delete(&self.pool, id).await?)
    }

    pub async fn get_item(&self, id: &str) -> Result<Option<Item>, Error> {
        Ok(self.items.get(id).await?.map(Item::from))
    }

    pub async fn list_items(&self, name_like: Option<&str>) -> Result<Vec<Item>, Error> {
        let records = self.items.list(name_like).await?;
        Ok(records.into_iter().map(Item::from).collect())
    }

    /// Stores a consumption and returns it with its row id.
    pub async fn insert_consumption(
        &self,
        mut consumption: Consumption,
    ) -> Result<Consumption, Error> {
        let id = self
            .consumptions
            .insert(&ConsumptionRecord::from(&consumption))
            .await?;
        consumption.id = Some(id);
        Ok(consumption)
    }

    pub async fn consumptions_on(&self, date: Date) -> Result<Vec<Consumption>, Error> {
        let records = self.consumptions.list_by_date(date).await?;
        to_consumptions(records)
    }

    pub async fn all_consumptions(&self) -> Result<Vec<Consumption>, Error> {
        let records = self.consumptions.list_all().await?;
        to_consumptions(records)
    }

    pub async fn close(self) -> Result<(), Error> {
        tracing::debug!("closing database connection");
        self.pool.close().await;
        Ok(())
    }
}

fn to_consumptions(records: Vec<ConsumptionRecord>) -> Result<Vec<Consumption>, Error> {
    records
        .into_iter()
        .map(|r| {
            Consumption::try_from(r).map_err(|e| Error::Database(sqlx::Error::Decode(e.into())))
        })
        .collect()
}

/// Sync watermark persisted in the local database.
#[derive(Debug, Clone)]
pub struct SqliteWatermark {
    kv: Kv,
}

impl SqliteWatermark {
    /// Creates a watermark cache backed by the given database.
    pub fn new(db: &LocalDb) -> Self {
        Self { kv: db.kv.clone() }
    }

    /// Forgets the watermark, the next sync fetches everything.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn reset(&self) -> Result<(), Error> {
        self.kv.remove(KEY_ITEMS_LAST_UPDATED).await?;
        Ok(())
    }
}

#[async_trait]
impl WatermarkCache for SqliteWatermark {
    async fn load(&self) -> Result<Option<i64>, Error> {
        match self.kv.get(KEY_ITEMS_LAST_UPDATED).await? {
            Some(value) => match value.parse() {
                Ok(v) => Ok(Some(v)),
                Err(e) => {
                    tracing::warn!(%value, err = %e, "ignoring malformed watermark");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn store(&self, watermark: i64) -> Result<(), Error> {
        self.kv
            .set(KEY_ITEMS_LAST_UPDATED, &watermark.to_string())
            .await?;
        Ok(())
    }
}
