// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::Arc;

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use kcal_docstore::{DocStoreClient, FieldPatch};
use serde::Deserialize;
use tokio::fs;

use crate::error::{Error, ValidationError};
use crate::localdb::{LocalDb, SqliteWatermark};
use crate::store::{
    AuthSession, Clock, ImageUploader, ItemStore, SettingsStore, SystemClock, WatermarkCache,
};
use crate::sync::{ItemSync, WatermarkPolicy};
use crate::{Config, Consumption, DailySummary, ExportData, Item, ItemPatch, NewItem, Settings};

/// Field of the user document holding the settings.
const SETTINGS_FIELD: &str = "settings";

/// Local copy of the last settings read from or written to the remote store.
const KEY_SETTINGS: &str = "settings";

/// The collaborators of a [`Kcal`] instance.
#[derive(Clone)]
pub struct Backends {
    /// Source of the signed-in user.
    pub session: Arc<dyn AuthSession>,
    /// Item collection.
    pub items: Arc<dyn ItemStore>,
    /// User document holding the settings.
    pub settings: Arc<dyn SettingsStore>,
    /// Image storage.
    pub uploader: Arc<dyn ImageUploader>,
    /// Source of the current time.
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("user_id", &self.session.current_user_id())
            .finish_non_exhaustive()
    }
}

impl Backends {
    /// Backends talking to the configured remote document store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can not be created.
    pub fn remote(config: &Config) -> Result<Self, Error> {
        let client = DocStoreClient::new(config.remote.clone())
            .map_err(|e| Error::Config(format!("Failed to create remote client: {e}")))?;
        let client = Arc::new(client);
        Ok(Self {
            session: Arc::new(config.session()),
            items: client.clone(),
            settings: client.clone(),
            uploader: client,
            clock: Arc::new(SystemClock),
        })
    }
}

/// Outcome of [`Kcal::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Number of created or changed items.
    pub updated: usize,
    /// Number of deleted items.
    pub deleted: usize,
    /// Watermark stored after the sync.
    pub watermark: i64,
}

/// kcal application core.
#[derive(Clone)]
pub struct Kcal {
    db: LocalDb,
    sync: ItemSync,
    session: Arc<dyn AuthSession>,
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    tz: TimeZone,
}

impl std::fmt::Debug for Kcal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kcal")
            .field("db", &self.db)
            .field("sync", &self.sync)
            .field("tz", &self.tz)
            .finish_non_exhaustive()
    }
}

impl Kcal {
    /// Creates a new kcal instance with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the local database
    /// can not be opened.
    pub async fn new(mut config: Config) -> Result<Self, Error> {
        config.normalize()?;
        prepare(&config).await?;

        let backends = Backends::remote(&config)?;
        Self::with_backends(
            config.state_dir.as_deref(),
            backends,
            config.watermark_policy(),
        )
        .await
    }

    /// Creates a new kcal instance with explicit backends.
    ///
    /// If `state_dir` is `None`, the local cache lives in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the local database can not be opened.
    pub async fn with_backends(
        state_dir: Option<&Path>,
        backends: Backends,
        policy: WatermarkPolicy,
    ) -> Result<Self, Error> {
        let db = LocalDb::open(state_dir).await?;
        let sync = ItemSync::new(
            backends.session.clone(),
            backends.items,
            backends.uploader,
            Arc::new(SqliteWatermark::new(&db)),
            backends.clock.clone(),
        )
        .with_policy(policy);

        Ok(Self {
            db,
            sync,
            session: backends.session,
            settings: backends.settings,
            clock: backends.clock,
            tz: TimeZone::system(),
        })
    }

    /// Uses the given time zone for calendar dates instead of the system one.
    #[must_use]
    pub fn with_time_zone(mut self, tz: TimeZone) -> Self {
        self.tz = tz;
        self
    }

    /// Time zone of calendar dates.
    pub fn time_zone(&self) -> &TimeZone {
        &self.tz
    }

    /// The item sync engine.
    pub fn item_sync(&self) -> &ItemSync {
        &self.sync
    }

    /// Today's date in the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock is out of range.
    pub fn today(&self) -> Result<Date, Error> {
        Ok(self.now()?.to_zoned(self.tz.clone()).date())
    }

    /// Fetches remote changes and applies them to the local cache.
    ///
    /// A full sync starts from watermark zero and re-reads every item.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching or applying the changes fails. The
    /// watermark only advances once the changes are committed to the cache,
    /// so a failed sync is retried from the same point.
    #[tracing::instrument(skip(self))]
    pub async fn sync(&self, full: bool) -> Result<SyncReport, Error> {
        let (updates, pending) = if full {
            self.sync.fetch_changes(0).await?
        } else {
            self.sync.pull_pending().await?
        };
        self.db.apply_updates(&updates).await?;
        let watermark = self.sync.commit_watermark(pending).await;

        let report = SyncReport {
            updated: updates.updated_items.len(),
            deleted: updates.deleted_item_ids.len(),
            watermark,
        };
        tracing::info!(?report, "sync finished");
        Ok(report)
    }

    /// Lists cached items ordered by name, optionally filtered by a name
    /// substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the local database can not be read.
    pub async fn list_items(&self, query: Option<&str>) -> Result<Vec<Item>, Error> {
        self.db.list_items(query).await
    }

    /// Reads a single item from the remote store and refreshes the cache.
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`] or [`Error::UnableToFetch`].
    pub async fn get_item(&self, id: &str) -> Result<Option<Item>, Error> {
        let item = self.sync.get_item(id).await?;
        match &item {
            Some(item) => self.db.upsert_item(item).await?,
            None => {
                self.db.remove_item(id).await?;
            }
        }
        Ok(item)
    }

    /// Creates a new item.
    ///
    /// # Errors
    ///
    /// See [`ItemSync::create_item`].
    pub async fn create_item(&self, new: NewItem) -> Result<Item, Error> {
        let item = self.sync.create_item(new).await?;
        self.db.upsert_item(&item).await?;
        Ok(item)
    }

    /// Applies a patch to an existing item.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the item is neither cached nor on the remote
    /// store, otherwise see [`ItemSync::update_item`].
    pub async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<Item, Error> {
        let mut item = self.find_item(id).await?;
        if patch.is_empty() {
            tracing::debug!(id, "empty patch, nothing to update");
            return Ok(item);
        }

        patch.apply_to(&mut item);
        let item = self.sync.update_item(item).await?;
        self.db.upsert_item(&item).await?;
        Ok(item)
    }

    /// Deletes an item; other clients learn about it on their next sync.
    ///
    /// # Errors
    ///
    /// See [`ItemSync::tombstone`].
    pub async fn remove_item(&self, id: &str) -> Result<(), Error> {
        self.sync.tombstone(id).await?;
        self.db.remove_item(id).await?;
        Ok(())
    }

    /// Logs the consumption of `quantity` portions of an item.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ZeroQuantity`], [`Error::NotFound`] for an unknown
    /// item, or a database error.
    #[tracing::instrument(skip(self))]
    pub async fn consume(&self, item_id: &str, quantity: u32) -> Result<Consumption, Error> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }

        let item = self.find_item(item_id).await?;
        let now = self.now()?;
        let date = now.to_zoned(self.tz.clone()).date();
        let consumption = Consumption::of(&item, quantity, now.as_millisecond(), date);
        let consumption = self.db.insert_consumption(consumption).await?;
        tracing::info!(item_id, quantity, %date, "consumption logged");
        Ok(consumption)
    }

    /// Totals the consumptions of a day against the calorie target.
    ///
    /// # Errors
    ///
    /// Returns an error if the local database can not be read.
    pub async fn daily_summary(&self, date: Date) -> Result<DailySummary, Error> {
        let settings = self.settings_or_default().await;
        let entries = self.db.consumptions_on(date).await?;
        Ok(DailySummary::new(date, settings.calorie_target, entries))
    }

    /// Reads the settings from the user document.
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`], [`Error::NotFound`] if the user document does
    /// not exist, or [`Error::UnableToFetch`].
    pub async fn settings(&self) -> Result<Settings, Error> {
        let user_id = self.user_id()?;
        let doc = self.settings.get_user(user_id).await.map_err(|e| {
            tracing::error!(err = %e, "failed to get settings");
            Error::fetch(&e)
        })?;
        let doc = doc.ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;

        let settings = match doc.get(SETTINGS_FIELD) {
            Some(value) => Settings::deserialize(value).map_err(|e| Error::UnableToFetch {
                code: None,
                message: format!("malformed settings: {e}"),
            })?,
            None => Settings::default(),
        };
        self.cache_settings(settings).await;
        Ok(settings)
    }

    /// Writes the settings to the user document, other fields are kept.
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`] or [`Error::UnableToWrite`].
    pub async fn update_settings(&self, settings: Settings) -> Result<(), Error> {
        let user_id = self.user_id()?;
        let patch = FieldPatch::new().set(SETTINGS_FIELD, serde_json::to_value(settings)?);
        self.settings
            .update_user(user_id, patch)
            .await
            .map_err(|e| {
                tracing::error!(err = %e, "failed to update settings");
                Error::write(&e)
            })?;

        tracing::info!(?settings, "settings updated");
        self.cache_settings(settings).await;
        Ok(())
    }

    /// Writes a JSON snapshot of the user's data to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the local database can not be read or the file can
    /// not be written.
    #[tracing::instrument(skip(self))]
    pub async fn export(&self, path: &Path) -> Result<ExportData, Error> {
        let data = ExportData {
            exported_at: self.now()?,
            settings: self.settings_or_default().await,
            items: self.db.list_items(None).await?,
            consumptions: self.db.all_consumptions().await?,
        };

        fs::write(path, data.to_json()?).await?;
        tracing::info!(
            items = data.items.len(),
            consumptions = data.consumptions.len(),
            "data exported"
        );
        Ok(data)
    }

    /// Close the kcal instance, saving any changes to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if closing the database fails.
    pub async fn close(self) -> Result<(), Error> {
        self.db.close().await
    }

    fn user_id(&self) -> Result<&str, Error> {
        self.session.current_user_id().ok_or(Error::NoValidUser)
    }

    fn now(&self) -> Result<Timestamp, Error> {
        Ok(Timestamp::from_millisecond(self.clock.now_ms())?)
    }

    async fn find_item(&self, id: &str) -> Result<Item, Error> {
        if let Some(item) = self.db.get_item(id).await? {
            return Ok(item);
        }

        tracing::debug!(id, "item not cached, reading from remote store");
        self.get_item(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("item {id}")))
    }

    /// Remote settings, then the local copy, then the defaults.
    async fn settings_or_default(&self) -> Settings {
        match self.settings().await {
            Ok(settings) => return settings,
            Err(e) => tracing::debug!(err = %e, "remote settings unavailable"),
        }

        match self.db.kv.get(KEY_SETTINGS).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!(err = %e, "ignoring malformed cached settings"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(err = %e, "failed to read cached settings"),
        }
        Settings::default()
    }

    async fn cache_settings(&self, settings: Settings) {
        let result = match serde_json::to_string(&settings) {
            Ok(json) => self.db.kv.set(KEY_SETTINGS, &json).await.map_err(Error::from),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!(err = %e, "failed to cache settings");
        }
    }
}

async fn prepare(config: &Config) -> Result<(), Error> {
    if let Some(parent) = &config.state_dir {
        tracing::debug!(path = %parent.display(), "ensuring state directory exists");
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}
