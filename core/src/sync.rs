// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Incremental synchronization of the item collection.
//!
//! Changes are fetched with a single range query on `lastModified`, starting
//! at the watermark (inclusive). Deleted items are tombstones: their content
//! is stripped, `deleted` is set, and the id is kept so other clients learn
//! about the deletion on their next fetch.

use std::collections::HashSet;
use std::sync::Arc;

use jiff::SignedDuration;
use kcal_docstore::{Document, DocumentId, FieldPatch};
use serde_json::Value;

use crate::error::{Error, ValidationError};
use crate::item::{Item, ItemUpdates, ItemUpsert, NewItem, fields, is_remote_url};
use crate::store::{AuthSession, Clock, ImageUploader, ItemStore, WatermarkCache};

/// Watermark of a fetch whose changes are not yet persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWatermark {
    fetched_from: i64,
    observed_max: Option<i64>,
    fetched_at: i64,
}

/// How the watermark advances after a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatermarkPolicy {
    /// Stamp the client time at fetch completion.
    ///
    /// A write that lands on the server between query execution and the
    /// stamp is skipped by the next fetch.
    #[default]
    FetchTime,

    /// Use the largest observed `lastModified` minus an overlap window.
    ///
    /// Server timestamps drive the watermark, the overlap re-fetches a small
    /// window so late commits with older stamps are still seen.
    MaxObserved {
        /// Overlap subtracted from the largest observed timestamp.
        overlap: SignedDuration,
    },
}

impl WatermarkPolicy {
    /// Computes the next watermark; the result is never below `previous`.
    pub fn next(self, previous: i64, observed_max: Option<i64>, now: i64) -> i64 {
        let candidate = match self {
            Self::FetchTime => now,
            Self::MaxObserved { overlap } => {
                let overlap = i64::try_from(overlap.as_millis().max(0)).unwrap_or(i64::MAX);
                observed_max.map_or(previous, |max| max.saturating_sub(overlap))
            }
        };
        candidate.max(previous)
    }
}

/// Incremental item synchronization with the remote store.
///
/// All collaborators are injected, there is no ambient state besides the
/// watermark kept in the [`WatermarkCache`].
#[derive(Clone)]
pub struct ItemSync {
    session: Arc<dyn AuthSession>,
    store: Arc<dyn ItemStore>,
    uploader: Arc<dyn ImageUploader>,
    watermark: Arc<dyn WatermarkCache>,
    clock: Arc<dyn Clock>,
    policy: WatermarkPolicy,
}

impl std::fmt::Debug for ItemSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemSync")
            .field("user_id", &self.session.current_user_id())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ItemSync {
    /// Creates a new item sync with the default watermark policy.
    pub fn new(
        session: Arc<dyn AuthSession>,
        store: Arc<dyn ItemStore>,
        uploader: Arc<dyn ImageUploader>,
        watermark: Arc<dyn WatermarkCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session,
            store,
            uploader,
            watermark,
            clock,
            policy: WatermarkPolicy::default(),
        }
    }

    /// Sets the watermark policy.
    #[must_use]
    pub fn with_policy(mut self, policy: WatermarkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The watermark policy in use.
    pub fn policy(&self) -> WatermarkPolicy {
        self.policy
    }

    /// The stored watermark, zero before the first sync.
    ///
    /// # Errors
    ///
    /// Returns an error if the watermark cache can not be read.
    pub async fn watermark(&self) -> Result<i64, Error> {
        Ok(self.watermark.load().await?.unwrap_or(0))
    }

    /// Fetches the changes since the stored watermark.
    ///
    /// # Errors
    ///
    /// See [`ItemSync::fetch_changes_since`].
    pub async fn pull(&self) -> Result<ItemUpdates, Error> {
        let watermark = self.watermark().await?;
        self.fetch_changes_since(watermark).await
    }

    /// Fetches the changes since the stored watermark without advancing it.
    ///
    /// # Errors
    ///
    /// See [`ItemSync::fetch_changes`].
    pub async fn pull_pending(&self) -> Result<(ItemUpdates, PendingWatermark), Error> {
        let watermark = self.watermark().await?;
        self.fetch_changes(watermark).await
    }

    /// Fetches all item changes with `lastModified >= watermark` and
    /// classifies them into updated items and deleted ids.
    ///
    /// On success the stored watermark advances according to the policy.
    ///
    /// # Errors
    ///
    /// - [`Error::NoValidUser`] without a signed-in user, no request is made.
    /// - [`Error::UnableToFetch`] if the query fails or returns a malformed item.
    pub async fn fetch_changes_since(&self, watermark: i64) -> Result<ItemUpdates, Error> {
        let (updates, pending) = self.fetch_changes(watermark).await?;
        self.commit_watermark(pending).await;
        Ok(updates)
    }

    /// Like [`ItemSync::fetch_changes_since`], but leaves the stored
    /// watermark alone. Pass the returned [`PendingWatermark`] to
    /// [`ItemSync::commit_watermark`] once the changes are persisted.
    ///
    /// # Errors
    ///
    /// See [`ItemSync::fetch_changes_since`].
    #[tracing::instrument(skip(self))]
    pub async fn fetch_changes(
        &self,
        watermark: i64,
    ) -> Result<(ItemUpdates, PendingWatermark), Error> {
        if watermark < 0 {
            return Err(ValidationError::NegativeWatermark(watermark).into());
        }
        let user_id = self.user_id()?;

        let docs = self
            .store
            .query_modified_since(user_id, watermark)
            .await
            .map_err(|e| {
                tracing::error!(err = %e, "failed to fetch items");
                Error::fetch(&e)
            })?;

        let (updates, observed_max) = classify(&docs).map_err(|e| {
            tracing::error!(err = %e, "failed to decode item document");
            Error::UnableToFetch {
                code: None,
                message: e.to_string(),
            }
        })?;

        tracing::debug!(
            updated = updates.updated_items.len(),
            deleted = updates.deleted_item_ids.len(),
            "fetched item changes"
        );
        let pending = PendingWatermark {
            fetched_from: watermark,
            observed_max,
            fetched_at: self.clock.now_ms(),
        };
        Ok((updates, pending))
    }

    /// Advances the stored watermark past a fetch, returning the new value.
    ///
    /// The watermark never moves backwards. A failing watermark store is
    /// logged and otherwise ignored, the next fetch then re-reads the window.
    pub async fn commit_watermark(&self, pending: PendingWatermark) -> i64 {
        let stored = match self.watermark.load().await {
            Ok(a) => a.unwrap_or(0),
            Err(e) => {
                tracing::warn!(err = %e, "failed to read watermark");
                0
            }
        };

        let previous = stored.max(pending.fetched_from);
        let next = self
            .policy
            .next(previous, pending.observed_max, pending.fetched_at);
        if let Err(e) = self.watermark.store(next).await {
            tracing::warn!(err = %e, next, "failed to store watermark");
        } else {
            tracing::debug!(previous, next, "watermark advanced");
        }
        next
    }

    /// Fetches a single live item, `None` if missing or tombstoned.
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`] or [`Error::UnableToFetch`].
    pub async fn get_item(&self, id: &str) -> Result<Option<Item>, Error> {
        let user_id = self.user_id()?;
        let doc = self
            .store
            .get(user_id, &DocumentId::from(id))
            .await
            .map_err(|e| {
                tracing::error!(err = %e, id, "failed to get item");
                Error::fetch(&e)
            })?;

        match doc {
            Some(doc) if !is_tombstone(&doc) => {
                let item = Item::from_document(&doc).map_err(|e| Error::UnableToFetch {
                    code: None,
                    message: e.to_string(),
                })?;
                Ok(Some(item))
            }
            _ => Ok(None),
        }
    }

    /// Creates or updates an item, see [`ItemSync::create_item`] and
    /// [`ItemSync::update_item`].
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`], [`Error::Validation`], [`Error::UnableToUpload`]
    /// or [`Error::UnableToWrite`].
    pub async fn upsert_item(&self, upsert: ItemUpsert) -> Result<Item, Error> {
        match upsert {
            ItemUpsert::Create(new) => self.create_item(new).await,
            ItemUpsert::Update(item) => self.update_item(item).await,
        }
    }

    /// Creates a new item document.
    ///
    /// A local image is uploaded first, the document is only written once the
    /// upload returned a remote URL.
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`], [`Error::Validation`], [`Error::UnableToUpload`]
    /// (nothing written) or [`Error::UnableToWrite`].
    #[tracing::instrument(skip(self))]
    pub async fn create_item(&self, new: NewItem) -> Result<Item, Error> {
        let user_id = self.user_id()?;
        new.validate()?;

        let img_url = self.resolve_image(user_id, new.img_uri.as_deref()).await?;
        let item = new.into_item(String::new(), img_url);

        let fields = item.to_fields(self.clock.now_ms());
        let id = self.store.add(user_id, fields).await.map_err(|e| {
            tracing::error!(err = %e, "failed to add item");
            Error::write(&e)
        })?;

        tracing::info!(%id, name = %item.name, "item created");
        Ok(Item {
            id: id.into_string(),
            ..item
        })
    }

    /// Overwrites an existing item document.
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`], [`Error::Validation`], [`Error::UnableToUpload`]
    /// (nothing written) or [`Error::UnableToWrite`].
    #[tracing::instrument(skip(self))]
    pub async fn update_item(&self, mut item: Item) -> Result<Item, Error> {
        let user_id = self.user_id()?;
        item.validate()?;

        item.img_url = self.resolve_image(user_id, Some(&item.img_url)).await?;

        let fields = item.to_fields(self.clock.now_ms());
        let id = DocumentId::from(item.id.as_str());
        self.store.set(user_id, &id, fields).await.map_err(|e| {
            tracing::error!(err = %e, %id, "failed to update item");
            Error::write(&e)
        })?;

        tracing::info!(%id, "item updated");
        Ok(item)
    }

    /// Tombstones an item: strips its content, marks it deleted and re-stamps
    /// `lastModified`. The document id is retained.
    ///
    /// # Errors
    ///
    /// [`Error::NoValidUser`] or [`Error::UnableToWrite`].
    #[tracing::instrument(skip(self))]
    pub async fn tombstone(&self, id: &str) -> Result<(), Error> {
        let user_id = self.user_id()?;

        let patch = fields::CONTENT
            .iter()
            .fold(FieldPatch::new(), |patch, name| patch.delete(*name))
            .set(fields::DELETED, true)
            .set(fields::LAST_MODIFIED, self.clock.now_ms());

        self.store
            .update(user_id, &DocumentId::from(id), patch)
            .await
            .map_err(|e| {
                tracing::error!(err = %e, id, "failed to remove item");
                Error::write(&e)
            })?;

        tracing::info!(id, "item tombstoned");
        Ok(())
    }

    fn user_id(&self) -> Result<&str, Error> {
        self.session.current_user_id().ok_or(Error::NoValidUser)
    }

    /// Uploads a local image and returns the remote URL; empty and already
    /// remote references pass through untouched.
    async fn resolve_image(&self, user_id: &str, img: Option<&str>) -> Result<String, Error> {
        let Some(img) = img.map(str::trim).filter(|a| !a.is_empty()) else {
            return Ok(String::new());
        };
        if is_remote_url(img) {
            return Ok(img.to_string());
        }

        tracing::debug!(path = img, "uploading local image");
        let url = self.uploader.upload(user_id, img).await.map_err(|e| {
            tracing::error!(err = %e, path = img, "failed to upload image");
            Error::upload(&e)
        })?;

        if !is_remote_url(&url) {
            tracing::error!(%url, "upload returned an invalid URL");
            return Err(Error::UnableToUpload {
                code: None,
                message: format!("upload returned an invalid URL: {url:?}"),
            });
        }
        Ok(url)
    }
}

/// Splits fetched documents into live items and tombstoned ids, returning the
/// largest observed `lastModified` as well.
///
/// Each id lands in exactly one list; a repeated id keeps its first occurrence.
fn classify(docs: &[Document]) -> Result<(ItemUpdates, Option<i64>), serde_json::Error> {
    let mut updates = ItemUpdates::default();
    let mut seen = HashSet::with_capacity(docs.len());
    let mut observed_max = None;

    for doc in docs {
        if let Some(ts) = last_modified(doc) {
            observed_max = Some(observed_max.map_or(ts, |max: i64| max.max(ts)));
        }

        if !seen.insert(doc.id.as_str()) {
            tracing::warn!(id = %doc.id, "duplicate document in query result");
            continue;
        }

        if is_tombstone(doc) {
            updates.deleted_item_ids.push(doc.id.as_str().to_string());
        } else {
            updates.updated_items.push(Item::from_document(doc)?);
        }
    }

    Ok((updates, observed_max))
}

fn is_tombstone(doc: &Document) -> bool {
    doc.get(fields::DELETED).is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|a| a != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn last_modified(doc: &Document) -> Option<i64> {
    let value = doc.get(fields::LAST_MODIFIED)?;
    value.as_i64().or_else(|| value.as_f64().map(|a| a as i64))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(id: &str, fields: Value) -> Document {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object")
        };
        Document::new(DocumentId::from(id), fields)
    }

    #[test]
    fn classify_splits_live_and_deleted() {
        let docs = vec![
            doc("1", json!({"name": "Apple", "calories": 95, "lastModified": 100})),
            doc("2", json!({"deleted": true, "lastModified": 200})),
        ];
        let (updates, max) = classify(&docs).unwrap();

        assert_eq!(updates.updated_items.len(), 1);
        assert_eq!(updates.updated_items[0].id, "1");
        assert_eq!(updates.updated_items[0].name, "Apple");
        assert_eq!(updates.deleted_item_ids, vec!["2".to_string()]);
        assert_eq!(max, Some(200));
    }

    #[test]
    fn classify_keeps_first_of_duplicate_ids() {
        let docs = vec![
            doc("1", json!({"deleted": true, "lastModified": 300})),
            doc("1", json!({"name": "Apple", "lastModified": 100})),
        ];
        let (updates, max) = classify(&docs).unwrap();
        assert!(updates.updated_items.is_empty());
        assert_eq!(updates.deleted_item_ids, vec!["1".to_string()]);
        assert_eq!(max, Some(300));
    }

    #[test]
    fn deleted_marker_is_truthy_check() {
        assert!(is_tombstone(&doc("a", json!({"deleted": true}))));
        assert!(is_tombstone(&doc("a", json!({"deleted": 1}))));
        assert!(!is_tombstone(&doc("a", json!({"deleted": false, "name": "x"}))));
        assert!(!is_tombstone(&doc("a", json!({"deleted": null, "name": "x"}))));
        assert!(!is_tombstone(&doc("a", json!({"name": "x"}))));
    }

    #[test]
    fn last_modified_accepts_floats() {
        assert_eq!(last_modified(&doc("a", json!({"lastModified": 12.0}))), Some(12));
        assert_eq!(last_modified(&doc("a", json!({"lastModified": "12"}))), None);
        assert_eq!(last_modified(&doc("a", json!({}))), None);
    }

    #[test]
    fn fetch_time_policy_stamps_now() {
        let policy = WatermarkPolicy::FetchTime;
        assert_eq!(policy.next(100, Some(500), 1_000), 1_000);
        assert_eq!(policy.next(100, None, 1_000), 1_000);
        // never decremented, even with a clock behind the stored watermark
        assert_eq!(policy.next(2_000, None, 1_000), 2_000);
    }

    #[test]
    fn max_observed_policy_subtracts_overlap() {
        let policy = WatermarkPolicy::MaxObserved {
            overlap: SignedDuration::from_millis(50),
        };
        assert_eq!(policy.next(100, Some(500), 1_000), 450);
        assert_eq!(policy.next(100, None, 1_000), 100);
        assert_eq!(policy.next(480, Some(500), 1_000), 480);
    }
}
