// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Collaborators of the item sync: remote store, image upload, watermark
//! cache, auth session and clock.

use async_trait::async_trait;
use kcal_docstore::{DocStoreError, Document, DocumentId, FieldPatch};
use serde_json::{Map, Value};

use crate::error::Error;

/// The authenticated user's item collection on the remote store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All documents whose `lastModified` is at or after `since`, tombstones included.
    async fn query_modified_since(
        &self,
        user_id: &str,
        since: i64,
    ) -> Result<Vec<Document>, DocStoreError>;

    /// A single document, `None` if it does not exist.
    async fn get(
        &self,
        user_id: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocStoreError>;

    /// Creates a document, the store assigns the id.
    async fn add(
        &self,
        user_id: &str,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, DocStoreError>;

    /// Replaces all fields of a document.
    async fn set(
        &self,
        user_id: &str,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<(), DocStoreError>;

    /// Sets and deletes individual fields of a document.
    async fn update(
        &self,
        user_id: &str,
        id: &DocumentId,
        patch: FieldPatch,
    ) -> Result<(), DocStoreError>;
}

/// The user document holding per-user data such as settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fields of the user document, `None` if it does not exist.
    async fn get_user(&self, user_id: &str) -> Result<Option<Document>, DocStoreError>;

    /// Sets and deletes individual fields of the user document.
    async fn update_user(&self, user_id: &str, patch: FieldPatch) -> Result<(), DocStoreError>;
}

/// Uploads local images to remote storage.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads the image at `local` and returns its remote URL.
    async fn upload(&self, user_id: &str, local: &str) -> Result<String, DocStoreError>;
}

/// Persistent storage of the sync watermark.
#[async_trait]
pub trait WatermarkCache: Send + Sync {
    /// The last stored watermark, `None` before the first sync.
    async fn load(&self) -> Result<Option<i64>, Error>;

    /// Stores a new watermark.
    async fn store(&self, watermark: i64) -> Result<(), Error>;
}

/// Source of the current user identity.
pub trait AuthSession: Send + Sync {
    /// Id of the signed-in user, `None` if nobody is signed in.
    fn current_user_id(&self) -> Option<&str>;
}

/// A fixed session, typically built from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    /// A session of the given user.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// A session without a signed-in user.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

impl AuthSession for Session {
    fn current_user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|a| !a.is_empty())
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        jiff::Timestamp::now().as_millisecond()
    }
}
