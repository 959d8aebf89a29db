// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Store implementations backed by the remote document store.

use std::path::Path;

use async_trait::async_trait;
use kcal_docstore::{DocStoreClient, DocStoreError, Document, DocumentId, FieldPatch, Filter};
use serde_json::{Map, Value};

use crate::item::fields;
use crate::store::{ImageUploader, ItemStore, SettingsStore};

/// Collection holding the item documents of a user.
pub const ITEMS_COLLECTION: &str = "items";

#[async_trait]
impl ItemStore for DocStoreClient {
    async fn query_modified_since(
        &self,
        user_id: &str,
        since: i64,
    ) -> Result<Vec<Document>, DocStoreError> {
        let filter = Filter::gte(fields::LAST_MODIFIED, since);
        self.query(user_id, ITEMS_COLLECTION, &filter).await
    }

    async fn get(
        &self,
        user_id: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocStoreError> {
        DocStoreClient::get(self, user_id, ITEMS_COLLECTION, id).await
    }

    async fn add(
        &self,
        user_id: &str,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, DocStoreError> {
        DocStoreClient::add(self, user_id, ITEMS_COLLECTION, &fields).await
    }

    async fn set(
        &self,
        user_id: &str,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<(), DocStoreError> {
        DocStoreClient::set(self, user_id, ITEMS_COLLECTION, id, &fields).await
    }

    async fn update(
        &self,
        user_id: &str,
        id: &DocumentId,
        patch: FieldPatch,
    ) -> Result<(), DocStoreError> {
        DocStoreClient::update(self, user_id, ITEMS_COLLECTION, id, &patch).await
    }
}

#[async_trait]
impl SettingsStore for DocStoreClient {
    async fn get_user(&self, user_id: &str) -> Result<Option<Document>, DocStoreError> {
        DocStoreClient::get_user(self, user_id).await
    }

    async fn update_user(&self, user_id: &str, patch: FieldPatch) -> Result<(), DocStoreError> {
        DocStoreClient::update_user(self, user_id, &patch).await
    }
}

#[async_trait]
impl ImageUploader for DocStoreClient {
    async fn upload(&self, user_id: &str, local: &str) -> Result<String, DocStoreError> {
        // accept file URIs as produced by image pickers
        let path = local.strip_prefix("file://").unwrap_or(local);
        self.upload_image(user_id, Path::new(path)).await
    }
}
