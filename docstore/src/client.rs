// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Document store client for per-user collections and image storage.

use std::path::Path;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use tokio::fs;

use crate::config::DocStoreConfig;
use crate::error::DocStoreError;
use crate::http::HttpClient;
use crate::types::{Document, DocumentId, FieldPatch, Filter};

const USERS: &str = "users";

/// Client for accessing a user's documents on the document store.
///
/// # Example
///
/// ```ignore
/// use kcal_docstore::{AuthMethod, DocStoreClient, DocStoreConfig, Filter};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DocStoreConfig {
///     base_url: "https://db.example.com/v1".to_string(),
///     auth: AuthMethod::Bearer {
///         token: "id-token".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = DocStoreClient::new(config)?;
/// let docs = client
///     .query("user-id", "items", &Filter::gte("lastModified", 0))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocStoreClient {
    http: Arc<HttpClient>,
    config: DocStoreConfig,
}

#[derive(Debug, serde::Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, serde::Deserialize)]
struct CreatedResponse {
    id: DocumentId,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    download_url: String,
}

#[derive(Debug, serde::Serialize)]
struct FieldsBody<'a> {
    fields: &'a Map<String, Value>,
}

impl DocStoreClient {
    /// Creates a new document store client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(config: DocStoreConfig) -> Result<Self, DocStoreError> {
        let http = HttpClient::new(config.clone())?;
        Ok(Self {
            http: Arc::new(http),
            config,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &DocStoreConfig {
        &self.config
    }

    /// Runs a single-field range query over a user's collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn query(
        &self,
        user_id: &str,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocStoreError> {
        let segment = format!("{collection}:query");
        let url = HttpClient::url(&self.config.base_url, &[USERS, user_id, segment.as_str()])?;
        let resp = self
            .http
            .execute(self.http.build_request(Method::POST, url).json(filter))
            .await?;

        let body: QueryResponse = serde_json::from_str(&resp.text().await?)?;
        tracing::debug!(count = body.documents.len(), "query returned documents");
        Ok(body.documents)
    }

    /// Gets a single document by id, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn get(
        &self,
        user_id: &str,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocStoreError> {
        let url = HttpClient::url(
            &self.config.base_url,
            &[USERS, user_id, collection, id.as_str()],
        )?;
        self.get_document(url).await
    }

    /// Creates a new document and returns the id assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn add(
        &self,
        user_id: &str,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> Result<DocumentId, DocStoreError> {
        let url = HttpClient::url(&self.config.base_url, &[USERS, user_id, collection])?;
        let resp = self
            .http
            .execute(
                self.http
                    .build_request(Method::POST, url)
                    .json(&FieldsBody { fields }),
            )
            .await?;

        let created: CreatedResponse = serde_json::from_str(&resp.text().await?)?;
        Ok(created.id)
    }

    /// Replaces the fields of a document, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn set(
        &self,
        user_id: &str,
        collection: &str,
        id: &DocumentId,
        fields: &Map<String, Value>,
    ) -> Result<(), DocStoreError> {
        let url = HttpClient::url(
            &self.config.base_url,
            &[USERS, user_id, collection, id.as_str()],
        )?;
        self.http
            .execute(
                self.http
                    .build_request(Method::PUT, url)
                    .json(&FieldsBody { fields }),
            )
            .await?;
        Ok(())
    }

    /// Applies a field-level patch to an existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails, e.g. the document is missing.
    pub async fn update(
        &self,
        user_id: &str,
        collection: &str,
        id: &DocumentId,
        patch: &FieldPatch,
    ) -> Result<(), DocStoreError> {
        let url = HttpClient::url(
            &self.config.base_url,
            &[USERS, user_id, collection, id.as_str()],
        )?;
        self.http
            .execute(self.http.build_request(Method::PATCH, url).json(patch))
            .await?;
        Ok(())
    }

    /// Gets the user document itself, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<Document>, DocStoreError> {
        let url = HttpClient::url(&self.config.base_url, &[USERS, user_id])?;
        self.get_document(url).await
    }

    /// Applies a field-level patch to the user document.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_user(
        &self,
        user_id: &str,
        patch: &FieldPatch,
    ) -> Result<(), DocStoreError> {
        let url = HttpClient::url(&self.config.base_url, &[USERS, user_id])?;
        self.http
            .execute(self.http.build_request(Method::PATCH, url).json(patch))
            .await?;
        Ok(())
    }

    /// Uploads a local image file and returns its download URL.
    ///
    /// The object name is a fresh UUID keeping the file extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    #[tracing::instrument(skip(self))]
    pub async fn upload_image(&self, user_id: &str, path: &Path) -> Result<String, DocStoreError> {
        let bytes = fs::read(path).await?;
        let ext = path
            .extension()
            .and_then(|a| a.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "jpg".to_string());
        let name = format!("{}.{ext}", uuid::Uuid::new_v4());

        let url = HttpClient::url(
            self.config.storage_url(),
            &[USERS, user_id, "images", name.as_str()],
        )?;
        let resp = self
            .http
            .execute(
                self.http
                    .build_request(Method::PUT, url)
                    .header("Content-Type", content_type(&ext))
                    .body(bytes),
            )
            .await?;

        let uploaded: UploadResponse = serde_json::from_str(&resp.text().await?)?;
        tracing::debug!(url = %uploaded.download_url, "image uploaded");
        Ok(uploaded.download_url)
    }

    async fn get_document(&self, url: reqwest::Url) -> Result<Option<Document>, DocStoreError> {
        match self
            .http
            .execute(self.http.build_request(Method::GET, url))
            .await
        {
            Ok(resp) => Ok(Some(serde_json::from_str(&resp.text().await?)?)),
            Err(DocStoreError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_defaults_to_jpeg() {
        assert_eq!(content_type("png"), "image/png");
        assert_eq!(content_type("jpg"), "image/jpeg");
        assert_eq!(content_type("jpeg"), "image/jpeg");
        assert_eq!(content_type("bmp"), "image/jpeg");
    }
}
