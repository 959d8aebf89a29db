// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Document store client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DocStoreError {
    /// Transport level error, the request never produced a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The store answered with an error status.
    #[error("Document store error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Backend error code such as `permission-denied`, if the body carried one.
        code: Option<String>,
        /// Human readable message.
        message: String,
    },

    /// Invalid or unexpected response body.
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O error, e.g. reading an image before upload.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocStoreError {
    /// Returns the backend error code, if the store reported one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DocStoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<serde_json::Error> for DocStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}
