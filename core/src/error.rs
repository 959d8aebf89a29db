// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use kcal_docstore::DocStoreError;

/// Errors of the kcal core.
///
/// The remote variants keep the backend's original error code, if any, so
/// that callers can look up a localized message through [`Error::code`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No authenticated session is established.
    #[error("No valid user, please sign in again")]
    NoValidUser,

    /// Reading from the remote store failed.
    #[error("Unable to fetch items: {message}")]
    UnableToFetch {
        /// Backend error code.
        code: Option<String>,
        /// Diagnostic message.
        message: String,
    },

    /// Uploading an image failed; nothing was written.
    #[error("Unable to upload image: {message}")]
    UnableToUpload {
        /// Backend error code.
        code: Option<String>,
        /// Diagnostic message.
        message: String,
    },

    /// Writing a document to the remote store failed.
    #[error("Unable to write item: {message}")]
    UnableToWrite {
        /// Backend error code.
        code: Option<String>,
        /// Diagnostic message.
        message: String,
    },

    /// Input rejected before reaching any store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Local I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Date or time conversion error.
    #[error("Time error: {0}")]
    Time(#[from] jiff::Error),
}

impl Error {
    pub(crate) fn fetch(e: &DocStoreError) -> Self {
        Self::UnableToFetch {
            code: e.code().map(ToString::to_string),
            message: e.to_string(),
        }
    }

    pub(crate) fn upload(e: &DocStoreError) -> Self {
        Self::UnableToUpload {
            code: e.code().map(ToString::to_string),
            message: e.to_string(),
        }
    }

    pub(crate) fn write(e: &DocStoreError) -> Self {
        Self::UnableToWrite {
            code: e.code().map(ToString::to_string),
            message: e.to_string(),
        }
    }

    /// Stable key for localized messages: the backend code when the store
    /// provided one, otherwise a generic code per error kind.
    pub fn code(&self) -> &str {
        match self {
            Self::NoValidUser => "auth/no-valid-user",
            Self::UnableToFetch { code, .. } => code.as_deref().unwrap_or("unable-to-get-item"),
            Self::UnableToUpload { code, .. } => {
                code.as_deref().unwrap_or("unable-to-upload-image")
            }
            Self::UnableToWrite { code, .. } => code.as_deref().unwrap_or("unable-to-write-item"),
            Self::Validation(e) => e.code(),
            Self::NotFound(_) => "not-found",
            Self::Config(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Time(_) => "unexpected-error",
        }
    }
}

/// Invalid user input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// An item needs a name.
    #[error("A name is required to create an item")]
    MissingName,

    /// Nutrition values can not be negative.
    #[error("{field} can not be negative: {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A consumption needs a positive quantity.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// Watermarks are milliseconds since the epoch.
    #[error("Watermark can not be negative: {0}")]
    NegativeWatermark(i64),
}

impl ValidationError {
    /// Stable key for localized messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingName => "create/no-name",
            Self::Negative { .. } => "create/negative-value",
            Self::ZeroQuantity => "consume/zero-quantity",
            Self::NegativeWatermark(_) => "sync/negative-watermark",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_prefer_backend_code() {
        let backend = DocStoreError::Api {
            status: 403,
            code: Some("permission-denied".to_string()),
            message: "denied".to_string(),
        };
        assert_eq!(Error::fetch(&backend).code(), "permission-denied");
        assert_eq!(Error::upload(&backend).code(), "permission-denied");
        assert_eq!(Error::write(&backend).code(), "permission-denied");
    }

    #[test]
    fn remote_errors_fall_back_to_generic_code() {
        let backend = DocStoreError::Http("connection refused".to_string());
        assert_eq!(Error::fetch(&backend).code(), "unable-to-get-item");
        assert_eq!(Error::upload(&backend).code(), "unable-to-upload-image");
        assert_eq!(Error::write(&backend).code(), "unable-to-write-item");
        assert_eq!(Error::NoValidUser.code(), "auth/no-valid-user");
    }

    #[test]
    fn validation_codes() {
        assert_eq!(
            Error::from(ValidationError::MissingName).code(),
            "create/no-name"
        );
        let e = ValidationError::Negative {
            field: "fat",
            value: -1.0,
        };
        assert_eq!(e.to_string(), "fat can not be negative: -1");
    }
}
