// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and error body decoding.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};

use crate::config::{AuthMethod, DocStoreConfig};
use crate::error::DocStoreError;

/// HTTP client for document store operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: DocStoreConfig,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: DocStoreConfig) -> Result<Self, DocStoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.config.auth {
            AuthMethod::Bearer { token } => req.bearer_auth(token),
            AuthMethod::None => req,
        }
    }

    /// Executes a request and checks for HTTP errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns an error status code.
    /// Error bodies of the form `{"error": {"code": .., "message": ..}}` are
    /// decoded so the backend code is preserved.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, DocStoreError> {
        let resp = req.send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());
        Err(decode_error(status, &text))
    }

    /// Joins path segments onto a base URL, escaping each segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or cannot carry a path.
    pub fn url(base: &str, segments: &[&str]) -> Result<Url, DocStoreError> {
        let mut url = Url::parse(base)
            .map_err(|e| DocStoreError::Config(format!("Invalid base URL {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| DocStoreError::Config(format!("Base URL cannot be a base: {base}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn decode_error(status: StatusCode, text: &str) -> DocStoreError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => DocStoreError::Api {
            status: status.as_u16(),
            code: body.error.code,
            message: body.error.message.unwrap_or_else(|| status.to_string()),
        },
        Err(_) => DocStoreError::Api {
            status: status.as_u16(),
            code: None,
            message: format!("{status}: {text}"),
        },
    }
}
