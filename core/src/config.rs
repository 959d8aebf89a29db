// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::path::{Path, PathBuf};

use jiff::SignedDuration;
use kcal_docstore::DocStoreConfig;
use serde::de;

use crate::error::Error;
use crate::store::Session;
use crate::sync::WatermarkPolicy;

/// The name of the kcal application.
pub const APP_NAME: &str = "kcal";

/// Overlap used by the max-observed policy when none is configured.
const DEFAULT_WATERMARK_OVERLAP: SignedDuration = SignedDuration::from_secs(30);

/// Configuration for the kcal application.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Directory for storing application state.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// How the sync watermark advances.
    #[serde(default)]
    pub watermark_policy: WatermarkPolicyKind,

    /// Overlap window of the max-observed watermark policy.
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub watermark_overlap: Option<SignedDuration>,

    /// Remote document store.
    pub remote: DocStoreConfig,

    /// Signed-in user.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Configured watermark policy, see [`WatermarkPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPolicyKind {
    /// Stamp the client time at fetch completion.
    #[default]
    FetchTime,
    /// Use the largest observed server timestamp minus an overlap.
    MaxObserved,
}

/// The signed-in user, absent when nobody is signed in.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SessionConfig {
    /// Id of the signed-in user.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Config {
    /// Normalize the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a path can not be expanded or a value is out of range.
    pub fn normalize(&mut self) -> Result<(), Error> {
        // Normalize state directory
        match &self.state_dir {
            Some(a) => {
                self.state_dir = Some(expand_path(a).map_err(|e| {
                    Error::Config(format!("Failed to expand state directory path: {e}"))
                })?);
            }

            None => match get_state_dir() {
                Ok(a) => self.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        }

        if self.watermark_overlap.is_some_and(|a| a.is_negative()) {
            return Err(Error::Config("watermark_overlap can not be negative".into()));
        }

        if self.remote.base_url.trim().is_empty() {
            return Err(Error::Config("remote.base_url is required".into()));
        }

        Ok(())
    }

    /// The watermark policy described by this configuration.
    pub fn watermark_policy(&self) -> WatermarkPolicy {
        match self.watermark_policy {
            WatermarkPolicyKind::FetchTime => WatermarkPolicy::FetchTime,
            WatermarkPolicyKind::MaxObserved => WatermarkPolicy::MaxObserved {
                overlap: self.watermark_overlap.unwrap_or(DEFAULT_WATERMARK_OVERLAP),
            },
        }
    }

    /// The session of the configured user.
    pub fn session(&self) -> Session {
        match &self.session.user_id {
            Some(id) => Session::user(id.trim()),
            None => Session::anonymous(),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<SignedDuration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct DurationVisitor;

    impl de::Visitor<'_> for DurationVisitor {
        type Value = Option<SignedDuration>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str(r#"a duration string like "500ms", "30s", "5m" or "1h""#)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(value)
                .map(Some)
                .map_err(|e| de::Error::custom(e.to_string()))
        }
    }

    deserializer.deserialize_str(DurationVisitor)
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path
        .to_str()
        .ok_or_else(|| Error::Config("Invalid path".into()))?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle state directories
    let state_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_STATE_HOME/", "${XDG_STATE_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in state_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_state_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Error> {
    dirs::home_dir().ok_or_else(|| Error::Config("User-specific home directory not found".into()))
}

fn get_state_dir() -> Result<PathBuf, Error> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_local_dir();
    state_dir.ok_or_else(|| Error::Config("User-specific state directory not found".into()))
}

/// Parse a duration string in the format "500ms" / "30s" / "5m" / "1h".
fn parse_duration(s: &str) -> Result<SignedDuration, Error> {
    let invalid = || Error::Config(format!("Invalid duration format: {s}"));
    let s = s.trim();

    let (rest, unit_ms) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, 1)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, 1_000)
    } else if let Some(rest) = s.strip_suffix('m') {
        (rest, 60_000)
    } else if let Some(rest) = s.strip_suffix('h') {
        (rest, 3_600_000)
    } else {
        return Err(invalid());
    };

    let value: i64 = rest.trim().parse().map_err(|_| invalid())?;
    let ms = value.checked_mul(unit_ms).ok_or_else(invalid)?;
    Ok(SignedDuration::from_millis(ms))
}
