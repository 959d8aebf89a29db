// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use tokio::fs;

use kcal_core::{APP_NAME, Config as CoreConfig};

const KCAL_CONFIG_ENV: &str = "KCAL_CONFIG";
const KCAL_DEV_ENV: &str = "KCAL_DEV";

const KCAL_DEV_VALID_TRUE: &[&str] = &["1", "true", "yes"];
const KCAL_DEV_VALID_FALSE: &[&str] = &["0", "false", "no"];

/// Reads the configuration from `path`, `$KCAL_CONFIG` or the user config dir, in that order.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<(CoreConfig, Config), Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(KCAL_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        if let Some(true) = is_dev_mode() {
            return Err(format!(
                "Development environment detected ({KCAL_DEV_ENV} is set): config must be explicitly specified via --config or {KCAL_CONFIG_ENV} environment variable",
            ).into());
        }
        let config = get_config_dir()?.join(format!("{APP_NAME}/config.toml"));
        if !config.exists() {
            return Err(format!("No config found at: {}", config.display()).into());
        }
        config
    };

    tracing::debug!(path = %path.display(), "reading config");
    let raw = fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<ConfigRaw>()
        .map_err(|e| format!("Invalid config file at {}: {}", path.display(), e))?;
    Ok((raw.core, raw.cli))
}

/// Settings of the command-line interface itself.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Config {
    /// Print the table header of item lists.
    #[serde(default = "default_true")]
    pub header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { header: true }
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, serde::Deserialize)]
struct ConfigRaw {
    core: CoreConfig,
    #[serde(default)]
    cli: Config,
}

impl FromStr for ConfigRaw {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific home directory not found".into())
}

fn is_dev_mode() -> Option<bool> {
    let val = std::env::var(KCAL_DEV_ENV).ok()?;
    let lower = val.to_lowercase();
    if KCAL_DEV_VALID_TRUE.contains(&lower.as_str()) {
        Some(true)
    } else if KCAL_DEV_VALID_FALSE.contains(&lower.as_str()) {
        Some(false)
    } else {
        tracing::warn!(
            "Unrecognized value for {}: '{}'. Expected one of: {}. Treating as unset.",
            KCAL_DEV_ENV,
            val,
            format!(
                "true: {}, false: {}",
                KCAL_DEV_VALID_TRUE.join(", "),
                KCAL_DEV_VALID_FALSE.join(", ")
            )
        );
        None
    }
}
