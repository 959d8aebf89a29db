// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::Timestamp;

use crate::{Consumption, Item, Settings};

/// A snapshot of the user's data, written as JSON by [`crate::Kcal::export`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// Time of the export.
    pub exported_at: Timestamp,
    /// User settings, defaults if they could not be read.
    pub settings: Settings,
    /// Items of the local cache.
    pub items: Vec<Item>,
    /// The consumption log, oldest first.
    pub consumptions: Vec<Consumption>,
}

impl ExportData {
    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
