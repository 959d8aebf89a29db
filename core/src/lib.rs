// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Core of kcal: food items, their incremental synchronization with the
//! remote document store, a local SQLite cache, the consumption log, user
//! settings and data export.

mod config;
mod consumption;
mod error;
mod export;
mod item;
mod kcal;
mod localdb;
mod remote;
mod settings;
mod store;
mod sync;

pub use crate::config::{APP_NAME, Config, SessionConfig, WatermarkPolicyKind};
pub use crate::consumption::{Consumption, DailySummary};
pub use crate::error::{Error, ValidationError};
pub use crate::export::ExportData;
pub use crate::item::{Item, ItemPatch, ItemUpdates, ItemUpsert, NewItem, is_remote_url};
pub use crate::kcal::{Backends, Kcal, SyncReport};
pub use crate::localdb::{DB_FILENAME, LocalDb, SqliteWatermark};
pub use crate::settings::Settings;
pub use crate::store::{
    AuthSession, Clock, ImageUploader, ItemStore, Session, SettingsStore, SystemClock,
    WatermarkCache,
};
pub use crate::sync::{ItemSync, PendingWatermark, WatermarkPolicy};

pub use kcal_docstore::{Document, DocumentId, FieldPatch};
