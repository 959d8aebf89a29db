// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client for the per-user document store and image storage backing kcal.
//!
//! The store keeps one collection of documents per user. Documents are JSON
//! objects addressed by an opaque id; the store supports range queries on a
//! single field, point reads, full writes, and field-level patches including
//! field deletion.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(clippy::similar_names, clippy::single_match_else)]

mod client;
mod config;
mod error;
mod http;
mod types;

pub use crate::client::DocStoreClient;
pub use crate::config::{AuthMethod, DocStoreConfig};
pub use crate::error::DocStoreError;
pub use crate::types::{Document, DocumentId, FieldPatch, Filter, FilterOp};
