// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use serde_json::{Map, Value};

/// Document identifier.
///
/// A `DocumentId` is an opaque string assigned by the store when a document
/// is created. It stays valid after a document is tombstoned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new `DocumentId` from a string.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for DocumentId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A stored document: its id and its JSON fields.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    /// The id of the document.
    pub id: DocumentId,
    /// The document fields.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Creates a new `Document`.
    #[must_use]
    pub const fn new(id: DocumentId, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Comparison operator of a range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FilterOp {
    /// `field >= value`
    #[serde(rename = ">=")]
    Gte,
    /// `field > value`
    #[serde(rename = ">")]
    Gt,
    /// `field == value`
    #[serde(rename = "==")]
    Eq,
}

/// A single-field query filter.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Filter {
    /// Field to compare.
    pub field: String,
    /// Comparison operator.
    pub op: FilterOp,
    /// Value to compare against.
    pub value: Value,
}

impl Filter {
    /// Creates a `field >= value` filter.
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte,
            value: value.into(),
        }
    }
}

/// A field-level update: fields to set and fields to delete.
///
/// Fields listed for deletion are removed from the stored document; fields
/// not mentioned are left untouched.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FieldPatch {
    /// Fields to set.
    pub fields: Map<String, Value>,
    /// Names of fields to delete.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<String>,
}

impl FieldPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Deletes a field.
    #[must_use]
    pub fn delete(mut self, name: impl Into<String>) -> Self {
        self.delete.push(name.into());
        self
    }

    /// Returns true if the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.delete.is_empty()
    }
}
