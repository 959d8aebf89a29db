// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use kcal_docstore::Document;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Document field names shared by every item document.
pub(crate) mod fields {
    pub const NAME: &str = "name";
    pub const CALORIES: &str = "calories";
    pub const CARBOHYDRATES: &str = "carbohydrates";
    pub const FAT: &str = "fat";
    pub const PROTEIN: &str = "protein";
    pub const IMG_URL: &str = "imgUrl";
    pub const LAST_MODIFIED: &str = "lastModified";
    pub const DELETED: &str = "deleted";

    /// Fields cleared when an item is tombstoned.
    pub const CONTENT: [&str; 6] = [CALORIES, CARBOHYDRATES, FAT, IMG_URL, NAME, PROTEIN];
}

/// A food item.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Id assigned by the remote store.
    pub id: String,
    /// Name of the item, never empty.
    pub name: String,
    /// Calories in kcal.
    pub calories: f64,
    /// Carbohydrates in grams.
    pub carbohydrates: f64,
    /// Fat in grams.
    pub fat: f64,
    /// Protein in grams.
    pub protein: f64,
    /// Image URL, empty if the item has no image.
    ///
    /// Before an update this may hold a local path; it is replaced by the
    /// uploaded URL before anything is written.
    #[serde(default)]
    pub img_url: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemFields {
    #[serde(default)]
    name: String,
    #[serde(default)]
    calories: f64,
    #[serde(default)]
    carbohydrates: f64,
    #[serde(default)]
    fat: f64,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    img_url: Option<String>,
}

impl Item {
    /// Maps a live (non-tombstoned) document into an item.
    ///
    /// A missing `imgUrl` becomes an empty string.
    pub(crate) fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        let f: ItemFields = serde_json::from_value(Value::Object(doc.fields.clone()))?;
        Ok(Self {
            id: doc.id.as_str().to_string(),
            name: f.name,
            calories: f.calories,
            carbohydrates: f.carbohydrates,
            fat: f.fat,
            protein: f.protein,
            img_url: f.img_url.unwrap_or_default(),
        })
    }

    /// Document fields of this item, stamped with `last_modified`.
    pub(crate) fn to_fields(&self, last_modified: i64) -> Map<String, Value> {
        content_fields(
            &self.name,
            [self.calories, self.carbohydrates, self.fat, self.protein],
            &self.img_url,
            last_modified,
        )
    }

    /// Checks the item invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or any value is negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(
            &self.name,
            [self.calories, self.carbohydrates, self.fat, self.protein],
        )
    }
}

/// An item to be created, the remote store assigns the id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    /// Name of the item.
    pub name: String,
    /// Calories in kcal.
    pub calories: f64,
    /// Carbohydrates in grams.
    pub carbohydrates: f64,
    /// Fat in grams.
    pub fat: f64,
    /// Protein in grams.
    pub protein: f64,
    /// Image reference: a local path to upload, or an already uploaded URL.
    pub img_uri: Option<String>,
}

impl NewItem {
    /// Creates a new item draft with the given name and calories.
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            name: name.into(),
            calories,
            ..Default::default()
        }
    }

    /// Checks the item invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or any value is negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(
            &self.name,
            [self.calories, self.carbohydrates, self.fat, self.protein],
        )
    }

    pub(crate) fn into_item(self, id: String, img_url: String) -> Item {
        Item {
            id,
            name: self.name.trim().to_string(),
            calories: self.calories,
            carbohydrates: self.carbohydrates,
            fat: self.fat,
            protein: self.protein,
            img_url,
        }
    }
}

/// Create-or-update request for a single item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemUpsert {
    /// Create a new document.
    Create(NewItem),
    /// Overwrite the document with the item's id.
    Update(Item),
}

/// Partial update of an item, `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    /// New name.
    pub name: Option<String>,
    /// New calories.
    pub calories: Option<f64>,
    /// New carbohydrates.
    pub carbohydrates: Option<f64>,
    /// New fat.
    pub fat: Option<f64>,
    /// New protein.
    pub protein: Option<f64>,
    /// New image reference, an empty string removes the image.
    pub img: Option<String>,
}

impl ItemPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the patch to an item.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(v) = self.calories {
            item.calories = v;
        }
        if let Some(v) = self.carbohydrates {
            item.carbohydrates = v;
        }
        if let Some(v) = self.fat {
            item.fat = v;
        }
        if let Some(v) = self.protein {
            item.protein = v;
        }
        if let Some(img) = &self.img {
            item.img_url.clone_from(img);
        }
    }
}

/// Changes of the item collection since a watermark.
///
/// An id appears in at most one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdates {
    /// Items created or changed since the watermark, in store order.
    pub updated_items: Vec<Item>,
    /// Ids of items tombstoned since the watermark.
    pub deleted_item_ids: Vec<String>,
}

impl ItemUpdates {
    /// Returns true if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.updated_items.is_empty() && self.deleted_item_ids.is_empty()
    }
}

/// Whether an image reference already points to uploaded remote storage.
pub fn is_remote_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

pub(crate) fn content_fields(
    name: &str,
    [calories, carbohydrates, fat, protein]: [f64; 4],
    img_url: &str,
    last_modified: i64,
) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(fields::NAME.to_string(), Value::from(name));
    map.insert(fields::CALORIES.to_string(), Value::from(calories));
    map.insert(fields::CARBOHYDRATES.to_string(), Value::from(carbohydrates));
    map.insert(fields::FAT.to_string(), Value::from(fat));
    map.insert(fields::PROTEIN.to_string(), Value::from(protein));
    map.insert(fields::IMG_URL.to_string(), Value::from(img_url));
    map.insert(fields::LAST_MODIFIED.to_string(), Value::from(last_modified));
    map
}

fn validate(name: &str, values: [f64; 4]) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }

    let names = [
        fields::CALORIES,
        fields::CARBOHYDRATES,
        fields::FAT,
        fields::PROTEIN,
    ];
    for (field, value) in names.into_iter().zip(values) {
        // NaN is rejected as well
        if !(value >= 0.0) {
            return Err(ValidationError::Negative { field, value });
        }
    }
    Ok(())
}
