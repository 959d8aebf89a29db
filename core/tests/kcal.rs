// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the kcal application core over in-memory fakes.

mod common;

use std::sync::Arc;

use jiff::civil::date;
use jiff::tz::TimeZone;
use kcal_core::{
    DB_FILENAME, Error, ExportData, ItemPatch, Kcal, NewItem, Session, Settings, WatermarkPolicy,
};
use serde_json::json;
use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};

use crate::common::{FixedClock, MemoryStore, MemoryUserDoc, USER, backends, code};

// 2025-03-14T12:00:00Z
const NOON: i64 = 1_741_953_600_000;

struct Fixture {
    kcal: Kcal,
    store: Arc<MemoryStore>,
    user_doc: Arc<MemoryUserDoc>,
    clock: Arc<FixedClock>,
}

async fn fixture_with(session: Session, user_doc: Arc<MemoryUserDoc>) -> Fixture {
    let store = MemoryStore::new();
    let clock = FixedClock::at(NOON);
    let kcal = Kcal::with_backends(
        None,
        backends(session, store.clone(), user_doc.clone(), clock.clone()),
        WatermarkPolicy::FetchTime,
    )
    .await
    .expect("Failed to create kcal")
    .with_time_zone(TimeZone::UTC);

    Fixture {
        kcal,
        store,
        user_doc,
        clock,
    }
}

async fn fixture() -> Fixture {
    fixture_with(Session::user(USER), MemoryUserDoc::new()).await
}

#[tokio::test]
async fn kcal_sync_applies_changes_to_cache() {
    let f = fixture().await;
    f.store.put("1", json!({"name": "Banana", "calories": 105, "lastModified": 100}));
    f.store.put("2", json!({"name": "Apple", "calories": 95, "lastModified": 150}));

    let report = f.kcal.sync(false).await.unwrap();
    assert_eq!(report.updated, 2);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.watermark, NOON);

    let names: Vec<_> = f
        .kcal
        .list_items(None)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, ["Apple", "Banana"]);

    // a tombstone written by another client
    f.store.put("2", json!({"deleted": true, "lastModified": NOON + 10}));
    f.clock.set(NOON + 1_000);
    let report = f.kcal.sync(false).await.unwrap();
    assert_eq!(report.updated, 0);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.watermark, NOON + 1_000);

    let items = f.kcal.list_items(None).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "1");
}

#[tokio::test]
async fn kcal_full_sync_starts_from_zero() {
    let f = fixture().await;
    f.store.put("1", json!({"name": "Banana", "lastModified": 100}));
    f.kcal.sync(false).await.unwrap();

    f.kcal.sync(true).await.unwrap();
    let calls = f.store.calls();
    assert_eq!(calls.last().unwrap(), &format!("query {USER} >= 0"));
    assert_eq!(f.kcal.list_items(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn kcal_sync_failure_leaves_cache_untouched() {
    let f = fixture().await;
    f.store.put("1", json!({"name": "Banana", "lastModified": 100}));
    f.kcal.sync(false).await.unwrap();

    f.store.fail_with("unavailable");
    assert_eq!(code(f.kcal.sync(false).await), "unavailable");
    assert_eq!(f.kcal.list_items(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn kcal_sync_apply_failure_keeps_watermark() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    store.put("1", json!({"name": "Apple", "calories": 95, "lastModified": 500}));
    let clock = FixedClock::at(NOON);
    let kcal = Kcal::with_backends(
        Some(dir.path()),
        backends(Session::user(USER), store.clone(), MemoryUserDoc::new(), clock.clone()),
        WatermarkPolicy::FetchTime,
    )
    .await
    .unwrap();

    let options = SqliteConnectOptions::new().filename(dir.path().join(DB_FILENAME));
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    sqlx::query(
        "CREATE TRIGGER fail_items BEFORE INSERT ON items \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END",
    )
    .execute(&mut conn)
    .await
    .unwrap();

    assert!(matches!(kcal.sync(false).await, Err(Error::Database(_))));
    assert!(kcal.list_items(None).await.unwrap().is_empty());

    sqlx::query("DROP TRIGGER fail_items")
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();

    clock.set(NOON + 1_000);
    let report = kcal.sync(false).await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.watermark, NOON + 1_000);
    assert_eq!(
        store.calls(),
        vec![format!("query {USER} >= 0"), format!("query {USER} >= 0")]
    );

    let items = kcal.list_items(None).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Apple");
    kcal.close().await.unwrap();
}

#[tokio::test]
async fn kcal_item_lifecycle() {
    let f = fixture().await;

    let item = f.kcal.create_item(NewItem::new("Apple", 95.0)).await.unwrap();
    assert_eq!(f.kcal.list_items(Some("app")).await.unwrap(), vec![item.clone()]);

    let patch = ItemPatch {
        calories: Some(100.0),
        ..Default::default()
    };
    let updated = f.kcal.update_item(&item.id, &patch).await.unwrap();
    assert!((updated.calories - 100.0).abs() < f64::EPSILON);
    assert_eq!(updated.name, "Apple");
    let doc = f.store.doc(&item.id).unwrap();
    assert_eq!(doc.get("calories"), Some(&json!(100.0)));

    f.kcal.remove_item(&item.id).await.unwrap();
    assert!(f.kcal.list_items(None).await.unwrap().is_empty());
    assert_eq!(f.store.doc(&item.id).unwrap().get("deleted"), Some(&json!(true)));
}

#[tokio::test]
async fn kcal_update_unknown_item_is_not_found() {
    let f = fixture().await;
    let patch = ItemPatch {
        name: Some("Pear".to_string()),
        ..Default::default()
    };
    let result = f.kcal.update_item("missing", &patch).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn kcal_update_reads_uncached_item_from_remote() {
    let f = fixture().await;
    f.store.put("1", json!({"name": "Pear", "calories": 57, "lastModified": 100}));

    let patch = ItemPatch {
        protein: Some(0.4),
        ..Default::default()
    };
    let item = f.kcal.update_item("1", &patch).await.unwrap();
    assert_eq!(item.name, "Pear");
    assert!((item.protein - 0.4).abs() < f64::EPSILON);
}

#[tokio::test]
async fn kcal_get_item_refreshes_cache() {
    let f = fixture().await;
    f.store.put("1", json!({"name": "Pear", "lastModified": 100}));

    let item = f.kcal.get_item("1").await.unwrap();
    assert_eq!(item.map(|a| a.name), Some("Pear".to_string()));
    assert_eq!(f.kcal.list_items(None).await.unwrap().len(), 1);

    f.store.put("1", json!({"deleted": true, "lastModified": 200}));
    assert!(f.kcal.get_item("1").await.unwrap().is_none());
    assert!(f.kcal.list_items(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn kcal_consume_and_daily_summary() {
    let f = fixture_with(
        Session::user(USER),
        MemoryUserDoc::with_fields(json!({"settings": {"calorieTarget": 1800, "weight": 70}})),
    )
    .await;
    let apple = f.kcal.create_item(NewItem::new("Apple", 95.0)).await.unwrap();
    let egg = f
        .kcal
        .create_item(NewItem {
            protein: 6.0,
            ..NewItem::new("Egg", 78.0)
        })
        .await
        .unwrap();

    let c = f.kcal.consume(&apple.id, 2).await.unwrap();
    assert_eq!(c.date, date(2025, 3, 14));
    assert_eq!(c.consumed_at, NOON);
    assert!(c.id.is_some());
    f.kcal.consume(&egg.id, 1).await.unwrap();

    let summary = f.kcal.daily_summary(f.kcal.today().unwrap()).await.unwrap();
    assert_eq!(summary.calorie_target, 1800);
    assert_eq!(summary.entries.len(), 2);
    assert!((summary.calories - 268.0).abs() < 1e-9);
    assert!((summary.protein - 6.0).abs() < 1e-9);
    assert!((summary.calories_left() - 1532.0).abs() < 1e-9);

    let yesterday = f.kcal.daily_summary(date(2025, 3, 13)).await.unwrap();
    assert!(yesterday.entries.is_empty());
}

#[tokio::test]
async fn kcal_consume_rejects_zero_and_unknown() {
    let f = fixture().await;
    let apple = f.kcal.create_item(NewItem::new("Apple", 95.0)).await.unwrap();

    assert_eq!(code(f.kcal.consume(&apple.id, 0).await), "consume/zero-quantity");
    assert!(matches!(
        f.kcal.consume("missing", 1).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn kcal_consumption_survives_item_edit() {
    let f = fixture().await;
    let apple = f.kcal.create_item(NewItem::new("Apple", 95.0)).await.unwrap();
    f.kcal.consume(&apple.id, 1).await.unwrap();

    let patch = ItemPatch {
        calories: Some(200.0),
        ..Default::default()
    };
    f.kcal.update_item(&apple.id, &patch).await.unwrap();
    f.kcal.remove_item(&apple.id).await.unwrap();

    let summary = f.kcal.daily_summary(date(2025, 3, 14)).await.unwrap();
    assert!((summary.calories - 95.0).abs() < 1e-9);
}

#[tokio::test]
async fn kcal_settings_round_trip() {
    let f = fixture_with(
        Session::user(USER),
        MemoryUserDoc::with_fields(json!({"displayName": "Ada"})),
    )
    .await;

    assert_eq!(f.kcal.settings().await.unwrap(), Settings::default());

    let settings = Settings::default().with(Some(1900), Some(72));
    f.kcal.update_settings(settings).await.unwrap();
    assert_eq!(f.kcal.settings().await.unwrap(), settings);

    let fields = f.user_doc.fields().unwrap();
    assert_eq!(fields.get("displayName"), Some(&json!("Ada")));
    assert_eq!(
        fields.get("settings"),
        Some(&json!({"calorieTarget": 1900, "weight": 72}))
    );
}

#[tokio::test]
async fn kcal_settings_errors() {
    let f = fixture().await;
    assert!(matches!(f.kcal.settings().await, Err(Error::NotFound(_))));

    let f = fixture_with(Session::anonymous(), MemoryUserDoc::new()).await;
    assert_eq!(code(f.kcal.settings().await), "auth/no-valid-user");
    assert_eq!(
        code(f.kcal.update_settings(Settings::default()).await),
        "auth/no-valid-user"
    );

    // the summary still works offline, with the default target
    let summary = f.kcal.daily_summary(date(2025, 3, 14)).await.unwrap();
    assert_eq!(summary.calorie_target, 2100);
}

#[tokio::test]
async fn kcal_export_writes_json_snapshot() {
    let f = fixture().await;
    let apple = f.kcal.create_item(NewItem::new("Apple", 95.0)).await.unwrap();
    f.kcal.consume(&apple.id, 3).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    let data = f.kcal.export(&path).await.unwrap();
    assert_eq!(data.items.len(), 1);
    assert_eq!(data.consumptions.len(), 1);
    assert_eq!(data.settings, Settings::default());
    assert_eq!(data.exported_at.as_millisecond(), NOON);

    let written: ExportData =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, data);
}

#[tokio::test]
async fn kcal_opens_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    store.put("1", json!({"name": "Banana", "lastModified": 100}));

    let kcal = Kcal::with_backends(
        Some(dir.path()),
        backends(
            Session::user(USER),
            store.clone(),
            MemoryUserDoc::new(),
            FixedClock::at(NOON),
        ),
        WatermarkPolicy::FetchTime,
    )
    .await
    .unwrap();
    kcal.sync(false).await.unwrap();
    kcal.close().await.unwrap();

    // the cache and the watermark persist across instances
    let kcal = Kcal::with_backends(
        Some(dir.path()),
        backends(
            Session::user(USER),
            store.clone(),
            MemoryUserDoc::new(),
            FixedClock::at(NOON + 1),
        ),
        WatermarkPolicy::FetchTime,
    )
    .await
    .unwrap();
    assert_eq!(kcal.list_items(None).await.unwrap().len(), 1);
    kcal.sync(false).await.unwrap();
    assert_eq!(store.calls().last().unwrap(), &format!("query {USER} >= {NOON}"));
}
