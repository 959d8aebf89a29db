// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory fakes of the sync collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kcal_core::{
    AuthSession, Backends, Clock, Document, DocumentId, Error, FieldPatch, ImageUploader,
    ItemStore, ItemSync, Session, SettingsStore, WatermarkCache,
};
use kcal_docstore::DocStoreError;
use serde_json::{Map, Value};

pub const USER: &str = "u1";

/// Shared log of remote operations, in call order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

fn api_error(code: &str) -> DocStoreError {
    DocStoreError::Api {
        status: 500,
        code: Some(code.to_string()),
        message: format!("injected failure: {code}"),
    }
}

/// A single user's item collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<Vec<Document>>,
    failure: Mutex<Option<String>>,
    next_id: AtomicI64,
    log: CallLog,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Makes every following call fail with the given backend code.
    pub fn fail_with(&self, code: &str) {
        *self.failure.lock().unwrap() = Some(code.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Inserts or replaces a raw document, bypassing the log.
    pub fn put(&self, id: &str, fields: Value) {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object")
        };
        let mut docs = self.docs.lock().unwrap();
        docs.retain(|d| d.id.as_str() != id);
        docs.push(Document::new(DocumentId::from(id), fields));
    }

    pub fn doc(&self, id: &str) -> Option<Document> {
        let docs = self.docs.lock().unwrap();
        docs.iter().find(|d| d.id.as_str() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn record(&self, call: String) -> Result<(), DocStoreError> {
        self.log.lock().unwrap().push(call);
        match &*self.failure.lock().unwrap() {
            Some(code) => Err(api_error(code)),
            None => Ok(()),
        }
    }
}

fn last_modified(doc: &Document) -> Option<i64> {
    doc.get("lastModified").and_then(Value::as_i64)
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn query_modified_since(
        &self,
        user_id: &str,
        since: i64,
    ) -> Result<Vec<Document>, DocStoreError> {
        self.record(format!("query {user_id} >= {since}"))?;
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .iter()
            .filter(|d| last_modified(d).is_some_and(|ts| ts >= since))
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        user_id: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocStoreError> {
        self.record(format!("get {user_id} {id}"))?;
        Ok(self.doc(id))
    }

    async fn add(
        &self,
        user_id: &str,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, DocStoreError> {
        self.record(format!("add {user_id}"))?;
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.docs
            .lock()
            .unwrap()
            .push(Document::new(DocumentId::from(id.as_str()), fields));
        Ok(DocumentId::from(id))
    }

    async fn set(
        &self,
        user_id: &str,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<(), DocStoreError> {
        self.record(format!("set {user_id} {id}"))?;
        let mut docs = self.docs.lock().unwrap();
        docs.retain(|d| &d.id != id);
        docs.push(Document::new(id.clone(), fields));
        Ok(())
    }

    async fn update(
        &self,
        user_id: &str,
        id: &DocumentId,
        patch: FieldPatch,
    ) -> Result<(), DocStoreError> {
        self.record(format!("update {user_id} {id}"))?;
        let mut docs = self.docs.lock().unwrap();
        let Some(doc) = docs.iter_mut().find(|d| &d.id == id) else {
            return Err(DocStoreError::Api {
                status: 404,
                code: Some("not-found".to_string()),
                message: format!("no document {id}"),
            });
        };
        for name in &patch.delete {
            doc.fields.remove(name);
        }
        doc.fields.extend(patch.fields);
        Ok(())
    }
}

/// Uploads into a fake bucket, or fails when configured to.
#[derive(Debug)]
pub struct FakeUploader {
    failure: Option<String>,
    log: CallLog,
}

impl FakeUploader {
    pub fn new(log: CallLog) -> Arc<Self> {
        Arc::new(Self { failure: None, log })
    }

    pub fn failing(log: CallLog, code: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(code.to_string()),
            log,
        })
    }
}

#[async_trait]
impl ImageUploader for FakeUploader {
    async fn upload(&self, user_id: &str, local: &str) -> Result<String, DocStoreError> {
        self.log.lock().unwrap().push(format!("upload {user_id} {local}"));
        if let Some(code) = &self.failure {
            return Err(api_error(code));
        }
        let name = local.rsplit('/').next().unwrap_or(local);
        Ok(format!("https://files.example.com/{user_id}/images/{name}"))
    }
}

/// The user document.
#[derive(Debug, Default)]
pub struct MemoryUserDoc {
    fields: Mutex<Option<Map<String, Value>>>,
}

impl MemoryUserDoc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_fields(fields: Value) -> Arc<Self> {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object")
        };
        Arc::new(Self {
            fields: Mutex::new(Some(fields)),
        })
    }

    pub fn fields(&self) -> Option<Map<String, Value>> {
        self.fields.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsStore for MemoryUserDoc {
    async fn get_user(&self, user_id: &str) -> Result<Option<Document>, DocStoreError> {
        let fields = self.fields.lock().unwrap().clone();
        Ok(fields.map(|f| Document::new(DocumentId::from(user_id), f)))
    }

    async fn update_user(&self, _user_id: &str, patch: FieldPatch) -> Result<(), DocStoreError> {
        let mut fields = self.fields.lock().unwrap();
        let fields = fields.get_or_insert_with(Map::new);
        for name in &patch.delete {
            fields.remove(name);
        }
        fields.extend(patch.fields);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryWatermark {
    value: Mutex<Option<i64>>,
    fail_store: bool,
}

impl MemoryWatermark {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn starting_at(value: i64) -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(Some(value)),
            fail_store: false,
        })
    }

    pub fn read_only() -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(None),
            fail_store: true,
        })
    }

    pub fn get(&self) -> Option<i64> {
        *self.value.lock().unwrap()
    }
}

#[async_trait]
impl WatermarkCache for MemoryWatermark {
    async fn load(&self) -> Result<Option<i64>, Error> {
        Ok(self.get())
    }

    async fn store(&self, watermark: i64) -> Result<(), Error> {
        if self.fail_store {
            return Err(Error::Config("read-only watermark".to_string()));
        }
        *self.value.lock().unwrap() = Some(watermark);
        Ok(())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn at(ms: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(ms)))
    }

    pub fn set(&self, ms: i64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wired-up fakes for a single test.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub watermark: Arc<MemoryWatermark>,
    pub clock: Arc<FixedClock>,
    pub sync: ItemSync,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(Session::user(USER), MemoryWatermark::new(), None)
    }

    pub fn anonymous() -> Self {
        Self::with(Session::anonymous(), MemoryWatermark::new(), None)
    }

    pub fn with_failing_upload(code: &str) -> Self {
        Self::with(Session::user(USER), MemoryWatermark::new(), Some(code))
    }

    pub fn with(
        session: Session,
        watermark: Arc<MemoryWatermark>,
        upload_failure: Option<&str>,
    ) -> Self {
        let store = MemoryStore::new();
        let uploader = match upload_failure {
            Some(code) => FakeUploader::failing(store.log(), code),
            None => FakeUploader::new(store.log()),
        };
        let clock = FixedClock::at(1_000);
        let sync = ItemSync::new(
            Arc::new(session),
            store.clone(),
            uploader,
            watermark.clone(),
            clock.clone(),
        );
        Self {
            store,
            watermark,
            clock,
            sync,
        }
    }
}

/// Backends for a [`kcal_core::Kcal`] instance over fakes.
pub fn backends(
    session: Session,
    store: Arc<MemoryStore>,
    user_doc: Arc<MemoryUserDoc>,
    clock: Arc<FixedClock>,
) -> Backends {
    let session: Arc<dyn AuthSession> = Arc::new(session);
    Backends {
        session,
        uploader: FakeUploader::new(store.log()),
        items: store,
        settings: user_doc,
        clock,
    }
}

/// Tests the `Error::code` of a failed result.
pub fn code<T: std::fmt::Debug>(result: Result<T, Error>) -> String {
    result.expect_err("expected an error").code().to_string()
}
