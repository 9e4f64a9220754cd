// src/tests/utils.rs

use crate::domain::StatusDocument;
use crate::errors::StoreError;
use crate::fetcher::{FetchError, Fetcher};
use crate::mailer::{MailerError, Notifier};
use crate::orchestrator::Orchestrator;
use crate::store::SnapshotStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const RECIPIENT: &str = "me@example.com";

/// Builds a document from a `json!({...})` literal.
pub fn doc(value: Value) -> StatusDocument {
    StatusDocument::from_value(value).unwrap_or_else(|v| panic!("not an object: {v}"))
}

#[derive(Clone)]
pub enum Reply {
    Doc(StatusDocument),
    Auth,
    Transient,
}

/// Fetcher that answers from a per-case table. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct StubFetcher {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn set(&self, case_id: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(case_id.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, case_id: &str) -> Result<StatusDocument, FetchError> {
        self.calls.lock().unwrap().push(case_id.to_string());
        match self.replies.lock().unwrap().get(case_id).cloned() {
            Some(Reply::Doc(doc)) => Ok(doc),
            Some(Reply::Auth) => Err(FetchError::AuthenticationFailed("received status code 401".into())),
            Some(Reply::Transient) | None => Err(FetchError::Network("connection reset".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), MailerError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailerError::ApiError {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<Mutex<HashMap<String, StatusDocument>>>,
    saves: Arc<AtomicUsize>,
    fail_load: Arc<AtomicBool>,
    fail_save: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn put(&self, case_id: &str, doc: StatusDocument) {
        self.docs.lock().unwrap().insert(case_id.to_string(), doc);
    }

    pub fn get(&self, case_id: &str) -> Option<StatusDocument> {
        self.docs.lock().unwrap().get(case_id).cloned()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, case_id: &str) -> Result<Option<StatusDocument>, StoreError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StoreError::Corrupt("unreadable".into()));
        }
        Ok(self.get(case_id))
    }

    fn save(&self, case_id: &str, doc: &StatusDocument) -> Result<(), StoreError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Db("disk full".into()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.put(case_id, doc.clone());
        Ok(())
    }
}

pub struct Harness {
    pub fetcher: StubFetcher,
    pub notifier: RecordingNotifier,
    pub store: MemoryStore,
    pub orchestrator: Orchestrator,
}

pub fn harness() -> Harness {
    let fetcher = StubFetcher::default();
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();
    let orchestrator = Orchestrator::new(
        Box::new(fetcher.clone()),
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        RECIPIENT,
    );
    Harness {
        fetcher,
        notifier,
        store,
        orchestrator,
    }
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
