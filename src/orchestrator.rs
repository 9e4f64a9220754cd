// src/orchestrator.rs

use crate::domain::policy::{self, Decision, Message, NotificationKind};
use crate::domain::{detect_changes, ChangeSet, StatusDocument};
use crate::fetcher::{FetchError, Fetcher};
use crate::mailer::Notifier;
use crate::store::SnapshotStore;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Result of checking one case in one cycle. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    FirstObservation(StatusDocument),
    Unchanged(StatusDocument),
    Changed(StatusDocument, ChangeSet),
    AuthFailure(String),
    TransientFailure(String),
    /// Another pipeline for the same case was still running; nothing was done.
    AlreadyInFlight,
}

impl PollOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PollOutcome::FirstObservation(_) => "first observation",
            PollOutcome::Unchanged(_) => "unchanged",
            PollOutcome::Changed(..) => "changed",
            PollOutcome::AuthFailure(_) => "authentication failed",
            PollOutcome::TransientFailure(_) => "fetch failed",
            PollOutcome::AlreadyInFlight => "skipped (in flight)",
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, PollOutcome::AuthFailure(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    NotAttempted,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Skipped,
    Saved,
    Failed(String),
}

/// What happened to one case during `poll_once`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseReport {
    pub case_id: String,
    pub outcome: PollOutcome,
    pub delivery: Delivery,
    pub persistence: Persistence,
    /// The stored baseline existed but could not be read, so the case was
    /// treated as a first observation.
    pub baseline_unreadable: bool,
}

impl CaseReport {
    fn new(case_id: &str, outcome: PollOutcome) -> Self {
        Self {
            case_id: case_id.to_string(),
            outcome,
            delivery: Delivery::NotAttempted,
            persistence: Persistence::Skipped,
            baseline_unreadable: false,
        }
    }
}

/// Runs the load → fetch → decide → notify → persist pipeline per case.
pub struct Orchestrator {
    fetcher: Box<dyn Fetcher>,
    notifier: Box<dyn Notifier>,
    store: Box<dyn SnapshotStore>,
    recipient: String,
    in_flight: Mutex<HashSet<String>>,
}

impl Orchestrator {
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn SnapshotStore>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            store,
            recipient: recipient.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    /// Checks every case once, sequentially. A failing case never stops the others.
    /// Repeated ids are checked once.
    pub fn poll_once(&self, case_ids: &[String]) -> Vec<CaseReport> {
        let mut seen = HashSet::new();
        case_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .map(|case_id| self.check_case(case_id))
            .collect()
    }

    pub fn check_case(&self, case_id: &str) -> CaseReport {
        let Some(_guard) = InFlight::claim(&self.in_flight, case_id) else {
            warn!(case_id, "previous check still running, skipping");
            return CaseReport::new(case_id, PollOutcome::AlreadyInFlight);
        };

        // Loaded
        let (previous, baseline_unreadable) = match self.store.load(case_id) {
            Ok(Some(doc)) => (Some(doc), false),
            Ok(None) => {
                info!(case_id, "no stored snapshot, this is the first observation");
                (None, false)
            }
            Err(e) => {
                warn!(case_id, error = %e, "failed to load stored snapshot, treating as first observation");
                (None, true)
            }
        };

        // Fetched
        let current = match self.fetcher.fetch(case_id) {
            Ok(doc) => doc,
            Err(e) if e.is_auth_failure() => return self.auth_failed(case_id, e, baseline_unreadable),
            Err(e) => {
                warn!(case_id, error = %e, "fetch failed, will retry next cycle");
                let mut report = CaseReport::new(case_id, PollOutcome::TransientFailure(e.to_string()));
                report.baseline_unreadable = baseline_unreadable;
                return report;
            }
        };
        debug!(case_id, fields = current.len(), "case status fetched");

        // Decided
        let changes = detect_changes(previous.as_ref(), &current);
        let decision = policy::decide(previous.is_none(), &changes);

        let mut report = CaseReport::new(case_id, PollOutcome::Unchanged(current.clone()));
        report.baseline_unreadable = baseline_unreadable;

        let kind = match decision {
            Decision::Suppress => {
                info!(case_id, "no changes detected, skipping notification");
                return report;
            }
            Decision::Notify(kind) => kind,
        };

        match kind {
            NotificationKind::FirstRun => info!(case_id, "first run, sending initial status email"),
            NotificationKind::Update => info!(case_id, changed = changes.len(), "changes detected"),
        }

        // Notified
        let message = policy::compose(kind, case_id, &current, &changes);
        report.delivery = self.deliver(case_id, &message);

        // Persisted
        report.persistence = match self.store.save(case_id, &current) {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                error!(case_id, error = %e, "failed to save snapshot");
                Persistence::Failed(e.to_string())
            }
        };

        report.outcome = match kind {
            NotificationKind::FirstRun => PollOutcome::FirstObservation(current),
            NotificationKind::Update => PollOutcome::Changed(current, changes),
        };
        report
    }

    fn auth_failed(&self, case_id: &str, cause: FetchError, baseline_unreadable: bool) -> CaseReport {
        error!(case_id, error = %cause, "authentication failed, sending alert");
        let cause = cause.to_string();
        let message = policy::auth_alert("polling", &cause);

        let mut report = CaseReport::new(case_id, PollOutcome::AuthFailure(cause));
        report.delivery = self.deliver(case_id, &message);
        report.baseline_unreadable = baseline_unreadable;
        report
    }

    fn deliver(&self, case_id: &str, message: &Message) -> Delivery {
        match self
            .notifier
            .send(&self.recipient, &message.subject, &message.html_body)
        {
            Ok(()) => {
                info!(case_id, subject = %message.subject, "email sent");
                Delivery::Sent
            }
            Err(e) => {
                error!(case_id, subject = %message.subject, error = %e, "failed to send email");
                Delivery::Failed(e.to_string())
            }
        }
    }
}

/// Marks a case as in flight until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    case_id: String,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<String>>, case_id: &str) -> Option<Self> {
        let mut ids = set.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !ids.insert(case_id.to_string()) {
            return None;
        }
        Some(Self {
            set,
            case_id: case_id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut ids = self.set.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.remove(&self.case_id);
    }
}
