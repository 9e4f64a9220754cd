// src/status_board.rs

use crate::orchestrator::{CaseReport, Delivery, Persistence};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Summary of the most recent poll cycle, shared with the status page.
#[derive(Clone, Default)]
pub struct StatusBoard {
    latest: Arc<Mutex<Option<CycleSummary>>>,
}

#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub finished_at: DateTime<Utc>,
    pub cases: Vec<CaseLine>,
}

#[derive(Debug, Clone)]
pub struct CaseLine {
    pub case_id: String,
    pub outcome: &'static str,
    pub emailed: bool,
    pub saved: bool,
    pub note: Option<String>,
}

impl From<&CaseReport> for CaseLine {
    fn from(report: &CaseReport) -> Self {
        let note = match (&report.delivery, &report.persistence) {
            (Delivery::Failed(e), _) => Some(format!("email failed: {e}")),
            (_, Persistence::Failed(e)) => Some(format!("save failed: {e}")),
            _ if report.baseline_unreadable => Some("stored snapshot was unreadable".to_string()),
            _ => None,
        };
        Self {
            case_id: report.case_id.clone(),
            outcome: report.outcome.label(),
            emailed: report.delivery == Delivery::Sent,
            saved: report.persistence == Persistence::Saved,
            note,
        }
    }
}

impl StatusBoard {
    pub fn record(&self, reports: &[CaseReport]) {
        let summary = CycleSummary {
            finished_at: Utc::now(),
            cases: reports.iter().map(CaseLine::from).collect(),
        };
        *self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(summary);
    }

    pub fn latest(&self) -> Option<CycleSummary> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
