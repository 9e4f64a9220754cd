// src/domain/policy.rs

use crate::domain::changes::ChangeSet;
use crate::domain::document::StatusDocument;
use crate::templates::emails;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// No snapshot was stored yet; the user gets the full status once.
    FirstRun,
    /// At least one field differs from the stored snapshot.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Notify(NotificationKind),
    Suppress,
}

/// Rendered email, ready for a `Notifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub html_body: String,
}

/// Decides whether a poll result is worth an email.
///
/// Only a repeat observation with no changes is suppressed.
pub fn decide(is_first_observation: bool, changes: &ChangeSet) -> Decision {
    if is_first_observation {
        Decision::Notify(NotificationKind::FirstRun)
    } else if changes.is_empty() {
        Decision::Suppress
    } else {
        Decision::Notify(NotificationKind::Update)
    }
}

pub fn compose(
    kind: NotificationKind,
    case_id: &str,
    current: &StatusDocument,
    changes: &ChangeSet,
) -> Message {
    match kind {
        NotificationKind::FirstRun => Message {
            subject: format!("Case Tracker - Initial Status for {case_id}"),
            html_body: emails::initial_status_email(case_id, current).into_string(),
        },
        NotificationKind::Update => Message {
            subject: format!("Case Status Update - {case_id}"),
            html_body: emails::change_notification_email(case_id, changes, current).into_string(),
        },
    }
}

/// Alert sent when the upstream session or credentials stop working.
pub fn auth_alert(context: &str, cause: &str) -> Message {
    Message {
        subject: "Case Tracker - Authentication Failed".to_string(),
        html_body: emails::auth_failure_email(context, cause).into_string(),
    }
}
