// src/domain/changes.rs

use crate::domain::document::{deep_equal, StatusDocument};
use serde_json::Value;

/// A single field that differs between two snapshots.
///
/// `old_value` is `None` when the field is new, `new_value` is `None` when
/// the field was removed. Both are never `None` at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl Change {
    pub fn is_addition(&self) -> bool {
        self.old_value.is_none()
    }

    pub fn is_removal(&self) -> bool {
        self.new_value.is_none()
    }
}

pub type ChangeSet = Vec<Change>;

/// Compares the last stored snapshot with a freshly fetched one.
///
/// With no previous snapshot the result is empty: a first observation is
/// reported by the caller, not as a burst of added fields.
///
/// Order: fields of `current` (additions and modifications) in key order,
/// then fields only in `previous` (removals) in key order.
pub fn detect_changes(previous: Option<&StatusDocument>, current: &StatusDocument) -> ChangeSet {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut changes = Vec::new();

    for (field, new_value) in current.iter() {
        match previous.get(field) {
            None => changes.push(Change {
                field: field.clone(),
                old_value: None,
                new_value: Some(new_value.clone()),
            }),
            Some(old_value) if !deep_equal(old_value, new_value) => changes.push(Change {
                field: field.clone(),
                old_value: Some(old_value.clone()),
                new_value: Some(new_value.clone()),
            }),
            Some(_) => {}
        }
    }

    for (field, old_value) in previous.iter() {
        if !current.contains(field) {
            changes.push(Change {
                field: field.clone(),
                old_value: Some(old_value.clone()),
                new_value: None,
            });
        }
    }

    changes
}
