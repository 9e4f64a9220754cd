// src/db/snapshots.rs

use crate::db::connection::{init_db, Database};
use crate::domain::StatusDocument;
use crate::errors::StoreError;
use crate::store::SnapshotStore;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Append-only snapshot history in SQLite; the newest row per case is the baseline.
pub struct SqliteSnapshotStore {
    db: Database,
}

impl SqliteSnapshotStore {
    pub fn open(db: Database) -> Result<Self, StoreError> {
        init_db(&db)?;
        Ok(Self { db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, case_id: &str) -> Result<Option<StatusDocument>, StoreError> {
        let body: Option<String> = self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT body FROM case_snapshots WHERE case_id = ? ORDER BY id DESC LIMIT 1",
                params![case_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })?;

        match body {
            Some(body) => {
                let doc = serde_json::from_str(&body)
                    .map_err(|e| StoreError::Corrupt(format!("snapshot for {case_id}: {e}")))?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    fn save(&self, case_id: &str, doc: &StatusDocument) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        let fingerprint = fingerprint(&body);

        self.db.with_conn(|conn| {
            let latest: Option<String> = conn
                .query_row(
                    "SELECT fingerprint FROM case_snapshots WHERE case_id = ? ORDER BY id DESC LIMIT 1",
                    params![case_id],
                    |row| row.get(0),
                )
                .optional()?;

            if latest.as_deref() == Some(fingerprint.as_str()) {
                debug!(case_id, "snapshot identical to latest version, not appending");
                return Ok(());
            }

            conn.execute(
                "INSERT INTO case_snapshots (case_id, fetched_at, fingerprint, body) VALUES (?, ?, ?, ?)",
                params![case_id, Utc::now().to_rfc3339(), fingerprint, body],
            )?;
            Ok(())
        })
    }
}

/// SHA-256 of the serialized document. Keys serialize in sorted order, so equal
/// documents hash equally.
fn fingerprint(body: &str) -> String {
    format!("{:x}", Sha256::digest(body.as_bytes()))
}
