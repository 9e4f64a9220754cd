// src/store/file.rs

use crate::domain::StatusDocument;
use crate::errors::StoreError;
use crate::store::SnapshotStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use url::form_urlencoded;

/// One pretty-printed JSON file per case.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    case_id: String,
    fetched_at: DateTime<Utc>,
    status: StatusDocument,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Distinct case ids always map to distinct files.
    pub fn path_for(&self, case_id: &str) -> PathBuf {
        self.dir.join(format!("case_status_{}.json", file_safe(case_id)))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, case_id: &str) -> Result<Option<StatusDocument>, StoreError> {
        let raw = match fs::read_to_string(self.path_for(case_id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSnapshot = serde_json::from_str(&raw)?;
        if stored.case_id != case_id {
            return Err(StoreError::Corrupt(format!(
                "file for {case_id} holds a snapshot of {}",
                stored.case_id
            )));
        }
        Ok(Some(stored.status))
    }

    fn save(&self, case_id: &str, doc: &StatusDocument) -> Result<(), StoreError> {
        let stored = StoredSnapshot {
            case_id: case_id.to_string(),
            fetched_at: Utc::now(),
            status: doc.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored)?;
        write_atomic(&self.path_for(case_id), &json)
    }
}

/// Writes to a sibling temp file, then renames it over the target.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Percent-encodes the id, so separators never reach the file system and
/// the mapping stays one-to-one.
fn file_safe(case_id: &str) -> String {
    form_urlencoded::byte_serialize(case_id.as_bytes()).collect()
}
