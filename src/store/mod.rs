mod file;

use crate::domain::StatusDocument;
use crate::errors::StoreError;

pub use file::FileSnapshotStore;

/// Keeps the last notified snapshot per case.
///
/// `load` returns `Ok(None)` when nothing was stored yet; an `Err` means the
/// baseline exists but could not be read.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, case_id: &str) -> Result<Option<StatusDocument>, StoreError>;
    fn save(&self, case_id: &str, doc: &StatusDocument) -> Result<(), StoreError>;
}
