pub mod changes;
pub mod document;
pub mod policy;

pub use changes::{detect_changes, Change, ChangeSet};
pub use document::{deep_equal, StatusDocument};
