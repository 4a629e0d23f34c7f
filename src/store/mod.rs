//! Persisted exclusion state: the curated blacklist and the failure record.

mod file;

pub mod blacklist;
pub mod failures;

pub use blacklist::{Blacklist, BlacklistStore};
pub use failures::{FailureRecord, FailureTracker};
