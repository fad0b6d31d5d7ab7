//! The reconciliation engine.
//!
//! Given a library target, a set source, and a user policy, works out
//! which artwork is missing and fills it in from the best eligible set,
//! tolerating per-image failures along the way.

pub mod error;
pub mod events;
pub mod log;
pub mod lookup;
pub mod policy;
pub mod reconcile;

pub use error::SyncError;
pub use events::{SyncEvent, run_with_events};
pub use log::{SyncLog, SyncLogEntry, SyncSummary};
pub use lookup::{SweepOptions, find_target, gather_targets};
pub use policy::SyncPolicy;
pub use reconcile::{SyncOutcome, SyncReport, apply_set, reconcile};
