use postersync_core::ServiceError;
use thiserror::Error;

/// Errors from reconciling one target.
///
/// Only `Auth` is fatal for the run; everything else aborts the current
/// target and lets the sweep continue.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A service rejected the credentials
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Candidate set listing could not be fetched
    #[error("failed to fetch candidate sets: {0}")]
    SetFetch(String),

    /// Library inventory could not be read
    #[error("failed to read library inventory: {0}")]
    Inventory(String),
}

impl SyncError {
    pub fn auth(err: impl std::fmt::Display) -> Self {
        Self::Auth(err.to_string())
    }

    /// Classify a set-source failure, promoting auth rejections.
    pub fn set_fetch(err: ServiceError) -> Self {
        if err.is_auth() {
            Self::Auth(err.to_string())
        } else {
            Self::SetFetch(err.to_string())
        }
    }

    /// Classify a server listing failure, promoting auth rejections.
    pub fn inventory(err: ServiceError) -> Self {
        if err.is_auth() {
            Self::Auth(err.to_string())
        } else {
            Self::Inventory(err.to_string())
        }
    }

    /// Fatal errors abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
