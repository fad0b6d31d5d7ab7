use thiserror::Error;

/// Errors shared by the HTTP-facing clients (Mediux, Jellyfin, Plex).
///
/// The engine only distinguishes auth failures (fatal for a run) from
/// everything else, so the variants stay coarse.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Could not reach the service
    #[error("unable to connect: {0}")]
    Network(String),

    /// The service rejected the token (401/403)
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The requested entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The service took too long to respond
    #[error("timed out: {0}")]
    Timeout(String),

    /// The service answered with an error or an unparseable body
    #[error("service error: {0}")]
    Api(String),

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Auth failures abort the whole run instead of one target.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
