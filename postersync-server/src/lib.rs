//! Media server clients: Jellyfin and Plex implementations of the
//! `MediaServer` trait.

pub mod jellyfin;
pub mod plex;

pub use jellyfin::JellyfinServer;
pub use plex::PlexServer;

use postersync_core::ServiceError;
use reqwest::StatusCode;

pub(crate) fn map_reqwest(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout(err.to_string())
    } else if err.is_decode() {
        ServiceError::api(format!("unable to parse response: {err}"))
    } else {
        ServiceError::network(err.to_string())
    }
}

pub(crate) fn check_status(status: StatusCode, service: &str) -> Result<(), ServiceError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ServiceError::auth(format!("{status} from {service}")));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ServiceError::not_found(format!("{status} from {service}")));
    }
    if !status.is_success() {
        return Err(ServiceError::api(format!("{status} from {service}")));
    }
    Ok(())
}
