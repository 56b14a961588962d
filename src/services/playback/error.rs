use crate::services::api::ApiError;

use super::transport::TransportError;

/// Errors internal to the playback service.
///
/// These never reach presentation consumers; every public operation catches
/// and logs them, degrading to "state did not change".
#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    /// Backend command or query failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
