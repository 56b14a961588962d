/// Errors that can occur while talking to the backend.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Transport-level HTTP failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned status {0}")]
    Status(u16),

    /// The account tier does not permit remote playback queries.
    ///
    /// Raised on 401/403 responses and on the `premium_required` error body;
    /// callers treat this as a permanent capability downgrade for the session.
    #[error("remote playback unavailable for this account")]
    Restricted,

    /// A response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether this error permanently disables the remote-playback path.
    pub fn is_restricted(&self) -> bool {
        matches!(self, ApiError::Restricted)
    }
}
