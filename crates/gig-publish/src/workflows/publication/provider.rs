use super::domain::{GigSummary, PublicationRequest, UserId, UserSnapshot};

/// Read-only access to the marketplace data store, so the flow can be exercised without a backend.
pub trait PublicationContextProvider: Send + Sync {
    /// `Ok(None)` means the snapshot is not (yet) available.
    fn user_snapshot(&self, user_id: &UserId) -> Result<Option<UserSnapshot>, ProviderError>;
    fn existing_gigs(&self, user_id: &UserId) -> Result<Vec<GigSummary>, ProviderError>;
    fn in_grace_period(&self, user_id: &UserId) -> Result<bool, ProviderError>;
}

/// Error enumeration for provider failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("user {0} not found")]
    UnknownUser(String),
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook receiving confirmed publications (e.g. the gig mutation endpoint).
pub trait PublicationSink: Send + Sync {
    fn publish(&self, request: PublicationRequest) -> Result<(), SinkError>;
}

/// Publication dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("publication rejected: {0}")]
    Rejected(String),
    #[error("publication transport unavailable: {0}")]
    Transport(String),
}
