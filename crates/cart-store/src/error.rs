use thiserror::Error;

/// The cart was used without a hydrated [`CartStore`](crate::CartStore)
/// behind it. This is a programming error, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The context was never given a store.
    #[error("cart accessed outside of an initialized cart context; provide a hydrated CartStore first")]
    NotProvided,
}

/// A snapshot could not be made durable.
///
/// Mutations never return this: they log it and keep the in-memory cart.
/// Only [`CartStore::flush`](crate::CartStore::flush) hands it to the caller.
#[derive(Debug, Error)]
pub enum PersistError<E: std::error::Error + 'static> {
    /// The cart could not be serialized.
    #[error("failed to encode cart snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    /// The backend kept rejecting the write.
    #[error("cart snapshot write failed after {attempts} attempt(s): {source}")]
    Backend {
        /// How many writes were tried.
        attempts: u32,
        /// The last backend error.
        #[source]
        source: E,
    },
}
