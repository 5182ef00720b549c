//! Boundary to the geocoding service that turns free text into addresses.

use std::future::Future;

use thiserror::Error;

use super::entities::AddressCandidate;
use super::messages::Language;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("geocoder is not configured: {0}")]
    Configuration(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("geocoder rejected the query: {0}")]
    Api(String),
}

/// Looks up candidate addresses for a query, best match first.
///
/// Implementations may return an empty list. Failures are recoverable: the
/// session turns them into a field error on the address being typed.
pub trait AddressResolver: Send + Sync {
    fn resolve(
        &self,
        query: &str,
        language: Language,
    ) -> impl Future<Output = Result<Vec<AddressCandidate>, ResolveError>> + Send;
}

