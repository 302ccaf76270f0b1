use std::time::Duration;

use thiserror::Error;

use crate::{name::NameError, provider::ProviderError};

/// Errors returned by the zone operations of this crate.
///
/// Each variant names the request that failed. Where the provider was involved, its error is
/// kept as the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum R53Error {
    /// A page of a zone or record listing could not be fetched
    #[error("listing request {request} failed: {source}")]
    Listing {
        request: String,
        source: ProviderError,
    },
    #[error("could not create zone {name}: {source}")]
    ZoneCreation {
        name: String,
        source: ProviderError,
    },
    #[error("could not delete zone {zone_id}: {source}")]
    ZoneDeletion {
        zone_id: String,
        source: ProviderError,
    },
    #[error("change batch of {changes} change(s) for zone {zone_id} was rejected: {source}")]
    ChangeSubmission {
        zone_id: String,
        changes: usize,
        source: ProviderError,
    },
    #[error("no {what} named {name}")]
    NotFound { what: &'static str, name: String },
    #[error("zone name {name} is ambiguous, matching ids: {}", .ids.join(", "))]
    AmbiguousName { name: String, ids: Vec<String> },
    #[error("change {change_id} was not in sync after {waited:?}")]
    PropagationTimeout { change_id: String, waited: Duration },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("waiting for change {change_id} was cancelled")]
    Cancelled { change_id: String },
    /// Any other provider call (metadata lookups, change status) failed
    #[error("{operation} failed: {source}")]
    Provider {
        operation: String,
        source: ProviderError,
    },
    #[error(transparent)]
    InvalidName(#[from] NameError),
}
