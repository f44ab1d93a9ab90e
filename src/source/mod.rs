//! Metadata source module
//! Abstracts the backend calls that list buckets, tag keys and tag values.

pub mod memory;

use std::future::Future;

use thiserror::Error;

pub use memory::InMemorySource;

/// Errors returned by a metadata source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Backend data API consumed by the query builder
pub trait MetadataSource: Send + Sync {
    /// Lists bucket names (`db/rp`)
    fn list_buckets(&self) -> impl Future<Output = SourceResult<Vec<String>>> + Send;

    /// Lists the tag keys of a bucket
    fn list_tag_keys(
        &self,
        bucket: &str,
    ) -> impl Future<Output = SourceResult<Vec<String>>> + Send;

    /// Lists the values of one tag key within a bucket
    fn list_tag_values(
        &self,
        bucket: &str,
        tag_key: &str,
    ) -> impl Future<Output = SourceResult<Vec<String>>> + Send;
}
