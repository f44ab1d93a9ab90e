use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;

use super::{MetadataSource, SourceError, SourceResult};

/// Metadata source backed by in-process maps.
///
/// Used by tests and by the CLI when no backend is reachable. Keys are
/// listed in lexical order; values in insertion order.
#[derive(Debug, Default)]
pub struct InMemorySource {
    buckets: Vec<String>,
    tags: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    latency: Option<Duration>,
    failing: AtomicBool,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bucket with no tags
    pub fn with_bucket(mut self, bucket: &str) -> Self {
        if !self.buckets.iter().any(|b| b == bucket) {
            self.buckets.push(bucket.to_string());
        }
        self.tags.entry(bucket.to_string()).or_default();
        self
    }

    /// Adds a tag key and its values to a bucket, creating the bucket if needed
    pub fn with_tag(mut self, bucket: &str, key: &str, values: &[&str]) -> Self {
        self = self.with_bucket(bucket);
        let entry = self
            .tags
            .entry(bucket.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();
        for value in values {
            if !entry.iter().any(|v| v == value) {
                entry.push(value.to_string());
            }
        }
        self
    }

    /// Delays every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every subsequent call fail with [`SourceError::Unavailable`]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn respond<F>(&self, what: &str, lookup: F) -> SourceResult<Vec<String>>
    where
        F: FnOnce() -> SourceResult<Vec<String>>,
    {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            debug!("In-memory source failing request for {}", what);
            return Err(SourceError::Unavailable(format!("cannot list {}", what)));
        }
        lookup()
    }
}

impl MetadataSource for InMemorySource {
    async fn list_buckets(&self) -> SourceResult<Vec<String>> {
        self.respond("buckets", || Ok(self.buckets.clone())).await
    }

    async fn list_tag_keys(&self, bucket: &str) -> SourceResult<Vec<String>> {
        self.respond("tag keys", || {
            self.tags
                .get(bucket)
                .map(|keys| keys.keys().cloned().collect())
                .ok_or_else(|| SourceError::NotFound(format!("bucket {}", bucket)))
        })
        .await
    }

    async fn list_tag_values(&self, bucket: &str, tag_key: &str) -> SourceResult<Vec<String>> {
        self.respond("tag values", || {
            let keys = self
                .tags
                .get(bucket)
                .ok_or_else(|| SourceError::NotFound(format!("bucket {}", bucket)))?;
            Ok(keys.get(tag_key).cloned().unwrap_or_default())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with_tag("telegraf/autogen", "_measurement", &["cpu", "mem"])
            .with_tag("telegraf/autogen", "_field", &["usage_idle"])
            .with_bucket("_internal/monitor")
    }

    #[tokio::test]
    async fn test_listing() {
        let source = source();
        assert_eq!(
            source.list_buckets().await.unwrap(),
            vec!["telegraf/autogen", "_internal/monitor"]
        );
        assert_eq!(
            source.list_tag_keys("telegraf/autogen").await.unwrap(),
            vec!["_field", "_measurement"]
        );
        assert_eq!(
            source
                .list_tag_values("telegraf/autogen", "_measurement")
                .await
                .unwrap(),
            vec!["cpu", "mem"]
        );
        assert!(source
            .list_tag_values("telegraf/autogen", "host")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_bucket() {
        let result = source().list_tag_keys("nope").await;
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let source = source();
        source.set_failing(true);
        assert!(matches!(
            source.list_buckets().await,
            Err(SourceError::Unavailable(_))
        ));
        source.set_failing(false);
        assert!(source.list_buckets().await.is_ok());
    }
}
