//! Async driver for a [`QueryBuilder`]
//!
//! Runs the fetches a builder queues against a [`MetadataSource`] on tokio
//! tasks and feeds the completions back one at a time, so state is only ever
//! mutated by the session's owner.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::builder::{FetchOutcome, FetchRequest, FetchResponse, QueryBuilder, TagRole};
use crate::config::BuilderConfig;
use crate::source::{MetadataSource, SourceError, SourceResult};

/// A query builder bound to a metadata source
pub struct QueryBuilderSession<S> {
    builder: QueryBuilder,
    source: Arc<S>,
    completions_tx: mpsc::UnboundedSender<FetchResponse>,
    completions_rx: mpsc::UnboundedReceiver<FetchResponse>,
    in_flight: usize,
}

impl<S> QueryBuilderSession<S>
where
    S: MetadataSource + 'static,
{
    /// Mounts a new builder and starts loading the bucket list
    pub fn new(source: Arc<S>, config: BuilderConfig) -> Self {
        Self::with_builder(source, QueryBuilder::new(config))
    }

    pub fn with_builder(source: Arc<S>, builder: QueryBuilder) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            builder,
            source,
            completions_tx,
            completions_rx,
            in_flight: 0,
        };
        session.dispatch();
        session
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Number of fetches started but not yet handed back
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Runs a transition and starts whatever fetches it queued
    pub fn update<F, R>(&mut self, transition: F) -> R
    where
        F: FnOnce(&mut QueryBuilder) -> R,
    {
        let result = transition(&mut self.builder);
        self.dispatch();
        result
    }

    pub fn select_bucket(&mut self, name: &str) {
        self.update(|b| b.select_bucket(name));
    }

    pub fn add_card(&mut self) -> usize {
        self.update(QueryBuilder::add_card)
    }

    pub fn remove_card(&mut self, tag_index: usize) -> bool {
        self.update(|b| b.remove_card(tag_index))
    }

    pub fn select_tag_key(&mut self, tag_index: usize, key: &str) {
        self.update(|b| b.select_tag_key(tag_index, key));
    }

    pub fn toggle_tag_value(&mut self, tag_index: usize, value: &str) {
        self.update(|b| b.toggle_tag_value(tag_index, value));
    }

    pub fn set_tag_role(&mut self, tag_index: usize, role: TagRole) {
        self.update(|b| b.set_tag_role(tag_index, role));
    }

    pub fn build_query(&self) -> String {
        self.builder.build_query()
    }

    fn dispatch(&mut self) {
        for request in self.builder.drain_requests() {
            self.spawn_fetch(request);
        }
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            // a panicking source must still produce a completion
            let fetch = tokio::spawn(fetch_metadata(source, request.clone()));
            let result = fetch.await.unwrap_or_else(|e| {
                warn!("{} fetch task failed: {}", request.kind().as_str(), e);
                Err(SourceError::Backend(format!("fetch task failed: {}", e)))
            });
            // the receiver only goes away with the session itself
            let _ = completions.send(FetchResponse::new(request, result));
        });
    }

    /// Waits for the next completion and applies it. Returns None when
    /// nothing is in flight.
    pub async fn next_event(&mut self) -> Option<FetchOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let response = self.completions_rx.recv().await?;
        self.in_flight -= 1;

        let tag_index = response.request.tag_index();
        let outcome = self.builder.apply(response);
        debug!("Fetch for card {:?} completed: {:?}", tag_index, outcome);
        self.dispatch();
        Some(outcome)
    }

    /// Applies completions until no fetch is in flight, including fetches
    /// started by the completions themselves
    pub async fn settle(&mut self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_event().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    pub fn into_builder(self) -> QueryBuilder {
        self.builder
    }
}

async fn fetch_metadata<S>(source: Arc<S>, request: FetchRequest) -> SourceResult<Vec<String>>
where
    S: MetadataSource + 'static,
{
    match &request {
        FetchRequest::Buckets { .. } => source.list_buckets().await,
        FetchRequest::TagKeys { bucket, .. } => source.list_tag_keys(bucket).await,
        FetchRequest::TagValues {
            bucket, tag_key, ..
        } => source.list_tag_values(bucket, tag_key).await,
    }
}
