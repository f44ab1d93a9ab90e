//! Metrics recorded by the query builder
//!
//! Recorded through the `metrics` facade; whoever embeds the builder decides
//! which recorder (if any) to install.

use metrics::{counter, histogram};

use crate::builder::FetchKind;

/// Record a successfully assembled query
pub fn record_query_assembled() {
    counter!("fluxbuilder.query.assembled").increment(1);
}

/// Record the stage count of one assembled pipeline
pub fn record_query_stages(stages: usize) {
    histogram!("fluxbuilder.query.stages").record(stages as f64);
}

/// Record a metadata fetch issued by a transition
pub fn record_fetch_request(kind: FetchKind) {
    counter!("fluxbuilder.fetch.requests", "kind" => kind.as_str()).increment(1);
}

/// Record a failed metadata fetch
pub fn record_fetch_error(kind: FetchKind) {
    counter!("fluxbuilder.fetch.errors", "kind" => kind.as_str()).increment(1);
}

/// Record a fetch response dropped because its owner changed
pub fn record_stale_response(kind: FetchKind) {
    counter!("fluxbuilder.fetch.stale", "kind" => kind.as_str()).increment(1);
}
