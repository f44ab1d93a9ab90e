//! Query builder module
//! Holds the selector states and the transitions that mutate them.

pub mod aggregation;
pub mod bucket;
pub mod fetch;
pub mod machine;
pub mod state;
pub mod tags;

pub use aggregation::{AggregationPeriod, AggregationSelectorState};
pub use bucket::BucketSelectorState;
pub use fetch::{FetchKind, FetchOutcome, FetchRequest, FetchResponse};
pub use machine::QueryBuilder;
pub use state::{QueryBuilderState, RemoteDataState};
pub use tags::{TagRole, TagSelectorState};
