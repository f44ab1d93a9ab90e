//! fluxbuilder - state core of a visual Flux query builder
//!
//! This crate holds the bucket, tag and aggregation selectors of a
//! dashboard query builder, the transitions that mutate them, and the
//! assembler that folds them into a Flux pipeline.

pub mod builder;
pub mod config;
pub mod metrics;
pub mod query;
pub mod selection;
pub mod session;
pub mod source;

pub use builder::{QueryBuilder, QueryBuilderState};
pub use config::BuilderConfig;
pub use query::assembler::{assemble, try_assemble, AssembleError, Assembler};
pub use selection::{all_or_particular, WILDCARD};
pub use session::QueryBuilderSession;
pub use source::{MetadataSource, SourceError};
