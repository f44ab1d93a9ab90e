use thiserror::Error;
use tracing::debug;

use super::flux;
use crate::builder::{AggregationSelectorState, QueryBuilderState, TagRole, TagSelectorState};
use crate::config::BuilderConfig;
use crate::metrics;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("No bucket selected")]
    MissingBucket,
}

/// Builds Flux pipelines from builder state.
///
/// Stages are emitted in a fixed order: `from`, `range`, one `filter` per
/// filter card, a single `group` over the columns of every group card, then
/// `aggregateWindow` and `yield`. Each selected aggregate function gets its
/// own pipeline.
#[derive(Debug, Clone)]
pub struct Assembler {
    retention_policy: String,
    default_function: String,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::from_config(&BuilderConfig::default())
    }
}

impl Assembler {
    pub fn from_config(config: &BuilderConfig) -> Self {
        Self {
            retention_policy: config.default_retention_policy.clone(),
            default_function: config.default_function.clone(),
        }
    }

    /// `db/rp` form of a bucket; bare names get the default retention policy
    pub fn bucket_path(&self, bucket: &str) -> String {
        if bucket.contains('/') {
            bucket.to_string()
        } else {
            format!("{}/{}", bucket, self.retention_policy)
        }
    }

    pub fn try_assemble(
        &self,
        bucket: Option<&str>,
        tags: &[TagSelectorState],
        aggregation: &AggregationSelectorState,
    ) -> Result<String, AssembleError> {
        let bucket = bucket
            .filter(|b| !b.trim().is_empty())
            .ok_or(AssembleError::MissingBucket)?;

        let mut stages = vec![flux::from_bucket(&self.bucket_path(bucket)), flux::range()];
        stages.extend(
            tags.iter()
                .filter(|t| t.role == TagRole::Filter && !t.tag_key.is_empty())
                .filter_map(|t| flux::filter(&t.tag_key, t.particular_values())),
        );
        // a later group() replaces an earlier one, so all group cards share one stage
        let mut columns: Vec<&str> = Vec::new();
        for column in tags
            .iter()
            .filter(|t| t.role == TagRole::Group)
            .flat_map(|t| t.particular_values())
        {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        stages.extend(flux::group(columns));

        let every = aggregation.period.every();
        let pipelines: Vec<String> = aggregation
            .functions_or(&self.default_function)
            .into_iter()
            .map(|function| {
                let mut pipeline = stages.clone();
                pipeline.push(flux::aggregate_window(
                    every,
                    function,
                    aggregation.fill_missing,
                ));
                pipeline.push(flux::yield_result(function));
                metrics::record_query_stages(pipeline.len());
                pipeline.join(flux::STAGE_SEPARATOR)
            })
            .collect();

        debug!("Assembled {} pipeline(s) for {}", pipelines.len(), bucket);
        metrics::record_query_assembled();
        Ok(pipelines.join(flux::PIPELINE_SEPARATOR))
    }

    /// Like [`try_assemble`](Self::try_assemble), but yields an empty string
    /// when no bucket is selected
    pub fn assemble(
        &self,
        bucket: Option<&str>,
        tags: &[TagSelectorState],
        aggregation: &AggregationSelectorState,
    ) -> String {
        self.try_assemble(bucket, tags, aggregation)
            .unwrap_or_default()
    }

    pub fn assemble_state(&self, state: &QueryBuilderState) -> String {
        self.assemble(
            state.buckets.selected_bucket.as_deref(),
            &state.tags,
            &state.aggregation,
        )
    }
}

/// Assembles a query with the default configuration
pub fn assemble(
    bucket: Option<&str>,
    tags: &[TagSelectorState],
    aggregation: &AggregationSelectorState,
) -> String {
    Assembler::default().assemble(bucket, tags, aggregation)
}

/// Assembles a query with the default configuration, failing without a bucket
pub fn try_assemble(
    bucket: Option<&str>,
    tags: &[TagSelectorState],
    aggregation: &AggregationSelectorState,
) -> Result<String, AssembleError> {
    Assembler::default().try_assemble(bucket, tags, aggregation)
}
