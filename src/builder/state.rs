use serde::{Deserialize, Serialize};

use super::aggregation::AggregationSelectorState;
use super::bucket::BucketSelectorState;
use super::tags::TagSelectorState;

/// Loading lifecycle of server-sourced data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemoteDataState {
    #[default]
    NotStarted,
    Loading,
    Done,
    Error,
}

/// Snapshot of every selector of one query builder
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryBuilderState {
    pub buckets: BucketSelectorState,
    pub aggregation: AggregationSelectorState,
    pub tags: Vec<TagSelectorState>,
}

impl QueryBuilderState {
    /// Looks up a card by its tag index
    pub fn card(&self, tag_index: usize) -> Option<&TagSelectorState> {
        self.tags.iter().find(|t| t.tag_index == tag_index)
    }

    pub(crate) fn card_mut(&mut self, tag_index: usize) -> Option<&mut TagSelectorState> {
        self.tags.iter_mut().find(|t| t.tag_index == tag_index)
    }

    /// Number of cards with a non-empty value selection
    pub fn active_filter_count(&self) -> usize {
        self.tags.iter().filter(|t| t.has_selection()).count()
    }
}

/// Case-insensitive substring projection used by every search box
pub(crate) fn matching<'a>(items: &'a [String], term: &str) -> Vec<&'a str> {
    let needle = term.trim().to_lowercase();
    items
        .iter()
        .map(String::as_str)
        .filter(|item| needle.is_empty() || item.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive() {
        let items = vec!["Telegraf/autogen".to_string(), "_internal/monitor".to_string()];
        assert_eq!(matching(&items, "tele"), vec!["Telegraf/autogen"]);
        assert_eq!(matching(&items, "MONITOR"), vec!["_internal/monitor"]);
        assert_eq!(matching(&items, ""), vec!["Telegraf/autogen", "_internal/monitor"]);
        assert!(matching(&items, "Hello World").is_empty());
    }

    #[test]
    fn test_snapshot_field_names() {
        let json = r#"{
            "buckets": {"selectedBucket": "telegraf/autogen", "buckets": ["telegraf/autogen"], "status": "Done"},
            "aggregation": {"period": "13s", "fillMissing": true, "selectedFunctions": ["max"]},
            "tags": [{"tagIndex": 0, "tagKey": "_measurement", "aggregateFunctionType": "filter", "selectedValues": ["cpu"]}]
        }"#;
        let state: QueryBuilderState = serde_json::from_str(json).unwrap();
        assert_eq!(state.buckets.selected_bucket.as_deref(), Some("telegraf/autogen"));
        assert_eq!(state.buckets.status, RemoteDataState::Done);
        assert!(state.aggregation.fill_missing);
        assert_eq!(state.card(0).unwrap().selected_values, vec!["cpu"]);
        assert_eq!(state.active_filter_count(), 1);
    }
}
