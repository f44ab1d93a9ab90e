use serde::{Deserialize, Serialize};

use super::state::{matching, RemoteDataState};
use crate::selection::WILDCARD;

/// What a tag card contributes to the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagRole {
    /// Restrict rows to the selected values of `tag_key`
    #[default]
    Filter,
    /// Group rows by the selected columns
    Group,
}

/// State of one tag card
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagSelectorState {
    /// Identity of the card; never reused within one builder
    pub tag_index: usize,
    #[serde(rename = "aggregateFunctionType")]
    pub role: TagRole,
    /// Selected key, empty when none
    pub tag_key: String,

    pub keys_status: RemoteDataState,
    pub keys: Vec<String>,
    pub keys_search_term: String,

    pub values_status: RemoteDataState,
    pub values: Vec<String>,
    pub values_search_term: String,
    pub selected_values: Vec<String>,

    #[serde(skip)]
    pub(crate) keys_generation: u64,
    #[serde(skip)]
    pub(crate) values_generation: u64,
}

impl TagSelectorState {
    pub fn new(tag_index: usize) -> Self {
        Self {
            tag_index,
            ..Default::default()
        }
    }

    pub fn filtered_keys(&self) -> Vec<&str> {
        matching(&self.keys, &self.keys_search_term)
    }

    pub fn filtered_values(&self) -> Vec<&str> {
        matching(&self.values, &self.values_search_term)
    }

    /// Badge count shown on the card
    pub fn selected_count(&self) -> usize {
        self.selected_values.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_values.is_empty()
    }

    /// Whether the candidate list offers the wildcard entry
    pub fn offers_wildcard(&self) -> bool {
        self.values.iter().any(|v| v == WILDCARD)
    }

    /// Selected values other than the wildcard
    pub fn particular_values(&self) -> impl Iterator<Item = &str> {
        self.selected_values
            .iter()
            .map(String::as_str)
            .filter(|v| *v != WILDCARD)
    }

    /// Clears the key-dependent value state ahead of a new value fetch
    pub(crate) fn reset_values(&mut self) {
        self.values.clear();
        self.selected_values.clear();
        self.values_status = RemoteDataState::NotStarted;
        self.values_generation += 1;
    }
}
