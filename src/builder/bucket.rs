use serde::{Deserialize, Serialize};

use super::state::{matching, RemoteDataState};

/// State of the bucket picker
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketSelectorState {
    /// The single selected bucket, if any
    pub selected_bucket: Option<String>,
    /// Known bucket names, in server order
    pub buckets: Vec<String>,
    /// Lifecycle of the bucket list fetch
    pub status: RemoteDataState,
    /// Client-side filter text
    pub search_term: String,
}

impl BucketSelectorState {
    /// Buckets matching the current search term
    pub fn filtered_buckets(&self) -> Vec<&str> {
        matching(&self.buckets, &self.search_term)
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    /// Whether `name` may become the selected bucket.
    ///
    /// Until the list is loaded any name is accepted; afterwards it has to be
    /// one of the known buckets.
    pub fn is_selectable(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.status != RemoteDataState::Done || self.buckets.iter().any(|b| b == name)
    }

    pub(crate) fn begin_load(&mut self) {
        self.status = RemoteDataState::Loading;
    }

    /// Stores a fetched list. Returns true if the selection had to be dropped
    /// because the bucket disappeared.
    pub(crate) fn finish_load(&mut self, names: Vec<String>) -> bool {
        self.buckets = names;
        self.status = RemoteDataState::Done;

        let orphaned = self
            .selected_bucket
            .as_ref()
            .is_some_and(|selected| !self.buckets.contains(selected));
        if orphaned {
            self.selected_bucket = None;
        }
        orphaned
    }

    /// Marks the fetch as failed, keeping whatever list was shown before
    pub(crate) fn fail_load(&mut self) {
        self.status = RemoteDataState::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(names: &[&str]) -> BucketSelectorState {
        let mut state = BucketSelectorState::default();
        state.finish_load(names.iter().map(|n| n.to_string()).collect());
        state
    }

    #[test]
    fn test_search_is_display_projection() {
        let mut state = loaded(&["telegraf/autogen", "_internal/monitor"]);
        state.set_search_term("Hello World");
        assert!(state.filtered_buckets().is_empty());
        assert_eq!(state.buckets.len(), 2);

        state.set_search_term("");
        assert_eq!(state.filtered_buckets().len(), 2);
    }

    #[test]
    fn test_failure_keeps_stale_list() {
        let mut state = loaded(&["telegraf/autogen"]);
        state.begin_load();
        state.fail_load();
        assert_eq!(state.status, RemoteDataState::Error);
        assert_eq!(state.buckets, vec!["telegraf/autogen"]);
    }

    #[test]
    fn test_reload_drops_vanished_selection() {
        let mut state = loaded(&["a/autogen", "b/autogen"]);
        state.selected_bucket = Some("b/autogen".to_string());

        assert!(!state.finish_load(vec!["a/autogen".to_string(), "b/autogen".to_string()]));
        assert!(state.finish_load(vec!["a/autogen".to_string()]));
        assert_eq!(state.selected_bucket, None);
    }

    #[test]
    fn test_selectable() {
        let mut state = BucketSelectorState::default();
        assert!(state.is_selectable("anything"));
        assert!(!state.is_selectable(""));

        state.finish_load(vec!["a/autogen".to_string()]);
        assert!(state.is_selectable("a/autogen"));
        assert!(!state.is_selectable("b/autogen"));
    }
}
