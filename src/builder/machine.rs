use std::collections::VecDeque;

use tracing::{debug, info, warn};

use super::fetch::{FetchOutcome, FetchRequest, FetchResponse};
use super::state::{QueryBuilderState, RemoteDataState};
use super::tags::{TagRole, TagSelectorState};
use crate::config::BuilderConfig;
use crate::metrics;
use crate::query::assembler::Assembler;
use crate::selection::{toggle, toggle_with_wildcard};

/// Query builder state machine.
///
/// All mutation goes through the named transitions below. Transitions never
/// block: whenever they need backend metadata they queue a [`FetchRequest`],
/// which the caller drains, executes and hands back through [`apply`].
///
/// [`apply`]: QueryBuilder::apply
#[derive(Debug)]
pub struct QueryBuilder {
    state: QueryBuilderState,
    config: BuilderConfig,
    /// Next card identity to hand out
    next_tag_index: usize,
    /// Bumped whenever the selected bucket changes
    bucket_generation: u64,
    /// Bumped whenever the bucket list is (re)requested
    load_generation: u64,
    outbox: VecDeque<FetchRequest>,
}

impl QueryBuilder {
    /// Creates a freshly mounted builder and queues the bucket list fetch
    pub fn new(config: BuilderConfig) -> Self {
        let mut builder = Self::from_state(QueryBuilderState::default(), config);
        builder.add_card();
        builder.load_buckets();
        builder
    }

    /// Restores a builder from a snapshot without issuing any fetch
    pub fn from_state(state: QueryBuilderState, config: BuilderConfig) -> Self {
        let next_tag_index = state
            .tags
            .iter()
            .map(|t| t.tag_index + 1)
            .max()
            .unwrap_or(0);
        Self {
            state,
            config,
            next_tag_index,
            bucket_generation: 0,
            load_generation: 0,
            outbox: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &QueryBuilderState {
        &self.state
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn into_state(self) -> QueryBuilderState {
        self.state
    }

    /// Takes every queued fetch request, oldest first
    pub fn drain_requests(&mut self) -> Vec<FetchRequest> {
        self.outbox.drain(..).collect()
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.outbox.is_empty()
    }

    fn enqueue(&mut self, request: FetchRequest) {
        metrics::record_fetch_request(request.kind());
        self.outbox.push_back(request);
    }

    // Buckets

    /// Requests the bucket list; also the retry path after a failure
    pub fn load_buckets(&mut self) {
        self.load_generation += 1;
        self.state.buckets.begin_load();
        self.enqueue(FetchRequest::Buckets {
            load_generation: self.load_generation,
        });
    }

    /// Selects a bucket. Switching away from a previously selected bucket
    /// starts over with a single empty tag card.
    pub fn select_bucket(&mut self, name: &str) {
        if self.state.buckets.selected_bucket.as_deref() == Some(name) {
            return;
        }
        if !self.state.buckets.is_selectable(name) {
            warn!("Ignoring selection of unknown bucket {}", name);
            return;
        }

        info!("Selected bucket {}", name);
        let previous = self.state.buckets.selected_bucket.replace(name.to_string());
        if previous.is_some() {
            self.reset_cards();
        } else {
            // cards mounted before any bucket hold no bucket-scoped data yet
            self.bucket_generation += 1;
            let indexes: Vec<usize> = self.state.tags.iter().map(|t| t.tag_index).collect();
            for tag_index in indexes {
                self.request_keys(tag_index);
            }
        }
    }

    pub fn set_bucket_search_term(&mut self, term: &str) {
        self.state.buckets.set_search_term(term);
    }

    pub fn filtered_buckets(&self) -> Vec<&str> {
        self.state.buckets.filtered_buckets()
    }

    /// Tags are bucket-scoped: drops every card and mounts a fresh one
    fn reset_cards(&mut self) {
        self.bucket_generation += 1;
        self.state.tags.clear();
        self.add_card();
    }

    // Tag cards

    /// Appends an empty card and returns its tag index
    pub fn add_card(&mut self) -> usize {
        let tag_index = self.next_tag_index;
        self.next_tag_index += 1;
        self.state.tags.push(TagSelectorState::new(tag_index));
        debug!("Added tag card {}", tag_index);
        self.request_keys(tag_index);
        tag_index
    }

    /// Removes a card. Other cards keep their indexes, and any fetch still
    /// in flight for the removed card is discarded on arrival.
    pub fn remove_card(&mut self, tag_index: usize) -> bool {
        let before = self.state.tags.len();
        self.state.tags.retain(|t| t.tag_index != tag_index);
        let removed = self.state.tags.len() != before;
        if removed {
            debug!("Removed tag card {}", tag_index);
        }
        removed
    }

    /// Re-requests the key list of a card; the retry path after a failure
    pub fn reload_tag_keys(&mut self, tag_index: usize) {
        self.request_keys(tag_index);
    }

    fn request_keys(&mut self, tag_index: usize) {
        let Some(bucket) = self.state.buckets.selected_bucket.clone() else {
            return;
        };
        let bucket_generation = self.bucket_generation;
        let Some(card) = self.state.card_mut(tag_index) else {
            return;
        };

        card.keys_generation += 1;
        card.keys_status = RemoteDataState::Loading;
        let request = FetchRequest::TagKeys {
            bucket,
            bucket_generation,
            tag_index,
            keys_generation: card.keys_generation,
        };
        self.enqueue(request);
    }

    /// Selects the key of a card, dropping its previous values and selection.
    /// Group cards keep their column candidates, which do not depend on the key.
    pub fn select_tag_key(&mut self, tag_index: usize, key: &str) {
        let Some(card) = self.state.card_mut(tag_index) else {
            return;
        };
        card.tag_key = key.to_string();
        if card.role == TagRole::Group {
            return;
        }
        card.reset_values();
        debug!("Card {} selected key {}", tag_index, key);
        self.request_values(tag_index);
    }

    fn request_values(&mut self, tag_index: usize) {
        let bucket = self.state.buckets.selected_bucket.clone();
        let bucket_generation = self.bucket_generation;
        let Some(card) = self.state.card_mut(tag_index) else {
            return;
        };
        if card.role == TagRole::Group {
            return;
        }
        let Some(bucket) = bucket.filter(|_| !card.tag_key.is_empty()) else {
            return;
        };

        card.values_status = RemoteDataState::Loading;
        let request = FetchRequest::TagValues {
            bucket,
            tag_key: card.tag_key.clone(),
            bucket_generation,
            tag_index,
            values_generation: card.values_generation,
        };
        self.enqueue(request);
    }

    /// Adds or removes a value from a card's selection
    pub fn toggle_tag_value(&mut self, tag_index: usize, value: &str) {
        let is_last = self.state.tags.last().map(|t| t.tag_index) == Some(tag_index);
        let Some(card) = self.state.card_mut(tag_index) else {
            return;
        };

        card.selected_values = if card.offers_wildcard() {
            toggle_with_wildcard(&card.selected_values, value)
        } else {
            toggle(&card.selected_values, value)
        };
        let has_selection = card.has_selection();

        if is_last && has_selection && self.config.auto_append_card {
            self.add_card();
        }
    }

    /// Switches a card between filtering and grouping
    pub fn set_tag_role(&mut self, tag_index: usize, role: TagRole) {
        let Some(card) = self.state.card_mut(tag_index) else {
            return;
        };
        if card.role == role {
            return;
        }

        card.role = role;
        card.reset_values();
        match role {
            TagRole::Group => {
                card.values = card.keys.clone();
                card.values_status = card.keys_status;
            }
            TagRole::Filter => self.request_values(tag_index),
        }
    }

    pub fn set_keys_search_term(&mut self, tag_index: usize, term: &str) {
        if let Some(card) = self.state.card_mut(tag_index) {
            card.keys_search_term = term.to_string();
        }
    }

    pub fn set_values_search_term(&mut self, tag_index: usize, term: &str) {
        if let Some(card) = self.state.card_mut(tag_index) {
            card.values_search_term = term.to_string();
        }
    }

    /// Badge count of one card; zero for unknown cards
    pub fn selected_count(&self, tag_index: usize) -> usize {
        self.state
            .card(tag_index)
            .map(TagSelectorState::selected_count)
            .unwrap_or(0)
    }

    pub fn active_filter_count(&self) -> usize {
        self.state.active_filter_count()
    }

    // Aggregation

    pub fn set_period(&mut self, value: &str) -> bool {
        self.state.aggregation.set_period(value)
    }

    pub fn toggle_fill_missing(&mut self) {
        self.state.aggregation.toggle_fill_missing();
    }

    pub fn toggle_function(&mut self, name: &str) -> bool {
        self.state.aggregation.toggle_function(name)
    }

    /// Assembles the Flux query for the current state
    pub fn build_query(&self) -> String {
        Assembler::from_config(&self.config).assemble_state(&self.state)
    }

    // Fetch completions

    /// Applies a fetch completion, or discards it if it went stale
    pub fn apply(&mut self, response: FetchResponse) -> FetchOutcome {
        let kind = response.request.kind();
        if response.result.is_err() {
            metrics::record_fetch_error(kind);
        }

        let outcome = match response.request {
            FetchRequest::Buckets { load_generation } => {
                self.apply_buckets(load_generation, response.result)
            }
            FetchRequest::TagKeys {
                bucket_generation,
                tag_index,
                keys_generation,
                ..
            } => self.apply_keys(bucket_generation, tag_index, keys_generation, response.result),
            FetchRequest::TagValues {
                tag_key,
                bucket_generation,
                tag_index,
                values_generation,
                ..
            } => self.apply_values(
                bucket_generation,
                tag_index,
                &tag_key,
                values_generation,
                response.result,
            ),
        };

        if outcome == FetchOutcome::Discarded {
            debug!("Discarded stale {} response", kind.as_str());
            metrics::record_stale_response(kind);
        }
        outcome
    }

    fn apply_buckets(
        &mut self,
        load_generation: u64,
        result: Result<Vec<String>, crate::source::SourceError>,
    ) -> FetchOutcome {
        if load_generation != self.load_generation {
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(names) => {
                info!("Loaded {} buckets", names.len());
                if self.state.buckets.finish_load(names) {
                    warn!("Selected bucket no longer exists, clearing tag cards");
                    self.reset_cards();
                }
            }
            Err(e) => {
                warn!("Failed to load buckets: {}", e);
                self.state.buckets.fail_load();
            }
        }
        FetchOutcome::Applied
    }

    fn apply_keys(
        &mut self,
        bucket_generation: u64,
        tag_index: usize,
        keys_generation: u64,
        result: Result<Vec<String>, crate::source::SourceError>,
    ) -> FetchOutcome {
        if bucket_generation != self.bucket_generation {
            return FetchOutcome::Discarded;
        }
        let Some(card) = self.state.card_mut(tag_index) else {
            return FetchOutcome::Discarded;
        };
        if card.keys_generation != keys_generation {
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(keys) => {
                card.keys = keys;
                card.keys_status = RemoteDataState::Done;
                if card.role == TagRole::Group {
                    card.values = card.keys.clone();
                    card.values_status = RemoteDataState::Done;
                } else if card.tag_key.is_empty() {
                    if let Some(key) = self.default_key_for(tag_index) {
                        self.select_tag_key(tag_index, &key);
                    }
                }
            }
            Err(e) => {
                warn!("Failed to load tag keys for card {}: {}", tag_index, e);
                card.keys_status = RemoteDataState::Error;
            }
        }
        FetchOutcome::Applied
    }

    fn apply_values(
        &mut self,
        bucket_generation: u64,
        tag_index: usize,
        tag_key: &str,
        values_generation: u64,
        result: Result<Vec<String>, crate::source::SourceError>,
    ) -> FetchOutcome {
        if bucket_generation != self.bucket_generation {
            return FetchOutcome::Discarded;
        }
        let Some(card) = self.state.card_mut(tag_index) else {
            return FetchOutcome::Discarded;
        };
        if card.values_generation != values_generation
            || card.tag_key != tag_key
            || card.role != TagRole::Filter
        {
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(values) => {
                card.values = values;
                card.values_status = RemoteDataState::Done;
            }
            Err(e) => {
                warn!("Failed to load values of {} for card {}: {}", tag_key, tag_index, e);
                card.values_status = RemoteDataState::Error;
            }
        }
        FetchOutcome::Applied
    }

    /// Picks the key a card starts with: the first preferred key no other
    /// filter card uses, else the first unused key of the card's list.
    fn default_key_for(&self, tag_index: usize) -> Option<String> {
        let card = self.state.card(tag_index)?;
        let used: Vec<&str> = self
            .state
            .tags
            .iter()
            .filter(|t| t.tag_index != tag_index && t.role == TagRole::Filter)
            .map(|t| t.tag_key.as_str())
            .filter(|k| !k.is_empty())
            .collect();
        let available = |key: &&String| card.keys.contains(*key) && !used.contains(&key.as_str());

        self.config
            .default_tag_keys
            .iter()
            .find(available)
            .or_else(|| card.keys.iter().find(available))
            .cloned()
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}
