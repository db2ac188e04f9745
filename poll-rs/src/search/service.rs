//! Conversation search service
//!
//! Filters then full-text searches a list of conversations, caching whole
//! results. Failures never escape `search`: they come back as
//! `SearchResult::error`.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::filters::apply_filters;
use super::highlight::Highlighter;
use super::types::*;
use crate::cache::{self, CacheStats, SearchCache};
use crate::config::SearchSettings;
use crate::error::Result;

/// Separator used when searching the tag list as one string
const TAG_SEPARATOR: &str = ", ";

/// Everything that changes a search outcome, serialized into the cache key
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheKeyParts<'a> {
    #[serde(flatten)]
    filters: &'a SearchFilters,
    conversation_count: usize,
    case_sensitive: bool,
}

/// Cached conversation search
pub struct ConversationSearchService {
    cache: Arc<Mutex<SearchCache<SearchResult>>>,
    highlighter: Highlighter,
    defaults: SearchOptions,
}

impl ConversationSearchService {
    /// Service with the default cache sizes and TTL
    pub fn new() -> Self {
        Self::from_settings(&SearchSettings::default())
    }

    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self {
            cache: Arc::new(Mutex::new(SearchCache::lru(
                settings.cache_max_size,
                settings.cache_ttl(),
            ))),
            highlighter: Highlighter::new(settings.regex_cache_size),
            defaults: SearchOptions {
                min_query_length: settings.min_query_length,
                case_sensitive: settings.case_sensitive,
            },
        }
    }

    /// Options derived from the settings the service was built with
    pub fn default_options(&self) -> &SearchOptions {
        &self.defaults
    }

    /// Filter, search and highlight `conversations`
    pub fn search(
        &self,
        conversations: &[Conversation],
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> SearchResult {
        let query = filters.query.trim().to_string();
        let filters = SearchFilters {
            query: query.clone(),
            ..filters.clone()
        };

        if !query.is_empty() && query.chars().count() < options.min_query_length {
            debug!("Query {:?} shorter than {} characters", query, options.min_query_length);
            return SearchResult::empty(query, filters);
        }

        let key = SearchCache::<SearchResult>::generate_key(
            &query,
            &CacheKeyParts {
                filters: &filters,
                conversation_count: conversations.len(),
                case_sensitive: options.case_sensitive,
            },
        );

        if let Some(cached) = self.cache.lock().get(&key) {
            debug!("Search cache hit for {:?}", query);
            return cached;
        }

        match self.perform_search(conversations, &filters, options) {
            Ok(result) => {
                let worth_caching = query.chars().count() >= options.min_query_length
                    || filters.active_count() > 1;
                if worth_caching {
                    self.cache.lock().set(key, result.clone());
                }
                debug!(
                    "Search for {:?} matched {} of {} conversations",
                    query,
                    result.total_count,
                    conversations.len()
                );
                result
            }
            Err(err) => {
                warn!("Conversation search failed: {}", err);
                SearchResult::failed(query, filters, err.to_string())
            }
        }
    }

    fn perform_search(
        &self,
        conversations: &[Conversation],
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        let filtered = apply_filters(conversations, filters)?;
        let query = filters.query.as_str();

        let mut highlights = HashMap::new();
        let matched: Vec<Conversation> = if query.is_empty() {
            filtered.into_iter().cloned().collect()
        } else {
            let mut matched = Vec::new();
            for conversation in filtered {
                let found = self.highlight_conversation(conversation, query, options.case_sensitive)?;
                if !found.is_empty() {
                    highlights.insert(conversation.id.clone(), found);
                    matched.push(conversation.clone());
                }
            }
            matched
        };

        Ok(SearchResult {
            total_count: matched.len(),
            conversations: matched,
            query: query.to_string(),
            filters: filters.clone(),
            highlights,
            is_loading: false,
            error: None,
        })
    }

    fn highlight_conversation(
        &self,
        conversation: &Conversation,
        query: &str,
        case_sensitive: bool,
    ) -> Result<Vec<SearchHighlight>> {
        let tags = conversation.tags.join(TAG_SEPARATOR);
        let fields = [
            (HighlightField::Title, conversation.title.as_str()),
            (HighlightField::Content, conversation.first_message.as_str()),
            (HighlightField::Tags, tags.as_str()),
        ];

        let mut found = Vec::new();
        for (field, text) in fields {
            found.extend(self.highlight_matches(text, query, field, case_sensitive)?);
        }

        Ok(found)
    }

    /// Literal matches of `query` in `text`, tagged with `field`
    pub fn highlight_matches(
        &self,
        text: &str,
        query: &str,
        field: HighlightField,
        case_sensitive: bool,
    ) -> Result<Vec<SearchHighlight>> {
        self.highlighter.highlight_matches(text, query, field, case_sensitive)
    }

    /// Drop cached results; all of them, or those whose key matches `pattern`
    pub fn invalidate_cache(&self, pattern: Option<&str>) -> usize {
        self.cache.lock().invalidate(pattern)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Start the periodic purge of expired results
    pub fn spawn_cleanup(&self, every: Duration) -> JoinHandle<()> {
        cache::spawn_cleanup(self.cache.clone(), every)
    }
}

impl Default for ConversationSearchService {
    fn default() -> Self {
        Self::new()
    }
}
