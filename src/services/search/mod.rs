//! Search service for the Graph API.
//!
//! Runs message searches and enriches the hits into full messages.

pub mod enrichment;

pub use enrichment::{build_tasks, enrich, enrich_tasks, extract_entities, PageRequest};

use super::messages::MessagesServiceTrait;
use super::ServiceContext;
use crate::config::SearchConfig;
use crate::errors::{ResourceRefs, TeamsResult};
use crate::types::{ChatMessage, SearchEntity, SearchMessagesOptions, SearchPage};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Trait for search service operations
#[async_trait]
pub trait SearchServiceTrait: Send + Sync {
    /// Run a message search and return the raw response
    async fn query(
        &self,
        options: &SearchMessagesOptions,
        cancel: &CancellationToken,
    ) -> TeamsResult<Value>;

    /// Search messages and fetch each hit in full.
    ///
    /// Hits without a channel or chat location are dropped before fetching.
    async fn search_messages(
        &self,
        options: &SearchMessagesOptions,
        cancel: &CancellationToken,
    ) -> TeamsResult<SearchPage>;
}

/// Search service implementation
#[derive(Clone)]
pub struct SearchService {
    context: ServiceContext,
    messages: Arc<dyn MessagesServiceTrait>,
    config: SearchConfig,
}

impl SearchService {
    /// Create a new search service
    pub fn new(
        context: ServiceContext,
        messages: Arc<dyn MessagesServiceTrait>,
        config: SearchConfig,
    ) -> Self {
        Self {
            context,
            messages,
            config,
        }
    }

    /// Search configuration in effect
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search messages with a caller-supplied filter and fetch function
    pub async fn enrich_messages<K, F, Fut>(
        &self,
        options: &SearchMessagesOptions,
        keep: K,
        fetch: F,
        cancel: &CancellationToken,
    ) -> TeamsResult<SearchPage>
    where
        K: Fn(&SearchEntity) -> bool,
        F: Fn(SearchEntity, CancellationToken) -> Fut,
        Fut: Future<Output = TeamsResult<ChatMessage>>,
    {
        enrich(
            options,
            self.config.page_size,
            self.config.concurrency,
            |options| async move { self.query(&options, cancel).await },
            keep,
            fetch,
            cancel,
        )
        .await
    }
}

/// Request body for `POST /search/query`
pub fn search_request_body(query: &str, from: u32, size: u32) -> Value {
    json!({
        "requests": [{
            "entityTypes": ["chatMessage"],
            "query": {"queryString": query},
            "from": from,
            "size": size,
        }]
    })
}

#[async_trait]
impl SearchServiceTrait for SearchService {
    #[instrument(skip(self, options, cancel), fields(query = %options.query))]
    async fn query(
        &self,
        options: &SearchMessagesOptions,
        cancel: &CancellationToken,
    ) -> TeamsResult<Value> {
        let page = PageRequest::from_options(options, self.config.page_size)?;
        let body = search_request_body(&options.query, page.from, page.size);

        self.context
            .post("search.query", "search/query", body, cancel)
            .await
            .map_err(|e| e.classify(ResourceRefs::new()))
    }

    #[instrument(skip(self, options, cancel), fields(query = %options.query))]
    async fn search_messages(
        &self,
        options: &SearchMessagesOptions,
        cancel: &CancellationToken,
    ) -> TeamsResult<SearchPage> {
        let messages = self.messages.clone();

        self.enrich_messages(
            options,
            |entity| entity.location().is_some(),
            |entity, token| {
                let messages = messages.clone();
                async move { messages.fetch_for_entity(&entity, &token).await }
            },
            cancel,
        )
        .await
    }
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("context", &self.context)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_body() {
        let body = search_request_body("deploy failed", 25, 25);
        let request = &body["requests"][0];

        assert_eq!(request["entityTypes"][0], "chatMessage");
        assert_eq!(request["query"]["queryString"], "deploy failed");
        assert_eq!(request["from"], 25);
        assert_eq!(request["size"], 25);
    }
}
