//! Turning search hits into fully fetched messages.
//!
//! A search response only carries lightweight references. Enrichment walks
//! the response, keeps one task per distinct message, fetches every task
//! concurrently under a shared cancellation scope and writes results back by
//! slot so ordering follows the hits, not completion time.

use crate::config::Concurrency;
use crate::errors::{ConfigurationError, TeamsError, TeamsResult};
use crate::types::{
    ChatMessage, EnrichedMessage, EnrichmentTask, SearchEntity, SearchMessagesOptions, SearchPage,
};
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Parsed paging position of a search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Offset of the first hit
    pub from: u32,
    /// Page size
    pub size: u32,
}

impl PageRequest {
    /// Resolve paging from options, using `default_size` when `top` is unset
    pub fn from_options(options: &SearchMessagesOptions, default_size: u32) -> TeamsResult<Self> {
        let from = match options.page_token.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(token) => token.parse::<u32>().map_err(|_| {
                TeamsError::Configuration(ConfigurationError::InvalidConfiguration {
                    message: format!("Invalid page token: {token}"),
                })
            })?,
        };
        let size = options.top.filter(|top| *top > 0).unwrap_or(default_size);
        Ok(Self { from, size })
    }

    /// Token for the page after this one, given how many entities it held.
    ///
    /// A short page means the result set is exhausted.
    pub fn next_token(&self, entity_count: usize) -> Option<String> {
        if entity_count == 0 || entity_count < self.size as usize {
            return None;
        }
        let next = u64::from(self.from) + entity_count as u64;
        Some(next.to_string())
    }
}

fn non_null_items<'a>(value: Option<&'a Value>) -> impl Iterator<Item = &'a Value> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| !item.is_null())
}

fn string_field(object: &Map<String, Value>, name: &str) -> Option<String> {
    object
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn entity_from_hit(hit: &Value) -> Option<SearchEntity> {
    let resource = hit.get("resource")?.as_object()?;
    let message_id = string_field(resource, "id")?;

    let mut entity = SearchEntity::new(message_id);

    if let Some(identity) = resource.get("channelIdentity").and_then(Value::as_object) {
        entity.team_id = string_field(identity, "teamId");
        entity.channel_id = string_field(identity, "channelId");
    }
    entity.chat_id = string_field(resource, "chatId");
    entity.summary = hit
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(entity)
}

/// Extract entities from a raw search response.
///
/// Walks `value[] → hitsContainers[] → hits[] → resource`, skipping nulls
/// at every level and hits whose resource has no ID.
pub fn extract_entities(response: &Value) -> Vec<SearchEntity> {
    non_null_items(response.get("value"))
        .flat_map(|result| non_null_items(result.get("hitsContainers")))
        .flat_map(|container| non_null_items(container.get("hits")))
        .filter_map(entity_from_hit)
        .collect()
}

/// Build one task per distinct message accepted by `keep`.
///
/// The first occurrence of a message ID wins and keeps its original index.
pub fn build_tasks<K>(entities: &[SearchEntity], keep: K) -> Vec<EnrichmentTask>
where
    K: Fn(&SearchEntity) -> bool,
{
    let mut seen = HashSet::new();

    entities
        .iter()
        .enumerate()
        .filter_map(|(original_index, entity)| {
            let message_id = entity.message_id.as_deref()?;
            if !keep(entity) || !seen.insert(message_id) {
                return None;
            }
            Some(EnrichmentTask {
                original_index,
                entity: entity.clone(),
            })
        })
        .collect()
}

/// Fetch every task concurrently.
///
/// The returned vector has one slot per task, in task order. A fetch that
/// reports not-found leaves its slot empty. Any other failure cancels the
/// remaining fetches and is returned alone; nothing fetched so far is kept.
pub async fn enrich_tasks<F, Fut>(
    tasks: Vec<EnrichmentTask>,
    fetch: F,
    concurrency: Concurrency,
    cancel: &CancellationToken,
) -> TeamsResult<Vec<Option<EnrichedMessage>>>
where
    F: Fn(SearchEntity, CancellationToken) -> Fut,
    Fut: Future<Output = TeamsResult<ChatMessage>>,
{
    let mut slots: Vec<Option<EnrichedMessage>> = tasks.iter().map(|_| None).collect();
    if tasks.is_empty() {
        return Ok(slots);
    }

    let scope = cancel.child_token();
    let _scope_guard = scope.clone().drop_guard();
    let limit = concurrency.limit_for(tasks.len());

    let mut fetches = stream::iter(tasks.into_iter().enumerate())
        .map(|(slot, task)| {
            let fetched = fetch(task.entity.clone(), scope.child_token());
            async move { (slot, task, fetched.await) }
        })
        .buffer_unordered(limit);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TeamsError::Cancelled),
            next = fetches.next() => next,
        };
        let Some((slot, task, result)) = next else {
            break;
        };

        match result {
            Ok(message) => slots[slot] = Some(EnrichedMessage::new(message, &task.entity)),
            Err(error) if error.is_not_found() => {
                debug!(
                    message_id = ?task.entity.message_id,
                    original_index = task.original_index,
                    "Skipping search hit whose message no longer exists"
                );
            }
            Err(error) => {
                debug!(
                    message_id = ?task.entity.message_id,
                    error = %error,
                    "Enrichment fetch failed, cancelling remaining fetches"
                );
                scope.cancel();
                return Err(error);
            }
        }
    }

    Ok(slots)
}

/// Run a search and enrich its hits.
///
/// `search` receives a copy of `options`; the caller's value is never
/// touched. Pagination counts every extracted entity, so the next page
/// token advances even when `keep` rejects the whole page.
pub async fn enrich<S, SFut, K, F, Fut>(
    options: &SearchMessagesOptions,
    default_page_size: u32,
    default_concurrency: Concurrency,
    search: S,
    keep: K,
    fetch: F,
    cancel: &CancellationToken,
) -> TeamsResult<SearchPage>
where
    S: FnOnce(SearchMessagesOptions) -> SFut,
    SFut: Future<Output = TeamsResult<Value>>,
    K: Fn(&SearchEntity) -> bool,
    F: Fn(SearchEntity, CancellationToken) -> Fut,
    Fut: Future<Output = TeamsResult<ChatMessage>>,
{
    let options = options.clone();
    let page = PageRequest::from_options(&options, default_page_size)?;
    let concurrency = options.concurrency.unwrap_or(default_concurrency);

    let response = search(options).await?;

    let entities = extract_entities(&response);
    if entities.is_empty() {
        return Ok(SearchPage::default());
    }

    let next_page_token = page.next_token(entities.len());
    let tasks = build_tasks(&entities, keep);
    debug!(
        entities = entities.len(),
        tasks = tasks.len(),
        "Enriching search hits"
    );

    let messages = enrich_tasks(tasks, fetch, concurrency, cancel).await?;

    Ok(SearchPage {
        messages,
        next_page_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{search_hit, search_response};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_extract_skips_nulls_at_every_level() {
        let response = json!({
            "value": [
                null,
                {"hitsContainers": [
                    null,
                    {"hits": [
                        null,
                        {"resource": null},
                        {"resource": {"id": ""}},
                        {"resource": {"id": null}},
                        search_hit("m1", json!({"teamId": "t1", "channelId": "c1"}), None),
                    ]}
                ]}
            ]
        });

        let entities = extract_entities(&response);
        let expected = SearchEntity {
            summary: Some("<c0>m1</c0>".to_string()),
            ..SearchEntity::new("m1").in_channel("t1", "c1")
        };
        assert_eq!(entities, vec![expected]);
    }

    #[test]
    fn test_malformed_channel_identity_keeps_chat() {
        let response = search_response(vec![search_hit(
            "m1",
            json!("not-an-object"),
            Some("19:chat@unq.gbl.spaces"),
        )]);

        let entities = extract_entities(&response);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].team_id, None);
        assert_eq!(entities[0].channel_id, None);
        assert_eq!(entities[0].chat_id.as_deref(), Some("19:chat@unq.gbl.spaces"));
    }

    #[test]
    fn test_build_tasks_dedups_first_wins() {
        let entities = vec![
            SearchEntity::new("m1").in_chat("a"),
            SearchEntity::new("m1").in_chat("b"),
            SearchEntity::new("m2").in_chat("c"),
        ];

        let tasks = build_tasks(&entities, |_| true);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].original_index, 0);
        assert_eq!(tasks[0].entity.chat_id.as_deref(), Some("a"));
        assert_eq!(tasks[1].original_index, 2);
    }

    #[test]
    fn test_build_tasks_applies_predicate_and_skips_missing_ids() {
        let entities = vec![
            SearchEntity::default(),
            SearchEntity::new("m1"),
            SearchEntity::new("m2").in_chat("c"),
        ];

        let tasks = build_tasks(&entities, |e| e.location().is_some());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].original_index, 2);
    }

    #[test]
    fn test_page_request_and_next_token() {
        let options = SearchMessagesOptions::new("q").top(10).page_token("20");
        let page = PageRequest::from_options(&options, 25).unwrap();
        assert_eq!(page, PageRequest { from: 20, size: 10 });

        assert_eq!(page.next_token(10), Some("30".to_string()));
        assert_eq!(page.next_token(7), None);
        assert_eq!(page.next_token(0), None);

        let default_page = PageRequest::from_options(&SearchMessagesOptions::new("q"), 25).unwrap();
        assert_eq!(default_page, PageRequest { from: 0, size: 25 });
    }

    #[test]
    fn test_invalid_page_token() {
        let options = SearchMessagesOptions::new("q").page_token("abc");
        assert!(PageRequest::from_options(&options, 25).is_err());
    }
}
