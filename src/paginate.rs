//! Page-number pagination over list endpoints
//!
//! [`pages`] turns a list endpoint into a lazy stream of item batches. The
//! stream ends when, in priority order:
//! 1. the fetcher reports exhaustion (or a malformed page): partial results,
//! 2. the server reports no next page: complete results,
//! 3. the optional item cap is reached: the last batch is truncated so the
//!    total never exceeds the cap.

use crate::api::ListResponse;
use crate::client::{ApiClient, Query};
use crate::config::PaginationConfig;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// A list endpoint plus its filter parameters
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Endpoint path relative to the API base
    pub endpoint: String,
    /// Filter and sort parameters (paging parameters are added per page)
    pub filters: Query,
}

impl PageRequest {
    /// Request for `endpoint` with the given filters
    pub fn new(endpoint: impl Into<String>, filters: &[(&str, &str)]) -> Self {
        Self {
            endpoint: endpoint.into(),
            filters: filters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn page_query(&self, page: u32, page_size: u32) -> Query {
        let mut query = self.filters.clone();
        query.push(("page[size]".to_string(), page_size.to_string()));
        query.push(("page[number]".to_string(), page.to_string()));
        query
    }
}

struct Cursor<'a> {
    client: &'a mut ApiClient,
    request: PageRequest,
    config: PaginationConfig,
    cap: Option<usize>,
    page: u32,
    taken: usize,
    done: bool,
}

/// Stream the batches of a paginated list endpoint, starting at page 1
pub fn pages<'a, T>(
    client: &'a mut ApiClient,
    request: PageRequest,
    config: &PaginationConfig,
    cap: Option<usize>,
) -> impl Stream<Item = Vec<T>> + 'a
where
    T: DeserializeOwned + 'a,
{
    let cursor = Cursor {
        client,
        request,
        config: config.clone(),
        cap,
        page: 1,
        taken: 0,
        done: cap == Some(0),
    };

    stream::unfold(cursor, |mut cursor| async move {
        if cursor.done {
            return None;
        }

        if cursor.page > 1 && !cursor.config.page_delay.is_zero() {
            tokio::time::sleep(cursor.config.page_delay).await;
        }

        let query = cursor.request.page_query(cursor.page, cursor.config.page_size);
        let response: ListResponse<T> = match cursor.client.fetch(&cursor.request.endpoint, &query).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                warn!(
                    endpoint = %cursor.request.endpoint,
                    page = cursor.page,
                    "page unavailable after retries, continuing with partial data"
                );
                return None;
            }
            Err(e) => {
                warn!(
                    endpoint = %cursor.request.endpoint,
                    page = cursor.page,
                    error = %e,
                    "page could not be decoded, continuing with partial data"
                );
                return None;
            }
        };

        let mut batch = response.data;
        if let Some(cap) = cursor.cap {
            batch.truncate(cap.saturating_sub(cursor.taken));
        }
        cursor.taken += batch.len();

        let cap_reached = cursor.cap.is_some_and(|cap| cursor.taken >= cap);
        if cap_reached {
            debug!(endpoint = %cursor.request.endpoint, taken = cursor.taken, "item cap reached");
        }
        cursor.done = cap_reached || !response.meta.has_next_page;

        if let Some(total) = response.meta.total_elements {
            let every = cursor.config.progress_every.max(1);
            if total > u64::from(cursor.config.page_size) && cursor.page % every == 0 {
                info!(
                    endpoint = %cursor.request.endpoint,
                    retrieved = cursor.taken,
                    total,
                    "pagination progress"
                );
            }
        }

        cursor.page += 1;
        Some((batch, cursor))
    })
}

/// Drain [`pages`] into one vector
pub async fn collect_all<T>(
    client: &mut ApiClient,
    request: PageRequest,
    config: &PaginationConfig,
    cap: Option<usize>,
) -> Vec<T>
where
    T: DeserializeOwned,
{
    pages(client, request, config, cap).concat().await
}
