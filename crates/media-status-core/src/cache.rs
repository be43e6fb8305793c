use crate::aggregate::aggregate;
use futures::future::{BoxFuture, FutureExt, Shared};
use media_status_models::{SeasonKey, SeasonStatus, ShowStatus};
use media_status_sources::{EpisodeFetcher, FetchError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type FetchResult = Result<Arc<ShowStatus>, FetchError>;
type InFlightFetch = Shared<BoxFuture<'static, FetchResult>>;

enum Slot {
    /// Published aggregate; never mutated after insertion
    Ready(Arc<ShowStatus>),
    /// Fetch + aggregate in progress. Every caller for the show awaits the same future.
    Pending { generation: u64, fetch: InFlightFetch },
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<String, Slot>,
    next_generation: u64,
}

/// Memoized watch status per show.
///
/// Each show is fetched and aggregated at most once until it is invalidated.
/// Concurrent first-time callers for the same show share a single in-flight fetch.
/// Failed fetches are not cached; the next call retries.
pub struct StatusCache {
    fetcher: Arc<dyn EpisodeFetcher>,
    state: Mutex<CacheState>,
}

impl StatusCache {
    pub fn new(fetcher: Arc<dyn EpisodeFetcher>) -> Self {
        Self {
            fetcher,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub async fn get_show_status(&self, show_id: &str) -> Result<Arc<ShowStatus>, FetchError> {
        let (generation, fetch) = {
            let mut state = self.state.lock().await;
            let pending = match state.slots.get(show_id) {
                Some(Slot::Ready(status)) => {
                    debug!("Status cache hit: {}", show_id);
                    return Ok(Arc::clone(status));
                }
                Some(Slot::Pending { generation, fetch }) => Some((*generation, fetch.clone())),
                None => None,
            };

            match pending {
                Some((generation, fetch)) => match fetch.peek().cloned() {
                    None => {
                        debug!("Status cache: joining in-flight fetch for {}", show_id);
                        (generation, fetch)
                    }
                    // Finished, but every waiter went away before settling it
                    Some(Ok(status)) => {
                        state
                            .slots
                            .insert(show_id.to_string(), Slot::Ready(Arc::clone(&status)));
                        return Ok(status);
                    }
                    Some(Err(_)) => {
                        debug!("Status cache: discarding unsettled failed fetch for {}", show_id);
                        self.begin_fetch(&mut state, show_id)
                    }
                },
                None => {
                    debug!("Status cache miss: {}", show_id);
                    self.begin_fetch(&mut state, show_id)
                }
            }
        };

        let result = fetch.await;
        self.settle(show_id, generation, &result).await;
        result
    }

    /// Season lookup through the show aggregate. Unknown seasons yield the zero value.
    pub async fn get_season_status(
        &self,
        show_id: &str,
        season_id: &SeasonKey,
    ) -> Result<SeasonStatus, FetchError> {
        let show = self.get_show_status(show_id).await?;
        Ok(show.season(season_id))
    }

    /// Drop the cached (or in-flight) status for a show so the next query refetches.
    ///
    /// Callers already waiting on an in-flight fetch still receive its result,
    /// but that result is not stored.
    pub async fn invalidate(&self, show_id: &str) -> bool {
        let removed = self.state.lock().await.slots.remove(show_id).is_some();
        if removed {
            debug!("Status cache: invalidated {}", show_id);
        }
        removed
    }

    /// Insert a new pending slot for the show, replacing whatever was there
    fn begin_fetch(&self, state: &mut CacheState, show_id: &str) -> (u64, InFlightFetch) {
        let generation = state.next_generation;
        state.next_generation += 1;

        let fetch = self.start_fetch(show_id);
        state.slots.insert(
            show_id.to_string(),
            Slot::Pending {
                generation,
                fetch: fetch.clone(),
            },
        );
        (generation, fetch)
    }

    fn start_fetch(&self, show_id: &str) -> InFlightFetch {
        let fetcher = Arc::clone(&self.fetcher);
        let show_id = show_id.to_string();

        async move {
            let episodes = fetcher.fetch_episodes(&show_id).await?;
            let status = aggregate(&show_id, &episodes);
            info!(
                "Aggregated watch status for show {} from {}: {} episodes, {} seasons, {}",
                show_id,
                fetcher.source_name(),
                episodes.len(),
                status.seasons.len(),
                status.status().as_str()
            );
            Ok(Arc::new(status))
        }
        .boxed()
        .shared()
    }

    /// Publish or discard the outcome of the fetch identified by `generation`.
    /// Only the first waiter to get here acts; a slot that was invalidated or
    /// replaced in the meantime is left alone.
    async fn settle(&self, show_id: &str, generation: u64, result: &FetchResult) {
        let mut state = self.state.lock().await;
        let is_current = matches!(
            state.slots.get(show_id),
            Some(Slot::Pending { generation: g, .. }) if *g == generation
        );
        if !is_current {
            return;
        }

        match result {
            Ok(status) => {
                state
                    .slots
                    .insert(show_id.to_string(), Slot::Ready(Arc::clone(status)));
            }
            Err(e) => {
                warn!("Failed to fetch episodes for show {}: {}", show_id, e);
                state.slots.remove(show_id);
            }
        }
    }
}

#[cfg(test)]
impl StatusCache {
    /// Whether a completed aggregate is cached for the show
    async fn contains(&self, show_id: &str) -> bool {
        matches!(
            self.state.lock().await.slots.get(show_id),
            Some(Slot::Ready(_))
        )
    }

    /// Number of shows with a completed aggregate
    async fn len(&self) -> usize {
        self.state
            .lock()
            .await
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }
}
