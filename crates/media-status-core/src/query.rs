use crate::cache::StatusCache;
use media_status_models::{AggregateStatus, ItemKind, LibraryItem, SeasonKey, SeasonStatus, ShowStatus};
use media_status_sources::{EpisodeFetcher, FetchError};
use std::sync::Arc;

/// Read path for watch status. The only way callers reach the cache.
pub struct StatusQuery {
    cache: StatusCache,
}

impl StatusQuery {
    pub fn new(fetcher: Arc<dyn EpisodeFetcher>) -> Self {
        Self {
            cache: StatusCache::new(fetcher),
        }
    }

    pub async fn get_show_status(&self, show_id: &str) -> Result<Arc<ShowStatus>, FetchError> {
        self.cache.get_show_status(show_id).await
    }

    pub async fn get_season_status(
        &self,
        show_id: &str,
        season_id: &SeasonKey,
    ) -> Result<SeasonStatus, FetchError> {
        self.cache.get_season_status(show_id, season_id).await
    }

    /// Forget a show so its next query reflects new playback
    pub async fn invalidate_show(&self, show_id: &str) -> bool {
        self.cache.invalidate(show_id).await
    }

    /// Indicator status for a browsed item.
    ///
    /// The item's own user data wins. Otherwise series and seasons are
    /// answered from their episodes; everything else is unwatched.
    pub async fn item_status(&self, item: &LibraryItem) -> Result<AggregateStatus, FetchError> {
        let own = item.own_status();
        if own != AggregateStatus::Unwatched {
            return Ok(own);
        }

        match (&item.kind, item.series_id.as_deref()) {
            (ItemKind::Series, _) => Ok(self.get_show_status(&item.id).await?.status()),
            (ItemKind::Season, Some(series_id)) => {
                let season_id = SeasonKey::from(item.id.as_str());
                Ok(self.get_season_status(series_id, &season_id).await?.status())
            }
            _ => Ok(AggregateStatus::Unwatched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use media_status_models::EpisodeRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedFetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FixedFetcher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl EpisodeFetcher for FixedFetcher {
        fn source_name(&self) -> &str {
            "fixed"
        }

        // s1 and the season-less episode watched, s2 untouched
        async fn fetch_episodes(&self, _show_id: &str) -> Result<Vec<EpisodeRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Timeout {
                    url: "/Shows/x/Episodes".to_string(),
                });
            }
            Ok(vec![
                EpisodeRecord {
                    episode_id: "e1".to_string(),
                    season_id: Some("s1".to_string()),
                    played: true,
                    playback_position: Duration::ZERO,
                },
                EpisodeRecord {
                    episode_id: "e2".to_string(),
                    season_id: Some("s2".to_string()),
                    played: false,
                    playback_position: Duration::ZERO,
                },
                EpisodeRecord {
                    episode_id: "special".to_string(),
                    season_id: None,
                    played: true,
                    playback_position: Duration::ZERO,
                },
            ])
        }
    }

    fn item(id: &str, kind: ItemKind, series_id: Option<&str>) -> LibraryItem {
        LibraryItem {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            series_id: series_id.map(str::to_string),
            played: false,
            playback_position: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_show_and_season_queries() {
        let fetcher = FixedFetcher::new();
        let query = StatusQuery::new(fetcher.clone());

        let show = query.get_show_status("show").await.unwrap();
        assert!(show.partial());
        assert!(!show.watched());

        assert!(query.get_season_status("show", &SeasonKey::from("s1")).await.unwrap().watched());
        assert!(!query.get_season_status("show", &SeasonKey::from("s2")).await.unwrap().watched());
        assert!(!query.get_season_status("show", &SeasonKey::from("s3")).await.unwrap().partial());
        assert!(query.get_season_status("show", &SeasonKey::Unassigned).await.unwrap().watched());

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_show_refetches() {
        let fetcher = FixedFetcher::new();
        let query = StatusQuery::new(fetcher.clone());

        query.get_show_status("show").await.unwrap();
        assert!(query.invalidate_show("show").await);
        query.get_show_status("show").await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_item_status_for_series_and_season() {
        let fetcher = FixedFetcher::new();
        let query = StatusQuery::new(fetcher.clone());

        let series = item("show", ItemKind::Series, None);
        assert_eq!(query.item_status(&series).await.unwrap(), AggregateStatus::Partial);

        let watched_season = item("s1", ItemKind::Season, Some("show"));
        assert_eq!(
            query.item_status(&watched_season).await.unwrap(),
            AggregateStatus::Watched
        );

        let unwatched_season = item("s2", ItemKind::Season, Some("show"));
        assert_eq!(
            query.item_status(&unwatched_season).await.unwrap(),
            AggregateStatus::Unwatched
        );

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_item_own_status_wins() {
        let fetcher = FixedFetcher::failing();
        let query = StatusQuery::new(fetcher.clone());

        let mut played = item("show", ItemKind::Series, None);
        played.played = true;
        assert_eq!(query.item_status(&played).await.unwrap(), AggregateStatus::Watched);

        let mut resumed = item("movie", ItemKind::Movie, None);
        resumed.playback_position = Duration::from_secs(90);
        assert_eq!(query.item_status(&resumed).await.unwrap(), AggregateStatus::Partial);

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_item_status_without_lookup() {
        let fetcher = FixedFetcher::failing();
        let query = StatusQuery::new(fetcher.clone());

        let episode = item("e1", ItemKind::Episode, Some("show"));
        assert_eq!(query.item_status(&episode).await.unwrap(), AggregateStatus::Unwatched);

        let orphan_season = item("s1", ItemKind::Season, None);
        assert_eq!(
            query.item_status(&orphan_season).await.unwrap(),
            AggregateStatus::Unwatched
        );

        let folder = item("lib", ItemKind::CollectionFolder, None);
        assert_eq!(query.item_status(&folder).await.unwrap(), AggregateStatus::Unwatched);

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_to_caller() {
        let fetcher = FixedFetcher::failing();
        let query = StatusQuery::new(fetcher.clone());

        let series = item("show", ItemKind::Series, None);
        let err = query.item_status(&series).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));

        // not cached, so the next call tries again
        assert!(query.get_show_status("show").await.is_err());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
