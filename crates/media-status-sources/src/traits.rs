use crate::error::FetchError;
use async_trait::async_trait;
use media_status_models::EpisodeRecord;

/// Source of per-episode watch records for a show.
///
/// Implementations own whatever authentication context the server needs;
/// callers only supply the show id.
#[async_trait]
pub trait EpisodeFetcher: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch_episodes(&self, show_id: &str) -> Result<Vec<EpisodeRecord>, FetchError>;
}
