use crate::error::FetchError;
use crate::jellyfin::api::{AuthSession, JellyfinHttpClient, PlaybackEvent};
use crate::jellyfin::auth::device_info;
use crate::traits::EpisodeFetcher;
use anyhow::Result;
use async_trait::async_trait;
use media_status_config::{Config, CredentialStore};
use media_status_models::{EpisodeRecord, ItemKind, LibraryItem};
use std::time::Duration;
use tracing::debug;

/// Signed-in view of a Jellyfin server
pub struct JellyfinClient {
    api: JellyfinHttpClient,
}

impl JellyfinClient {
    pub fn new(api: JellyfinHttpClient) -> Self {
        Self { api }
    }

    /// Build a client from configuration, attaching the stored session if there is one
    pub fn from_config(config: &Config, credentials: &mut CredentialStore) -> Result<Self> {
        let device = device_info(config, credentials);
        let mut api = JellyfinHttpClient::new(&config.server.url, device, config.timeout())?;

        if let (Some(token), Some(user_id)) = (credentials.get_access_token(), credentials.get_user_id()) {
            api = api.with_session(AuthSession {
                access_token: token.clone(),
                user_id: user_id.clone(),
                server_id: None,
            });
        }

        Ok(Self { api })
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_some()
    }

    pub async fn list_views(&self) -> Result<Vec<LibraryItem>, FetchError> {
        self.api.get_views().await
    }

    /// Children of `parent_id`, or with `include` every item of that kind below it
    pub async fn list_items(
        &self,
        parent_id: Option<&str>,
        include: Option<&ItemKind>,
    ) -> Result<Vec<LibraryItem>, FetchError> {
        self.api.get_items(parent_id, include).await
    }

    pub async fn get_item(&self, item_id: &str) -> Result<LibraryItem, FetchError> {
        self.api.get_item(item_id).await
    }

    pub async fn report_playback(
        &self,
        event: PlaybackEvent,
        item_id: &str,
        position: Duration,
    ) -> Result<(), FetchError> {
        self.api.report_playback(event, item_id, position).await
    }
}

#[async_trait]
impl EpisodeFetcher for JellyfinClient {
    fn source_name(&self) -> &str {
        "jellyfin"
    }

    async fn fetch_episodes(&self, show_id: &str) -> Result<Vec<EpisodeRecord>, FetchError> {
        let episodes = self.api.get_episodes(show_id).await?;
        debug!("Jellyfin: fetched {} episodes for show {}", episodes.len(), show_id);
        Ok(episodes)
    }
}
