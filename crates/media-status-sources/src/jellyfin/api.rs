use crate::error::FetchError;
use anyhow::{Context, Result};
use media_status_models::{duration_to_ticks, ticks_to_duration, EpisodeRecord, ItemKind, LibraryItem};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, trace};

pub const CLIENT_NAME: &str = "finwatch";

/// Identifies this installation to the server
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub user_id: String,
    pub server_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    user: UserDto,
    server_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserDto {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<ItemDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemDto {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "Type")]
    type_: Option<String>,
    season_id: Option<String>,
    series_id: Option<String>,
    user_data: Option<UserDataDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserDataDto {
    #[serde(default)]
    played: bool,
    #[serde(default)]
    playback_position_ticks: i64,
}

impl UserDataDto {
    fn position(&self) -> Duration {
        // Negative positions show up on some servers after a reset
        ticks_to_duration(self.playback_position_ticks.max(0) as u64)
    }
}

impl ItemDto {
    fn into_episode(self) -> Result<EpisodeRecord, String> {
        let episode_id = self.id.ok_or_else(|| "episode without Id".to_string())?;
        let user_data = self.user_data.unwrap_or_default();
        Ok(EpisodeRecord {
            episode_id,
            season_id: self.season_id,
            played: user_data.played,
            playback_position: user_data.position(),
        })
    }

    fn into_library_item(self) -> Result<LibraryItem, String> {
        let id = self.id.ok_or_else(|| "item without Id".to_string())?;
        let user_data = self.user_data.unwrap_or_default();
        Ok(LibraryItem {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            kind: ItemKind::from_server_type(self.type_.as_deref().unwrap_or_default()),
            series_id: self.series_id,
            played: user_data.played,
            playback_position: user_data.position(),
        })
    }
}

/// Playback session events reported back to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Start,
    Progress,
    Stopped,
}

impl PlaybackEvent {
    fn path(&self) -> &'static str {
        match self {
            PlaybackEvent::Start => "/Sessions/Playing",
            PlaybackEvent::Progress => "/Sessions/Playing/Progress",
            PlaybackEvent::Stopped => "/Sessions/Playing/Stopped",
        }
    }

    fn body(&self, item_id: &str, position: Duration) -> Value {
        let ticks = duration_to_ticks(position);
        match self {
            PlaybackEvent::Start => json!({
                "ItemId": item_id,
                "CanSeek": true,
                "IsPaused": true,
                "IsMuted": false,
                "PlaybackStartTimeTicks": ticks,
                "PlayMethod": "DirectStream",
            }),
            PlaybackEvent::Progress => json!({
                "ItemId": item_id,
                "PositionTicks": ticks,
            }),
            PlaybackEvent::Stopped => json!({
                "ItemId": item_id,
                "PositionTicks": ticks,
                "MediaSourceId": item_id,
            }),
        }
    }
}

/// Percent-encode an id for use as a single URL path segment
fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

pub struct JellyfinHttpClient {
    client: Client,
    base_url: String,
    device: DeviceInfo,
    session: Option<AuthSession>,
}

impl JellyfinHttpClient {
    pub fn new(base_url: &str, device: DeviceInfo, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            device,
            session: None,
        })
    }

    pub fn with_session(mut self, session: AuthSession) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn require_session(&self) -> Result<&AuthSession, FetchError> {
        self.session.as_ref().ok_or(FetchError::NotAuthenticated)
    }

    /// `MediaBrowser` authorization value; carries the token once signed in
    fn authorization_header(&self) -> String {
        let mut value = format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
            CLIENT_NAME,
            self.device.name,
            self.device.id,
            env!("CARGO_PKG_VERSION")
        );
        if let Some(ref session) = self.session {
            value.push_str(&format!(", Token=\"{}\"", session.access_token));
        }
        value
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response, FetchError> {
        trace!("Jellyfin: {} {} {:?}", method, url, query);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("X-Emby-Authorization", self.authorization_header())
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!("Jellyfin: {} {} returned HTTP {}", method, url, status);
            return Err(FetchError::from_status(url, status));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        let response = self.send(Method::GET, &url, query, None).await?;
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        serde_json::from_str(&text).map_err(|e| FetchError::Malformed {
            url,
            message: e.to_string(),
        })
    }

    /// Sign in with username and password. On success the session is kept on the client.
    pub async fn authenticate_by_name(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, FetchError> {
        let url = self.url("/Users/AuthenticateByName");
        let body = json!({ "Username": username, "Pw": password });
        let response = self.send(Method::POST, &url, &[], Some(&body)).await?;
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;
        let result: AuthenticationResult =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let session = AuthSession {
            access_token: result.access_token,
            user_id: result.user.id,
            server_id: result.server_id,
        };
        debug!("Jellyfin: authenticated as user {}", session.user_id);
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Top-level libraries of the signed-in user
    pub async fn get_views(&self) -> Result<Vec<LibraryItem>, FetchError> {
        let session = self.require_session()?;
        let path = format!("/Users/{}/Views", segment(&session.user_id));
        let response: ItemsResponse = self.get_json(&path, &[]).await?;
        self.library_items(&path, response)
    }

    /// Children of a library, show or season.
    ///
    /// With `include`, only items of that kind are returned, searched
    /// recursively below `parent_id` (or the whole library when there is none).
    pub async fn get_items(
        &self,
        parent_id: Option<&str>,
        include: Option<&ItemKind>,
    ) -> Result<Vec<LibraryItem>, FetchError> {
        let session = self.require_session()?;
        let path = format!("/Users/{}/Items", segment(&session.user_id));

        let mut query = vec![("SortBy", "SortName"), ("Fields", "UserData")];
        if let Some(parent_id) = parent_id {
            query.push(("ParentId", parent_id));
        }
        if let Some(kind) = include {
            query.push(("IncludeItemTypes", kind.as_str()));
            query.push(("Recursive", "true"));
        }

        let response: ItemsResponse = self.get_json(&path, &query).await?;
        self.library_items(&path, response)
    }

    pub async fn get_item(&self, item_id: &str) -> Result<LibraryItem, FetchError> {
        let session = self.require_session()?;
        let path = format!("/Users/{}/Items/{}", segment(&session.user_id), segment(item_id));
        let item: ItemDto = self.get_json(&path, &[]).await?;
        item.into_library_item().map_err(|message| FetchError::Malformed {
            url: self.url(&path),
            message,
        })
    }

    /// Every episode of a show with the signed-in user's watch data
    pub async fn get_episodes(&self, show_id: &str) -> Result<Vec<EpisodeRecord>, FetchError> {
        let session = self.require_session()?;
        let path = format!("/Shows/{}/Episodes", segment(show_id));
        let response: ItemsResponse = self
            .get_json(&path, &[("UserId", session.user_id.as_str()), ("Fields", "UserData")])
            .await?;

        response
            .items
            .into_iter()
            .map(ItemDto::into_episode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| FetchError::Malformed {
                url: self.url(&path),
                message,
            })
    }

    pub async fn report_playback(
        &self,
        event: PlaybackEvent,
        item_id: &str,
        position: Duration,
    ) -> Result<(), FetchError> {
        self.require_session()?;
        let url = self.url(event.path());
        let body = event.body(item_id, position);
        self.send(Method::POST, &url, &[], Some(&body)).await?;
        debug!("Jellyfin: reported {:?} for {} at {:?}", event, item_id, position);
        Ok(())
    }

    fn library_items(&self, path: &str, response: ItemsResponse) -> Result<Vec<LibraryItem>, FetchError> {
        response
            .items
            .into_iter()
            .map(ItemDto::into_library_item)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| FetchError::Malformed {
                url: self.url(path),
                message,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_dto_defaults() {
        let dto: ItemDto = serde_json::from_str(r#"{"Id": "e1"}"#).unwrap();
        let episode = dto.into_episode().unwrap();
        assert_eq!(episode.episode_id, "e1");
        assert_eq!(episode.season_id, None);
        assert!(!episode.played);
        assert_eq!(episode.playback_position, Duration::ZERO);
    }

    #[test]
    fn test_episode_dto_requires_id() {
        let dto: ItemDto = serde_json::from_str(r#"{"SeasonId": "s1"}"#).unwrap();
        assert!(dto.into_episode().is_err());
    }

    #[test]
    fn test_negative_position_is_clamped() {
        let dto: ItemDto = serde_json::from_str(
            r#"{"Id": "e1", "UserData": {"Played": false, "PlaybackPositionTicks": -5}}"#,
        )
        .unwrap();
        assert_eq!(dto.into_episode().unwrap().playback_position, Duration::ZERO);
    }

    #[test]
    fn test_stopped_body_carries_media_source() {
        let body = PlaybackEvent::Stopped.body("item1", Duration::from_secs(2));
        assert_eq!(body["PositionTicks"], 20_000_000u64);
        assert_eq!(body["MediaSourceId"], "item1");
        assert_eq!(PlaybackEvent::Progress.path(), "/Sessions/Playing/Progress");
    }

    #[test]
    fn test_start_body_opens_paused_session() {
        let body = PlaybackEvent::Start.body("item1", Duration::from_secs(3));
        assert_eq!(body["IsPaused"], true);
        assert_eq!(body["PlaybackStartTimeTicks"], 30_000_000u64);
        assert_eq!(body["PlayMethod"], "DirectStream");
        assert!(body.get("PositionTicks").is_none());
    }

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(segment("abc123"), "abc123");
        assert_eq!(segment("a/b?c"), "a%2Fb%3Fc");
    }

    #[test]
    fn test_authorization_header_includes_token_after_login() {
        let device = DeviceInfo {
            name: "laptop".to_string(),
            id: "dev-1".to_string(),
        };
        let client = JellyfinHttpClient::new("http://localhost:8096/", device, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8096");
        assert!(!client.authorization_header().contains("Token="));

        let client = client.with_session(AuthSession {
            access_token: "abc".to_string(),
            user_id: "u1".to_string(),
            server_id: None,
        });
        let header = client.authorization_header();
        assert!(header.starts_with("MediaBrowser Client=\"finwatch\""));
        assert!(header.contains("DeviceId=\"dev-1\""));
        assert!(header.ends_with("Token=\"abc\""));
    }
}
