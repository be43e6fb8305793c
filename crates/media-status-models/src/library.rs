use crate::episode::WatchState;
use crate::status::AggregateStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Item types the browser distinguishes. Anything else is `Other`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemKind {
    CollectionFolder,
    Series,
    Season,
    Episode,
    Movie,
    Other(String),
}

impl ItemKind {
    pub fn from_server_type(type_: &str) -> Self {
        match type_ {
            "CollectionFolder" | "UserView" => ItemKind::CollectionFolder,
            "Series" => ItemKind::Series,
            "Season" => ItemKind::Season,
            "Episode" => ItemKind::Episode,
            "Movie" => ItemKind::Movie,
            other => ItemKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::CollectionFolder => "CollectionFolder",
            ItemKind::Series => "Series",
            ItemKind::Season => "Season",
            ItemKind::Episode => "Episode",
            ItemKind::Movie => "Movie",
            ItemKind::Other(type_) => type_,
        }
    }

    /// Whether selecting the item descends into children rather than playing it
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ItemKind::CollectionFolder | ItemKind::Series | ItemKind::Season
        )
    }
}

/// An entry in a library listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    /// Set for seasons and episodes
    pub series_id: Option<String>,
    pub played: bool,
    pub playback_position: Duration,
}

impl LibraryItem {
    /// Status from the item's own user data, without looking at its children
    pub fn own_status(&self) -> AggregateStatus {
        match WatchState::classify(self.played, self.playback_position) {
            WatchState::Watched => AggregateStatus::Watched,
            WatchState::PartiallyWatched => AggregateStatus::Partial,
            WatchState::Unwatched => AggregateStatus::Unwatched,
        }
    }

    /// Case-insensitive substring match on the display name. An empty query matches everything.
    pub fn name_matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_from_server_type() {
        assert_eq!(ItemKind::from_server_type("Series"), ItemKind::Series);
        assert_eq!(ItemKind::from_server_type("UserView"), ItemKind::CollectionFolder);
        assert_eq!(
            ItemKind::from_server_type("MusicAlbum"),
            ItemKind::Other("MusicAlbum".to_string())
        );
        assert_eq!(ItemKind::from_server_type("MusicAlbum").as_str(), "MusicAlbum");
        assert_eq!(ItemKind::from_server_type("UserView").as_str(), "CollectionFolder");
        assert!(ItemKind::Season.is_container());
        assert!(!ItemKind::Episode.is_container());
    }

    #[test]
    fn test_name_matches() {
        let item = LibraryItem {
            id: "1".to_string(),
            name: "The Expanse".to_string(),
            kind: ItemKind::Series,
            series_id: None,
            played: false,
            playback_position: Duration::ZERO,
        };
        assert!(item.name_matches("expanse"));
        assert!(item.name_matches("HE EXP"));
        assert!(item.name_matches(""));
        assert!(!item.name_matches("expanses"));
    }

    #[test]
    fn test_own_status() {
        let mut item = LibraryItem {
            id: "1".to_string(),
            name: "Pilot".to_string(),
            kind: ItemKind::Episode,
            series_id: Some("show".to_string()),
            played: false,
            playback_position: Duration::ZERO,
        };
        assert_eq!(item.own_status(), AggregateStatus::Unwatched);

        item.playback_position = Duration::from_secs(30);
        assert_eq!(item.own_status(), AggregateStatus::Partial);

        item.played = true;
        assert_eq!(item.own_status(), AggregateStatus::Watched);
    }

    #[test]
    fn test_library_item_serializes() {
        let item = LibraryItem {
            id: "1".to_string(),
            name: "Films".to_string(),
            kind: ItemKind::CollectionFolder,
            series_id: None,
            played: false,
            playback_position: Duration::ZERO,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["name"], "Films");
        assert_eq!(json["kind"], "CollectionFolder");
    }
}
