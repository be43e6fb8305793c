use crate::episode::WatchState;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Grouping key for the seasons of a show.
///
/// Episodes the server reports without a season id are grouped under
/// `Unassigned` so they still count towards the show-level status.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeasonKey {
    Id(String),
    Unassigned,
}

impl SeasonKey {
    pub fn from_option(season_id: Option<&str>) -> Self {
        match season_id {
            Some(id) if !id.is_empty() => SeasonKey::Id(id.to_string()),
            _ => SeasonKey::Unassigned,
        }
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            SeasonKey::Id(id) => Some(id),
            SeasonKey::Unassigned => None,
        }
    }
}

impl From<&str> for SeasonKey {
    fn from(id: &str) -> Self {
        SeasonKey::from_option(Some(id))
    }
}

/// Parses a user-supplied season: `none` names the unassigned group, an empty id is rejected
impl FromStr for SeasonKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("season id must not be empty (use 'none' for episodes without a season)".to_string());
        }
        if s.eq_ignore_ascii_case("none") {
            return Ok(SeasonKey::Unassigned);
        }
        Ok(SeasonKey::Id(s.to_string()))
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonKey::Id(id) => write!(f, "{}", id),
            SeasonKey::Unassigned => write!(f, "(no season)"),
        }
    }
}

/// Three-state status shown next to a library entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateStatus {
    Watched,
    Partial,
    Unwatched,
}

impl AggregateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateStatus::Watched => "watched",
            AggregateStatus::Partial => "partial",
            AggregateStatus::Unwatched => "unwatched",
        }
    }

    /// Single-character list indicator
    pub fn indicator(&self) -> &'static str {
        match self {
            AggregateStatus::Watched => "✔",
            AggregateStatus::Partial => "~",
            AggregateStatus::Unwatched => " ",
        }
    }
}

/// The two facts the watched/partial flags are derived from.
///
/// `watched` and `partial` are computed rather than stored, so they can
/// never disagree with the underlying facts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WatchTally {
    pub has_any_watched_or_partial: bool,
    pub has_any_unwatched: bool,
}

impl WatchTally {
    pub fn record(&mut self, state: WatchState) {
        if state.is_engaged() {
            self.has_any_watched_or_partial = true;
        } else {
            self.has_any_unwatched = true;
        }
    }

    pub fn watched(&self) -> bool {
        self.has_any_watched_or_partial && !self.has_any_unwatched
    }

    pub fn partial(&self) -> bool {
        self.has_any_watched_or_partial && self.has_any_unwatched
    }

    pub fn status(&self) -> AggregateStatus {
        if self.watched() {
            AggregateStatus::Watched
        } else if self.partial() {
            AggregateStatus::Partial
        } else {
            AggregateStatus::Unwatched
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonStatus {
    pub season_id: SeasonKey,
    pub tally: WatchTally,
}

impl SeasonStatus {
    /// Zero value: nothing known about the season
    pub fn empty(season_id: SeasonKey) -> Self {
        Self {
            season_id,
            tally: WatchTally::default(),
        }
    }

    pub fn watched(&self) -> bool {
        self.tally.watched()
    }

    pub fn partial(&self) -> bool {
        self.tally.partial()
    }

    pub fn status(&self) -> AggregateStatus {
        self.tally.status()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowStatus {
    pub show_id: String,
    pub tally: WatchTally,
    pub seasons: BTreeMap<SeasonKey, SeasonStatus>,
}

impl ShowStatus {
    pub fn empty(show_id: impl Into<String>) -> Self {
        Self {
            show_id: show_id.into(),
            tally: WatchTally::default(),
            seasons: BTreeMap::new(),
        }
    }

    pub fn watched(&self) -> bool {
        self.tally.watched()
    }

    pub fn partial(&self) -> bool {
        self.tally.partial()
    }

    pub fn status(&self) -> AggregateStatus {
        self.tally.status()
    }

    /// Season lookup; an unknown season yields the zero value instead of an error
    pub fn season(&self, season_id: &SeasonKey) -> SeasonStatus {
        self.seasons
            .get(season_id)
            .cloned()
            .unwrap_or_else(|| SeasonStatus::empty(season_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_key_from_user_input() {
        assert_eq!("s1".parse::<SeasonKey>(), Ok(SeasonKey::Id("s1".to_string())));
        assert_eq!("none".parse::<SeasonKey>(), Ok(SeasonKey::Unassigned));
        assert_eq!("NONE".parse::<SeasonKey>(), Ok(SeasonKey::Unassigned));
        assert!("".parse::<SeasonKey>().is_err());
        assert!("  ".parse::<SeasonKey>().is_err());
    }

    #[test]
    fn test_empty_tally_is_neither_watched_nor_partial() {
        let tally = WatchTally::default();
        assert!(!tally.watched());
        assert!(!tally.partial());
        assert_eq!(tally.status(), AggregateStatus::Unwatched);
    }

    #[test]
    fn test_tally_derivation() {
        let mut tally = WatchTally::default();
        tally.record(WatchState::PartiallyWatched);
        assert!(tally.watched());
        assert!(!tally.partial());

        tally.record(WatchState::Unwatched);
        assert!(!tally.watched());
        assert!(tally.partial());
        assert_eq!(tally.status(), AggregateStatus::Partial);
    }

    #[test]
    fn test_unwatched_only_tally() {
        let mut tally = WatchTally::default();
        tally.record(WatchState::Unwatched);
        tally.record(WatchState::Unwatched);
        assert_eq!(tally.status(), AggregateStatus::Unwatched);
        assert!(!tally.partial());
    }

    #[test]
    fn test_unknown_season_returns_zero_value() {
        let show = ShowStatus::empty("show");
        let season = show.season(&SeasonKey::from("missing"));
        assert_eq!(season.season_id, SeasonKey::Id("missing".to_string()));
        assert!(!season.watched());
        assert!(!season.partial());
    }

    #[test]
    fn test_season_key_from_option() {
        assert_eq!(SeasonKey::from_option(None), SeasonKey::Unassigned);
        assert_eq!(SeasonKey::from_option(Some("")), SeasonKey::Unassigned);
        assert_eq!(SeasonKey::from_option(Some("abc")).as_id(), Some("abc"));
        assert_eq!(SeasonKey::Unassigned.to_string(), "(no season)");
    }
}
