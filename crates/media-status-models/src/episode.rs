use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server-side playback positions are expressed in 100ns ticks.
pub const TICKS_PER_SECOND: u64 = 10_000_000;

const NANOS_PER_TICK: u64 = 100;

pub fn ticks_to_duration(ticks: u64) -> Duration {
    Duration::from_nanos(ticks.saturating_mul(NANOS_PER_TICK))
}

pub fn duration_to_ticks(duration: Duration) -> u64 {
    let ticks = duration.as_nanos() / NANOS_PER_TICK as u128;
    u64::try_from(ticks).unwrap_or(u64::MAX)
}

/// Watch state of a single episode, derived from its played flag and resume position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WatchState {
    Watched,
    PartiallyWatched,
    Unwatched,
}

impl WatchState {
    pub fn classify(played: bool, playback_position: Duration) -> Self {
        if played {
            WatchState::Watched
        } else if !playback_position.is_zero() {
            WatchState::PartiallyWatched
        } else {
            WatchState::Unwatched
        }
    }

    /// Any engagement with an episode counts, including an unfinished one
    pub fn is_engaged(&self) -> bool {
        matches!(self, WatchState::Watched | WatchState::PartiallyWatched)
    }
}

/// Per-episode watch record as returned by the episode fetcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub episode_id: String,
    /// Some servers return episodes that are not attached to a season (specials, orphans)
    pub season_id: Option<String>,
    pub played: bool,
    pub playback_position: Duration,
}

impl EpisodeRecord {
    pub fn watch_state(&self) -> WatchState {
        WatchState::classify(self.played, self.playback_position)
    }
}
