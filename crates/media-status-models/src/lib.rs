pub mod episode;
pub mod library;
pub mod status;

pub use episode::{duration_to_ticks, ticks_to_duration, EpisodeRecord, WatchState, TICKS_PER_SECOND};
pub use library::{ItemKind, LibraryItem};
pub use status::{AggregateStatus, SeasonKey, SeasonStatus, ShowStatus, WatchTally};
