pub mod error;
pub mod jellyfin;
pub mod traits;

pub use error::FetchError;
pub use jellyfin::{JellyfinClient, JellyfinHttpClient, PlaybackEvent};
pub use traits::EpisodeFetcher;
