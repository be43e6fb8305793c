use media_status_models::{EpisodeRecord, SeasonKey, SeasonStatus, ShowStatus};

/// Derive show- and season-level watch status from a flat episode list.
///
/// A partially watched episode counts as watched for aggregation: a show whose
/// only episode was started but not finished is reported as watched, not partial.
/// Episodes without a season are grouped under `SeasonKey::Unassigned`.
pub fn aggregate(show_id: &str, episodes: &[EpisodeRecord]) -> ShowStatus {
    let mut show = ShowStatus::empty(show_id);

    for episode in episodes {
        let state = episode.watch_state();
        show.tally.record(state);

        let key = SeasonKey::from_option(episode.season_id.as_deref());
        show.seasons
            .entry(key.clone())
            .or_insert_with(|| SeasonStatus::empty(key))
            .tally
            .record(state);
    }

    show
}
