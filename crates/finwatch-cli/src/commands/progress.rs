use super::connect;
use super::status::print_status;
use crate::output::Output;
use color_eyre::Result;
use media_status_models::ItemKind;
use media_status_sources::PlaybackEvent;
use std::time::Duration;
use tracing::{debug, warn};

pub async fn run_progress(item_id: &str, position_secs: u64, start: bool, stopped: bool, output: &Output) -> Result<()> {
    let session = connect()?;

    let event = if start {
        PlaybackEvent::Start
    } else if stopped {
        PlaybackEvent::Stopped
    } else {
        PlaybackEvent::Progress
    };
    let position = Duration::from_secs(position_secs);

    session
        .client
        .report_playback(event, item_id, position)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to report playback for {}: {}", item_id, e))?;
    output.success(format!("Reported {:?} for {} at {}s", event, item_id, position_secs));

    if !stopped {
        return Ok(());
    }

    // Playback ended, so the owning series may have changed state
    let item = match session.client.get_item(item_id).await {
        Ok(item) => item,
        Err(e) => {
            warn!("Could not look up item {} after playback: {}", item_id, e);
            return Ok(());
        }
    };
    let series_id = match item.kind {
        ItemKind::Series => Some(item.id.clone()),
        _ => item.series_id.clone(),
    };
    let Some(series_id) = series_id else {
        debug!("Item {} does not belong to a series", item_id);
        return Ok(());
    };

    session.query.invalidate_show(&series_id).await;
    print_status(&session.query, &series_id, None, output).await
}
