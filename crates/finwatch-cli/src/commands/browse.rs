use super::connect;
use crate::output::{colored_indicator, Output, OutputFormat};
use clap::ValueEnum;
use color_eyre::Result;
use media_status_models::{AggregateStatus, ItemKind, LibraryItem};
use media_status_core::StatusQuery;
use media_status_sources::FetchError;
use owo_colors::OwoColorize;
use serde_json::json;
use tracing::warn;

/// Media types `browse --type` can narrow a listing to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaType {
    Series,
    Movie,
}

impl MediaType {
    pub fn kind(self) -> ItemKind {
        match self {
            MediaType::Series => ItemKind::Series,
            MediaType::Movie => ItemKind::Movie,
        }
    }
}

pub async fn run_browse(
    parent_id: Option<String>,
    media_type: Option<MediaType>,
    filter: Option<String>,
    output: &Output,
) -> Result<()> {
    let session = connect()?;

    let include = media_type.map(MediaType::kind);
    let items = match (&parent_id, &include) {
        (None, None) => session.client.list_views().await,
        _ => session.client.list_items(parent_id.as_deref(), include.as_ref()).await,
    }
    .map_err(|e| color_eyre::eyre::eyre!("Failed to list library items: {}{}", e, retry_hint(&e)))?;

    let items = filter_by_name(items, filter.as_deref());

    // One status query at a time, in listing order
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let status = status_or_unwatched(&session.query, &item).await;
        rows.push((item, status));
    }

    match output.format() {
        OutputFormat::Human => {
            if rows.is_empty() {
                output.info("No items");
            }
            for (item, status) in &rows {
                let name = if item.kind.is_container() {
                    format!("{}/", item.name)
                } else {
                    item.name.clone()
                };
                output.println(format!(
                    "[{}] {}  {}",
                    colored_indicator(*status),
                    name,
                    format!("{} {}", item.kind.as_str(), item.id).bright_black()
                ));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let entries: Vec<_> = rows
                .iter()
                .map(|(item, status)| {
                    json!({
                        "id": item.id,
                        "name": item.name,
                        "type": item.kind.as_str(),
                        "series_id": item.series_id,
                        "status": status.as_str(),
                    })
                })
                .collect();
            output.json(&json!({
                "parent_id": parent_id,
                "type": include.as_ref().map(ItemKind::as_str),
                "filter": filter,
                "items": entries,
            }));
        }
    }

    Ok(())
}

/// Keep items whose name contains `filter`, ignoring case
fn filter_by_name(items: Vec<LibraryItem>, filter: Option<&str>) -> Vec<LibraryItem> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(query) => items.into_iter().filter(|item| item.name_matches(query)).collect(),
        None => items,
    }
}

fn retry_hint(err: &FetchError) -> &'static str {
    if err.is_transient() {
        " (temporary, try again)"
    } else {
        ""
    }
}

/// A status that cannot be loaded is shown as unwatched
async fn status_or_unwatched(query: &StatusQuery, item: &LibraryItem) -> AggregateStatus {
    match query.item_status(item).await {
        Ok(status) => status,
        Err(e) => {
            warn!(
                "Could not load watch status for {} ({}): {}{}",
                item.name,
                item.id,
                e,
                retry_hint(&e)
            );
            AggregateStatus::Unwatched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn item(name: &str) -> LibraryItem {
        LibraryItem {
            id: name.to_lowercase(),
            name: name.to_string(),
            kind: ItemKind::Series,
            series_id: None,
            played: false,
            playback_position: Duration::ZERO,
        }
    }

    #[test]
    fn test_filter_by_name_ignores_case() {
        let items = vec![item("The Wire"), item("Wireless"), item("Dark")];
        let names: Vec<_> = filter_by_name(items, Some("WIRE"))
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["The Wire", "Wireless"]);
    }

    #[test]
    fn test_filter_by_name_blank_keeps_everything() {
        let items = vec![item("The Wire"), item("Dark")];
        assert_eq!(filter_by_name(items.clone(), None).len(), 2);
        assert_eq!(filter_by_name(items.clone(), Some("  ")).len(), 2);
        assert!(filter_by_name(items, Some("zzz")).is_empty());
    }

    #[test]
    fn test_media_type_kind() {
        assert_eq!(MediaType::Series.kind(), ItemKind::Series);
        assert_eq!(MediaType::Movie.kind(), ItemKind::Movie);
    }

    #[test]
    fn test_retry_hint_only_for_transient_errors() {
        let timeout = FetchError::Timeout { url: "/x".to_string() };
        assert!(!retry_hint(&timeout).is_empty());
        assert_eq!(retry_hint(&FetchError::NotAuthenticated), "");
    }
}
