use super::connect;
use crate::output::{colored_indicator, Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_status_models::{SeasonKey, SeasonStatus, ShowStatus};
use media_status_core::StatusQuery;
use serde_json::json;

pub async fn run_status(show_id: &str, season: Option<SeasonKey>, output: &Output) -> Result<()> {
    let session = connect()?;
    print_status(&session.query, show_id, season.as_ref(), output).await
}

/// Print a show's aggregate, or a single season of it
pub async fn print_status(query: &StatusQuery, show_id: &str, season: Option<&SeasonKey>, output: &Output) -> Result<()> {
    let show = query
        .get_show_status(show_id)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load watch status for show {}: {}", show_id, e))?;

    if let Some(season_id) = season {
        let season_status = query
            .get_season_status(show_id, season_id)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load watch status for season {}: {}", season_id, e))?;
        print_season(show_id, &season_status, output);
        return Ok(());
    }

    print_show(&show, output);
    Ok(())
}

fn season_json(season: &SeasonStatus) -> serde_json::Value {
    json!({
        "season_id": season.season_id.as_id(),
        "status": season.status().as_str(),
        "watched": season.watched(),
        "partial": season.partial(),
    })
}

fn print_season(show_id: &str, season: &SeasonStatus, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            output.println(format!(
                "[{}] Season {} of {}: {}",
                colored_indicator(season.status()),
                season.season_id,
                show_id,
                season.status().as_str()
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let mut value = season_json(season);
            value["show_id"] = json!(show_id);
            output.json(&value);
        }
    }
}

fn print_show(show: &ShowStatus, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            output.println(format!(
                "[{}] Show {}: {}",
                colored_indicator(show.status()),
                show.show_id,
                show.status().as_str()
            ));

            if show.seasons.is_empty() {
                output.info("No episodes");
                return;
            }
            if output.is_quiet() {
                return;
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Season").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Status").add_attribute(comfy_table::Attribute::Bold),
            ]);
            for season in show.seasons.values() {
                table.add_row(vec![
                    Cell::new(season.season_id.to_string()),
                    Cell::new(format!("{} {}", colored_indicator(season.status()), season.status().as_str())),
                ]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let seasons: Vec<_> = show.seasons.values().map(season_json).collect();
            output.json(&json!({
                "show_id": show.show_id,
                "status": show.status().as_str(),
                "watched": show.watched(),
                "partial": show.partial(),
                "seasons": seasons,
            }));
        }
    }
}
