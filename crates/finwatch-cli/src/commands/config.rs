use super::prompts;
use crate::output::{mask_string, Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_status_config::{Config, CredentialStore, PathManager};
use media_status_sources::jellyfin::login;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Server { url, username } => configure_server(url, username, output).await,
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
    }
}

async fn configure_server(url_arg: Option<String>, username_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    let existing = if config_file.exists() {
        Some(
            Config::load_from_file(&config_file)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?,
        )
    } else {
        None
    };

    print_section_header("Jellyfin Server Setup", output);

    let url = match url_arg {
        Some(u) => u,
        None => prompts::prompt_string("Server URL", existing.as_ref().map(|c| c.server.url.as_str()))?,
    };
    let username = match username_arg {
        Some(u) => u,
        None => prompts::prompt_string("Username", existing.as_ref().map(|c| c.server.username.as_str()))?,
    };

    let mut config = Config::new(&url, &username);
    if let Some(existing) = &existing {
        config.server.device_name = existing.server.device_name.clone();
        config.http = existing.http.clone();
    }
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid server settings: {}", e))?;

    let password = prompts::prompt_password("Password")?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;

    output.println(format!("{} Signing in to {}...", "→".bright_blue(), config.server.url.bright_white()));
    let session = match login(&config, &mut cred_store, &password).await {
        Ok(session) => session,
        Err(e) => {
            output.error(format!("Sign-in failed: {}", e));
            return Err(color_eyre::eyre::eyre!("Failed to authenticate as {}: {}", config.server.username, e));
        }
    };

    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    match output.format() {
        OutputFormat::Human => {
            output.success(format!("Signed in as {}", config.server.username));
            output.info(format!("Configuration saved to {}", config_file.display()));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "type": "success",
                "server": config.server.url,
                "username": config.server.username,
                "user_id": session.user_id,
                "server_id": session.server_id,
                "config_file": config_file.display().to_string(),
            }));
        }
    }

    Ok(())
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'finwatch config server' to set up a server.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;

    let token = cred_store.get_access_token().cloned().unwrap_or_default();
    let token_display = if full { token.clone() } else { mask_string(&token) };
    let authenticated_at = cred_store.get_authenticated_at().map(|t| t.to_rfc3339());

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            print_section_header("Configuration", output);
            println!();

            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.add_row(vec![
                Cell::new("Credentials File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(cred_store.path().display().to_string()),
            ]);
            info_table.load_preset(comfy_table::presets::UTF8_FULL);
            info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", info_table);
            println!();

            let mut server_table = Table::new();
            server_table.set_header(vec![
                Cell::new("Server").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
            ]);
            server_table.add_row(vec![Cell::new("URL"), Cell::new(&config.server.url)]);
            server_table.add_row(vec![Cell::new("Username"), Cell::new(&config.server.username)]);
            server_table.add_row(vec![Cell::new("Device Name"), Cell::new(&config.server.device_name)]);
            server_table.add_row(vec![
                Cell::new("Request Timeout"),
                Cell::new(format!("{}s", config.http.timeout_secs)),
            ]);
            server_table.load_preset(comfy_table::presets::UTF8_FULL);
            server_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", server_table);
            println!();

            let mut session_table = Table::new();
            session_table.set_header(vec![
                Cell::new("Session").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
            ]);
            session_table.add_row(vec![
                Cell::new("Signed In"),
                Cell::new(if cred_store.has_session() { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            session_table.add_row(vec![
                Cell::new("User ID"),
                Cell::new(cred_store.get_user_id().cloned().unwrap_or_else(|| "<not set>".to_string())),
            ]);
            session_table.add_row(vec![Cell::new("Access Token"), Cell::new(token_display)]);
            session_table.add_row(vec![
                Cell::new("Device ID"),
                Cell::new(cred_store.get_device_id().cloned().unwrap_or_else(|| "<not set>".to_string())),
            ]);
            session_table.add_row(vec![
                Cell::new("Authenticated At"),
                Cell::new(authenticated_at.unwrap_or_else(|| "<never>".to_string())),
            ]);
            session_table.load_preset(comfy_table::presets::UTF8_FULL);
            session_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", session_table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "credentials_file": cred_store.path().display().to_string(),
                "server": {
                    "url": config.server.url,
                    "username": config.server.username,
                    "device_name": config.server.device_name,
                },
                "http": {
                    "timeout_secs": config.http.timeout_secs,
                },
                "session": {
                    "signed_in": cred_store.has_session(),
                    "user_id": cred_store.get_user_id(),
                    "access_token": token_display,
                    "device_id": cred_store.get_device_id(),
                    "authenticated_at": authenticated_at,
                },
            }));
        }
    }

    Ok(())
}

fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.chars().count()).bright_cyan()));
}
