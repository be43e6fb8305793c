pub mod browse;
pub mod clear;
pub mod config;
pub mod progress;
pub mod prompts;
pub mod status;

use color_eyre::Result;
use media_status_config::{Config, CredentialStore, PathManager};
use media_status_core::StatusQuery;
use media_status_sources::JellyfinClient;
use std::sync::Arc;

/// Load and validate the saved configuration
pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'finwatch config server' first.",
            config_file.display()
        ));
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Signed-in client plus a status query backed by it
pub struct Session {
    pub client: Arc<JellyfinClient>,
    pub query: StatusQuery,
}

pub fn connect() -> Result<Session> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let had_device_id = cred_store.get_device_id().is_some();
    let client = JellyfinClient::from_config(&config, &mut cred_store)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create Jellyfin client: {}", e))?;
    if !had_device_id {
        cred_store
            .save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;
    }

    if !client.is_authenticated() {
        return Err(color_eyre::eyre::eyre!(
            "Not signed in to {}. Run 'finwatch config server' first.",
            config.server.url
        ));
    }

    let client = Arc::new(client);
    let query = StatusQuery::new(client.clone());
    Ok(Session { client, query })
}
