use crate::jellyfin::api::{AuthSession, DeviceInfo, JellyfinHttpClient};
use anyhow::Result;
use chrono::Utc;
use media_status_config::{Config, CredentialStore};
use tracing::info;

/// Device identity for this install, generating and storing a device id on first use
pub fn device_info(config: &Config, credentials: &mut CredentialStore) -> DeviceInfo {
    let id = match credentials.get_device_id() {
        Some(id) => id.clone(),
        None => {
            let id = uuid::Uuid::new_v4().simple().to_string();
            credentials.set_device_id(id.clone());
            id
        }
    };
    DeviceInfo {
        name: config.server.device_name.clone(),
        id,
    }
}

/// Sign in with the configured username and persist the session to the credential store
pub async fn login(
    config: &Config,
    credentials: &mut CredentialStore,
    password: &str,
) -> Result<AuthSession> {
    let device = device_info(config, credentials);
    let mut api = JellyfinHttpClient::new(&config.server.url, device, config.timeout())?;
    let session = api
        .authenticate_by_name(&config.server.username, password)
        .await?;

    credentials.set_access_token(session.access_token.clone());
    credentials.set_user_id(session.user_id.clone());
    credentials.set_authenticated_at(Utc::now());
    credentials.save()?;

    info!(
        "Authenticated to {} as {}",
        api.base_url(),
        config.server.username
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_device_id_is_generated_once() {
        let config = Config::new("http://localhost:8096", "alice");
        let mut store = CredentialStore::new(PathBuf::from("/tmp/finwatch-device"));

        let first = device_info(&config, &mut store);
        let second = device_info(&config, &mut store);
        assert_eq!(first.id, second.id);
        assert_eq!(first.id.len(), 32);
        assert_eq!(first.name, "finwatch");
    }
}
