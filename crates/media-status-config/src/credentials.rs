use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Key/value credential file. Values are stored as plain text.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_access_token(&self) -> Option<&String> {
        self.get("access_token")
    }

    pub fn set_access_token(&mut self, token: String) {
        self.set("access_token".to_string(), token);
    }

    pub fn get_user_id(&self) -> Option<&String> {
        self.get("user_id")
    }

    pub fn set_user_id(&mut self, user_id: String) {
        self.set("user_id".to_string(), user_id);
    }

    /// Stable per-install identifier sent in the client authorization header
    pub fn get_device_id(&self) -> Option<&String> {
        self.get("device_id")
    }

    pub fn set_device_id(&mut self, device_id: String) {
        self.set("device_id".to_string(), device_id);
    }

    pub fn get_authenticated_at(&self) -> Option<DateTime<Utc>> {
        self.get("authenticated_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_authenticated_at(&mut self, at: DateTime<Utc>) {
        self.set("authenticated_at".to_string(), at.to_rfc3339());
    }

    /// Drop the session but keep the device id
    pub fn clear_session(&mut self) {
        self.remove("access_token");
        self.remove("user_id");
        self.remove("authenticated_at");
    }

    pub fn has_session(&self) -> bool {
        self.get_access_token().is_some() && self.get_user_id().is_some()
    }
}
