use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the media server, e.g. `https://media.example.org`
    pub url: String,
    pub username: String,
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

pub fn default_device_name() -> String {
    "finwatch".to_string()
}

pub fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn new(url: &str, username: &str) -> Self {
        Self {
            server: ServerConfig {
                url: url.trim_end_matches('/').to_string(),
                username: username.to_string(),
                device_name: default_device_name(),
            },
            http: HttpConfig::default(),
        }
    }

    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.server.url = config.server.url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(anyhow::anyhow!("server.url is required"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "server.url must start with http:// or https:// (got {})",
                url
            ));
        }
        if self.server.username.trim().is_empty() {
            return Err(anyhow::anyhow!("server.username is required"));
        }
        if self.http.timeout_secs == 0 {
            return Err(anyhow::anyhow!("http.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config::new("https://media.example.org/", "alice");

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.server.url, "https://media.example.org");
        assert_eq!(loaded.server.username, "alice");
        assert_eq!(loaded.server.device_name, "finwatch");
        assert_eq!(loaded.http.timeout_secs, 10);
    }

    #[test]
    fn test_config_defaults_when_sections_missing() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "[server]\nurl = \"http://localhost:8096/\"\nusername = \"bob\"\n",
        )
        .unwrap();

        let loaded = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(loaded.server.url, "http://localhost:8096");
        assert_eq!(loaded.http.timeout_secs, default_timeout_secs());
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::new("media.example.org", "alice");
        assert!(config.validate().is_err());

        config.server.url = "https://media.example.org".to_string();
        assert!(config.validate().is_ok());

        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.http.timeout_secs = 5;
        config.server.username = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
