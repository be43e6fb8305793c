pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, HttpConfig, ServerConfig, default_device_name, default_timeout_secs};
pub use credentials::CredentialStore;
pub use paths::{PathManager, base_path_override};
