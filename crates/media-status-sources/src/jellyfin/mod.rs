pub mod api;
pub mod auth;
pub mod client;

pub use api::{AuthSession, DeviceInfo, JellyfinHttpClient, PlaybackEvent};
pub use auth::{device_info, login};
pub use client::JellyfinClient;
