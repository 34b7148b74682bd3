use std::env;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_IMAGE_HOST_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Bind address and allowed browser origin for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origin of the single-page app, allowed to send credentialed requests.
    pub client_origin: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host_raw = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let host = host_raw.parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: host_raw.clone(),
        })?;

        let port_raw = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
            key: "PORT",
            value: port_raw.clone(),
        })?;

        let client_origin = env::var("CLIENT_ORIGIN").ok().filter(|o| !o.is_empty());

        Ok(Self {
            host,
            port,
            client_origin,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

/// Unsigned-upload settings for the external image host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHostConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

impl ImageHostConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            env::var("IMAGE_HOST_URL").unwrap_or_else(|_| DEFAULT_IMAGE_HOST_URL.to_string());
        let cloud_name = env::var("IMAGE_HOST_CLOUD_NAME")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("IMAGE_HOST_CLOUD_NAME"))?;
        let upload_preset = env::var("IMAGE_HOST_UPLOAD_PRESET")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("IMAGE_HOST_UPLOAD_PRESET"))?;

        Ok(Self {
            base_url,
            cloud_name,
            upload_preset,
        })
    }
}

/// Settings used by the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("ESTATE_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
        }
    }
}
