use std::{collections::HashMap, env};

use estate::{
    client::ApiClient,
    config::{settings::ConfigError, ClientConfig, ImageHostConfig, ServerConfig},
};
use serial_test::serial;

#[derive(Default)]
struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    fn set(&mut self, key: &str, value: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::set_var(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.original.drain() {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn server_config_defaults() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove("HOST");
    env_guard.remove("PORT");
    env_guard.remove("CLIENT_ORIGIN");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    assert!(config.client_origin.is_none());
}

#[test]
#[serial]
fn server_config_reads_overrides() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("HOST", "0.0.0.0");
    env_guard.set("PORT", "3000");
    env_guard.set("CLIENT_ORIGIN", "http://localhost:5173");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    assert_eq!(
        config.client_origin.as_deref(),
        Some("http://localhost:5173")
    );
}

#[test]
#[serial]
fn server_config_rejects_bad_port() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove("HOST");
    env_guard.set("PORT", "eighty");

    let result = ServerConfig::from_env();
    assert!(matches!(
        result,
        Err(ConfigError::Invalid { key: "PORT", .. })
    ));
}

#[test]
#[serial]
fn image_host_config_requires_cloud_and_preset() {
    let mut env_guard = EnvGuard::default();
    env_guard.remove("IMAGE_HOST_URL");
    env_guard.remove("IMAGE_HOST_CLOUD_NAME");
    env_guard.set("IMAGE_HOST_UPLOAD_PRESET", "estate_unsigned");

    assert!(matches!(
        ImageHostConfig::from_env(),
        Err(ConfigError::Missing("IMAGE_HOST_CLOUD_NAME"))
    ));

    env_guard.set("IMAGE_HOST_CLOUD_NAME", "demo");
    let config = ImageHostConfig::from_env().unwrap();
    assert_eq!(config.base_url, "https://api.cloudinary.com");
    assert_eq!(config.cloud_name, "demo");
    assert_eq!(config.upload_preset, "estate_unsigned");
}

#[test]
#[serial]
fn client_config_builds_api_client() {
    let mut env_guard = EnvGuard::default();
    env_guard.set("ESTATE_API_URL", "http://127.0.0.1:9999/");

    let config = ClientConfig::from_env();
    assert_eq!(config.api_url, "http://127.0.0.1:9999/");
    assert!(ApiClient::from_config(&config).is_ok());

    env_guard.remove("ESTATE_API_URL");
    assert_eq!(ClientConfig::from_env().api_url, "http://127.0.0.1:8080");
}
