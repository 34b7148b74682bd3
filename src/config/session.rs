use std::env;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};
use time::Duration;
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    Expiry, SessionManagerLayer,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::warn;

/// Signed session layer backed by the SQLite session table.
pub type SessionLayer = SessionManagerLayer<SqliteStore, SignedCookie>;

pub const SESSION_TABLE: &str = "sessions";

const MIN_SECRET_BYTES: usize = 64;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionConfigError {
    #[error("production requires HTTPS; set FORCE_HTTPS=true")]
    HttpsRequired,
    #[error("SESSION_SECRET must be set in production")]
    MissingSecret,
    #[error("SESSION_SECRET must be at least {MIN_SECRET_BYTES} bytes in production")]
    ShortSecret,
    #[error("SESSION_SECRET looks like a placeholder value")]
    PlaceholderSecret,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub expiry: Duration,
    pub name: String,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::for_environment(&current_environment())
    }

    pub fn for_environment(environment: &str) -> Self {
        if environment == "production" {
            SessionConfig {
                secure: true,
                http_only: true,
                same_site: SameSite::Strict,
                expiry: Duration::days(1),
                name: "__Host-estate_session".to_string(),
            }
        } else {
            SessionConfig {
                secure: false,
                http_only: true,
                same_site: SameSite::Lax,
                expiry: Duration::days(7),
                name: "estate_session".to_string(),
            }
        }
    }

    pub fn create_layer(&self, store: SqliteStore) -> SessionLayer {
        let key = load_session_key();

        SessionManagerLayer::new(store)
            .with_secure(self.secure)
            .with_http_only(self.http_only)
            .with_same_site(self.same_site)
            .with_name(self.name.clone())
            .with_expiry(Expiry::OnInactivity(self.expiry))
            .with_signed(key)
    }
}

/// Refuses to start a production server with an unsafe cookie setup.
pub fn validate_production_config() -> Result<(), SessionConfigError> {
    if current_environment() != "production" {
        return Ok(());
    }

    if !env_flag_enabled("FORCE_HTTPS") {
        return Err(SessionConfigError::HttpsRequired);
    }

    let secret = env::var("SESSION_SECRET").map_err(|_| SessionConfigError::MissingSecret)?;
    if decode_secret_bytes(&secret).len() < MIN_SECRET_BYTES {
        return Err(SessionConfigError::ShortSecret);
    }

    let lowered = secret.to_ascii_lowercase();
    if ["example", "changeme", "default"]
        .iter()
        .any(|word| lowered.contains(word))
    {
        return Err(SessionConfigError::PlaceholderSecret);
    }

    Ok(())
}

fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

fn env_flag_enabled(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}

fn load_session_key() -> Key {
    match env::var("SESSION_SECRET") {
        Ok(secret) if !secret.is_empty() => key_from_secret_bytes(&decode_secret_bytes(&secret)),
        _ => {
            warn!("SESSION_SECRET not set; generating ephemeral key (development only)");
            Key::generate()
        }
    }
}

fn decode_secret_bytes(secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret.as_bytes())
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

fn key_from_secret_bytes(bytes: &[u8]) -> Key {
    match bytes.get(..MIN_SECRET_BYTES) {
        Some(prefix) => Key::from(prefix),
        None => Key::from(Sha512::digest(bytes).as_slice()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_cookies_are_lax_and_not_secure() {
        let config = SessionConfig::for_environment("development");
        assert!(!config.secure);
        assert!(config.http_only);
        assert_eq!(config.same_site, SameSite::Lax);
        assert_eq!(config.name, "estate_session");
    }

    #[test]
    fn short_secrets_are_stretched_to_a_full_key() {
        let key = key_from_secret_bytes(b"short");
        assert_eq!(key.master().len(), 64);
    }
}
