use crate::config::ClientConfig;
use crate::error::ErrorBody;
use crate::models::listing::{Listing, ListingQuery, UpsertListingRequest};
use crate::models::user::PublicUser;
use crate::services::auth_service::ProviderProfile;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// REST client keeping the session cookie between calls.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Ok(error) = serde_json::from_str::<ErrorBody>(&body) {
            if !error.success {
                return Err(ClientError::Api {
                    status: error.status_code,
                    message: error.message,
                });
            }
        }

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn sign_up(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<String, ClientError> {
        let body = json!({ "username": username, "email": email, "password": password });
        self.send(self.http.post(self.url("/api/auth/signup")).json(&body))
            .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let body = json!({ "email": email, "password": password });
        self.send(self.http.post(self.url("/api/auth/signin")).json(&body))
            .await
    }

    /// Forwards a provider-authenticated identity to the backend.
    pub async fn sign_in_with_provider(
        &self,
        profile: &ProviderProfile,
    ) -> Result<PublicUser, ClientError> {
        self.send(self.http.post(self.url("/api/auth/google")).json(profile))
            .await
    }

    pub async fn sign_out(&self) -> Result<String, ClientError> {
        self.send(self.http.get(self.url("/api/auth/signout"))).await
    }

    pub async fn create_listing(
        &self,
        request: &UpsertListingRequest,
    ) -> Result<Listing, ClientError> {
        self.send(self.http.post(self.url("/api/listing/create")).json(request))
            .await
    }

    pub async fn update_listing(
        &self,
        listing_id: i64,
        request: &UpsertListingRequest,
    ) -> Result<Listing, ClientError> {
        let path = format!("/api/listing/update/{}", listing_id);
        self.send(self.http.post(self.url(&path)).json(request))
            .await
    }

    pub async fn get_listing(&self, listing_id: i64) -> Result<Listing, ClientError> {
        let path = format!("/api/listing/get/{}", listing_id);
        self.send(self.http.get(self.url(&path))).await
    }

    pub async fn delete_listing(&self, listing_id: i64) -> Result<String, ClientError> {
        let path = format!("/api/listing/delete/{}", listing_id);
        self.send(self.http.delete(self.url(&path))).await
    }

    pub async fn search_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, ClientError> {
        self.send(self.http.get(self.url("/api/listing/get")).query(query))
            .await
    }

    pub async fn user_listings(&self, user_id: i64) -> Result<Vec<Listing>, ClientError> {
        let path = format!("/api/user/listings/{}", user_id);
        self.send(self.http.get(self.url(&path))).await
    }
}
