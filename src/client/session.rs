use crate::client::api::ApiClient;
use crate::models::user::PublicUser;
use crate::services::auth_service::ProviderProfile;

/// Signed-in user state, as held by the browser between page loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSession {
    pub current_user: Option<PublicUser>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn sign_in_start(&mut self) {
        self.loading = true;
    }

    pub fn sign_in_success(&mut self, user: PublicUser) {
        self.current_user = Some(user);
        self.loading = false;
        self.error = None;
    }

    pub fn sign_in_failure(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
    }

    pub fn sign_out(&mut self) {
        self.current_user = None;
        self.loading = false;
        self.error = None;
    }

    /// Signs in with email (or username) and password.
    pub async fn sign_in(&mut self, api: &ApiClient, email: &str, password: &str) -> bool {
        self.sign_in_start();
        match api.sign_in(email, password).await {
            Ok(user) => {
                self.sign_in_success(user);
                true
            }
            Err(e) => {
                self.sign_in_failure(e.to_string());
                false
            }
        }
    }

    /// Completes a popup sign-in by handing the provider profile to the API.
    ///
    /// Failures are logged and leave the session untouched.
    pub async fn sign_in_with_provider(
        &mut self,
        api: &ApiClient,
        profile: ProviderProfile,
    ) -> bool {
        match api.sign_in_with_provider(&profile).await {
            Ok(user) => {
                self.sign_in_success(user);
                true
            }
            Err(e) => {
                tracing::warn!("Could not sign in with identity provider: {}", e);
                false
            }
        }
    }

    /// Clears the server session, then the local one.
    pub async fn sign_out_remote(&mut self, api: &ApiClient) -> bool {
        match api.sign_out().await {
            Ok(_) => {
                self.sign_out();
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}
