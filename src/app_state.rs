use std::sync::Arc;

use crate::{
    config::AppConfig, credentials::CredentialStore, rate_limit::LoginRateLimiter,
    sessions::SessionRegistry,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Registered account credentials
    pub credentials: Arc<CredentialStore>,
    /// Live session tokens
    pub sessions: Arc<SessionRegistry>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Shared login rate limiter
    pub login_rate_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(config: AppConfig) -> Self {
        let credentials = CredentialStore::new(config.security.password_pepper.clone());

        Self {
            credentials: Arc::new(credentials),
            sessions: Arc::new(SessionRegistry::new()),
            config: Arc::new(config),
            login_rate_limiter: Arc::new(LoginRateLimiter::new()),
        }
    }

    /// Get a reference to the credential store
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Get a reference to the session registry
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Get a reference to the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Access the login rate limiter instance
    pub fn login_rate_limiter(&self) -> &LoginRateLimiter {
        &self.login_rate_limiter
    }
}
