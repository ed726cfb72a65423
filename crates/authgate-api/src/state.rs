//! Application state management

use crate::auth::AuthService;
use authgate_core::config::AppConfig;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Authentication service
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: AppConfig, auth: AuthService) -> Self {
        Self { config, auth }
    }
}
