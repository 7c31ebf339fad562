//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError, CatalogApi, SessionApi};
use crate::config::DashboardConfig;
use crate::session::RequestSlots;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The backend is held behind the API traits so
/// tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    sessions: Arc<dyn SessionApi>,
    catalog: Arc<dyn CatalogApi>,
    slots: RequestSlots,
}

impl AppState {
    /// Create state talking to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built.
    pub fn new(config: DashboardConfig) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config.api_url)?;
        Ok(Self::with_backend(
            config,
            Arc::new(client.clone()),
            Arc::new(client),
        ))
    }

    /// Create state over explicit backend implementations.
    #[must_use]
    pub fn with_backend(
        config: DashboardConfig,
        sessions: Arc<dyn SessionApi>,
        catalog: Arc<dyn CatalogApi>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                catalog,
                slots: RequestSlots::default(),
            }),
        }
    }

    /// Get a reference to the dashboard configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Accounts and sessions backend.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionApi {
        self.inner.sessions.as_ref()
    }

    /// Categories and products backend.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogApi {
        self.inner.catalog.as_ref()
    }

    /// In-flight submission tracking.
    #[must_use]
    pub fn slots(&self) -> &RequestSlots {
        &self.inner.slots
    }

    /// Whether the session cookie is marked `Secure`.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.inner.config.cookie_secure
    }
}
