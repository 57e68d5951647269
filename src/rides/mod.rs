//! Ride option generation.
//!
//! A single asynchronous operation: pickup and destination text in, a
//! small ordered list of fabricated ride options out, backed by a
//! configurable generative-AI provider. Nothing here is real routing or
//! pricing; the external model invents every field.

pub mod generate;
pub mod prompts;
pub mod types;

pub use types::RideOption;

use async_trait::async_trait;

use crate::error::RideMateError;

/// Source of ride options for a search.
///
/// The booking flow only sees this trait, so tests substitute a stub
/// without touching process-wide state.
#[async_trait]
pub trait RideOptionProvider: Send + Sync {
    /// Fetch candidate rides for a pickup/destination pair.
    /// Suspends until the backing service responds or errors; no partial
    /// results.
    async fn fetch_ride_options(
        &self,
        pickup: &str,
        destination: &str,
    ) -> Result<Vec<RideOption>, RideMateError>;
}

/// Resolved generation configuration for one search.
///
/// `api_key` is `None` when neither the keychain nor the environment has a
/// credential for the provider; the fetch then fails with a configuration
/// error instead of the process crashing at startup.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Process-wide HTTP client handle, created once at startup and managed as
/// Tauri state. Write-once, then read-only: searches clone the inner client,
/// and clones share the same connection pool.
pub struct SharedHttpClient(reqwest::Client);

impl SharedHttpClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }

    pub fn client(&self) -> reqwest::Client {
        self.0.clone()
    }
}

impl Default for SharedHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// The production provider: dispatches to the configured generation API.
///
/// Holds a clone of the process-wide `reqwest::Client` (created once at
/// startup; clones share the connection pool) plus the settings resolved
/// for this search. Stateless across calls.
pub struct GenerativeRideProvider {
    client: reqwest::Client,
    settings: GenerationSettings,
}

impl GenerativeRideProvider {
    pub fn new(client: reqwest::Client, settings: GenerationSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl RideOptionProvider for GenerativeRideProvider {
    async fn fetch_ride_options(
        &self,
        pickup: &str,
        destination: &str,
    ) -> Result<Vec<RideOption>, RideMateError> {
        generate::generate_ride_options(&self.client, pickup, destination, &self.settings).await
    }
}
