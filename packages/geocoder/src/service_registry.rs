//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`]. [`client_from_env`] picks
//! the first enabled service whose credentials are present in the
//! environment.

use std::sync::Arc;

use serde::Deserialize;

use crate::google::GooglePlacesClient;
use crate::nominatim::NominatimClient;
use crate::GeocodingClient;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"google_places"`, `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be selected at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selection order; lower values are tried first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Google Places / Geocoding API.
    GooglePlaces {
        /// API base URL (e.g., `"https://maps.googleapis.com/maps/api"`).
        base_url: String,
        /// Environment variables checked in order for the API key.
        api_key_env: Vec<String>,
    },
    /// Nominatim / `OpenStreetMap` geocoder.
    Nominatim {
        /// Instance root URL, if a fixed one is configured.
        #[serde(default)]
        base_url: Option<String>,
        /// Environment variable that overrides (or supplies) the root URL.
        #[serde(default)]
        base_url_env: Option<String>,
    },
}

const fn default_true() -> bool {
    true
}

impl GeocodingService {
    /// Builds a client for this service using credentials from `env`.
    ///
    /// Returns `None` when the service is disabled or its credentials are
    /// missing or empty.
    #[must_use]
    pub fn client(&self, env: impl Fn(&str) -> Option<String>) -> Option<Arc<dyn GeocodingClient>> {
        if !self.enabled {
            return None;
        }

        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        match &self.provider {
            ProviderConfig::GooglePlaces {
                base_url,
                api_key_env,
            } => {
                let api_key = api_key_env.iter().find_map(|key| non_empty(key))?;
                Some(Arc::new(GooglePlacesClient::new(base_url, api_key)))
            }
            ProviderConfig::Nominatim {
                base_url,
                base_url_env,
            } => {
                let base_url = base_url_env
                    .as_deref()
                    .and_then(non_empty)
                    .or_else(|| base_url.clone())?;
                match NominatimClient::new(base_url) {
                    Ok(client) => Some(Arc::new(client)),
                    Err(e) => {
                        log::warn!("Failed to build {} client: {e}", self.name);
                        None
                    }
                }
            }
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("google_places", include_str!("../services/google_places.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 2;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Returns a client for the highest-priority enabled service that has
/// credentials in `env`, or `None` when no geocoder is available.
#[must_use]
pub fn client_with(env: impl Fn(&str) -> Option<String>) -> Option<Arc<dyn GeocodingClient>> {
    enabled_services().into_iter().find_map(|svc| {
        let client = svc.client(&env)?;
        log::info!("Using geocoding service '{}' ({})", svc.id, svc.name);
        Some(client)
    })
}

/// [`client_with`] reading the process environment.
#[must_use]
pub fn client_from_env() -> Option<Arc<dyn GeocodingClient>> {
    let client = client_with(|key| std::env::var(key).ok());
    if client.is_none() {
        log::warn!("No geocoding service configured; suggestions disabled, points echo as typed");
    }
    client
}
