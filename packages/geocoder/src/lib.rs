#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address normalization, autocomplete and place resolution for the
//! route planner.
//!
//! Geocoding providers are configured via TOML files in `services/` and
//! selected in priority order by [`service_registry`]:
//!
//! 1. **Google Places** (priority 1): autocomplete, place details and
//!    forward geocoding. Needs `GOOGLE_PLACES_API_KEY` (or
//!    `GOOGLE_API_KEY`).
//! 2. **Nominatim** (priority 2): only when `NOMINATIM_BASE_URL` points
//!    at a self-hosted instance.
//!
//! The [`resolver::AddressResolver`] wraps whichever client is available
//! and guarantees that no provider failure ever reaches the caller:
//! suggestions degrade to an empty list, resolution degrades to echoing
//! the input back.

pub mod address;
pub mod google;
pub mod nominatim;
pub mod resolver;
pub mod service_registry;

use route_planner_route_models::{Coordinates, LocationBias, Suggestion};
use thiserror::Error;

/// A place returned by a details lookup or forward geocode.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Canonical address reported by the provider.
    pub formatted_address: Option<String>,
    /// Position of the place.
    pub location: Coordinates,
    /// Provider place id, when the provider reports one.
    pub place_id: Option<String>,
}

/// Which geocoding provider a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Google Places / Geocoding API.
    GooglePlaces,
    /// Nominatim / OpenStreetMap.
    Nominatim,
}

/// Errors from geocoding operations.
///
/// These never leave this crate through the resolver; they are logged and
/// turned into empty suggestions or echo resolutions.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("{provider:?} returned status {status}")]
    Status {
        /// The provider.
        provider: GeocodingProvider,
        /// The status string or HTTP status.
        status: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider did not answer in time.
    #[error("Timed out after {millis}ms")]
    Timeout {
        /// The configured timeout.
        millis: u128,
    },
}

/// The geocoding collaborator consumed by the resolver.
#[async_trait::async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Which provider this client talks to.
    fn provider(&self) -> GeocodingProvider;

    /// Autocomplete suggestions for `text`, in provider relevance order.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn autocomplete(
        &self,
        text: &str,
        bias: Option<&LocationBias>,
    ) -> Result<Vec<Suggestion>, GeocodeError>;

    /// Details for a place id previously returned by
    /// [`GeocodingClient::autocomplete`].
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn place_details(&self, place_id: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;

    /// Forward geocode of free text.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn geocode(&self, text: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}
