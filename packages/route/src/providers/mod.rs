//! Deep-link builders for the supported map providers.
//!
//! Each provider has its own URL grammar and its own ceiling on what it
//! can express:
//!
//! | Provider | Origin | Waypoints | Coordinates |
//! |----------|--------|-----------|-------------|
//! | Google Maps | yes | native, pipe separated | as text |
//! | Waze | no | none (destination only) | native `ll=` |
//! | Apple Maps | optional | folded into `daddr` | as text |
//!
//! Builders never fail: when a provider cannot express a request the
//! builder returns `None` and the other providers are unaffected.

pub mod apple;
pub mod google;
pub mod waze;

use route_planner_route_models::{Provider, ProviderUrlResult, RouteOptions, RouteRequest};
use url::form_urlencoded;

pub use apple::AppleMaps;
pub use google::GoogleMaps;
pub use waze::Waze;

/// How a provider handles intermediate stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointSupport {
    /// Dedicated waypoint parameter.
    Native,
    /// No waypoint parameter; stops are folded into another field.
    Degraded,
    /// Stops are dropped.
    Unsupported,
}

/// What a provider's URL grammar can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether an explicit origin can be given.
    pub origin: bool,
    /// Intermediate stop handling.
    pub waypoints: WaypointSupport,
    /// Whether a coordinate destination has its own parameter form.
    pub coordinates: bool,
    /// Whether travel mode and avoid preferences are honoured.
    pub preferences: bool,
}

/// Normalized address strings for one itinerary.
///
/// Blank strings are treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stops<'a> {
    /// Starting point.
    pub origin: Option<&'a str>,
    /// Intermediate stops, in order, without blanks.
    pub waypoints: Vec<&'a str>,
    /// Final point.
    pub destination: Option<&'a str>,
}

impl<'a> Stops<'a> {
    /// Builds the itinerary, trimming values and dropping blanks.
    #[must_use]
    pub fn new(
        origin: Option<&'a str>,
        destination: Option<&'a str>,
        waypoints: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            origin: origin.and_then(non_blank),
            waypoints: waypoints.into_iter().filter_map(non_blank).collect(),
            destination: destination.and_then(non_blank),
        }
    }

    /// Uses the resolved address of every point in `request`.
    #[must_use]
    pub fn from_request(request: &'a RouteRequest) -> Self {
        Self::new(
            Some(request.origin.address.as_str()),
            Some(request.destination.address.as_str()),
            request.waypoints.iter().map(|w| w.address.as_str()),
        )
    }
}

/// A provider deep-link encoder.
pub trait UrlBuilder: Sync {
    /// The provider this builder targets.
    fn provider(&self) -> Provider;

    /// What the provider's URL grammar can express.
    fn capabilities(&self) -> Capabilities;

    /// Encodes the itinerary, or `None` when the provider cannot express
    /// it.
    fn build(&self, stops: &Stops<'_>, options: &RouteOptions) -> Option<String>;
}

/// Every supported builder, in provider order.
pub const BUILDERS: &[&dyn UrlBuilder] = &[&GoogleMaps, &Waze, &AppleMaps];

/// Returns the builder for `provider`.
#[must_use]
pub fn builder_for(provider: Provider) -> &'static dyn UrlBuilder {
    match provider {
        Provider::Google => &GoogleMaps,
        Provider::Waze => &Waze,
        Provider::Apple => &AppleMaps,
    }
}

/// Runs one builder and wraps its outcome.
#[must_use]
pub fn build_with(
    builder: &dyn UrlBuilder,
    stops: &Stops<'_>,
    options: &RouteOptions,
) -> ProviderUrlResult {
    let url = builder.build(stops, options);
    if url.is_none() {
        log::debug!(
            "{} cannot express this itinerary",
            builder.provider().label()
        );
    }
    ProviderUrlResult {
        provider: builder.provider(),
        url,
    }
}

/// Form-encodes a single query value (`+` for space).
pub(crate) fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
