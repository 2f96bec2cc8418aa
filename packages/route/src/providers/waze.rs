//! Waze navigation links.
//!
//! Waze only navigates to a single destination: there is no origin and no
//! waypoint parameter. Coordinate destinations use `ll=`, anything else is
//! a free-text search with `q=`.
//!
//! See <https://developers.google.com/waze/deeplinks>

use route_planner_geocoder::address::parse_coordinate_pair;
use route_planner_route_models::{Provider, RouteOptions};
use url::form_urlencoded;

use super::{Capabilities, Stops, UrlBuilder, WaypointSupport};

/// Deep-link endpoint.
pub const DEEP_LINK_URL: &str = "https://waze.com/ul";

/// Waze builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Waze;

impl UrlBuilder for Waze {
    fn provider(&self) -> Provider {
        Provider::Waze
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            origin: false,
            waypoints: WaypointSupport::Unsupported,
            coordinates: true,
            preferences: false,
        }
    }

    fn build(&self, stops: &Stops<'_>, _options: &RouteOptions) -> Option<String> {
        destination_url(stops.destination?)
    }
}

/// Builds a link from an ordered point list; only the last point is used.
#[must_use]
pub fn build_url(points: &[&str]) -> Option<String> {
    destination_url(points.last()?)
}

/// Builds a navigation link to `destination`.
///
/// `"41.4,2.2"` becomes `?ll=41.4,2.2&navigate=yes`; free text becomes
/// `?q=<encoded>&navigate=yes`. Returns `None` when `destination` is
/// blank.
#[must_use]
pub fn destination_url(destination: &str) -> Option<String> {
    let destination = destination.trim();
    if destination.is_empty() {
        return None;
    }

    if parse_coordinate_pair(destination).is_some() {
        // Components are plain decimal literals; emit them as written.
        let (lat, lng) = destination.split_once(',')?;
        return Some(format!(
            "{DEEP_LINK_URL}?ll={},{}&navigate=yes",
            without_plus(lat),
            without_plus(lng)
        ));
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", destination)
        .append_pair("navigate", "yes")
        .finish();

    Some(format!("{DEEP_LINK_URL}?{query}"))
}

/// Trims a coordinate component and drops a leading `+`, which would
/// decode as a space in a query string.
fn without_plus(component: &str) -> &str {
    let component = component.trim();
    component.strip_prefix('+').unwrap_or(component)
}
