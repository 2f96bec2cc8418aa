//! Google Maps directions links.
//!
//! `https://www.google.com/maps/dir/?api=1&origin=..&destination=..&travelmode=..[&avoid=..][&waypoints=..]`
//!
//! See <https://developers.google.com/maps/documentation/urls/get-started#directions-action>

use route_planner_route_models::{Provider, RouteOptions};
use url::form_urlencoded;

use super::{Capabilities, Stops, UrlBuilder, WaypointSupport};

/// Directions endpoint.
pub const DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/";

/// Prefix asking Google to reorder the waypoints.
const OPTIMIZE_PREFIX: &str = "optimize:true";

/// Google Maps builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleMaps;

impl UrlBuilder for GoogleMaps {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            origin: true,
            waypoints: WaypointSupport::Native,
            coordinates: false,
            preferences: true,
        }
    }

    fn build(&self, stops: &Stops<'_>, options: &RouteOptions) -> Option<String> {
        build_url(stops.origin?, stops.destination?, &stops.waypoints, options)
    }
}

/// Builds a directions URL.
///
/// The avoid list is emitted in canonical order and omitted when empty.
/// Waypoints are pipe separated, prefixed with `optimize:true` when
/// `options.optimize` is set, and the whole value is form-encoded.
///
/// Returns `None` when origin or destination is blank.
#[must_use]
pub fn build_url(
    origin: &str,
    destination: &str,
    waypoints: &[&str],
    options: &RouteOptions,
) -> Option<String> {
    let (origin, destination) = (origin.trim(), destination.trim());
    if origin.is_empty() || destination.is_empty() {
        return None;
    }

    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("api", "1")
        .append_pair("origin", origin)
        .append_pair("destination", destination)
        .append_pair("travelmode", options.mode.as_ref());

    if !options.avoid.is_empty() {
        let avoid: Vec<String> = options.avoid.iter().map(ToString::to_string).collect();
        query.append_pair("avoid", &avoid.join(","));
    }

    let waypoints: Vec<&str> = waypoints
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();

    if !waypoints.is_empty() {
        let mut value = waypoints.join("|");
        if options.optimize {
            value = format!("{OPTIMIZE_PREFIX}|{value}");
        }
        query.append_pair("waypoints", &value);
    }

    Some(format!("{DIRECTIONS_URL}?{}", query.finish()))
}
