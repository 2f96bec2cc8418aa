//! Apple Maps directions links.
//!
//! Apple Maps takes a start address (`saddr`) and a destination
//! (`daddr`) but has no waypoint parameter. Intermediate stops are folded
//! into `daddr` as an `@`-joined sequence ending with the destination,
//! each stop encoded on its own. This is best effort; Apple may only
//! honour the first address.
//!
//! See <https://developer.apple.com/library/archive/featuredarticles/iPhoneURLScheme_Reference/MapLinks/MapLinks.html>

use route_planner_route_models::{Provider, RouteOptions};
use url::form_urlencoded;

use super::{Capabilities, Stops, UrlBuilder, WaypointSupport, encode};

/// Maps endpoint.
pub const MAPS_URL: &str = "https://maps.apple.com/";

/// Direction flag. Always driving; travel mode is not carried over.
pub const DIRECTION_FLAG: &str = "d";

/// Separator between stops folded into `daddr`.
pub const STOP_SEPARATOR: char = '@';

/// Apple Maps builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppleMaps;

impl UrlBuilder for AppleMaps {
    fn provider(&self) -> Provider {
        Provider::Apple
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            origin: true,
            waypoints: WaypointSupport::Degraded,
            coordinates: false,
            preferences: false,
        }
    }

    fn build(&self, stops: &Stops<'_>, _options: &RouteOptions) -> Option<String> {
        build_url(stops.origin, stops.destination?, &stops.waypoints)
    }
}

/// Builds a directions URL.
///
/// `saddr` is omitted when `origin` is absent or blank. Returns `None`
/// when `destination` is blank.
#[must_use]
pub fn build_url(origin: Option<&str>, destination: &str, stops: &[&str]) -> Option<String> {
    let destination = destination.trim();
    if destination.is_empty() {
        return None;
    }

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("dirflg", DIRECTION_FLAG);

    if let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) {
        query.append_pair("saddr", origin);
    }

    let separator = STOP_SEPARATOR.to_string();
    let daddr = stops
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .chain(std::iter::once(destination))
        .map(encode)
        .collect::<Vec<_>>()
        .join(&separator);

    Some(format!("{MAPS_URL}?{}&daddr={daddr}", query.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_planner_route_models::TravelMode;

    #[test]
    fn builds_origin_and_destination() {
        assert_eq!(
            build_url(Some("Madrid"), "Plaza Mayor", &[]).as_deref(),
            Some("https://maps.apple.com/?dirflg=d&saddr=Madrid&daddr=Plaza+Mayor")
        );
    }

    #[test]
    fn missing_origin_omits_saddr() {
        let url = build_url(None, "B", &[]).unwrap();
        assert_eq!(url, "https://maps.apple.com/?dirflg=d&daddr=B");
        assert!(!url.contains("saddr"));

        let url = build_url(Some("  "), "B", &[]).unwrap();
        assert!(!url.contains("saddr"));
    }

    #[test]
    fn stops_are_folded_into_daddr() {
        let url = build_url(
            Some("Madrid"),
            "Barcelona",
            &["Zaragoza", "Lleida"],
        )
        .unwrap();
        assert!(url.ends_with("&daddr=Zaragoza@Lleida@Barcelona"), "{url}");
    }

    #[test]
    fn each_stop_is_encoded_separately() {
        let url = build_url(None, "Casa Batlló", &["Parc Güell, Barcelona"]).unwrap();
        assert!(url.starts_with("https://maps.apple.com/?dirflg=d&"), "{url}");
        assert!(
            url.ends_with("daddr=Parc+G%C3%BCell%2C+Barcelona@Casa+Batll%C3%B3"),
            "{url}"
        );
    }

    #[test]
    fn travel_mode_never_changes_the_flag() {
        for mode in TravelMode::ALL {
            let options = RouteOptions {
                mode: *mode,
                ..RouteOptions::default()
            };
            let stops = Stops::new(Some("Madrid"), Some("Barcelona"), Vec::new());
            assert_eq!(
                AppleMaps.build(&stops, &options).as_deref(),
                Some("https://maps.apple.com/?dirflg=d&saddr=Madrid&daddr=Barcelona"),
                "{mode}"
            );
        }
    }

    #[test]
    fn blank_destination_cannot_build() {
        assert_eq!(build_url(Some("A"), " ", &[]), None);
    }
}
