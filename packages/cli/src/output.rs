//! Printing generated routes.

use route_planner_route::providers::{WaypointSupport, builder_for};
use route_planner_route_models::{ProviderUrlResult, RouteLinks, RouteOptions};

/// Prints the resolved itinerary and the three provider links.
pub fn print_route(links: &RouteLinks, options: &RouteOptions) {
    println!();
    for line in report(links, options) {
        println!("{line}");
    }
    println!();
}

fn report(links: &RouteLinks, options: &RouteOptions) -> Vec<String> {
    let mut lines = vec![format!("From: {}", links.origin.address)];
    lines.extend(
        links
            .waypoints
            .iter()
            .map(|point| format!("Via:  {}", point.address)),
    );
    lines.push(format!("To:   {}", links.destination.address));
    lines.push(String::new());

    for result in links.results() {
        let label = result.provider.label();
        match &result.url {
            Some(url) => lines.push(format!("{label}: {url}")),
            None => lines.push(format!("{label}: not available for this itinerary")),
        }
        lines.extend(notice(result, !links.waypoints.is_empty(), options).map(|n| format!("  {n}")));
    }

    lines
}

/// Explains what a provider left out of an otherwise usable link.
fn notice(result: &ProviderUrlResult, has_stops: bool, options: &RouteOptions) -> Option<String> {
    if !result.is_available() {
        return None;
    }

    let label = result.provider.label();
    let capabilities = builder_for(result.provider).capabilities();

    if has_stops {
        match capabilities.waypoints {
            WaypointSupport::Native => {}
            WaypointSupport::Degraded => {
                return Some(format!(
                    "{label} has no stop parameter; stops were added as destinations."
                ));
            }
            WaypointSupport::Unsupported => {
                return Some(format!(
                    "{label} only supports a single destination; stops were left out."
                ));
            }
        }
    }

    (!capabilities.preferences && *options != RouteOptions::default())
        .then(|| format!("{label} ignores route preferences."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_planner_route::links_for;
    use route_planner_route_models::{Avoid, ResolvedPoint, RouteRequest};

    fn links(stops: &[&str], options: RouteOptions) -> RouteLinks {
        links_for(RouteRequest {
            origin: ResolvedPoint::echo("Madrid"),
            destination: ResolvedPoint::echo("Barcelona"),
            waypoints: stops.iter().map(|s| ResolvedPoint::echo(*s)).collect(),
            options,
        })
    }

    #[test]
    fn direct_route_has_no_notices() {
        let options = RouteOptions::default();
        let lines = report(&links(&[], options.clone()), &options);

        assert_eq!(lines[0], "From: Madrid");
        assert_eq!(lines[1], "To:   Barcelona");
        assert!(lines.iter().all(|l| !l.starts_with("  ")));
        assert!(lines.iter().any(|l| l.starts_with("Waze: https://waze.com/ul")));
    }

    #[test]
    fn stops_explain_waze_and_apple_limits() {
        let options = RouteOptions::default();
        let lines = report(&links(&["Zaragoza"], options.clone()), &options);

        assert!(lines.contains(&"Via:  Zaragoza".to_string()));
        assert!(lines.contains(
            &"  Waze only supports a single destination; stops were left out.".to_string()
        ));
        assert!(lines.contains(
            &"  Apple Maps has no stop parameter; stops were added as destinations.".to_string()
        ));
        assert!(!lines.iter().any(|l| l.starts_with("  Google Maps")));
    }

    #[test]
    fn ignored_preferences_are_mentioned() {
        let options = RouteOptions {
            avoid: [Avoid::Tolls].into_iter().collect(),
            ..RouteOptions::default()
        };
        let lines = report(&links(&[], options.clone()), &options);

        assert!(lines.contains(&"  Waze ignores route preferences.".to_string()));
        assert!(lines.contains(&"  Apple Maps ignores route preferences.".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Google Maps ignores")));
    }
}
